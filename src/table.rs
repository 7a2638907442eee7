// src/table.rs
//
// CSV persistence for the three pipeline tables. Every column is read as text
// and missing or unparsable values become empty, so tables edited by hand or
// written by other tools still load.

use crate::error::{Error, Result};
use crate::model::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const COMMIT_HEADERS: [&str; 5] = ["Hash", "Message", "ParentHashes", "IsMergeCommit", "ModifiedFiles"];

pub const CHANGE_HEADERS: [&str; 9] = [
    "Hash",
    "Message",
    "Filename",
    "SourceBefore",
    "SourceAfter",
    "Diff",
    "PredictedLabel",
    "DeveloperMessage",
    "RectifiedMessage",
];

pub const RECTIFIED_HEADERS: [&str; 10] = [
    "Hash",
    "Message",
    "Filename",
    "SourceBefore",
    "SourceAfter",
    "Diff",
    "PredictedLabel",
    "DeveloperMessage",
    "RectifiedMessage",
    "Source",
];

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CommitRow {
    hash: String,
    message: String,
    parent_hashes: String,
    is_merge_commit: String,
    modified_files: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ChangeRow {
    hash: String,
    message: String,
    filename: String,
    source_before: String,
    source_after: String,
    diff: String,
    predicted_label: String,
    developer_message: String,
    rectified_message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RectifiedRow {
    hash: String,
    message: String,
    filename: String,
    source_before: String,
    source_after: String,
    diff: String,
    predicted_label: String,
    developer_message: String,
    rectified_message: String,
    source: String,
}

impl From<&FileChangeRecord> for ChangeRow {
    fn from(r: &FileChangeRecord) -> Self {
        ChangeRow {
            hash: r.hash.clone(),
            message: r.message.clone(),
            filename: r.filename.clone(),
            source_before: r.source_before.clone(),
            source_after: r.source_after.clone(),
            diff: r.diff.clone(),
            predicted_label: r.predicted_label.clone(),
            developer_message: r.developer_message.clone(),
            rectified_message: String::new(),
        }
    }
}

impl From<ChangeRow> for FileChangeRecord {
    fn from(r: ChangeRow) -> Self {
        FileChangeRecord {
            hash: r.hash,
            message: r.message,
            filename: r.filename,
            source_before: r.source_before,
            source_after: r.source_after,
            diff: r.diff,
            predicted_label: r.predicted_label,
            developer_message: r.developer_message,
        }
    }
}

fn writer(path: &Path, headers: &[&str]) -> Result<csv::Writer<std::fs::File>> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(headers)?;
    Ok(wtr)
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new().flexible(true).from_path(path)?)
}

/// Reads a list column written as a JSON array, falling back to a bracketed,
/// comma-separated list of optionally quoted items.
fn parse_list(s: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(s) {
        return items;
    }
    s.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Writes table A, one row per bug-fix commit.
pub fn write_commits(path: &Path, commits: &[Commit]) -> Result<()> {
    let mut wtr = writer(path, &COMMIT_HEADERS)?;
    for c in commits {
        let files: Vec<&str> = c.modified_files.iter().map(|f| f.filename.as_str()).collect();
        wtr.serialize(CommitRow {
            hash: c.hash.clone(),
            message: c.message.clone(),
            parent_hashes: serde_json::to_string(&c.parents)?,
            is_merge_commit: c.is_merge.to_string(),
            modified_files: serde_json::to_string(&files)?,
        })?;
    }
    wtr.flush()?;
    tracing::info!("Wrote {} commits to {}", commits.len(), path.display());
    Ok(())
}

/// Reads table A. Modified files come back with only their names set.
pub fn read_commits(path: &Path) -> Result<Vec<Commit>> {
    let mut rdr = reader(path)?;
    if !rdr.headers()?.iter().any(|h| h == "Hash") {
        return Err(Error::MissingColumn { path: path.to_path_buf(), column: "Hash" });
    }

    let mut commits = Vec::new();
    for row in rdr.deserialize::<CommitRow>() {
        let row = row?;
        commits.push(Commit {
            hash: row.hash.trim().to_string(),
            message: row.message,
            parents: parse_list(&row.parent_hashes),
            is_merge: parse_bool(&row.is_merge_commit),
            time: 0,
            modified_files: parse_list(&row.modified_files)
                .into_iter()
                .map(|filename| ModifiedFile { filename, ..Default::default() })
                .collect(),
        });
    }
    Ok(commits)
}

/// Writes table B with an empty `RectifiedMessage` column.
pub fn write_changes(path: &Path, records: &[FileChangeRecord]) -> Result<()> {
    let mut wtr = writer(path, &CHANGE_HEADERS)?;
    for r in records {
        wtr.serialize(ChangeRow::from(r))?;
    }
    wtr.flush()?;
    tracing::info!("Wrote {} file-level records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_changes(path: &Path) -> Result<Vec<FileChangeRecord>> {
    let mut rdr = reader(path)?;
    let mut records = Vec::new();
    for row in rdr.deserialize::<ChangeRow>() {
        records.push(FileChangeRecord::from(row?));
    }
    Ok(records)
}

/// Writes table C: table B plus the rectified message and its source.
pub fn write_rectified(path: &Path, records: &[RectifiedRecord]) -> Result<()> {
    let mut wtr = writer(path, &RECTIFIED_HEADERS)?;
    for r in records {
        let base = ChangeRow::from(&r.change);
        wtr.serialize(RectifiedRow {
            hash: base.hash,
            message: base.message,
            filename: base.filename,
            source_before: base.source_before,
            source_after: base.source_after,
            diff: base.diff,
            predicted_label: base.predicted_label,
            developer_message: base.developer_message,
            rectified_message: r.result.chosen.clone(),
            source: r.result.provenance.to_string(),
        })?;
    }
    wtr.flush()?;
    tracing::info!("Wrote {} rectified records to {}", records.len(), path.display());
    Ok(())
}

/// Reads table C. Rows whose `Source` is not a known provenance are skipped.
pub fn read_rectified(path: &Path) -> Result<Vec<RectifiedRecord>> {
    let mut rdr = reader(path)?;
    let mut records = Vec::new();
    for (line, row) in rdr.deserialize::<RectifiedRow>().enumerate() {
        let row = row?;
        let Some(provenance) = Provenance::parse(&row.source) else {
            tracing::warn!("Skipping row {} of {}: unknown source {:?}", line + 1, path.display(), row.source);
            continue;
        };
        let chosen = row.rectified_message.clone();
        let change = FileChangeRecord::from(ChangeRow {
            hash: row.hash,
            message: row.message,
            filename: row.filename,
            source_before: row.source_before,
            source_after: row.source_after,
            diff: row.diff,
            predicted_label: row.predicted_label,
            developer_message: row.developer_message,
            rectified_message: row.rectified_message,
        });
        records.push(RectifiedRecord { change, result: RectificationResult { chosen, provenance } });
    }
    Ok(records)
}
