// src/analyzer.rs

use crate::error::{Error, Result};
use crate::model::*;
use chrono::{NaiveDate, NaiveTime};
use git2::{Diff, DiffFindOptions, DiffOptions, Oid, Patch, Repository};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::Path;

/// Controls which commits the walk yields and how much it reads per file.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Inclusive lower bound on commit time, seconds since the epoch
    pub since: Option<i64>,
    /// Inclusive upper bound on commit time, seconds since the epoch
    pub until: Option<i64>,
    /// Restrict the walk to these commit hashes
    pub only: Option<HashSet<String>>,
    /// Read diffs and blob contents, not just file names
    pub with_content: bool,
}

/// Parses a `YYYY-MM-DD` date into a UTC timestamp at the start of the day,
/// or the last second of the day when `end_of_day` is set.
pub fn parse_date_bound(s: &str, end_of_day: bool) -> Result<i64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| Error::InvalidDate(s.to_string()))?;
    Ok(date.and_time(time).and_utc().timestamp())
}

/// Walks the history reachable from HEAD, oldest commit first.
pub fn walk(repo_path: &Path, options: &WalkOptions) -> Result<Vec<Commit>> {
    let repo = Repository::open(repo_path)?;
    tracing::info!("Walking history of {}", repo_path.display());

    let mut oids = Vec::new();
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(git2::Sort::TIME)?;
    for oid in revwalk {
        oids.push(oid?);
    }
    oids.reverse();

    let bar = ProgressBar::new(oids.len() as u64);
    bar.set_message("Reading commits");

    let mut commits = Vec::new();
    for oid in oids {
        bar.inc(1);
        let hash = oid.to_string();
        if let Some(only) = &options.only {
            if !only.contains(&hash) {
                continue;
            }
        }
        let commit = repo.find_commit(oid)?;
        let time = commit.time().seconds();
        if options.since.map_or(false, |s| time < s) || options.until.map_or(false, |u| time > u) {
            continue;
        }

        let parents: Vec<String> = commit.parent_ids().map(|p| p.to_string()).collect();
        let is_merge = parents.len() > 1;
        // Merge commits have no single parent to diff against.
        let modified_files = if is_merge {
            Vec::new()
        } else {
            modified_files(&repo, &commit, options.with_content)?
        };

        commits.push(Commit {
            hash,
            message: String::from_utf8_lossy(commit.message_bytes()).trim().to_string(),
            parents,
            is_merge,
            time,
            modified_files,
        });
    }
    bar.finish_with_message("History read");
    tracing::info!("Read {} commits", commits.len());

    Ok(commits)
}

fn modified_files(repo: &Repository, commit: &git2::Commit, with_content: bool) -> Result<Vec<ModifiedFile>> {
    let parent_tree = match commit.parents().next() {
        Some(parent) => Some(parent.tree()?),
        None => None,
    };
    let current_tree = commit.tree()?;

    let mut diff_opts = DiffOptions::new();
    diff_opts.include_untracked(false);
    diff_opts.ignore_filemode(true);

    let mut diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&current_tree), Some(&mut diff_opts))?;
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))?;

    let mut files = Vec::new();
    for (idx, delta) in diff.deltas().enumerate() {
        let Some(path) = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(Path::to_path_buf)
        else {
            continue;
        };
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        let mut file = ModifiedFile {
            filename,
            path: path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        if with_content {
            file.diff = patch_text(&diff, idx)?;
            file.source_before = blob_text(repo, delta.old_file().id())?;
            file.source_after = blob_text(repo, delta.new_file().id())?;
            tracing::trace!(commit = %commit.id(), path = %file.path, status = ?delta.status(), "collected file");
        }
        files.push(file);
    }
    Ok(files)
}

/// Renders the hunks of one file as unified diff text without the file header.
fn patch_text(diff: &Diff<'_>, idx: usize) -> Result<String> {
    let Some(patch) = Patch::from_diff(diff, idx)? else {
        return Ok(String::new());
    };
    if patch.delta().flags().is_binary() {
        return Ok(String::new());
    }

    let mut out = String::new();
    for h in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(h)?;
        out.push_str(&String::from_utf8_lossy(hunk.header()));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        for l in 0..line_count {
            let line = patch.line_in_hunk(h, l)?;
            match line.origin() {
                '+' | '-' | ' ' => {
                    out.push(line.origin());
                    out.push_str(&String::from_utf8_lossy(line.content()));
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => {} // end-of-file newline markers
            }
        }
    }
    Ok(out)
}

fn blob_text(repo: &Repository, id: Oid) -> Result<String> {
    if id.is_zero() {
        return Ok(String::new());
    }
    // Submodule entries point at commits, not blobs.
    let Ok(blob) = repo.find_blob(id) else {
        return Ok(String::new());
    };
    if blob.is_binary() {
        return Ok(String::new());
    }
    Ok(String::from_utf8_lossy(blob.content()).into_owned())
}


#[cfg(test)]
mod tests {
    use super::testutil::commit_files;
    use super::*;
    use tempfile::TempDir;

    fn sample_repo() -> (TempDir, Vec<Oid>) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let a = commit_files(&repo, &[("src/app.py", "x = 1\n")], "Initial commit", 1_600_000_000);
        let b = commit_files(&repo, &[("src/app.py", "x = 2\n"), ("README", "hi\n")], "Fix crash on start\n", 1_600_100_000);
        let c = commit_files(&repo, &[("README", "hello\n")], "Update readme", 1_600_200_000);
        (dir, vec![a, b, c])
    }

    #[test]
    fn walks_oldest_first_with_file_names() {
        let (dir, oids) = sample_repo();
        let commits = walk(dir.path(), &WalkOptions::default()).unwrap();
        let hashes: Vec<_> = commits.iter().map(|c| c.hash.clone()).collect();
        let expected: Vec<_> = oids.iter().map(|o| o.to_string()).collect();
        assert_eq!(hashes, expected);

        assert!(commits[0].parents.is_empty());
        assert_eq!(commits[1].parents, vec![oids[0].to_string()]);
        assert!(!commits[1].is_merge);
        assert_eq!(commits[1].message, "Fix crash on start");

        let names: Vec<_> = commits[1].modified_files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["README", "app.py"]);
        assert_eq!(commits[1].modified_files[1].path, "src/app.py");
        assert!(commits[1].modified_files[1].diff.is_empty());
    }

    #[test]
    fn reads_diff_and_sources_when_asked() {
        let (dir, oids) = sample_repo();
        let options = WalkOptions {
            only: Some([oids[1].to_string()].into_iter().collect()),
            with_content: true,
            ..Default::default()
        };
        let commits = walk(dir.path(), &options).unwrap();
        assert_eq!(commits.len(), 1);

        let app = commits[0].modified_files.iter().find(|f| f.filename == "app.py").unwrap();
        assert_eq!(app.source_before, "x = 1\n");
        assert_eq!(app.source_after, "x = 2\n");
        assert!(app.diff.starts_with("@@"));
        assert!(app.diff.contains("-x = 1\n"));
        assert!(app.diff.contains("+x = 2\n"));

        // README is new in this commit
        let readme = commits[0].modified_files.iter().find(|f| f.filename == "README").unwrap();
        assert_eq!(readme.source_before, "");
        assert_eq!(readme.source_after, "hi\n");
    }

    #[test]
    fn date_bounds_filter_commits() {
        let (dir, oids) = sample_repo();
        let options = WalkOptions {
            since: Some(1_600_050_000),
            until: Some(1_600_150_000),
            ..Default::default()
        };
        let commits = walk(dir.path(), &options).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].hash, oids[1].to_string());
    }

    #[test]
    fn parses_date_bounds() {
        assert_eq!(parse_date_bound("1970-01-02", false).unwrap(), 86_400);
        assert_eq!(parse_date_bound("1970-01-01", true).unwrap(), 86_399);
        assert!(matches!(parse_date_bound("01/02/1970", false), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn missing_repository_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(walk(&dir.path().join("nope"), &WalkOptions::default()), Err(Error::Git(_))));
    }
}
