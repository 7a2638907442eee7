// src/pipeline.rs

use crate::analyzer::{self, WalkOptions};
use crate::classifier;
use crate::cli::HistoryArgs;
use crate::collector;
use crate::error::Result;
use crate::model::{Commit, RectifiedRecord};
use crate::predictor::FixTypePredictor;
use crate::rectifier;
use crate::report::Report;
use crate::table;
use std::path::Path;

/// Repository location plus the optional date window
#[derive(Debug, Clone)]
pub struct History<'a> {
    pub repo: &'a Path,
    pub since: Option<i64>,
    pub until: Option<i64>,
}

impl<'a> History<'a> {
    pub fn from_args(args: &'a HistoryArgs) -> Result<Self> {
        Ok(Self {
            repo: &args.repo,
            since: args.since.as_deref().map(|s| analyzer::parse_date_bound(s, false)).transpose()?,
            until: args.until.as_deref().map(|s| analyzer::parse_date_bound(s, true)).transpose()?,
        })
    }

    fn walk_options(&self) -> WalkOptions {
        WalkOptions { since: self.since, until: self.until, ..Default::default() }
    }
}

/// Classifies the history and writes the bug-fix commit table.
pub fn mine(history: &History<'_>, output: &Path) -> Result<Vec<Commit>> {
    let commits = analyzer::walk(history.repo, &history.walk_options())?;
    let fixes = classifier::classify(commits);
    table::write_commits(output, &fixes)?;
    Ok(fixes)
}

/// Re-reads the given commits with full diffs, predicts a label per file and
/// writes the file-level table. Nothing is written if prediction fails.
pub fn diff(
    history: &History<'_>,
    fixes: &[Commit],
    predictor: &dyn FixTypePredictor,
    output: &Path,
) -> Result<()> {
    let options = WalkOptions {
        only: Some(fixes.iter().map(|c| c.hash.clone()).collect()),
        with_content: true,
        ..history.walk_options()
    };
    let commits = analyzer::walk(history.repo, &options)?;
    let records = collector::collect(&commits, predictor)?;
    table::write_changes(output, &records)
}

/// Rectifies the file-level table, writes the result and returns its report.
pub fn rectify(input: &Path, output: &Path) -> Result<Report> {
    let records = table::read_changes(input)?;
    let rectified = rectifier::rectify_all(records);
    table::write_rectified(output, &rectified)?;
    Ok(report(&rectified))
}

pub fn report(records: &[RectifiedRecord]) -> Report {
    Report::from_results(records.iter().map(|r| &r.result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testutil::commit_files;
    use crate::error::{Error, PredictError};
    use crate::model::Provenance;
    use git2::Repository;
    use tempfile::TempDir;

    /// Labels a diff after the first added line.
    struct FirstAddedLine;

    impl FixTypePredictor for FirstAddedLine {
        fn predict(&self, diff: &str) -> std::result::Result<String, PredictError> {
            Ok(diff
                .lines()
                .find_map(|l| l.strip_prefix('+'))
                .map(|l| format!("Handle {} in config loader", l.trim()))
                .unwrap_or_default())
        }
    }

    struct Unavailable;

    impl FixTypePredictor for Unavailable {
        fn predict(&self, _diff: &str) -> std::result::Result<String, PredictError> {
            Err(PredictError::Status { status: 503, body: "model loading".into() })
        }
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_files(&repo, &[("conf.py", "a = 1\n")], "Initial import", 1_600_000_000);
        commit_files(&repo, &[("conf.py", "a = 2\n")], "fix", 1_600_100_000);
        commit_files(&repo, &[("docs.md", "# Docs\n")], "Write documentation", 1_600_200_000);
        commit_files(&repo, &[("conf.py", "a = 3\n"), ("notes.txt", "n\n")], "Resolve error in conf.py parser", 1_600_300_000);
        dir
    }

    #[test]
    fn stages_chain_through_tables() {
        let dir = repo();
        let out = TempDir::new().unwrap();
        let history = History { repo: dir.path(), since: None, until: None };
        let (a, b, c) = (out.path().join("a.csv"), out.path().join("b.csv"), out.path().join("c.csv"));

        let fixes = mine(&history, &a).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(table::read_commits(&a).unwrap().len(), 2);

        diff(&history, &table::read_commits(&a).unwrap(), &FirstAddedLine, &b).unwrap();
        let changes = table::read_changes(&b).unwrap();
        let files: Vec<_> = changes.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(files, vec!["conf.py", "conf.py", "notes.txt"]);
        assert_eq!(changes[0].predicted_label, "Handle a = 2 in config loader");

        let report = rectify(&b, &c).unwrap();
        assert_eq!(report.total(), 3);
        let rectified = table::read_rectified(&c).unwrap();

        // "fix" is generic, the label is not.
        assert_eq!(rectified[0].result.provenance, Provenance::Llm);
        assert_eq!(rectified[0].result.chosen, "Handle a = 2 in config loader (conf.py)");
        // Developer message names a specific term and already mentions the file.
        assert_eq!(rectified[1].result.provenance, Provenance::Developer);
        assert_eq!(rectified[1].result.chosen, "Resolve error in conf.py parser");
        assert_eq!(rectified[2].result.chosen, "Resolve error in conf.py parser (notes.txt)");
        assert_eq!(report.count(Provenance::Developer), 2);
    }

    #[test]
    fn failed_prediction_writes_nothing() {
        let dir = repo();
        let out = TempDir::new().unwrap();
        let history = History { repo: dir.path(), since: None, until: None };
        let b = out.path().join("b.csv");

        let fixes = mine(&history, &out.path().join("a.csv")).unwrap();
        let err = diff(&history, &fixes, &Unavailable, &b).unwrap_err();
        assert!(matches!(err, Error::Predict { .. }));
        assert!(!b.exists());
    }

    #[test]
    fn date_window_limits_mining() {
        let dir = repo();
        let out = TempDir::new().unwrap();
        let history = History { repo: dir.path(), since: Some(1_600_250_000), until: None };
        let fixes = mine(&history, &out.path().join("a.csv")).unwrap();
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].message, "Resolve error in conf.py parser");
    }
}
