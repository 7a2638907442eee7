// src/collector.rs

use crate::error::{Error, Result};
use crate::model::{Commit, FileChangeRecord};
use crate::predictor::{label_for, FixTypePredictor};
use indicatif::ProgressBar;

/// Emits one record per modified file of each commit, in traversal order,
/// labelling each diff with the predictor. A predictor failure aborts the stage.
pub fn collect(commits: &[Commit], predictor: &dyn FixTypePredictor) -> Result<Vec<FileChangeRecord>> {
    let total: usize = commits.iter().map(|c| c.modified_files.len()).sum();
    let bar = ProgressBar::new(total as u64);
    bar.set_message("Predicting fix types");

    let mut records = Vec::with_capacity(total);
    for commit in commits {
        for file in &commit.modified_files {
            let predicted_label = label_for(predictor, &file.diff).map_err(|source| Error::Predict {
                filename: file.path.clone(),
                source,
            })?;
            records.push(FileChangeRecord {
                hash: commit.hash.clone(),
                message: commit.message.clone(),
                filename: file.filename.clone(),
                source_before: file.source_before.clone(),
                source_after: file.source_after.clone(),
                diff: file.diff.clone(),
                predicted_label,
                developer_message: commit.message.clone(),
            });
            bar.inc(1);
        }
    }
    bar.finish_with_message("Predictions complete");
    tracing::info!("Collected {} file-level records from {} commits", records.len(), commits.len());

    Ok(records)
}
