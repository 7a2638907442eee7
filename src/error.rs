// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a text-generation backend.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("prediction request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("prediction backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected prediction response: {0}")]
    Response(String),
}

/// Errors that abort a pipeline stage.
#[derive(Error, Debug)]
pub enum Error {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fix-type prediction failed for {filename}: {source}")]
    Predict {
        filename: String,
        #[source]
        source: PredictError,
    },

    #[error("could not set up fix-type predictor: {0}")]
    PredictorSetup(#[source] PredictError),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("table {} is missing required column {column}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
