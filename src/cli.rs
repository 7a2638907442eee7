// src/cli.rs

use crate::predictor::{self, RemoteConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const COMMITS_FILE: &str = "bug_fix_commits.csv";
pub const CHANGES_FILE: &str = "diff_analysis.csv";
pub const RECTIFIED_FILE: &str = "diff_analysis_rectified.csv";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find bug-fixing commits and write them to a table
    Mine {
        #[command(flatten)]
        history: HistoryArgs,

        /// Where to write the bug-fix commit table
        #[arg(short, long, default_value = COMMITS_FILE)]
        output: PathBuf,
    },

    /// Extract per-file diffs of the mined commits and predict a fix type for each
    Diff {
        #[command(flatten)]
        history: HistoryArgs,

        /// Bug-fix commit table produced by `mine`
        #[arg(long, default_value = COMMITS_FILE)]
        commits: PathBuf,

        /// Where to write the file-level diff table
        #[arg(short, long, default_value = CHANGES_FILE)]
        output: PathBuf,

        #[command(flatten)]
        predictor: PredictorArgs,
    },

    /// Reconcile developer messages with predicted labels and print the report
    Rectify {
        /// File-level diff table produced by `diff`
        #[arg(short, long, default_value = CHANGES_FILE)]
        input: PathBuf,

        /// Where to write the rectified table
        #[arg(short, long, default_value = RECTIFIED_FILE)]
        output: PathBuf,
    },

    /// Print the report for an existing rectified table
    Report {
        #[arg(short, long, default_value = RECTIFIED_FILE)]
        input: PathBuf,
    },

    /// Run every stage in sequence
    Run {
        #[command(flatten)]
        history: HistoryArgs,

        /// Directory receiving the three tables
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        predictor: PredictorArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Path to the git repository to analyze
    #[arg(short, long)]
    pub repo: PathBuf,

    /// Only consider commits on or after this date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub since: Option<String>,

    /// Only consider commits on or before this date (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PredictorArgs {
    /// Fix-type predictor backend
    #[arg(long, value_enum, default_value_t = Predictor::Remote)]
    pub predictor: Predictor,

    /// Text-generation endpoint for the remote predictor
    #[arg(long, env = "FIXMSG_ENDPOINT", default_value = predictor::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token for the endpoint
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Diff tokens sent to the model; the rest is cut off
    #[arg(long, default_value_t = 512)]
    pub max_input_tokens: usize,

    /// Maximum length of a generated label
    #[arg(long, default_value_t = 64)]
    pub max_length: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

impl PredictorArgs {
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            max_input_tokens: self.max_input_tokens,
            max_length: self.max_length,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum Predictor {
    /// Ask a hosted sequence-to-sequence model
    Remote,
    /// Label every diff "N/A" without calling a model
    Skip,
}
