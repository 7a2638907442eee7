// src/model.rs

use std::fmt;

/// A single file touched by a commit, relative to its first parent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifiedFile {
    /// Basename of the file
    pub filename: String,
    /// Repository-relative path, kept for logging
    pub path: String,
    pub diff: String,
    pub source_before: String,
    pub source_after: String,
}

/// A commit as read from the history walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub parents: Vec<String>,
    pub is_merge: bool,
    /// Seconds since the epoch
    pub time: i64,
    pub modified_files: Vec<ModifiedFile>,
}

/// One (bug-fix commit, modified file) pair with its predicted label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChangeRecord {
    pub hash: String,
    pub message: String,
    pub filename: String,
    pub source_before: String,
    pub source_after: String,
    pub diff: String,
    pub predicted_label: String,
    pub developer_message: String,
}

/// Which side supplied the rectified message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    Developer,
    Llm,
    Merged,
    Fallback,
}

impl Provenance {
    pub const ALL: [Provenance; 4] = [
        Provenance::Developer,
        Provenance::Llm,
        Provenance::Merged,
        Provenance::Fallback,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Developer => "Developer",
            Provenance::Llm => "LLM",
            Provenance::Merged => "Merged",
            Provenance::Fallback => "Fallback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s.trim())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectificationResult {
    pub chosen: String,
    pub provenance: Provenance,
}

/// A file change record together with its rectification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectifiedRecord {
    pub change: FileChangeRecord,
    pub result: RectificationResult,
}
