// src/rectifier.rs

use crate::model::{FileChangeRecord, Provenance, RectificationResult, RectifiedRecord};

/// Words that carry no information about what was fixed.
/// Multi-word entries can never equal a single whitespace token; they are kept
/// so the list mirrors the classifier vocabulary.
pub const GENERIC_WORDS: &[&str] = &[
    "fixed", "bug", "fixes", "fix", "crash", "solves", "resolves", "issue",
    "regression", "fall back", "assertion", "covertly", "reproducible",
    "stack-wanted", "steps-wanted", "testcase", "failure", "fail", "npe",
    "except", "broken", "differential testing", "error", "hang", "test fix",
    "steps to reproduce", "leak", "stack trace", "heap overflow", "freeze",
    "problem", "overflow", "avoid", "workaround", "break", "stop",
];

/// Domain terms that make a message worth keeping over one without them.
pub const SPECIFIC_TERMS: &[&str] = &[
    "error", "crash", "typo", "parser", "memory", "api", "login", "auth",
    "cleanup", "handling",
];

const MAX_GENERIC_TOKENS: usize = 3;

/// A message is generic when it is short or made only of generic words.
pub fn is_generic(message: &str) -> bool {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    words.len() <= MAX_GENERIC_TOKENS || words.iter().all(|w| GENERIC_WORDS.contains(w))
}

fn has_specific_term(lower: &str) -> bool {
    SPECIFIC_TERMS.iter().any(|term| lower.contains(term))
}

/// Reconciles a developer message and a predicted label into one message.
///
/// Branches are tried in a fixed order and the first match wins: both empty,
/// one empty, duplicates, genericity, specific terms, then a merge of both.
/// The filename is appended afterwards unless the message already names it.
pub fn rectify(developer_message: &str, predicted_label: &str, filename: &str) -> RectificationResult {
    let dev = developer_message.trim();
    let llm = predicted_label.trim();

    let (chosen, provenance) = match (dev.is_empty(), llm.is_empty()) {
        (true, true) => (format!("Bug fix in {filename}"), Provenance::Fallback),
        (false, true) => (dev.to_string(), Provenance::Developer),
        (true, false) => (llm.to_string(), Provenance::Llm),
        (false, false) => choose(dev, llm),
    };

    RectificationResult { chosen: annotate(chosen, filename), provenance }
}

fn choose(dev: &str, llm: &str) -> (String, Provenance) {
    let dev_lower = dev.to_lowercase();
    let llm_lower = llm.to_lowercase();

    if dev_lower == llm_lower || llm_lower.contains(&dev_lower) || dev_lower.contains(&llm_lower) {
        // Length is measured in characters; ties go to the developer.
        return if dev.chars().count() >= llm.chars().count() {
            (dev.to_string(), Provenance::Developer)
        } else {
            (llm.to_string(), Provenance::Llm)
        };
    }

    let (dev_generic, llm_generic) = (is_generic(dev), is_generic(llm));
    if dev_generic && !llm_generic {
        return (llm.to_string(), Provenance::Llm);
    }
    if llm_generic && !dev_generic {
        return (dev.to_string(), Provenance::Developer);
    }

    match (has_specific_term(&dev_lower), has_specific_term(&llm_lower)) {
        (true, false) => (dev.to_string(), Provenance::Developer),
        (false, true) => (llm.to_string(), Provenance::Llm),
        _ => (format!("{dev} \u{2013} {llm}"), Provenance::Merged),
    }
}

/// Appends ` (filename)` unless the message already mentions it.
pub fn annotate(message: String, filename: &str) -> String {
    if filename.is_empty() || message.to_lowercase().contains(&filename.to_lowercase()) {
        message
    } else {
        format!("{message} ({filename})")
    }
}

/// Rectifies every record using its `Message` as the developer message.
pub fn rectify_all(records: Vec<FileChangeRecord>) -> Vec<RectifiedRecord> {
    records
        .into_iter()
        .map(|change| {
            let result = rectify(&change.message, &change.predicted_label, &change.filename);
            tracing::debug!(hash = %change.hash, file = %change.filename, source = %result.provenance, "rectified");
            RectifiedRecord { change, result }
        })
        .collect()
}
