// src/classifier.rs

use crate::model::Commit;

/// Terms whose presence in a lowercased commit message marks it as a bug fix.
/// Multi-word entries match as phrases.
pub const BUG_KEYWORDS: &[&str] = &[
    "fixed", "bug", "fixes", "fix", "crash", "solves", "resolves", "issue",
    "regression", "fall back", "assertion", "covertly", "reproducible",
    "stack-wanted", "steps-wanted", "testcase", "failure", "fail", "npe",
    "except", "broken", "differential testing", "error", "hang", "test fix",
    "steps to reproduce", "leak", "stack trace", "heap overflow", "freeze",
    "problem", "overflow", "avoid", "workaround", "break", "stop",
];

pub fn is_bug_fix(message: &str) -> bool {
    let lower = message.to_lowercase();
    BUG_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Keeps the commits whose message matches the bug-fix vocabulary, in order.
pub fn classify(commits: Vec<Commit>) -> Vec<Commit> {
    let total = commits.len();
    let fixes: Vec<Commit> = commits.into_iter().filter(|c| is_bug_fix(&c.message)).collect();
    for c in &fixes {
        tracing::debug!(hash = %c.hash, time = c.time, merge = c.is_merge, "bug-fix commit");
    }
    tracing::info!("Classified {} of {} commits as bug fixes", fixes.len(), total);
    fixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, message: &str) -> Commit {
        Commit { hash: hash.into(), message: message.into(), ..Default::default() }
    }

    #[test]
    fn matches_case_insensitively_and_inside_words() {
        assert!(is_bug_fix("FIX typo in README"));
        assert!(is_bug_fix("Prefixed the header")); // substring match on "fix"
        assert!(is_bug_fix("Handle Stack Trace output"));
        assert!(!is_bug_fix("Add new feature"));
        assert!(!is_bug_fix(""));
    }

    #[test]
    fn classify_preserves_order() {
        let commits = vec![
            commit("a", "Fix crash on start"),
            commit("b", "Update docs"),
            commit("c", "Resolves #12"),
            commit("d", "Bump version"),
        ];
        let hashes: Vec<_> = classify(commits).into_iter().map(|c| c.hash).collect();
        assert_eq!(hashes, vec!["a", "c"]);
    }
}
