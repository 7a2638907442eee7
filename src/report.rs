// src/report.rs

use crate::model::{Provenance, RectificationResult};
use std::collections::BTreeMap;
use std::fmt;

/// Provenance distribution over a batch of rectifications
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    counts: BTreeMap<Provenance, usize>,
    total: usize,
}

impl Report {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a RectificationResult>,
    {
        let mut report = Report::default();
        for result in results {
            *report.counts.entry(result.provenance).or_default() += 1;
            report.total += 1;
        }
        report
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, provenance: Provenance) -> usize {
        self.counts.get(&provenance).copied().unwrap_or(0)
    }

    /// Share of results with this provenance, in percent. Zero for an empty batch.
    pub fn percentage(&self, provenance: Provenance) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(provenance) as f64 * 100.0 / self.total as f64
    }

    /// RQ1: messages kept as the developer wrote them
    pub fn developer_share(&self) -> f64 {
        self.percentage(Provenance::Developer)
    }

    /// RQ2: messages taken from the predicted label
    pub fn llm_share(&self) -> f64 {
        self.percentage(Provenance::Llm)
    }

    /// RQ3: messages the rectifier had to merge or synthesize
    pub fn rectifier_share(&self) -> f64 {
        self.percentage(Provenance::Merged) + self.percentage(Provenance::Fallback)
    }

    /// Observed provenances, most frequent first.
    pub fn distribution(&self) -> Vec<(Provenance, f64)> {
        let mut rows: Vec<(Provenance, usize)> = self.counts.iter().map(|(&p, &n)| (p, n)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.into_iter().map(|(p, _)| (p, self.percentage(p))).collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==== Hit Rates (% by Source) ====")?;
        for (provenance, pct) in self.distribution() {
            writeln!(f, "{:<10} {:>6.2}%", provenance.as_str(), pct)?;
        }
        writeln!(f)?;
        writeln!(f, "==== Research Question Results ====")?;
        writeln!(f, "RQ1 (Developer precision): {:.2}%", self.developer_share())?;
        writeln!(f, "RQ2 (LLM precision): {:.2}%", self.llm_share())?;
        write!(f, "RQ3 (Rectifier improvement): {:.2}%", self.rectifier_share())
    }
}
