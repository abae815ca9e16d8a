//! Corpus statistics for operator review.

use crate::example::TrainingExample;
use serde::{Deserialize, Serialize};

/// Descriptive statistics over the assembled examples. Purely
/// informational; nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_examples: usize,
    pub avg_email_length: usize,
    pub min_email_length: usize,
    pub max_email_length: usize,
    pub reply_emails: usize,
    pub forward_emails: usize,
    pub new_emails: usize,
}

impl CorpusStats {
    /// Compute stats; an empty input yields the zero-valued structure.
    pub fn compute(examples: &[TrainingExample]) -> Self {
        if examples.is_empty() {
            return Self::default();
        }

        let lengths: Vec<usize> = examples
            .iter()
            .map(|ex| ex.output.chars().count())
            .collect();
        let total = lengths.len();
        let sum: usize = lengths.iter().sum();

        let reply_emails = examples
            .iter()
            .filter(|ex| {
                let s = ex.metadata.subject.as_str();
                s.starts_with("Re:") || s.starts_with("RE:")
            })
            .count();
        let forward_emails = examples
            .iter()
            .filter(|ex| {
                let s = ex.metadata.subject.as_str();
                s.starts_with("Fwd:") || s.starts_with("FW:")
            })
            .count();

        Self {
            total_examples: total,
            avg_email_length: sum / total,
            min_email_length: lengths.iter().copied().min().unwrap_or(0),
            max_email_length: lengths.iter().copied().max().unwrap_or(0),
            reply_emails,
            forward_emails,
            new_emails: total - reply_emails - forward_emails,
        }
    }
}
