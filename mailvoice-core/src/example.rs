//! Training-example assembly from raw emails.

use crate::clean::TextCleaner;
use crate::store::RawEmail;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Provenance carried alongside each training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleMetadata {
    pub email_id: String,
    pub subject: String,
    pub sent_at: String,
    pub from: String,
    pub to: String,
}

/// An instruction/response pair derived from exactly one sent email.
///
/// `input` is always empty in this pipeline; `output` is the cleaned
/// body and is never shorter than the cleaning floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub instruction: String,
    pub input: String,
    pub output: String,
    pub metadata: ExampleMetadata,
}

/// Derive reply context from a subject line.
///
/// Subject-prefix matching only (`Re: ` / `RE: `). A heuristic, not
/// thread reconstruction, so non-standard reply subjects are missed.
pub fn extract_context(subject: &str) -> Option<String> {
    if let Some(rest) = subject.strip_prefix("Re: ") {
        return Some(format!("Previous email subject: {rest}"));
    }
    if let Some(rest) = subject.strip_prefix("RE: ") {
        return Some(format!("Previous email subject: {rest}"));
    }
    None
}

/// Build training examples from raw emails.
///
/// Emails whose cleaned body comes back empty are skipped, so the result
/// never has more entries than the input.
pub fn build_examples(emails: &[RawEmail]) -> Vec<TrainingExample> {
    let cleaner = TextCleaner::new();
    let mut examples = Vec::with_capacity(emails.len());

    for email in emails {
        let output = cleaner.clean(&email.text_plain);
        if output.is_empty() {
            debug!(id = %email.id, "skipping email with no usable body");
            continue;
        }

        let instruction = match extract_context(&email.subject) {
            Some(context) => format!(
                "Write a professional email reply about: {}\n\nContext: {}",
                email.subject, context
            ),
            None => format!("Write a professional email about: {}", email.subject),
        };

        examples.push(TrainingExample {
            instruction,
            input: String::new(),
            output,
            metadata: ExampleMetadata {
                email_id: email.id.clone(),
                subject: email.subject.clone(),
                sent_at: email.sent_at.clone(),
                from: email.from_email.clone(),
                to: email.to_email.clone(),
            },
        });
    }

    info!(count = examples.len(), "assembled training examples");
    examples
}
