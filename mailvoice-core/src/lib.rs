//! # mailvoice-core — sent-email dataset preparation for LoRA fine-tuning
//!
//! Queries a user's sent emails from the mail store, cleans and normalizes
//! the text, assembles instruction/response training pairs, splits them
//! into train/validation sets, and serializes the result for an external
//! trainer. Training itself (model loading, quantization, tokenization,
//! the training loop) is an external collaborator; this crate ends at the
//! dataset files and the typed configuration it hands over.

pub mod clean;
pub mod dataset;
pub mod error;
pub mod example;
pub mod finetune;
pub mod format;
pub mod split;
pub mod stats;
pub mod store;

pub use clean::TextCleaner;
pub use dataset::{DatasetSummary, SplitOptions, save_dataset};
pub use error::PrepError;
pub use example::{TrainingExample, build_examples};
pub use finetune::FineTuneConfig;
pub use format::DataFormat;
pub use stats::CorpusStats;
pub use store::{EmailStore, RawEmail};
