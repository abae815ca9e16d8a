//! Dataset serialization: JSONL splits plus a combined JSON document.

use crate::error::PrepError;
use crate::example::TrainingExample;
use crate::format::{DataFormat, to_alpaca, to_chat};
use crate::split::split_examples;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Split parameters for one save pass.
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub train_ratio: f64,
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: 0.9,
            seed: None,
        }
    }
}

/// Metadata block embedded in the combined dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub user_id: String,
    pub total_examples: usize,
    pub train_examples: usize,
    pub val_examples: usize,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

/// Combined dataset document (`dataset_{format}.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDocument<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
    pub metadata: DatasetMetadata,
}

/// Files written for one format.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub format: DataFormat,
    pub train_file: PathBuf,
    pub val_file: PathBuf,
    pub dataset_file: PathBuf,
    pub train_examples: usize,
    pub val_examples: usize,
}

/// Convert, split, and persist the examples in one format.
///
/// Writes `train_{format}.jsonl`, `val_{format}.jsonl`, and
/// `dataset_{format}.json` under `output_dir`, creating the directory if
/// absent and silently overwriting existing files.
pub fn save_dataset(
    examples: &[TrainingExample],
    output_dir: &Path,
    format: DataFormat,
    user_id: &str,
    options: SplitOptions,
) -> Result<DatasetSummary, PrepError> {
    std::fs::create_dir_all(output_dir)?;
    match format {
        DataFormat::Alpaca => write_split(to_alpaca(examples), output_dir, format, user_id, options),
        DataFormat::Chat => write_split(to_chat(examples), output_dir, format, user_id, options),
    }
}

fn write_split<T: Serialize>(
    formatted: Vec<T>,
    output_dir: &Path,
    format: DataFormat,
    user_id: &str,
    options: SplitOptions,
) -> Result<DatasetSummary, PrepError> {
    let total = formatted.len();
    let (train, val) = split_examples(formatted, options.train_ratio, options.seed);
    let train_examples = train.len();
    let val_examples = val.len();

    let train_file = output_dir.join(format!("train_{format}.jsonl"));
    let val_file = output_dir.join(format!("val_{format}.jsonl"));
    write_jsonl(&train_file, &train)?;
    write_jsonl(&val_file, &val)?;

    let dataset_file = output_dir.join(format!("dataset_{format}.json"));
    let document = DatasetDocument {
        train,
        val,
        metadata: DatasetMetadata {
            user_id: user_id.to_string(),
            total_examples: total,
            train_examples,
            val_examples,
            format: format.tag().to_string(),
            created_at: Utc::now(),
        },
    };
    atomic_write_json(&dataset_file, &document)?;

    info!(
        format = %format,
        train = train_examples,
        val = val_examples,
        dir = %output_dir.display(),
        "dataset written"
    );

    Ok(DatasetSummary {
        format,
        train_file,
        val_file,
        dataset_file,
        train_examples,
        val_examples,
    })
}

/// One JSON object per line.
fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<(), PrepError> {
    let mut output = String::new();
    for item in items {
        output.push_str(&serde_json::to_string(item)?);
        output.push('\n');
    }
    std::fs::write(path, output)?;
    Ok(())
}

/// Write pretty JSON to a `.tmp` sibling then rename, so a partial write
/// never leaves a truncated document at the target path.
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), PrepError> {
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
