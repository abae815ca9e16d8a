//! Typed configuration handed to the external LoRA trainer.
//!
//! Declares every recognized option up front, including the optional
//! resume path, so nothing is injected into a config after construction.
//! The trainer itself (model loading, quantization, tokenization, the
//! training loop, checkpointing) is an external collaborator; this crate
//! only produces the configuration and the dataset files it points at.

use crate::error::PrepError;
use crate::format::DataFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete fine-tuning configuration, serialized as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTuneConfig {
    pub model: ModelSection,
    pub data: DataSection,
    pub lora: LoraSection,
    pub quantization: QuantizationSection,
    pub training: TrainingSection,
    pub logging: LoggingSection,
}

/// Base model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub base_model: String,
    pub model_max_length: usize,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            base_model: "meta-llama/Llama-3.1-8B-Instruct".into(),
            model_max_length: 2048,
        }
    }
}

/// Dataset files produced by `prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub train_data: PathBuf,
    pub val_data: PathBuf,
    pub data_format: DataFormat,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            train_data: PathBuf::from("training-data/train_alpaca.jsonl"),
            val_data: PathBuf::from("training-data/val_alpaca.jsonl"),
            data_format: DataFormat::Alpaca,
        }
    }
}

/// LoRA adapter hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoraSection {
    pub rank: u32,
    pub alpha: f32,
    pub dropout: f32,
    pub target_modules: Vec<String>,
}

impl Default for LoraSection {
    fn default() -> Self {
        Self {
            rank: 16,
            alpha: 32.0,
            dropout: 0.05,
            target_modules: vec![
                "q_proj".into(),
                "k_proj".into(),
                "v_proj".into(),
                "o_proj".into(),
                "gate_proj".into(),
                "up_proj".into(),
                "down_proj".into(),
            ],
        }
    }
}

/// Quantized loading of the base model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizationSection {
    pub use_4bit: bool,
    pub compute_dtype: String,
    pub quant_type: String,
}

impl Default for QuantizationSection {
    fn default() -> Self {
        Self {
            use_4bit: true,
            compute_dtype: "float16".into(),
            quant_type: "nf4".into(),
        }
    }
}

/// Trainer hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    pub output_dir: PathBuf,
    pub num_train_epochs: usize,
    pub per_device_train_batch_size: usize,
    pub per_device_eval_batch_size: usize,
    pub gradient_accumulation_steps: usize,
    pub learning_rate: f64,
    pub max_grad_norm: f64,
    pub warmup_ratio: f64,
    pub lr_scheduler_type: String,
    pub fp16: bool,
    pub bf16: bool,
    pub gradient_checkpointing: bool,
    pub group_by_length: bool,
    /// Checkpoint directory to resume from, when present.
    pub resume_from_checkpoint: Option<PathBuf>,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            num_train_epochs: 3,
            per_device_train_batch_size: 4,
            per_device_eval_batch_size: 4,
            gradient_accumulation_steps: 4,
            learning_rate: 2e-4,
            max_grad_norm: 0.3,
            warmup_ratio: 0.03,
            lr_scheduler_type: "cosine".into(),
            fp16: false,
            bf16: true,
            gradient_checkpointing: true,
            group_by_length: true,
            resume_from_checkpoint: None,
        }
    }
}

/// Trainer logging and checkpoint cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub logging_steps: usize,
    pub save_steps: usize,
    pub eval_steps: usize,
    pub save_total_limit: usize,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            logging_steps: 10,
            save_steps: 100,
            eval_steps: 100,
            save_total_limit: 3,
        }
    }
}

impl FineTuneConfig {
    /// Default configuration pointing at the prepared dataset files for
    /// `format` under `data_dir`.
    pub fn for_dataset(data_dir: &Path, format: DataFormat) -> Self {
        Self {
            data: DataSection {
                train_data: data_dir.join(format!("train_{format}.jsonl")),
                val_data: data_dir.join(format!("val_{format}.jsonl")),
                data_format: format,
            },
            ..Self::default()
        }
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_toml(path: &Path) -> Result<Self, PrepError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write the configuration as TOML, creating parent
    /// directories if needed.
    pub fn to_toml(&self, path: &Path) -> Result<(), PrepError> {
        self.validate()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| PrepError::config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the trainer cannot act on.
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.model.base_model.is_empty() {
            return Err(PrepError::config("base_model must not be empty"));
        }
        if self.lora.rank == 0 {
            return Err(PrepError::config("lora rank must be at least 1"));
        }
        if self.training.num_train_epochs == 0 {
            return Err(PrepError::config("num_train_epochs must be at least 1"));
        }
        if self.training.per_device_train_batch_size == 0 {
            return Err(PrepError::config(
                "per_device_train_batch_size must be at least 1",
            ));
        }
        if self.training.learning_rate <= 0.0 {
            return Err(PrepError::config("learning_rate must be positive"));
        }
        if !(0.0..=1.0).contains(&self.training.warmup_ratio) {
            return Err(PrepError::config("warmup_ratio must be within [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_trainer_defaults() {
        let config = FineTuneConfig::default();
        assert_eq!(config.model.base_model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.lora.rank, 16);
        assert_eq!(config.lora.alpha, 32.0);
        assert_eq!(config.lora.target_modules.len(), 7);
        assert!(config.quantization.use_4bit);
        assert_eq!(config.training.num_train_epochs, 3);
        assert_eq!(config.training.learning_rate, 2e-4);
        assert!(config.training.bf16);
        assert!(!config.training.fp16);
        assert_eq!(config.training.resume_from_checkpoint, None);
        assert_eq!(config.logging.save_total_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_for_dataset_points_at_format_files() {
        let config = FineTuneConfig::for_dataset(Path::new("out"), DataFormat::Chat);
        assert_eq!(config.data.train_data, Path::new("out/train_chat.jsonl"));
        assert_eq!(config.data.val_data, Path::new("out/val_chat.jsonl"));
        assert_eq!(config.data.data_format, DataFormat::Chat);
    }

    #[test]
    fn test_toml_round_trip_with_resume_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("configs").join("lora.toml");

        let mut config = FineTuneConfig::for_dataset(Path::new("training-data"), DataFormat::Alpaca);
        config.training.resume_from_checkpoint = Some(PathBuf::from("./output/checkpoint-300"));

        config.to_toml(&path).unwrap();
        let loaded = FineTuneConfig::from_toml(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.training.resume_from_checkpoint,
            Some(PathBuf::from("./output/checkpoint-300"))
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lora.toml");
        std::fs::write(
            &path,
            "[training]\nnum_train_epochs = 5\n\n[data]\ndata_format = \"chat\"\n",
        )
        .unwrap();

        let loaded = FineTuneConfig::from_toml(&path).unwrap();
        assert_eq!(loaded.training.num_train_epochs, 5);
        assert_eq!(loaded.data.data_format, DataFormat::Chat);
        assert_eq!(loaded.lora.rank, 16);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FineTuneConfig::default();
        config.training.num_train_epochs = 0;
        assert!(config.validate().is_err());

        let mut config = FineTuneConfig::default();
        config.model.base_model = String::new();
        assert!(config.validate().is_err());

        let mut config = FineTuneConfig::default();
        config.training.warmup_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = FineTuneConfig::default();
        config.lora.rank = 0;
        assert!(matches!(config.validate(), Err(PrepError::Config(_))));
    }

    #[test]
    fn test_to_toml_refuses_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lora.toml");
        let mut config = FineTuneConfig::default();
        config.training.learning_rate = 0.0;
        assert!(config.to_toml(&path).is_err());
        assert!(!path.exists());
    }
}
