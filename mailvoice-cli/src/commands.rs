//! Subcommand implementations.

use anyhow::{Context, bail};
use clap::Args;
use mailvoice_core::dataset::{SplitOptions, save_dataset};
use mailvoice_core::example::build_examples;
use mailvoice_core::finetune::FineTuneConfig;
use mailvoice_core::format::DataFormat;
use mailvoice_core::stats::CorpusStats;
use mailvoice_core::store::EmailStore;
use std::path::PathBuf;
use tracing::info;

/// Which dataset formats to emit.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Alpaca,
    Chat,
    Both,
}

impl OutputFormat {
    fn formats(self) -> Vec<DataFormat> {
        match self {
            OutputFormat::Alpaca => vec![DataFormat::Alpaca],
            OutputFormat::Chat => vec![DataFormat::Chat],
            OutputFormat::Both => vec![DataFormat::Alpaca, DataFormat::Chat],
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Alpaca => "alpaca",
            OutputFormat::Chat => "chat",
            OutputFormat::Both => "both",
        })
    }
}

/// A single dataset format (no `both`), for commands that need exactly one.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleFormat {
    Alpaca,
    Chat,
}

impl SingleFormat {
    fn as_data_format(self) -> DataFormat {
        match self {
            SingleFormat::Alpaca => DataFormat::Alpaca,
            SingleFormat::Chat => DataFormat::Chat,
        }
    }
}

impl std::fmt::Display for SingleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_data_format().tag())
    }
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Mail store database (path or sqlite:// URL)
    #[arg(long)]
    pub db_url: String,

    /// User whose sent emails to prepare
    #[arg(long)]
    pub user_id: String,

    /// Output directory for training data
    #[arg(long, default_value = "./training-data")]
    pub output: PathBuf,

    /// Minimum number of sent emails required
    #[arg(long, default_value_t = 50)]
    pub min_emails: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    pub format: OutputFormat,

    /// Fraction of examples that go to the training split
    #[arg(long, default_value_t = 0.9)]
    pub train_ratio: f64,

    /// Seed for a reproducible shuffle (unseeded when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_prepare(args: PrepareArgs) -> anyhow::Result<()> {
    if !(args.train_ratio > 0.0 && args.train_ratio <= 1.0) {
        bail!("--train-ratio must be within (0, 1]");
    }

    println!("Email data preparation for fine-tuning");
    println!("  User ID:    {}", args.user_id);
    println!("  Output:     {}", args.output.display());
    println!("  Min emails: {}", args.min_emails);
    println!();

    let store = EmailStore::open(&args.db_url).context("database connection failed")?;
    let emails = store.fetch_sent_emails(&args.user_id);
    drop(store);

    if emails.len() < args.min_emails {
        bail!(
            "not enough emails: {} < {}; the user needs to send more emails before fine-tuning",
            emails.len(),
            args.min_emails
        );
    }

    let examples = build_examples(&emails);
    if examples.is_empty() {
        bail!("no valid training examples after cleaning");
    }

    let stats = CorpusStats::compute(&examples);
    println!("Dataset statistics:");
    println!("  total_examples:   {}", stats.total_examples);
    println!("  avg_email_length: {}", stats.avg_email_length);
    println!("  min_email_length: {}", stats.min_email_length);
    println!("  max_email_length: {}", stats.max_email_length);
    println!("  reply_emails:     {}", stats.reply_emails);
    println!("  forward_emails:   {}", stats.forward_emails);
    println!("  new_emails:       {}", stats.new_emails);
    println!();

    let options = SplitOptions {
        train_ratio: args.train_ratio,
        seed: args.seed,
    };
    for format in args.format.formats() {
        let summary = save_dataset(&examples, &args.output, format, &args.user_id, options)?;
        println!(
            "Wrote {format} split: {} train / {} val",
            summary.train_examples, summary.val_examples
        );
        println!("  {}", summary.train_file.display());
        println!("  {}", summary.val_file.display());
        println!("  {}", summary.dataset_file.display());
    }

    println!();
    println!("Data preparation complete.");
    println!("Next: `mailvoice init-config` to generate a trainer configuration for these files.");
    info!(user = %args.user_id, output = %args.output.display(), "prepare finished");
    Ok(())
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Directory containing the prepared train/val JSONL files
    #[arg(long, default_value = "./training-data")]
    pub data_dir: PathBuf,

    /// Dataset format the configuration should point at
    #[arg(long, value_enum, default_value_t = SingleFormat::Alpaca)]
    pub format: SingleFormat,

    /// Where to write the configuration
    #[arg(long, default_value = "./configs/lora.toml")]
    pub output: PathBuf,
}

pub fn run_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    let config = FineTuneConfig::for_dataset(&args.data_dir, args.format.as_data_format());
    config
        .to_toml(&args.output)
        .context("failed to write fine-tuning configuration")?;

    println!("Wrote fine-tuning configuration to {}", args.output.display());
    println!("  train_data: {}", config.data.train_data.display());
    println!("  val_data:   {}", config.data.val_data.display());
    Ok(())
}
