//! Handle command - run one pipeline stage against a storage event.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;
use tracing::info;

use rcpt_core::pipeline::{ModelStage, OcrStage, Stage};
use rcpt_core::services::{HttpExpenseAnalyzer, HttpTextModel};
use rcpt_core::storage::LocalBlobStore;

use super::{config, read_json};

/// Arguments for the handle command.
#[derive(Args)]
pub struct HandleArgs {
    /// Storage event JSON file
    #[arg(required = true)]
    event: PathBuf,

    /// Stage to run
    #[arg(short, long, value_enum)]
    stage: StageKind,

    /// Blob store root directory (overrides storage.root)
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum StageKind {
    /// Document upload to expense summary
    Ocr,
    /// Expense summary to model summary and record
    Model,
}

pub fn run(args: HandleArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let event: Value = read_json(&args.event)?;

    let root = args.root.unwrap_or_else(|| config.storage.root.clone());
    info!("Using blob store at {}", root.display());
    let store = LocalBlobStore::new(root);

    let outcome = match args.stage {
        StageKind::Ocr => {
            let analyzer = HttpExpenseAnalyzer::from_config(&config.analyzer)?;
            OcrStage::new(store, analyzer, config.pipeline).handle(&event)?
        }
        StageKind::Model => {
            let model = HttpTextModel::from_config(&config.model)?;
            ModelStage::new(store, model, config.pipeline, config.model).handle(&event)?
        }
    };

    if outcome.is_skipped() {
        eprintln!("{} Skipped: {}", style("ℹ").blue(), outcome.body());
    } else {
        eprintln!("{} Stage completed", style("✓").green());
    }
    println!("{}", serde_json::to_string_pretty(&outcome.to_response())?);

    Ok(())
}
