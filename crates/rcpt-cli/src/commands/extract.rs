//! Extract command - summarize a saved expense-analysis response.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use rcpt_core::extract::ExpenseFieldExtractor;
use rcpt_core::models::expense::RawExpenseResponse;

use super::read_json;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Expense-analysis response JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Source name recorded in the summary (default: input file name)
    #[arg(short, long)]
    source: Option<String>,
}

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let response: RawExpenseResponse = read_json(&args.input)?;

    let source = match args.source {
        Some(source) => source,
        None => args
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let summary = ExpenseFieldExtractor::new()
        .extract(&response, &source)
        .with_context(|| format!("Cannot summarize {}", args.input.display()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
