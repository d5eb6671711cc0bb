//! Prompt command - render the model prompt for a summary.

use std::path::PathBuf;

use clap::Args;

use rcpt_core::llm::PromptBuilder;
use rcpt_core::models::expense::ExpenseSummary;

use super::read_json;

/// Arguments for the prompt command.
#[derive(Args)]
pub struct PromptArgs {
    /// Expense summary JSON file
    #[arg(required = true)]
    summary: PathBuf,
}

pub fn run(args: PromptArgs) -> anyhow::Result<()> {
    let summary: ExpenseSummary = read_json(&args.summary)?;
    println!("{}", PromptBuilder::new().build(&summary));
    Ok(())
}
