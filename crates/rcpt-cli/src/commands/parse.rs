//! Parse command - split raw model output and normalize it.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};

use rcpt_core::llm::{ModelOutputParser, ModelRawOutput};
use rcpt_core::models::expense::ExpenseSummary;
use rcpt_core::normalize::NormalizationStage;

use super::read_json;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Raw model output file (response body or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Expense summary to normalize against
    #[arg(short, long)]
    summary: Option<PathBuf>,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let body = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let parsed = ModelOutputParser::new().parse(&ModelRawOutput::new(body));

    let output = match &args.summary {
        Some(path) => {
            let summary: ExpenseSummary = read_json(path)?;
            let record = NormalizationStage::new().normalize(&parsed, &summary);
            json!({
                "summary_line": parsed.summary_line,
                "record": record,
            })
        }
        None => json!({
            "summary_line": parsed.summary_line,
            "fields": Value::Object(parsed.fields),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
