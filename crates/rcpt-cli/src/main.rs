//! CLI application for the receipt OCR summarization pipeline.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, extract, handle, parse, prompt};

/// Receipt pipeline - OCR expense extraction and model summarization
#[derive(Parser)]
#[command(name = "rcpt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline stage against a storage event
    Handle(handle::HandleArgs),

    /// Summarize a saved expense-analysis response
    Extract(extract::ExtractArgs),

    /// Render the model prompt for an expense summary
    Prompt(prompt::PromptArgs),

    /// Parse raw model output, optionally normalizing it
    Parse(parse::ParseArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so command output stays machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Handle(args) => handle::run(args, config_path),
        Commands::Extract(args) => extract::run(args),
        Commands::Prompt(args) => prompt::run(args),
        Commands::Parse(args) => parse::run(args),
        Commands::Config(args) => config::run(args, config_path),
    }
}
