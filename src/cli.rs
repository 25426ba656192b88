use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cre_closing_agent::orchestrator::DEFAULT_LETTER_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "cre-closing-agent",
    about = "Audit a commercial real estate deal folder and draft objection letters",
    version
)]
pub struct Cli {
    /// Username checked against the credentials file, when one is configured
    #[arg(long, global = true)]
    pub username: Option<String>,
    /// Password for --username
    #[arg(long, env = "CRE_AGENT_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify every unprocessed document in the deal folder
    Audit(AuditArgs),
    /// Draft an objection letter from the saved findings and export it as PDF
    Draft(DraftArgs),
    /// Convert a PDF into a text document inside the deal folder
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Override the configured deal folder
    #[arg(long)]
    pub folder: Option<String>,
    /// Continue from the saved progress instead of starting over
    #[arg(long)]
    pub resume: bool,
    /// Stop after the first document
    #[arg(long)]
    pub single: bool,
    /// Record classification failures as unclassified findings instead of stopping
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Property address or identifier
    #[arg(long)]
    pub property: String,
    /// Buyer the letter is written on behalf of
    #[arg(long)]
    pub buyer: String,
    /// JSON file with findings (defaults to the saved audit progress)
    #[arg(long)]
    pub findings: Option<PathBuf>,
    /// Override the configured deal folder
    #[arg(long)]
    pub folder: Option<String>,
    /// Output PDF path
    #[arg(long, default_value = DEFAULT_LETTER_FILE)]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// PDF to convert
    pub pdf: PathBuf,
    /// Override the configured deal folder
    #[arg(long)]
    pub folder: Option<String>,
}
