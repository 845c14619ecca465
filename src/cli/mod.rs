//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mailprep",
    version,
    author = "neur0map",
    about = "Email preprocessing and thread summarization for LLM reply drafting",
    long_about = "Mailprep strips boilerplate from customer emails, hides personal data behind \
                  reversible placeholders, separates the new message from the quoted thread and \
                  summarizes long threads so the result fits the drafting model's token budget."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/mailprep/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preprocess an email body for the drafting model
    Process {
        /// File with the raw body (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Classification label used in the draft prompt
        #[arg(long)]
        classification: Option<String>,

        /// Also build the draft prompt and its generation budget
        #[arg(long)]
        prompt: bool,
    },

    /// Restore placeholders in generated text
    Restore {
        /// JSON result written by `process --json`
        #[arg(short, long, value_name = "RESULT")]
        result: PathBuf,

        /// File with the generated text (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Summarize text with the statistical summarizer only
    Summarize {
        /// File with the text (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Token budget for the summary (defaults to limits.max_summary_tokens)
        #[arg(short, long)]
        max_tokens: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
