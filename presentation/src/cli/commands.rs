//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use synod_domain::Mode;

/// Output format for answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer plus contributions, agreement summary and confidence
    Full,
    /// Only the answer text
    Answer,
    /// JSON output
    Json,
}

impl From<OutputFormat> for synod_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => synod_domain::OutputFormat::Full,
            OutputFormat::Answer => synod_domain::OutputFormat::Answer,
            OutputFormat::Json => synod_domain::OutputFormat::Json,
        }
    }
}

/// Compute mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One model, answer passed through
    Quick,
    /// Small panel, weighted combine
    Thoughtful,
    /// Panel, then a roundtable where every model sees the others
    Contemplate,
    /// Visible panel with disagreements surfaced
    Council,
    /// Research, cross-critique, revision, synthesis
    Tribunal,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Quick => Mode::Quick,
            ModeArg::Thoughtful => Mode::Thoughtful,
            ModeArg::Contemplate => Mode::Contemplate,
            ModeArg::Council => Mode::Council,
            ModeArg::Tribunal => Mode::Tribunal,
        }
    }
}

/// CLI arguments for synod
#[derive(Parser, Debug)]
#[command(name = "synod")]
#[command(author, version, about = "Ask a panel of language models and get one answer")]
#[command(long_about = r#"
Synod sends a question to a panel of language models chosen for the
question's shape, then combines their answers into one.

Modes:
  quick        one model, answer passed through
  thoughtful   a small panel, weighted combine
  contemplate  panel answers, then a roundtable, then a deep combine
  council      every answer shown with disagreements surfaced
  tribunal     research, cross-critique, revision and synthesis

Configuration files are loaded from (in priority order):
1. SYNOD_* environment variables (SYNOD_ENGINE__DEADLINE_SECS=60)
2. --config <path>     Explicit config file
3. ./synod.toml        Project-level config
4. ~/.config/synod/config.toml   Global config

Example:
  synod "What's the best way to handle errors in Rust?"
  synod --mode council "Should we shard by tenant or by region?"
  synod --offline --mode tribunal "Is a B-tree better than an LSM tree here?"
"#)]
pub struct Cli {
    /// The question to ask the panel
    pub question: Option<String>,

    /// Compute mode
    #[arg(short, long, value_enum, default_value = "thoughtful")]
    pub mode: ModeArg,

    /// Background material for the question
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Maximum cost units for this request
    #[arg(long, value_name = "UNITS")]
    pub max_cost: Option<u64>,

    /// Deadline for this request, in seconds
    #[arg(long, value_name = "SECS")]
    pub max_secs: Option<u64>,

    /// Requester id for budget accounting
    #[arg(long, value_name = "ID", default_value = "cli")]
    pub requester: String,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a daily-rotated log file into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Answer every model in-process without network access
    #[arg(long)]
    pub offline: bool,
}
