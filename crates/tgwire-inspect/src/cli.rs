//! Command line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tgwire-inspect")]
#[command(about = "Decode Telegram Bot API payloads, report problems and optionally re-encode them")]
#[command(version)]
pub struct Cli {
    /// Payload files; `-` reads stdin
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// What each payload holds
    #[arg(short = 'a', long = "as", value_enum, default_value = "update")]
    pub target: Target,

    /// Print the re-encoded JSON after the summary
    #[arg(short, long)]
    pub reencode: bool,

    /// Fail on ambiguous variants and bad entity spans
    #[arg(long)]
    pub strict: bool,

    /// Extra config file, applied after ~/.tgwire/tgwire.toml and ./tgwire.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level, overrides the config file
    #[arg(short, long)]
    pub log_level: Option<String>,
}

/// Record type of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// One Update object
    Update,
    /// A getUpdates result array
    Updates,
    Message,
    Chat,
    /// A getWebhookInfo result
    WebhookInfo,
    User,
}
