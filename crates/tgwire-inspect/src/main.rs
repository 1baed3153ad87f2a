mod cli;
mod config;
mod inspect;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use inspect::{inspect, Options};
use std::io::Read;
use std::path::Path;
use tgwire_codec::{Codec, Strictness};
use tgwire_logging::init_logging;
use tracing::{error, info};

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        Ok(std::fs::read(path)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.strict {
        config.codec.strictness = Strictness::Strict;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }

    init_logging(&config.logging.level, config.logging.format)?;
    info!(
        target = ?cli.target,
        strictness = ?config.codec.strictness,
        inputs = cli.inputs.len(),
        "Inspecting payloads"
    );

    let codec = Codec::new(config.codec.clone());
    let options = Options {
        reencode: cli.reencode,
        pretty: config.output.pretty,
    };

    let mut failed = 0;
    for path in &cli.inputs {
        let bytes =
            read_input(path).with_context(|| format!("Failed to read {}", path.display()))?;
        match inspect(&codec, cli.target, &bytes, options) {
            Ok(report) => {
                info!(
                    input = %path.display(),
                    records = report.lines.len(),
                    diagnostics = report.diagnostics(),
                    "Decoded payload"
                );
                for line in &report.lines {
                    println!(
                        "{}: {} diagnostics={}",
                        path.display(),
                        line.summary,
                        line.diagnostics
                    );
                }
                for json in &report.reencoded {
                    println!("{json}");
                }
            }
            Err(e) => {
                failed += 1;
                error!(input = %path.display(), "Decode failed: {e:#}");
                println!("{}: FAILED {e:#}", path.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} payloads failed to decode", cli.inputs.len());
    }
    Ok(())
}
