use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tgwire_codec::CodecConfig;
use tgwire_logging::LogFormat;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[codec]
strictness = "lenient"  # or "strict": ambiguous variants and bad entity spans fail
check_entity_ranges = true

[logging]
level = "info"  # trace, debug, info, warn, error
format = "pretty"  # or "json"

[output]
pretty = false  # pretty-print re-encoded JSON
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Get the global config path: ~/.tgwire/tgwire.toml
    fn global_config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".tgwire").join("tgwire.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path()?;

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.tgwire/tgwire.toml (auto-created if missing)
    /// 2. Local override: ./tgwire.toml (optional)
    /// 3. File given with `--config` (required if given)
    /// 4. Environment variables, e.g. `TGWIRE__CODEC__STRICTNESS=strict`
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let global_config_path = Self::ensure_global_config()?;

        let mut builder = config::Config::builder()
            .add_source(config::File::from(global_config_path))
            .add_source(config::File::with_name("tgwire").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("TGWIRE").separator("__"))
            .build()
            .context("Failed to load configuration")?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgwire_codec::Strictness;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_template_parses() {
        let config = parse(DEFAULT_CONFIG);
        assert_eq!(config.codec, CodecConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_sections_are_optional() {
        let config = parse("[codec]\nstrictness = \"strict\"\n");
        assert_eq!(config.codec.strictness, Strictness::Strict);
        assert!(config.codec.check_entity_ranges);
        assert_eq!(config.logging.level, "info");
    }
}
