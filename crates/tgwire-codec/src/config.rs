//! Codec configuration

use serde::Deserialize;

/// How contract violations in a payload are treated
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Resolve and report as diagnostics
    #[default]
    Lenient,
    /// Fail the decode
    Strict,
}

/// Codec configuration, usually the `[codec]` section of a config file
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Ambiguous variants and bad entity spans: diagnostic or error
    #[serde(default)]
    pub strictness: Strictness,

    /// Check entity offsets against the text they annotate
    #[serde(default = "default_check_entity_ranges")]
    pub check_entity_ranges: bool,
}

fn default_check_entity_ranges() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            check_entity_ranges: default_check_entity_ranges(),
        }
    }
}

impl CodecConfig {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Self::default()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: CodecConfig = toml::from_str("").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert!(!config.is_strict());
        assert!(config.check_entity_ranges);
    }

    #[test]
    fn test_parse_strict() {
        let config: CodecConfig = toml::from_str(
            r#"
            strictness = "strict"
            check_entity_ranges = false
            "#,
        )
        .unwrap();
        assert!(config.is_strict());
        assert!(!config.check_entity_ranges);
    }

    #[test]
    fn test_rejects_unknown_strictness() {
        assert!(toml::from_str::<CodecConfig>(r#"strictness = "paranoid""#).is_err());
    }
}
