//! Non-fatal findings collected while decoding

use crate::path::FieldPath;
use crate::schema::EntityKind;
use std::fmt;
use tgwire_types::EntityRangeError;

/// Why a variant container could not be resolved cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantIssue {
    /// No recognised variant field populated. `unrecognised` lists keys the
    /// schema does not know, which may be variants newer than this crate.
    NonePopulated { unrecognised: Vec<String> },

    /// Several variant fields populated; `chosen` comes first in
    /// declaration order and the rest were dropped
    Ambiguous {
        chosen: &'static str,
        ignored: Vec<&'static str>,
    },
}

/// Variant container decoded with `Unknown` or with a guessed variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariantWarning {
    pub path: FieldPath,
    pub container: EntityKind,
    pub issue: VariantIssue,
}

/// A finding that did not stop the decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownVariant(UnknownVariantWarning),
    /// Entity span outside its text, reported instead of failing in lenient mode
    EntityOutOfRange {
        path: FieldPath,
        source: EntityRangeError,
    },
}

impl Diagnostic {
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::UnknownVariant(warning) => &warning.path,
            Self::EntityOutOfRange { path, .. } => path,
        }
    }

    pub fn as_unknown_variant(&self) -> Option<&UnknownVariantWarning> {
        match self {
            Self::UnknownVariant(warning) => Some(warning),
            Self::EntityOutOfRange { .. } => None,
        }
    }
}

impl fmt::Display for UnknownVariantWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            VariantIssue::NonePopulated { unrecognised } if unrecognised.is_empty() => {
                write!(f, "{} at `{}` has no variant field", self.container, self.path)
            }
            VariantIssue::NonePopulated { unrecognised } => write!(
                f,
                "{} at `{}` has no known variant field (unrecognised: {})",
                self.container,
                self.path,
                unrecognised.join(", ")
            ),
            VariantIssue::Ambiguous { chosen, ignored } => write!(
                f,
                "{} at `{}` sets several variant fields; kept `{chosen}`, ignored {}",
                self.container,
                self.path,
                ignored.join(", ")
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariant(warning) => fmt::Display::fmt(warning, f),
            Self::EntityOutOfRange { path, source } => write!(f, "`{path}`: {source}"),
        }
    }
}
