//! Error types for decode and encode

use crate::path::FieldPath;
use crate::schema::EntityKind;
use thiserror::Error;
use tgwire_types::{EntityRangeError, IdentifierError};

/// Result alias for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure to turn wire JSON into a typed record
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input is not JSON at all
    #[error("Invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Required field absent or null
    #[error("Missing required field `{path}`")]
    MissingField {
        /// Where the field should have been
        path: FieldPath,
    },

    /// Field present with the wrong JSON type or an unknown enum value
    #[error("Field `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Offending field
        path: FieldPath,
        /// Declared type
        expected: String,
        /// What the payload actually holds
        found: String,
    },

    /// Identifier that cannot be held exactly as a signed 64-bit integer
    #[error("Field `{path}`: {source}")]
    PrecisionLoss {
        /// Offending field
        path: FieldPath,
        /// Rejected value and reason
        source: IdentifierError,
    },

    /// More than one variant field populated (strict mode only)
    #[error("Field `{path}`: variant `{chosen}` set together with {ignored:?}")]
    AmbiguousVariant {
        /// Container holding the variants
        path: FieldPath,
        /// Variant that would have been kept
        chosen: &'static str,
        /// Other populated variant fields
        ignored: Vec<&'static str>,
    },

    /// Entity span that does not fit its text (strict mode only)
    #[error("Field `{path}`: {source}")]
    EntityOutOfRange {
        /// The entity inside its list
        path: FieldPath,
        /// How the span is wrong
        source: EntityRangeError,
    },

    /// Payload passed validation but the typed record rejected it
    #[error("Failed to construct {entity}: {source}")]
    Construct {
        /// Record being built
        entity: EntityKind,
        /// Underlying serde error
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Path of the offending field, when the error is about one
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::MissingField { path }
            | Self::TypeMismatch { path, .. }
            | Self::PrecisionLoss { path, .. }
            | Self::AmbiguousVariant { path, .. }
            | Self::EntityOutOfRange { path, .. } => Some(path),
            Self::Syntax(_) | Self::Construct { .. } => None,
        }
    }
}

/// Failure to produce wire JSON
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Serializer failure
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameter outside the range upstream accepts
    #[error("Invalid parameter `{field}` for {method}: {reason}")]
    InvalidParameter {
        /// Bot API method name
        method: &'static str,
        /// Parameter name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
