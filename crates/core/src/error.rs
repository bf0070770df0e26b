//! Error types for client generation.
//!
//! Every error is fatal: a run either produces the complete output set or
//! stops at the first error with no partial output.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors produced while loading a document or generating clients from it.
#[derive(Debug, Error)]
pub enum GenError {
    /// A `$ref` points at a schema, parameter, body or response that does not exist.
    #[error("unresolved reference '{reference}' at {location}")]
    UnresolvedReference {
        /// The reference string as written in the document.
        reference: String,
        /// Schema path of the node holding the reference.
        location: String,
    },

    /// A schema node carries a kind marker the resolver does not understand.
    #[error("malformed schema at {location}: {reason}")]
    MalformedSchema {
        /// Schema path of the offending node.
        location: String,
        /// What is wrong with the node.
        reason: String,
    },

    /// Path template placeholders disagree with the declared path parameters.
    #[error("placeholder mismatch in {operation}: {reason}")]
    PlaceholderMismatch {
        /// Operation identifier (`METHOD /path`).
        operation: String,
        /// How the template and the parameters disagree.
        reason: String,
    },

    /// Numeric suffixes ran out while disambiguating a name.
    #[error("no free name left for candidate '{candidate}' (owner {owner})")]
    NameCollisionExhausted {
        /// The name that was requested.
        candidate: String,
        /// The entity that requested it.
        owner: String,
    },

    /// The document could not be deserialized.
    #[error("invalid schema document at {path}: {message}")]
    InvalidDocument {
        /// Location inside the document where deserialization failed.
        path: String,
        /// Deserializer message.
        message: String,
    },

    /// The generator configuration could not be parsed.
    #[error("invalid generator config: {message}")]
    InvalidConfig {
        /// Parser message.
        message: String,
    },
}

impl GenError {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolved(reference: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            location: location.into(),
        }
    }

    pub(crate) fn placeholder(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlaceholderMismatch {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Location context carried by the error, when it has one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::UnresolvedReference { location, .. } | Self::MalformedSchema { location, .. } => {
                Some(location)
            }
            Self::PlaceholderMismatch { operation, .. } => Some(operation),
            Self::InvalidDocument { path, .. } => Some(path),
            Self::NameCollisionExhausted { .. } | Self::InvalidConfig { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_location() {
        let err = GenError::unresolved("#/components/schemas/Missing", "#/paths/~1pets/get");
        let msg = err.to_string();
        assert!(msg.contains("#/components/schemas/Missing"));
        assert!(msg.contains("#/paths/~1pets/get"));
        assert_eq!(err.location(), Some("#/paths/~1pets/get"));
    }

    #[test]
    fn test_placeholder_location_is_operation() {
        let err = GenError::placeholder("GET /pets/{petId}", "1 placeholder, 0 path parameters");
        assert_eq!(err.location(), Some("GET /pets/{petId}"));
    }
}
