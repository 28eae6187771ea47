//! Error Types
//!
//! Every fallible operation in the crate returns this single error enum.
//! All of the variants represent programmer errors: they are raised
//! immediately, never retried, and expected to propagate to the caller.

use crate::value::ValueType;

/// The error type for all operations in this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A value could not be coerced into the required representation, or a
    /// bind target produces values of an incompatible type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type that was required.
        expected: ValueType,
        /// The type that was supplied.
        found: ValueType,
    },

    /// A lookup by name against a node's declared parameter set failed.
    #[error("unknown parameter `{name}`")]
    UnknownParameter {
        /// The name that was looked up.
        name: String,
    },

    /// A bind or graph construction would let one lifetime domain observe
    /// another that may be shorter-lived or unrelated.
    #[error("`{name}` is outside the current scope")]
    OutOfScope {
        /// The parameter or node involved in the violation.
        name: String,
    },

    /// An operation is invalid in the current mode, such as unbinding an
    /// already-constant parameter or killing the global scope.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// What made the operation invalid.
        reason: &'static str,
    },

    /// A node was evaluated without a transform having been supplied.
    #[error("no transform has been supplied")]
    NotImplemented,
}

impl Error {
    /// Shorthand for constructing an [`Error::InvalidState`].
    pub(crate) fn invalid_state(reason: &'static str) -> Self {
        Self::InvalidState { reason }
    }

    /// Shorthand for constructing an [`Error::UnknownParameter`].
    pub(crate) fn unknown_parameter(name: &str) -> Self {
        Self::UnknownParameter { name: name.to_owned() }
    }
}
