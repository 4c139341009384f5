//! Error types for the extension layer.

use crate::{Phase, Position};
use tessel_types::ErrorCode;
use thiserror::Error;

/// Errors raised while building registries, resolving lookups and
/// dispatching phases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// An extension was registered at a position its phase does not allow.
    #[error("'{position}' not allowed for phase '{phase}': {origin}")]
    DisallowedPosition {
        /// Offending position.
        position: Position,
        /// Phase whose allowed set rejected the position.
        phase: Phase,
        /// Who registered the extension.
        origin: String,
    },

    /// More than one extension holds a unique position in one visible chain.
    #[error("conflicting extensions at '{position}' for phase '{phase}': [{}]", .origins.join(", "))]
    PositionConflict {
        /// Phase being resolved.
        phase: Phase,
        /// Unique position held more than once.
        position: Position,
        /// Origins of every conflicting registration, in chain order.
        origins: Vec<String>,
    },

    /// The factory could not construct an extension type.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    /// Unknown phase string.
    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    /// Unknown position string.
    #[error("unknown position: {0}")]
    UnknownPosition(String),

    /// Unknown failure policy string.
    #[error("unknown failure policy: {0}")]
    UnknownPolicy(String),

    /// A single callback failed while a phase was dispatched.
    #[error("callback failed [{extension}] during '{phase}': {message}")]
    CallbackFailed {
        /// Name of the extension whose callback failed.
        extension: String,
        /// Phase being dispatched.
        phase: Phase,
        /// Failure message reported by the callback.
        message: String,
    },

    /// Several callbacks failed while a phase was dispatched with the
    /// aggregate policy.
    #[error("phase '{phase}' failed: {} callback(s) reported errors", .failures.len())]
    PhaseFailed {
        /// Phase being dispatched.
        phase: Phase,
        /// Every failure, in invocation order.
        failures: Vec<ExtensionError>,
    },
}

impl ErrorCode for ExtensionError {
    fn code(&self) -> &'static str {
        match self {
            Self::DisallowedPosition { .. } => "EXT_DISALLOWED_POSITION",
            Self::PositionConflict { .. } => "EXT_POSITION_CONFLICT",
            Self::Instantiation(_) => "EXT_INSTANTIATION",
            Self::UnknownPhase(_) => "EXT_UNKNOWN_PHASE",
            Self::UnknownPosition(_) => "EXT_UNKNOWN_POSITION",
            Self::UnknownPolicy(_) => "EXT_UNKNOWN_POLICY",
            Self::CallbackFailed { .. } => "EXT_CALLBACK_FAILED",
            Self::PhaseFailed { .. } => "EXT_PHASE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CallbackFailed { .. } | Self::PhaseFailed { .. }
        )
    }
}

/// The instantiation capability could not produce an extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiationError {
    /// No constructor is known for the type.
    #[error("no constructor registered for extension type '{0}'")]
    UnknownType(String),

    /// The constructor ran and refused to build an instance.
    #[error("failed to construct extension type '{type_name}': {reason}")]
    ConstructorFailed {
        /// Fully qualified type name.
        type_name: String,
        /// Constructor's explanation.
        reason: String,
    },
}

/// Error returned by an extension callback.
///
/// The dispatcher attaches the extension name and phase when it wraps
/// this into [`ExtensionError::CallbackFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackError {
    /// Human-readable failure message.
    pub message: String,
}

impl CallbackError {
    /// Creates a callback error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
