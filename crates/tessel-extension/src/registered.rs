//! Registration bookkeeping.

use crate::{Extension, Phase, Position};
use std::fmt;
use std::sync::Arc;
use tessel_types::ExtensionTypeId;

/// Who registered an extension.
///
/// Used only for diagnostics: conflict and disallowed-position errors
/// name the origin, not the extension instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The extension registered itself (declarative registration).
    Extension(String),
    /// A registrar injected the extension. Attributed to the registrar's type.
    Registrar(ExtensionTypeId),
    /// Host code registered the extension through the public API.
    Programmatic(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension(name) => write!(f, "{name}"),
            Self::Registrar(type_id) => write!(f, "registrar {type_id}"),
            Self::Programmatic(label) => write!(f, "programmatic {label}"),
        }
    }
}

/// An extension together with its origin and position. Immutable.
#[derive(Clone)]
pub struct RegisteredExtension {
    extension: Arc<dyn Extension>,
    origin: Origin,
    position: Position,
}

impl RegisteredExtension {
    pub(crate) fn new(extension: Arc<dyn Extension>, origin: Origin, position: Position) -> Self {
        Self {
            extension,
            origin,
            position,
        }
    }

    /// The extension instance.
    #[must_use]
    pub fn extension(&self) -> &Arc<dyn Extension> {
        &self.extension
    }

    /// Who registered it.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Position it was registered at.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns `true` if the extension takes part in `phase`.
    #[must_use]
    pub fn participates_in(&self, phase: Phase) -> bool {
        self.extension.capabilities().includes(phase)
    }

    /// Drops the bookkeeping.
    #[must_use]
    pub fn into_extension(self) -> Arc<dyn Extension> {
        self.extension
    }
}

impl fmt::Debug for RegisteredExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredExtension")
            .field("extension", &self.extension.name())
            .field("origin", &self.origin)
            .field("position", &self.position)
            .finish()
    }
}
