//! Programmatic registration by extensions.

use crate::{Extension, ExtensionError, ExtensionRegistry, Origin, Position};
use std::sync::Arc;
use tessel_types::ExtensionTypeId;

/// An extension that registers further extensions.
///
/// Called once, while the owning registry registers the registrar's
/// type. Everything registered through the [`DelegatingRegistry`] is
/// attributed to the registrar's type, so conflicts name the registrar
/// rather than anonymous closures it created.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tessel_extension::{
///     DelegatingRegistry, Extension, ExtensionError, FnExtension, PhaseSet, Position, Registrar,
/// };
///
/// struct Timing;
///
/// impl Extension for Timing {
///     fn name(&self) -> &str { "timing" }
///     fn capabilities(&self) -> PhaseSet { PhaseSet::empty() }
///     fn as_registrar(&self) -> Option<&dyn Registrar> { Some(self) }
/// }
///
/// impl Registrar for Timing {
///     fn register_extensions(&self, registry: &mut DelegatingRegistry<'_>) -> Result<(), ExtensionError> {
///         registry.register_at(
///             FnExtension::shared("start", PhaseSet::BEFORE_EACH, |_| Ok(())),
///             Position::Outermost,
///         )?;
///         registry.register(FnExtension::shared("stop", PhaseSet::AFTER_EACH, |_| Ok(())))
///     }
/// }
/// ```
pub trait Registrar: Send + Sync {
    /// Registers extensions into `registry`.
    ///
    /// # Errors
    ///
    /// Propagates registration errors (e.g. a disallowed position).
    fn register_extensions(&self, registry: &mut DelegatingRegistry<'_>)
        -> Result<(), ExtensionError>;
}

/// Registry view bound to one registrar for one registration session.
///
/// Forwards to [`ExtensionRegistry::register_extension`] with the
/// registrar's type as origin. Holds no state of its own.
pub struct DelegatingRegistry<'a> {
    owner: &'a mut ExtensionRegistry,
    registrar: ExtensionTypeId,
}

impl<'a> DelegatingRegistry<'a> {
    pub(crate) fn new(owner: &'a mut ExtensionRegistry, registrar: ExtensionTypeId) -> Self {
        Self { owner, registrar }
    }

    /// Registers `extension` at [`Position::Default`].
    ///
    /// # Errors
    ///
    /// See [`ExtensionRegistry::register_extension`].
    pub fn register(&mut self, extension: Arc<dyn Extension>) -> Result<(), ExtensionError> {
        self.register_at(extension, Position::Default)
    }

    /// Registers `extension` at `position`.
    ///
    /// # Errors
    ///
    /// See [`ExtensionRegistry::register_extension`].
    pub fn register_at(
        &mut self,
        extension: Arc<dyn Extension>,
        position: Position,
    ) -> Result<(), ExtensionError> {
        self.owner.register_extension(
            extension,
            Origin::Registrar(self.registrar.clone()),
            position,
        )
    }

    /// Type of the registrar this view is bound to.
    #[must_use]
    pub fn registrar(&self) -> &ExtensionTypeId {
        &self.registrar
    }
}
