//! Extension registry: hierarchical, append-only store of extensions.
//!
//! Each execution scope owns one registry node. A node links to its
//! parent through [`Parent`]; lookups merge the whole ancestor chain
//! (ancestors first) with local registrations, then validate and sort
//! the merged view for the requested phase.
//!
//! # Lifecycle
//!
//! ```text
//! root(factory)                     ← seeded with the default set
//!   └─ Arc<ExtensionRegistry>
//!        └─ new_child(&parent, types)   ← built synchronously
//!             └─ lookup(phase)*         ← read-only for the scope's lifetime
//! ```
//!
//! # Concurrency
//!
//! Registration takes `&mut self` and happens while the scope is built.
//! A child can only be created from an `Arc<ExtensionRegistry>`, i.e. a
//! finished parent, so siblings may be built concurrently against the
//! same read-only chain.

use crate::builtins::default_extension_types;
use crate::sorter;
use crate::{
    ApplicationOrder, DelegatingRegistry, Extension, ExtensionError, ExtensionFactory, Origin,
    Phase, PhaseTable, Position, RegisteredExtension,
};
use std::fmt;
use std::iter;
use std::sync::Arc;
use tessel_types::{ExtensionTypeId, ScopeId};

/// Link from a registry node to its parent.
#[derive(Debug, Clone)]
pub enum Parent {
    /// Top of the hierarchy.
    Root,
    /// Nested scope.
    Child(Arc<ExtensionRegistry>),
}

/// Registry node for one execution scope.
pub struct ExtensionRegistry {
    id: ScopeId,
    parent: Parent,
    table: Arc<PhaseTable>,
    factory: Arc<dyn ExtensionFactory>,
    /// Types registered at this node, in registration order.
    registered_types: Vec<ExtensionTypeId>,
    registered: Vec<RegisteredExtension>,
}

impl ExtensionRegistry {
    /// Creates a root registry with the shared phase table and the
    /// built-in default extensions.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Instantiation`] if `factory` cannot
    /// build a default extension.
    pub fn root(factory: Arc<dyn ExtensionFactory>) -> Result<Self, ExtensionError> {
        Self::root_with(PhaseTable::shared(), factory, &default_extension_types())
    }

    /// Creates a root registry with an explicit table and default set.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while registering `defaults`.
    pub fn root_with(
        table: Arc<PhaseTable>,
        factory: Arc<dyn ExtensionFactory>,
        defaults: &[ExtensionTypeId],
    ) -> Result<Self, ExtensionError> {
        let mut registry = Self {
            id: ScopeId::new(),
            parent: Parent::Root,
            table,
            factory,
            registered_types: Vec::new(),
            registered: Vec::new(),
        };
        tracing::debug!(scope = %registry.id, defaults = defaults.len(), "creating root registry");
        registry.register_types(defaults)?;
        Ok(registry)
    }

    /// Creates a child of `parent` and registers `types` in order.
    ///
    /// The child shares the parent's phase table and factory.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised while registering `types`.
    /// The partially built child is discarded.
    pub fn new_child(
        parent: &Arc<ExtensionRegistry>,
        types: &[ExtensionTypeId],
    ) -> Result<Self, ExtensionError> {
        let mut registry = Self {
            id: ScopeId::new(),
            parent: Parent::Child(Arc::clone(parent)),
            table: Arc::clone(&parent.table),
            factory: Arc::clone(&parent.factory),
            registered_types: Vec::new(),
            registered: Vec::new(),
        };
        tracing::debug!(
            scope = %registry.id,
            parent = %parent.id,
            depth = registry.depth(),
            types = types.len(),
            "creating child registry"
        );
        registry.register_types(types)?;
        Ok(registry)
    }

    fn register_types(&mut self, types: &[ExtensionTypeId]) -> Result<(), ExtensionError> {
        for type_id in types {
            self.register_type(type_id)?;
        }
        Ok(())
    }

    /// Registers an extension type.
    ///
    /// Does nothing and returns `false` if the type is already
    /// registered anywhere in the visible chain. Otherwise the factory
    /// builds an instance, which is:
    ///
    /// 1. registered at [`Position::Default`] if it declares any phase;
    /// 2. asked to register further extensions if it is a registrar.
    ///
    /// # Errors
    ///
    /// - [`ExtensionError::Instantiation`] if the factory fails
    /// - [`ExtensionError::DisallowedPosition`] from either step
    pub fn register_type(&mut self, type_id: &ExtensionTypeId) -> Result<bool, ExtensionError> {
        if self.contains_type(type_id) {
            tracing::trace!(scope = %self.id, extension_type = %type_id, "type already registered");
            return Ok(false);
        }

        let extension = self.factory.instantiate(type_id)?;

        if !extension.capabilities().is_empty() {
            let origin = Origin::Extension(extension.name().to_string());
            self.register_extension(Arc::clone(&extension), origin, Position::Default)?;
        }

        if let Some(registrar) = extension.as_registrar() {
            let mut delegate = DelegatingRegistry::new(self, type_id.clone());
            registrar.register_extensions(&mut delegate)?;
        }

        self.registered_types.push(type_id.clone());
        tracing::debug!(scope = %self.id, extension_type = %type_id, "registered extension type");
        Ok(true)
    }

    /// Registers an extension instance at `position`.
    ///
    /// `position` must be allowed by every phase the extension declares.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::DisallowedPosition`] naming the first
    /// declared phase (in lifecycle order) that rejects `position`.
    pub fn register_extension(
        &mut self,
        extension: Arc<dyn Extension>,
        origin: Origin,
        position: Position,
    ) -> Result<(), ExtensionError> {
        let capabilities = extension.capabilities();
        if let Some(phase) = capabilities
            .phases()
            .find(|phase| !self.table.descriptor(*phase).allows(position))
        {
            return Err(ExtensionError::DisallowedPosition {
                position,
                phase,
                origin: origin.to_string(),
            });
        }

        tracing::debug!(
            scope = %self.id,
            extension = extension.name(),
            origin = %origin,
            position = %position,
            "registered extension"
        );
        self.registered
            .push(RegisteredExtension::new(extension, origin, position));
        Ok(())
    }

    /// Returns the extensions for `phase` in application order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::PositionConflict`] if a unique position
    /// is held more than once in the visible chain.
    pub fn lookup(&self, phase: Phase) -> Result<Vec<Arc<dyn Extension>>, ExtensionError> {
        Ok(self
            .lookup_registered(phase)?
            .into_iter()
            .map(RegisteredExtension::into_extension)
            .collect())
    }

    /// Like [`lookup`](Self::lookup), keeping origin and position.
    ///
    /// # Errors
    ///
    /// See [`lookup`](Self::lookup).
    pub fn lookup_registered(
        &self,
        phase: Phase,
    ) -> Result<Vec<RegisteredExtension>, ExtensionError> {
        let merged: Vec<RegisteredExtension> = self
            .chain()
            .flat_map(|node| node.registered.iter())
            .filter(|entry| entry.participates_in(phase))
            .cloned()
            .collect();

        let descriptor = self.table.descriptor(phase);
        let mut sorted = sorter::sort(merged, phase, descriptor.allowed_positions())?;
        if descriptor.application_order() == ApplicationOrder::Backward {
            sorted.reverse();
        }

        tracing::trace!(
            scope = %self.id,
            phase = %phase,
            count = sorted.len(),
            order = %descriptor.application_order(),
            "resolved extensions"
        );
        Ok(sorted)
    }

    /// Every type registered in the visible chain, ancestors first.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&ExtensionTypeId> {
        self.chain()
            .flat_map(|node| node.registered_types.iter())
            .collect()
    }

    /// Returns `true` if `type_id` is registered anywhere in the visible chain.
    #[must_use]
    pub fn contains_type(&self, type_id: &ExtensionTypeId) -> bool {
        self.ancestors()
            .any(|node| node.registered_types.contains(type_id))
    }

    /// Number of extensions registered in the visible chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ancestors().map(|node| node.registered.len()).sum()
    }

    /// Returns `true` if nothing is registered in the visible chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of extensions registered at this node.
    #[must_use]
    pub fn local_len(&self) -> usize {
        self.registered.len()
    }

    /// Distance from the root (the root has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Parent node, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ExtensionRegistry>> {
        match &self.parent {
            Parent::Root => None,
            Parent::Child(parent) => Some(parent),
        }
    }

    /// Returns `true` for a root registry.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self.parent, Parent::Root)
    }

    /// Identifier of this node.
    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Phase table used by this node.
    #[must_use]
    pub fn table(&self) -> &Arc<PhaseTable> {
        &self.table
    }

    /// This node, then each ancestor up to the root.
    fn ancestors(&self) -> impl Iterator<Item = &ExtensionRegistry> {
        iter::successors(Some(self), |node| node.parent().map(|parent| &**parent))
    }

    /// The root first, down to this node.
    fn chain(&self) -> impl Iterator<Item = &ExtensionRegistry> {
        let mut nodes: Vec<&ExtensionRegistry> = self.ancestors().collect();
        nodes.reverse();
        nodes.into_iter()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self.registered_types.iter().map(ExtensionTypeId::fqn).collect();
        f.debug_struct("ExtensionRegistry")
            .field("id", &self.id)
            .field("depth", &self.depth())
            .field("types", &types)
            .field("registered", &self.registered)
            .finish()
    }
}
