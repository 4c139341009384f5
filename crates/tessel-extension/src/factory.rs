//! Instantiation capability.
//!
//! A registry never constructs extensions itself. It asks its
//! [`ExtensionFactory`] to turn an [`ExtensionTypeId`] into a live
//! instance. [`FactoryTable`] is the table-driven implementation used
//! when no host engine supplies one.

use crate::{builtins, Extension, InstantiationError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tessel_types::ExtensionTypeId;

/// Turns extension types into live instances.
///
/// Failures are fatal to the registry being built: the registry does
/// not retry or skip the type.
pub trait ExtensionFactory: Send + Sync {
    /// Constructs a new instance of `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError`] if the type is unknown or its
    /// constructor fails.
    fn instantiate(&self, type_id: &ExtensionTypeId)
        -> Result<Arc<dyn Extension>, InstantiationError>;
}

impl<F> ExtensionFactory for F
where
    F: Fn(&ExtensionTypeId) -> Result<Arc<dyn Extension>, InstantiationError> + Send + Sync,
{
    fn instantiate(
        &self,
        type_id: &ExtensionTypeId,
    ) -> Result<Arc<dyn Extension>, InstantiationError> {
        self(type_id)
    }
}

type Constructor = dyn Fn() -> Result<Arc<dyn Extension>, String> + Send + Sync;

/// Table of named constructors.
///
/// # Example
///
/// ```
/// use tessel_extension::{ExtensionFactory, FactoryTable, FnExtension, PhaseSet};
/// use tessel_types::ExtensionTypeId;
///
/// let timing = ExtensionTypeId::new("acme", "timing");
/// let factory = FactoryTable::with_builtins().register(timing.clone(), || {
///     FnExtension::shared("timing", PhaseSet::EACH, |_| Ok(()))
/// });
///
/// let ext = factory.instantiate(&timing).expect("registered");
/// assert_eq!(ext.name(), "timing");
/// ```
#[derive(Default)]
pub struct FactoryTable {
    constructors: HashMap<ExtensionTypeId, Box<Constructor>>,
}

impl FactoryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table pre-loaded with the built-in extensions.
    #[must_use]
    pub fn with_builtins() -> Self {
        builtins::install(Self::new())
    }

    /// Adds an infallible constructor, replacing any earlier one.
    #[must_use]
    pub fn register(
        self,
        type_id: ExtensionTypeId,
        constructor: impl Fn() -> Arc<dyn Extension> + Send + Sync + 'static,
    ) -> Self {
        self.register_fallible(type_id, move || Ok(constructor()))
    }

    /// Adds a constructor that may refuse to build an instance.
    ///
    /// An `Err(reason)` becomes [`InstantiationError::ConstructorFailed`].
    #[must_use]
    pub fn register_fallible(
        mut self,
        type_id: ExtensionTypeId,
        constructor: impl Fn() -> Result<Arc<dyn Extension>, String> + Send + Sync + 'static,
    ) -> Self {
        self.constructors.insert(type_id, Box::new(constructor));
        self
    }

    /// Returns `true` if a constructor is known for `type_id`.
    #[must_use]
    pub fn contains(&self, type_id: &ExtensionTypeId) -> bool {
        self.constructors.contains_key(type_id)
    }

    /// Number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if no constructors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Wraps the table for use by registries.
    #[must_use]
    pub fn shared(self) -> Arc<dyn ExtensionFactory> {
        Arc::new(self)
    }
}

impl ExtensionFactory for FactoryTable {
    fn instantiate(
        &self,
        type_id: &ExtensionTypeId,
    ) -> Result<Arc<dyn Extension>, InstantiationError> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| InstantiationError::UnknownType(type_id.fqn()))?;
        constructor().map_err(|reason| InstantiationError::ConstructorFailed {
            type_name: type_id.fqn(),
            reason,
        })
    }
}

impl fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.constructors.keys().map(ExtensionTypeId::fqn).collect();
        types.sort();
        f.debug_struct("FactoryTable").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnExtension, PhaseSet};

    #[test]
    fn unknown_type_fails() {
        let table = FactoryTable::new();
        let err = table
            .instantiate(&ExtensionTypeId::new("acme", "missing"))
            .expect_err("empty table");
        assert_eq!(err, InstantiationError::UnknownType("acme::missing".into()));
    }

    #[test]
    fn constructor_runs_per_call() {
        let id = ExtensionTypeId::new("acme", "fresh");
        let table = FactoryTable::new().register(id.clone(), || {
            FnExtension::shared("fresh", PhaseSet::BEFORE_ALL, |_| Ok(()))
        });
        let a = table.instantiate(&id).expect("known");
        let b = table.instantiate(&id).expect("known");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn fallible_constructor_reports_reason() {
        let id = ExtensionTypeId::new("acme", "broken");
        let table = FactoryTable::new()
            .register_fallible(id.clone(), || Err("requires a database".to_string()));
        let err = table.instantiate(&id).expect_err("constructor refuses");
        assert_eq!(
            err,
            InstantiationError::ConstructorFailed {
                type_name: "acme::broken".into(),
                reason: "requires a database".into(),
            }
        );
    }

    #[test]
    fn builtins_are_preloaded() {
        let table = FactoryTable::with_builtins();
        for type_id in builtins::default_extension_types() {
            assert!(table.contains(&type_id), "{type_id} missing");
        }
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn closures_are_factories() {
        let factory = |type_id: &ExtensionTypeId| -> Result<Arc<dyn Extension>, InstantiationError> {
            Ok(FnExtension::shared(type_id.name().to_string(), PhaseSet::AFTER_ALL, |_| Ok(())))
        };
        let ext = factory
            .instantiate(&ExtensionTypeId::new("any", "thing"))
            .expect("closure factory");
        assert_eq!(ext.name(), "thing");
    }

    #[test]
    fn debug_lists_sorted_types() {
        let rendered = format!("{:?}", FactoryTable::with_builtins());
        assert!(rendered.contains("builtin::disabled_condition"), "{rendered}");
    }
}
