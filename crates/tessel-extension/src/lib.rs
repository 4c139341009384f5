//! Extension registry for TESSEL.
//!
//! This crate registers, orders and dispatches the callback handlers
//! ("extensions") attached to nested execution scopes.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Types Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessel-types : ExtensionTypeId, ScopeId, ErrorCode          │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Extension Layer               ◄── HERE   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tessel-extension : Registry, Sorter, Registrar, Dispatch   │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕ consumed by
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Host execution engine (external)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! ## Phases and Positions
//!
//! A [`Phase`] is a lifecycle moment (`before_each`, `after_all`, ...).
//! Within a phase every extension holds a [`Position`]. The
//! [`PhaseTable`] says which positions each phase allows and whether
//! its sorted extensions are applied forward or backward.
//!
//! ## Extensions
//!
//! An [`Extension`] declares the phases it implements as a
//! [`PhaseSet`]. Extensions that also implement [`Registrar`] register
//! further extensions, attributed to the registrar's type.
//!
//! ## Registry
//!
//! [`ExtensionRegistry`] is one node per scope. Lookups merge the
//! ancestor chain with local registrations, check uniqueness of the
//! edge positions and return extensions in application order.
//!
//! ## Dispatch
//!
//! [`Dispatcher`] invokes a phase's extensions. Forward phases fail
//! fast by default; backward (teardown) phases run every extension and
//! aggregate failures.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use tessel_extension::{
//!     CallbackContext, Dispatcher, ExtensionRegistry, FactoryTable, FnExtension, Origin, Phase,
//!     PhaseSet, Position,
//! };
//!
//! let root = Arc::new(ExtensionRegistry::root(FactoryTable::with_builtins().shared())?);
//!
//! let mut suite = ExtensionRegistry::new_child(&root, &[])?;
//! suite.register_extension(
//!     FnExtension::shared("database", PhaseSet::AROUND_ALL, |ctx| {
//!         let state = if ctx.phase == Phase::BeforeAll { "connected" } else { "closed" };
//!         ctx.metadata.insert("db".into(), json!(state));
//!         Ok(())
//!     }),
//!     Origin::Programmatic("suite".into()),
//!     Position::Outermost,
//! )?;
//!
//! let dispatcher = Dispatcher::default();
//! let mut ctx = CallbackContext::new(Phase::BeforeAll, suite.id(), "suite", json!({}));
//! dispatcher.invoke(&suite, &mut ctx)?;
//! assert_eq!(ctx.metadata["db"], json!("connected"));
//!
//! let mut ctx = ctx.for_phase(Phase::AfterAll);
//! dispatcher.invoke(&suite, &mut ctx)?;
//! assert_eq!(ctx.metadata["db"], json!("closed"));
//! # Ok::<(), tessel_extension::ExtensionError>(())
//! ```

mod builtins;
pub mod config;
mod context;
mod dispatch;
mod error;
mod extension;
mod factory;
mod phase;
mod position;
mod registered;
mod registrar;
mod registry;
pub mod sorter;
mod table;

// Re-export core types
pub use builtins::{
    default_extension_types, DisabledCondition, TestInfoResolver, TestReporterResolver,
    DISABLED_CONDITION, DISABLED_KEY, TEST_INFO_PARAMETER, TEST_INFO_RESOLVER,
    TEST_REPORTER_PARAMETER, TEST_REPORTER_RESOLVER,
};
pub use config::{ConfigError, ConfigLoader, DispatchConfig, ExtensionConfig};
pub use context::{CallbackContext, Verdict, PARAMETER_KEY};
pub use dispatch::{Dispatcher, FailurePolicy};
pub use error::{CallbackError, ExtensionError, InstantiationError};
pub use extension::{Extension, FnExtension};
pub use factory::{ExtensionFactory, FactoryTable};
pub use phase::{Phase, PhaseSet};
pub use position::Position;
pub use registered::{Origin, RegisteredExtension};
pub use registrar::{DelegatingRegistry, Registrar};
pub use registry::{ExtensionRegistry, Parent};
pub use table::{
    ApplicationOrder, PhaseDescriptor, PhaseTable, PhaseTableBuilder, DEFAULT_ONLY,
    FIRST_LAST_POSITIONS, NESTED_POSITIONS,
};

// Re-export testing utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the extension layer.
    //!
    //! Provides [`MockExtension`], [`MockRegistrar`] and the shared
    //! [`Journal`] they record into.
    pub use crate::extension::testing::{Journal, MockExtension, MockRegistrar};
}
