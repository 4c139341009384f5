//! Extension trait, closure extensions and testing utilities.

use crate::{CallbackContext, CallbackError, PhaseSet, Registrar};
use std::fmt;
use std::sync::Arc;

/// A capability-tagged callback handler.
///
/// Extensions are produced by an [`ExtensionFactory`](crate::ExtensionFactory)
/// (declarative registration) or handed to a registry directly
/// (programmatic registration). Each one declares:
///
/// - A name (used as its origin in diagnostics)
/// - The phases it implements, as a [`PhaseSet`]
/// - Optionally, a [`Registrar`] view for registering further extensions
///
/// An extension with an empty capability set is never auto-registered,
/// but it can still act as a registrar.
///
/// # Thread Safety
///
/// Extensions must be `Send + Sync`: a built registry is shared by
/// reference across sibling scopes that may be constructed concurrently.
pub trait Extension: Send + Sync {
    /// Name of this extension instance.
    fn name(&self) -> &str;

    /// Phases this extension takes part in.
    fn capabilities(&self) -> PhaseSet;

    /// Runs the callback for `ctx.phase`.
    ///
    /// Only called for phases in [`capabilities`](Self::capabilities).
    /// The default does nothing.
    fn handle(&self, _ctx: &mut CallbackContext) -> Result<(), CallbackError> {
        Ok(())
    }

    /// Returns the registrar view of this extension, if it has one.
    ///
    /// Implementors that also implement [`Registrar`] return `Some(self)`.
    fn as_registrar(&self) -> Option<&dyn Registrar> {
        None
    }
}

impl fmt::Debug for dyn Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

type Callback = dyn Fn(&mut CallbackContext) -> Result<(), CallbackError> + Send + Sync;

/// An extension backed by a closure.
///
/// Registrars use this to register anonymous callbacks without
/// declaring a type for each one.
///
/// # Example
///
/// ```
/// use tessel_extension::{Extension, FnExtension, PhaseSet};
///
/// let ext = FnExtension::new("start-timer", PhaseSet::BEFORE_EACH, |ctx| {
///     ctx.metadata.insert("started".into(), serde_json::json!(true));
///     Ok(())
/// });
/// assert_eq!(ext.name(), "start-timer");
/// assert!(ext.capabilities().contains(PhaseSet::BEFORE_EACH));
/// ```
pub struct FnExtension {
    name: String,
    capabilities: PhaseSet,
    callback: Box<Callback>,
}

impl FnExtension {
    /// Creates a closure extension.
    pub fn new(
        name: impl Into<String>,
        capabilities: PhaseSet,
        callback: impl Fn(&mut CallbackContext) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            capabilities,
            callback: Box::new(callback),
        }
    }

    /// Creates a closure extension ready for registration.
    pub fn shared(
        name: impl Into<String>,
        capabilities: PhaseSet,
        callback: impl Fn(&mut CallbackContext) -> Result<(), CallbackError> + Send + Sync + 'static,
    ) -> Arc<dyn Extension> {
        Arc::new(Self::new(name, capabilities, callback))
    }
}

impl Extension for FnExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> PhaseSet {
        self.capabilities
    }

    fn handle(&self, ctx: &mut CallbackContext) -> Result<(), CallbackError> {
        (self.callback)(ctx)
    }
}

/// Test utilities for the extension layer.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use crate::{DelegatingRegistry, ExtensionError, Position};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// Shared, ordered record of callback invocations.
    ///
    /// Entries are `"<extension>@<phase>"`.
    #[derive(Debug, Clone, Default)]
    pub struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        /// Creates an empty journal.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Appends an entry.
        pub fn record(&self, entry: impl Into<String>) {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(entry.into());
        }

        /// Returns a copy of every entry so far.
        #[must_use]
        pub fn entries(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    /// A mock extension for testing.
    ///
    /// Records every invocation in its [`Journal`] and optionally fails.
    pub struct MockExtension {
        /// Extension name.
        pub name: String,
        /// Declared capabilities.
        pub capabilities: PhaseSet,
        /// Failure message returned by every call, if set.
        pub failure: Option<String>,
        /// Invocation record.
        pub journal: Journal,
        /// Number of times `handle()` has been called.
        pub call_count: Arc<AtomicUsize>,
    }

    impl MockExtension {
        /// Creates a mock that succeeds on every call.
        pub fn new(name: &str, capabilities: PhaseSet) -> Self {
            Self {
                name: name.to_string(),
                capabilities,
                failure: None,
                journal: Journal::new(),
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Records into the given journal instead of a private one.
        #[must_use]
        pub fn with_journal(mut self, journal: &Journal) -> Self {
            self.journal = journal.clone();
            self
        }

        /// Fails every call with `message`.
        #[must_use]
        pub fn failing(mut self, message: &str) -> Self {
            self.failure = Some(message.to_string());
            self
        }

        /// Wraps the mock for registration.
        #[must_use]
        pub fn shared(self) -> Arc<dyn Extension> {
            Arc::new(self)
        }

        /// Returns the number of times this extension has been called.
        pub fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    impl Extension for MockExtension {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> PhaseSet {
            self.capabilities
        }

        fn handle(&self, ctx: &mut CallbackContext) -> Result<(), CallbackError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.journal.record(format!("{}@{}", self.name, ctx.phase));
            match &self.failure {
                Some(message) => Err(CallbackError::new(message.clone())),
                None => Ok(()),
            }
        }
    }

    /// A mock registrar.
    ///
    /// Optionally implements phases itself, and registers a fixed list
    /// of extensions (with positions) every time it is asked to.
    pub struct MockRegistrar {
        /// Registrar name.
        pub name: String,
        /// Phases the registrar itself implements.
        pub capabilities: PhaseSet,
        /// Extensions registered through the delegating registry.
        pub children: Vec<(Arc<dyn Extension>, Position)>,
        /// Number of registration sessions run.
        pub sessions: Arc<AtomicUsize>,
    }

    impl MockRegistrar {
        /// Creates a registrar with no own capabilities and no children.
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                capabilities: PhaseSet::empty(),
                children: Vec::new(),
                sessions: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Sets the registrar's own capabilities.
        #[must_use]
        pub fn with_capabilities(mut self, capabilities: PhaseSet) -> Self {
            self.capabilities = capabilities;
            self
        }

        /// Adds an extension to register at `position`.
        #[must_use]
        pub fn with_child(mut self, extension: Arc<dyn Extension>, position: Position) -> Self {
            self.children.push((extension, position));
            self
        }
    }

    impl Extension for MockRegistrar {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> PhaseSet {
            self.capabilities
        }

        fn as_registrar(&self) -> Option<&dyn Registrar> {
            Some(self)
        }
    }

    impl Registrar for MockRegistrar {
        fn register_extensions(
            &self,
            registry: &mut DelegatingRegistry<'_>,
        ) -> Result<(), ExtensionError> {
            self.sessions.fetch_add(1, Ordering::SeqCst);
            for (extension, position) in &self.children {
                registry.register_at(Arc::clone(extension), *position)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Journal, MockExtension};
    use super::*;
    use crate::Phase;
    use serde_json::json;
    use tessel_types::ScopeId;

    fn test_ctx(phase: Phase) -> CallbackContext {
        CallbackContext::new(phase, ScopeId::new(), "suite", json!({}))
    }

    #[test]
    fn default_handle_is_noop() {
        struct Quiet;
        impl Extension for Quiet {
            fn name(&self) -> &str {
                "quiet"
            }
            fn capabilities(&self) -> PhaseSet {
                PhaseSet::BEFORE_ALL
            }
        }

        let mut ctx = test_ctx(Phase::BeforeAll);
        assert!(Quiet.handle(&mut ctx).is_ok());
        assert_eq!(ctx.verdict, crate::Verdict::Enabled);
        assert!(ctx.metadata.is_empty());
        assert!(ctx.resolved.is_none());
        assert!(Quiet.as_registrar().is_none());
    }

    #[test]
    fn fn_extension_runs_closure() {
        let ext = FnExtension::new("mark", PhaseSet::BEFORE_EACH, |ctx| {
            ctx.metadata.insert("marked".into(), json!(true));
            Ok(())
        });
        let mut ctx = test_ctx(Phase::BeforeEach);
        ext.handle(&mut ctx).expect("closure should succeed");
        assert_eq!(ctx.metadata.get("marked"), Some(&json!(true)));
        assert_eq!(ext.capabilities(), PhaseSet::BEFORE_EACH);
    }

    #[test]
    fn fn_extension_propagates_error() {
        let ext = FnExtension::shared("explode", PhaseSet::AFTER_ALL, |_| {
            Err(CallbackError::new("kaboom"))
        });
        let err = ext
            .handle(&mut test_ctx(Phase::AfterAll))
            .expect_err("closure fails");
        assert_eq!(err.message, "kaboom");
    }

    #[test]
    fn mock_records_into_shared_journal() {
        let journal = Journal::new();
        let a = MockExtension::new("a", PhaseSet::EACH).with_journal(&journal);
        let b = MockExtension::new("b", PhaseSet::EACH).with_journal(&journal);

        a.handle(&mut test_ctx(Phase::BeforeEach)).expect("ok");
        b.handle(&mut test_ctx(Phase::AfterEach)).expect("ok");

        assert_eq!(journal.entries(), vec!["a@before_each", "b@after_each"]);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[test]
    fn failing_mock_still_counts() {
        let ext = MockExtension::new("bad", PhaseSet::AFTER_EACH).failing("nope");
        let err = ext
            .handle(&mut test_ctx(Phase::AfterEach))
            .expect_err("configured to fail");
        assert_eq!(err.message, "nope");
        assert_eq!(ext.calls(), 1);
    }

    #[test]
    fn debug_for_dyn_extension() {
        let ext = FnExtension::shared("dbg", PhaseSet::BEFORE_ALL, |_| Ok(()));
        let rendered = format!("{ext:?}");
        assert!(rendered.contains("dbg"), "{rendered}");
    }
}
