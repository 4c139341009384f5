//! Built-in extensions seeded into every root registry.
//!
//! | Type | Phases | Behavior |
//! |------|--------|----------|
//! | `builtin::disabled_condition` | container/test condition | Disables scopes whose payload carries `disabled` |
//! | `builtin::test_info_resolver` | parameter resolver | Resolves `TestInfo` parameters |
//! | `builtin::test_reporter_resolver` | parameter resolver | Resolves `TestReporter` parameters |

use crate::{CallbackContext, CallbackError, Extension, FactoryTable, PhaseSet};
use serde_json::{json, Value};
use std::sync::Arc;
use tessel_types::ExtensionTypeId;

/// Type name of [`DisabledCondition`].
pub const DISABLED_CONDITION: &str = "disabled_condition";
/// Type name of [`TestInfoResolver`].
pub const TEST_INFO_RESOLVER: &str = "test_info_resolver";
/// Type name of [`TestReporterResolver`].
pub const TEST_REPORTER_RESOLVER: &str = "test_reporter_resolver";

/// Payload key that marks a scope as disabled.
pub const DISABLED_KEY: &str = "disabled";
/// Parameter type answered by [`TestInfoResolver`].
pub const TEST_INFO_PARAMETER: &str = "TestInfo";
/// Parameter type answered by [`TestReporterResolver`].
pub const TEST_REPORTER_PARAMETER: &str = "TestReporter";

/// The default extension set, in registration order.
#[must_use]
pub fn default_extension_types() -> Vec<ExtensionTypeId> {
    vec![
        ExtensionTypeId::builtin(DISABLED_CONDITION),
        ExtensionTypeId::builtin(TEST_INFO_RESOLVER),
        ExtensionTypeId::builtin(TEST_REPORTER_RESOLVER),
    ]
}

/// Adds constructors for every built-in to `table`.
pub(crate) fn install(table: FactoryTable) -> FactoryTable {
    table
        .register(ExtensionTypeId::builtin(DISABLED_CONDITION), || {
            Arc::new(DisabledCondition)
        })
        .register(ExtensionTypeId::builtin(TEST_INFO_RESOLVER), || {
            Arc::new(TestInfoResolver)
        })
        .register(ExtensionTypeId::builtin(TEST_REPORTER_RESOLVER), || {
            Arc::new(TestReporterResolver)
        })
}

/// Disables containers and leaves whose payload sets `disabled`.
///
/// `"disabled": true` uses a generated reason; `"disabled": "<reason>"`
/// uses the given one. Any other value leaves the scope enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCondition;

impl Extension for DisabledCondition {
    fn name(&self) -> &str {
        DISABLED_CONDITION
    }

    fn capabilities(&self) -> PhaseSet {
        PhaseSet::CONDITIONS
    }

    fn handle(&self, ctx: &mut CallbackContext) -> Result<(), CallbackError> {
        let reason = match ctx.payload.get(DISABLED_KEY) {
            Some(Value::Bool(true)) => format!("{} is disabled", ctx.display_name),
            Some(Value::String(reason)) => reason.clone(),
            _ => return Ok(()),
        };
        ctx.disable(reason);
        Ok(())
    }
}

/// Resolves `TestInfo` parameters from the scope's identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestInfoResolver;

impl Extension for TestInfoResolver {
    fn name(&self) -> &str {
        TEST_INFO_RESOLVER
    }

    fn capabilities(&self) -> PhaseSet {
        PhaseSet::PARAMETER_RESOLVER
    }

    fn handle(&self, ctx: &mut CallbackContext) -> Result<(), CallbackError> {
        if ctx.parameter() == Some(TEST_INFO_PARAMETER) {
            let info = json!({
                "name": ctx.scope_name,
                "display_name": ctx.display_name,
                "tags": ctx.tags,
            });
            ctx.resolve(info);
        }
        Ok(())
    }
}

/// Resolves `TestReporter` parameters to a reporter keyed by scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestReporterResolver;

impl Extension for TestReporterResolver {
    fn name(&self) -> &str {
        TEST_REPORTER_RESOLVER
    }

    fn capabilities(&self) -> PhaseSet {
        PhaseSet::PARAMETER_RESOLVER
    }

    fn handle(&self, ctx: &mut CallbackContext) -> Result<(), CallbackError> {
        if ctx.parameter() == Some(TEST_REPORTER_PARAMETER) {
            let reporter = json!({
                "scope": ctx.scope_id.to_string(),
                "scope_name": ctx.scope_name,
            });
            ctx.resolve(reporter);
        }
        Ok(())
    }
}
