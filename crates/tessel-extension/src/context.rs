//! Data passed to extension callbacks.

use crate::Phase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tessel_types::ScopeId;

/// Payload key a scope uses to declare a parameter it needs resolved.
pub const PARAMETER_KEY: &str = "parameter";

/// Outcome of condition evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Verdict {
    /// The scope runs.
    #[default]
    Enabled,
    /// The scope is skipped.
    Disabled {
        /// Why the scope was disabled.
        reason: String,
    },
}

/// Context passed to [`Extension::handle`](crate::Extension::handle).
///
/// The host engine builds one context per scope and re-targets it at
/// each phase with [`for_phase`](Self::for_phase). Condition callbacks
/// record a [`Verdict`]; parameter resolvers fill `resolved`.
/// `metadata` carries state between phases of the same scope (for
/// example, a timer started in `before_each` and read in `after_each`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackContext {
    /// Phase being dispatched.
    pub phase: Phase,

    /// Registry node of the scope.
    pub scope_id: ScopeId,

    /// Unique name of the scope within the execution tree.
    pub scope_name: String,

    /// Human-facing name. Defaults to `scope_name`.
    pub display_name: String,

    /// Tags declared on the scope.
    pub tags: Vec<String>,

    /// Phase-specific input (declared parameter, raised error, flags).
    pub payload: Value,

    /// Cross-phase state bag.
    pub metadata: HashMap<String, Value>,

    /// Condition outcome. Starts as [`Verdict::Enabled`].
    pub verdict: Verdict,

    /// Value produced by a parameter resolver.
    pub resolved: Option<Value>,
}

impl CallbackContext {
    /// Creates a context for `phase` in the given scope.
    #[must_use]
    pub fn new(
        phase: Phase,
        scope_id: ScopeId,
        scope_name: impl Into<String>,
        payload: Value,
    ) -> Self {
        let scope_name = scope_name.into();
        Self {
            phase,
            scope_id,
            display_name: scope_name.clone(),
            scope_name,
            tags: Vec::new(),
            payload,
            metadata: HashMap::new(),
            verdict: Verdict::Enabled,
            resolved: None,
        }
    }

    /// Returns the context re-targeted at `phase`, keeping metadata.
    ///
    /// The per-phase outputs (`verdict`, `resolved`) are reset.
    #[must_use]
    pub fn for_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self.verdict = Verdict::Enabled;
        self.resolved = None;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Marks the scope as disabled. The first reason wins.
    pub fn disable(&mut self, reason: impl Into<String>) {
        if self.verdict == Verdict::Enabled {
            self.verdict = Verdict::Disabled {
                reason: reason.into(),
            };
        }
    }

    /// Returns `true` if a condition disabled the scope.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self.verdict, Verdict::Disabled { .. })
    }

    /// The parameter type a resolver is asked for, if any.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.payload.get(PARAMETER_KEY).and_then(Value::as_str)
    }

    /// Records a resolved parameter value. The first resolver wins.
    pub fn resolve(&mut self, value: Value) {
        if self.resolved.is_none() {
            self.resolved = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_ctx() -> CallbackContext {
        CallbackContext::new(
            Phase::BeforeEach,
            ScopeId::new(),
            "suite/case",
            json!({"parameter": "TestInfo"}),
        )
    }

    #[test]
    fn new_has_correct_defaults() {
        let ctx = test_ctx();
        assert_eq!(ctx.display_name, "suite/case");
        assert!(ctx.tags.is_empty());
        assert!(ctx.metadata.is_empty());
        assert_eq!(ctx.verdict, Verdict::Enabled);
        assert!(ctx.resolved.is_none());
    }

    #[test]
    fn first_disable_reason_wins() {
        let mut ctx = test_ctx();
        ctx.disable("flaky");
        ctx.disable("slow");
        assert!(ctx.is_disabled());
        assert_eq!(
            ctx.verdict,
            Verdict::Disabled {
                reason: "flaky".into()
            }
        );
    }

    #[test]
    fn first_resolution_wins() {
        let mut ctx = test_ctx();
        ctx.resolve(json!(1));
        ctx.resolve(json!(2));
        assert_eq!(ctx.resolved, Some(json!(1)));
    }

    #[test]
    fn parameter_reads_payload() {
        assert_eq!(test_ctx().parameter(), Some("TestInfo"));
        let mut ctx = test_ctx();
        ctx.payload = json!(null);
        assert_eq!(ctx.parameter(), None);
    }

    #[test]
    fn for_phase_resets_outputs_and_keeps_metadata() {
        let mut ctx = test_ctx().with_metadata("started_at", json!(10));
        ctx.disable("nope");
        ctx.resolve(json!("x"));

        let ctx = ctx.for_phase(Phase::AfterEach);
        assert_eq!(ctx.phase, Phase::AfterEach);
        assert_eq!(ctx.verdict, Verdict::Enabled);
        assert!(ctx.resolved.is_none());
        assert_eq!(ctx.metadata.get("started_at"), Some(&json!(10)));
    }

    #[test]
    fn builders() {
        let ctx = test_ctx()
            .with_display_name("A readable case")
            .with_tag("slow")
            .with_tag("db");
        assert_eq!(ctx.display_name, "A readable case");
        assert_eq!(ctx.tags, vec!["slow".to_string(), "db".to_string()]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut ctx = test_ctx().with_metadata("key", json!(42));
        ctx.disable("because");
        let json = serde_json::to_string(&ctx).expect("serialize");
        let restored: CallbackContext = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.phase, ctx.phase);
        assert_eq!(restored.scope_id, ctx.scope_id);
        assert_eq!(restored.verdict, ctx.verdict);
        assert_eq!(restored.metadata, ctx.metadata);
    }
}
