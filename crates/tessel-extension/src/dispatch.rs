//! Phase dispatch.
//!
//! Resolves the extensions for a phase and invokes them in application
//! order. What happens when a callback fails depends on the
//! [`FailurePolicy`] for the phase's direction:
//!
//! | Direction | Default policy | Behavior |
//! |-----------|----------------|----------|
//! | forward (setup, conditions, resolvers) | `fail_fast` | First failure stops the phase |
//! | backward (teardown, exception handlers) | `aggregate` | Every callback runs, failures are collected |

use crate::{ApplicationOrder, CallbackContext, ExtensionError, ExtensionRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a callback fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and return it.
    FailFast,
    /// Run every callback and report all failures together.
    Aggregate,
}

impl FailurePolicy {
    /// All policies.
    pub const ALL: &'static [FailurePolicy] = &[Self::FailFast, Self::Aggregate];

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::Aggregate => "aggregate",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ExtensionError::UnknownPolicy(s.to_string()))
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invokes resolved extensions under a failure policy per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    /// Policy for forward phases.
    pub forward: FailurePolicy,
    /// Policy for backward phases.
    pub backward: FailurePolicy,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            forward: FailurePolicy::FailFast,
            backward: FailurePolicy::Aggregate,
        }
    }
}

impl Dispatcher {
    /// Creates a dispatcher with explicit policies.
    #[must_use]
    pub fn new(forward: FailurePolicy, backward: FailurePolicy) -> Self {
        Self { forward, backward }
    }

    /// Policy applied to phases with the given direction.
    #[must_use]
    pub fn policy_for(&self, order: ApplicationOrder) -> FailurePolicy {
        match order {
            ApplicationOrder::Forward => self.forward,
            ApplicationOrder::Backward => self.backward,
        }
    }

    /// Runs every extension registered for `ctx.phase`.
    ///
    /// Extensions share `ctx` and see each other's changes in order.
    ///
    /// # Errors
    ///
    /// - [`ExtensionError::PositionConflict`] before any callback runs
    /// - [`ExtensionError::CallbackFailed`] under [`FailurePolicy::FailFast`]
    /// - [`ExtensionError::PhaseFailed`] under [`FailurePolicy::Aggregate`]
    pub fn invoke(
        &self,
        registry: &ExtensionRegistry,
        ctx: &mut CallbackContext,
    ) -> Result<(), ExtensionError> {
        let phase = ctx.phase;
        let extensions = registry.lookup(phase)?;
        let policy = self.policy_for(registry.table().application_order_for(phase));

        tracing::trace!(
            scope = %registry.id(),
            phase = %phase,
            policy = %policy,
            count = extensions.len(),
            "dispatching phase"
        );

        let mut failures = Vec::new();
        for extension in &extensions {
            let Err(e) = extension.handle(ctx) else {
                continue;
            };
            let failure = ExtensionError::CallbackFailed {
                extension: extension.name().to_string(),
                phase,
                message: e.message,
            };
            match policy {
                FailurePolicy::FailFast => return Err(failure),
                FailurePolicy::Aggregate => {
                    tracing::warn!(
                        scope = %registry.id(),
                        phase = %phase,
                        extension = extension.name(),
                        error = %failure,
                        "callback failed, continuing phase"
                    );
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExtensionError::PhaseFailed { phase, failures })
        }
    }
}
