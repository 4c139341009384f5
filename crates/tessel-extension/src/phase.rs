//! Lifecycle phases and phase capability sets.
//!
//! A [`Phase`] is a named moment in the life of an execution scope at
//! which registered extensions are invoked. Extensions declare the
//! phases they implement as a [`PhaseSet`] when they are constructed;
//! the registry filters by set membership rather than by inspecting
//! types at runtime.

use crate::ExtensionError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All lifecycle phases an extension can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    // ── Setup ────────────────────────────────────────────────
    /// Before any child of a container runs.
    BeforeAll,
    /// Before each leaf runs.
    BeforeEach,

    // ── Teardown ─────────────────────────────────────────────
    /// After each leaf has run.
    AfterEach,
    /// After every child of a container has run.
    AfterAll,

    // ── Instances ────────────────────────────────────────────
    /// After a test instance has been constructed.
    InstancePostProcess,

    // ── Conditions ───────────────────────────────────────────
    /// Decide whether a container runs at all.
    ContainerCondition,
    /// Decide whether a leaf runs at all.
    TestCondition,

    // ── Failures & parameters ────────────────────────────────
    /// Handle (or rethrow) an error raised while a leaf ran.
    ExceptionHandler,
    /// Supply a value for a declared parameter.
    ParameterResolver,
}

impl Phase {
    /// Every phase, in lifecycle order.
    pub const ALL: &'static [Phase] = &[
        Self::BeforeAll,
        Self::BeforeEach,
        Self::AfterEach,
        Self::AfterAll,
        Self::InstancePostProcess,
        Self::ContainerCondition,
        Self::TestCondition,
        Self::ExceptionHandler,
        Self::ParameterResolver,
    ];

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeAll => "before_all",
            Self::BeforeEach => "before_each",
            Self::AfterEach => "after_each",
            Self::AfterAll => "after_all",
            Self::InstancePostProcess => "instance_post_process",
            Self::ContainerCondition => "container_condition",
            Self::TestCondition => "test_condition",
            Self::ExceptionHandler => "exception_handler",
            Self::ParameterResolver => "parameter_resolver",
        }
    }

    /// Returns the single-bit [`PhaseSet`] for this phase.
    #[must_use]
    pub fn as_set(&self) -> PhaseSet {
        match self {
            Self::BeforeAll => PhaseSet::BEFORE_ALL,
            Self::BeforeEach => PhaseSet::BEFORE_EACH,
            Self::AfterEach => PhaseSet::AFTER_EACH,
            Self::AfterAll => PhaseSet::AFTER_ALL,
            Self::InstancePostProcess => PhaseSet::INSTANCE_POST_PROCESS,
            Self::ContainerCondition => PhaseSet::CONTAINER_CONDITION,
            Self::TestCondition => PhaseSet::TEST_CONDITION,
            Self::ExceptionHandler => PhaseSet::EXCEPTION_HANDLER,
            Self::ParameterResolver => PhaseSet::PARAMETER_RESOLVER,
        }
    }
}

impl FromStr for Phase {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ExtensionError::UnknownPhase(s.to_string()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Capability tags: the set of phases an extension implements.
    ///
    /// | Flag | Phase |
    /// |------|-------|
    /// | [`BEFORE_ALL`](Self::BEFORE_ALL) | `before_all` |
    /// | [`BEFORE_EACH`](Self::BEFORE_EACH) | `before_each` |
    /// | [`AFTER_EACH`](Self::AFTER_EACH) | `after_each` |
    /// | [`AFTER_ALL`](Self::AFTER_ALL) | `after_all` |
    /// | [`INSTANCE_POST_PROCESS`](Self::INSTANCE_POST_PROCESS) | `instance_post_process` |
    /// | [`CONTAINER_CONDITION`](Self::CONTAINER_CONDITION) | `container_condition` |
    /// | [`TEST_CONDITION`](Self::TEST_CONDITION) | `test_condition` |
    /// | [`EXCEPTION_HANDLER`](Self::EXCEPTION_HANDLER) | `exception_handler` |
    /// | [`PARAMETER_RESOLVER`](Self::PARAMETER_RESOLVER) | `parameter_resolver` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PhaseSet: u16 {
        const BEFORE_ALL            = 0b0_0000_0001;
        const BEFORE_EACH           = 0b0_0000_0010;
        const AFTER_EACH            = 0b0_0000_0100;
        const AFTER_ALL             = 0b0_0000_1000;
        const INSTANCE_POST_PROCESS = 0b0_0001_0000;
        const CONTAINER_CONDITION   = 0b0_0010_0000;
        const TEST_CONDITION        = 0b0_0100_0000;
        const EXCEPTION_HANDLER     = 0b0_1000_0000;
        const PARAMETER_RESOLVER    = 0b1_0000_0000;
    }
}

impl PhaseSet {
    /// Both condition phases.
    pub const CONDITIONS: Self = Self::CONTAINER_CONDITION.union(Self::TEST_CONDITION);

    /// Before-each and after-each, the usual pair for per-leaf fixtures.
    pub const EACH: Self = Self::BEFORE_EACH.union(Self::AFTER_EACH);

    /// Before-all and after-all, the usual pair for per-container fixtures.
    pub const AROUND_ALL: Self = Self::BEFORE_ALL.union(Self::AFTER_ALL);

    /// Returns `true` if `phase` is in the set.
    #[must_use]
    pub fn includes(&self, phase: Phase) -> bool {
        self.contains(phase.as_set())
    }

    /// Iterates the phases in the set in lifecycle order.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.iter().copied().filter(|p| self.includes(*p))
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        phase.as_set()
    }
}

impl FromIterator<Phase> for PhaseSet {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |acc, phase| acc | phase.as_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_count() {
        assert_eq!(Phase::ALL.len(), 9);
    }

    #[test]
    fn from_str_roundtrip_all() {
        for &phase in Phase::ALL {
            let s = phase.to_string();
            let parsed: Phase = s
                .parse()
                .unwrap_or_else(|e| panic!("failed to parse '{s}': {e}"));
            assert_eq!(parsed, phase);
        }
    }

    #[test]
    fn from_str_unknown() {
        let err = "before_lunch"
            .parse::<Phase>()
            .expect_err("unknown phase should fail");
        assert!(matches!(err, ExtensionError::UnknownPhase(_)));
        assert!("".parse::<Phase>().is_err());
    }

    #[test]
    fn every_phase_has_a_distinct_bit() {
        let mut seen = PhaseSet::empty();
        for &phase in Phase::ALL {
            let bit = phase.as_set();
            assert_eq!(bit.bits().count_ones(), 1, "{phase}");
            assert!(!seen.intersects(bit), "{phase} bit reused");
            seen |= bit;
        }
        assert_eq!(seen, PhaseSet::all());
    }

    #[test]
    fn includes_and_phases() {
        let set = PhaseSet::EACH | PhaseSet::PARAMETER_RESOLVER;
        assert!(set.includes(Phase::BeforeEach));
        assert!(set.includes(Phase::AfterEach));
        assert!(!set.includes(Phase::BeforeAll));
        assert_eq!(
            set.phases().collect::<Vec<_>>(),
            vec![Phase::BeforeEach, Phase::AfterEach, Phase::ParameterResolver]
        );
    }

    #[test]
    fn collect_from_phases() {
        let set: PhaseSet = [Phase::ContainerCondition, Phase::TestCondition]
            .into_iter()
            .collect();
        assert_eq!(set, PhaseSet::CONDITIONS);
        assert_eq!(PhaseSet::from(Phase::AfterAll), PhaseSet::AFTER_ALL);
    }

    #[test]
    fn serde_roundtrip() {
        for &phase in Phase::ALL {
            let json = serde_json::to_string(&phase).expect("Phase should serialize");
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            let restored: Phase = serde_json::from_str(&json).expect("Phase should deserialize");
            assert_eq!(restored, phase);
        }
    }
}
