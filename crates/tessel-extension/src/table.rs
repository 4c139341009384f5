//! Phase configuration table.
//!
//! Maps every [`Phase`] to the positions an extension may occupy in it
//! and the direction in which its sorted extensions are applied.
//!
//! | Phase | Allowed positions | Order |
//! |-------|-------------------|-------|
//! | `before_all`, `before_each` | OUTERMOST … INNERMOST | forward |
//! | `after_each`, `after_all` | OUTERMOST … INNERMOST | backward |
//! | `instance_post_process` | FIRST, DEFAULT, LAST | forward |
//! | `exception_handler` | OUTERMOST … INNERMOST | backward |
//! | conditions, `parameter_resolver` | DEFAULT | forward |
//!
//! The table is built once, before the first registry exists, through
//! [`PhaseTable::shared`]. It is never mutated afterwards.

use crate::{Phase, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// The five nested positions used by setup, teardown and exception phases.
pub const NESTED_POSITIONS: &[Position] = &[
    Position::Outermost,
    Position::OutsideDefault,
    Position::Default,
    Position::InsideDefault,
    Position::Innermost,
];

/// Positions used by instance post-processing.
pub const FIRST_LAST_POSITIONS: &[Position] =
    &[Position::First, Position::Default, Position::Last];

/// The only position allowed by phases without explicit configuration.
pub const DEFAULT_ONLY: &[Position] = &[Position::Default];

/// Direction in which sorted extensions are applied.
///
/// Setup phases run outer to inner; teardown phases run inner to outer,
/// so cleanup mirrors setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationOrder {
    /// Ascending ordinal.
    #[default]
    Forward,
    /// Descending ordinal.
    Backward,
}

impl fmt::Display for ApplicationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        })
    }
}

/// Allowed positions and application order for one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDescriptor {
    allowed_positions: Vec<Position>,
    application_order: ApplicationOrder,
}

impl PhaseDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(allowed_positions: &[Position], application_order: ApplicationOrder) -> Self {
        Self {
            allowed_positions: allowed_positions.to_vec(),
            application_order,
        }
    }

    /// Positions an extension may occupy in this phase.
    #[must_use]
    pub fn allowed_positions(&self) -> &[Position] {
        &self.allowed_positions
    }

    /// Direction in which sorted extensions are applied.
    #[must_use]
    pub fn application_order(&self) -> ApplicationOrder {
        self.application_order
    }

    /// Returns `true` if `position` is allowed.
    #[must_use]
    pub fn allows(&self, position: Position) -> bool {
        self.allowed_positions.contains(&position)
    }
}

impl Default for PhaseDescriptor {
    /// `{DEFAULT}`, forward.
    fn default() -> Self {
        Self::new(DEFAULT_ONLY, ApplicationOrder::Forward)
    }
}

/// Immutable phase → descriptor mapping.
///
/// Phases missing from the table fall back to
/// [`PhaseDescriptor::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    descriptors: HashMap<Phase, PhaseDescriptor>,
    fallback: PhaseDescriptor,
}

static SHARED: OnceLock<Arc<PhaseTable>> = OnceLock::new();

impl PhaseTable {
    /// Builds the built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        use ApplicationOrder::{Backward, Forward};

        Self::builder()
            .configure(Phase::BeforeAll, NESTED_POSITIONS, Forward)
            .configure(Phase::BeforeEach, NESTED_POSITIONS, Forward)
            .configure(Phase::AfterEach, NESTED_POSITIONS, Backward)
            .configure(Phase::AfterAll, NESTED_POSITIONS, Backward)
            .configure(Phase::InstancePostProcess, FIRST_LAST_POSITIONS, Forward)
            .configure(Phase::ExceptionHandler, NESTED_POSITIONS, Backward)
            .configure(Phase::ContainerCondition, DEFAULT_ONLY, Forward)
            .configure(Phase::TestCondition, DEFAULT_ONLY, Forward)
            .configure(Phase::ParameterResolver, DEFAULT_ONLY, Forward)
            .build()
    }

    /// Returns the process-wide built-in table.
    ///
    /// The first call builds it; every later call returns the same
    /// instance.
    #[must_use]
    pub fn shared() -> Arc<PhaseTable> {
        Arc::clone(SHARED.get_or_init(|| {
            tracing::debug!("initializing shared phase table");
            Arc::new(Self::builtin())
        }))
    }

    /// Starts an empty table. Unconfigured phases use the fallback.
    #[must_use]
    pub fn builder() -> PhaseTableBuilder {
        PhaseTableBuilder {
            descriptors: HashMap::new(),
        }
    }

    /// Descriptor for `phase`.
    #[must_use]
    pub fn descriptor(&self, phase: Phase) -> &PhaseDescriptor {
        self.descriptors.get(&phase).unwrap_or(&self.fallback)
    }

    /// Positions an extension may occupy in `phase`.
    #[must_use]
    pub fn allowed_positions_for(&self, phase: Phase) -> &[Position] {
        self.descriptor(phase).allowed_positions()
    }

    /// Direction in which `phase` is applied.
    #[must_use]
    pub fn application_order_for(&self, phase: Phase) -> ApplicationOrder {
        self.descriptor(phase).application_order()
    }

    /// Returns `true` if `phase` has an explicit descriptor.
    #[must_use]
    pub fn is_configured(&self, phase: Phase) -> bool {
        self.descriptors.contains_key(&phase)
    }
}

/// Builder for [`PhaseTable`].
#[derive(Debug, Clone)]
pub struct PhaseTableBuilder {
    descriptors: HashMap<Phase, PhaseDescriptor>,
}

impl PhaseTableBuilder {
    /// Sets the descriptor for `phase`, replacing any earlier one.
    #[must_use]
    pub fn configure(
        mut self,
        phase: Phase,
        allowed_positions: &[Position],
        application_order: ApplicationOrder,
    ) -> Self {
        self.descriptors.insert(
            phase,
            PhaseDescriptor::new(allowed_positions, application_order),
        );
        self
    }

    /// Finishes the table.
    #[must_use]
    pub fn build(self) -> PhaseTable {
        PhaseTable {
            descriptors: self.descriptors,
            fallback: PhaseDescriptor::default(),
        }
    }
}
