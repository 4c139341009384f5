//! Relative positions an extension can occupy within a phase.
//!
//! Positions are ordered by ordinal. Lower ordinals wrap higher ones:
//! an `OUTERMOST` before-each callback runs before every other
//! before-each callback, and (because teardown phases are applied
//! backward) its after-each counterpart runs after all others.
//!
//! ```text
//! OUTERMOST/FIRST » OUTSIDE_DEFAULT » DEFAULT » INSIDE_DEFAULT » INNERMOST/LAST
//!       1                 2              3            4                5
//! ```

use crate::ExtensionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A relative-ordering slot within one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    /// Apply first. Unique within a visible chain.
    Outermost,
    /// Apply first, for phases that speak of first/last. Unique.
    First,
    /// After `OUTERMOST`, before `DEFAULT`. Ties keep registration order.
    OutsideDefault,
    /// Registration order. Extensions declared earlier (or in an outer
    /// scope) come before those declared later.
    #[default]
    Default,
    /// After `DEFAULT`, before `INNERMOST`.
    InsideDefault,
    /// Apply last. Unique within a visible chain.
    Innermost,
    /// Apply last, for phases that speak of first/last. Unique.
    Last,
}

impl Position {
    /// Every position in the catalog.
    pub const ALL: &'static [Position] = &[
        Self::Outermost,
        Self::First,
        Self::OutsideDefault,
        Self::Default,
        Self::InsideDefault,
        Self::Innermost,
        Self::Last,
    ];

    /// Sort key. `FIRST` shares the ordinal of `OUTERMOST`, `LAST` that
    /// of `INNERMOST`.
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Outermost | Self::First => 1,
            Self::OutsideDefault => 2,
            Self::Default => 3,
            Self::InsideDefault => 4,
            Self::Innermost | Self::Last => 5,
        }
    }

    /// Returns `true` if at most one extension may hold this position
    /// within a visible chain.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        matches!(
            self,
            Self::Outermost | Self::First | Self::Innermost | Self::Last
        )
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outermost => "OUTERMOST",
            Self::First => "FIRST",
            Self::OutsideDefault => "OUTSIDE_DEFAULT",
            Self::Default => "DEFAULT",
            Self::InsideDefault => "INSIDE_DEFAULT",
            Self::Innermost => "INNERMOST",
            Self::Last => "LAST",
        }
    }
}

impl FromStr for Position {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ExtensionError::UnknownPosition(s.to_string()))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
