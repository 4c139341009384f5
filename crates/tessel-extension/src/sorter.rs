//! Position sorting and uniqueness validation.

use crate::{ExtensionError, Phase, Position, RegisteredExtension};

/// Validates and sorts the visible chain for one phase.
///
/// 1. For every unique position in `allowed`, more than one entry at that
///    position fails with [`ExtensionError::PositionConflict`], naming
///    every conflicting origin in input order.
/// 2. Entries are stable-sorted by [`Position::ordinal`], so ties keep
///    their input (ancestor-first, then registration) order.
///
/// Pure: the input is consumed and a new sequence returned.
///
/// # Errors
///
/// Returns [`ExtensionError::PositionConflict`] for the first unique
/// position (in `allowed` order) held more than once.
pub fn sort(
    mut entries: Vec<RegisteredExtension>,
    phase: Phase,
    allowed: &[Position],
) -> Result<Vec<RegisteredExtension>, ExtensionError> {
    for &position in allowed.iter().filter(|p| p.is_unique()) {
        let origins: Vec<String> = entries
            .iter()
            .filter(|e| e.position() == position)
            .map(|e| e.origin().to_string())
            .collect();
        if origins.len() > 1 {
            return Err(ExtensionError::PositionConflict {
                phase,
                position,
                origins,
            });
        }
    }

    // Vec::sort_by_key is stable.
    entries.sort_by_key(|e| e.position().ordinal());
    Ok(entries)
}
