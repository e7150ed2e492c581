//! Implies overlay
//!
//! Implied values never touch the explicit slots. Each pass recomputes the
//! whole overlay from the explicit values plus the previous overlay, so the
//! result does not depend on the order options were assigned in.

use super::Slot;
use crate::diagnostic::ResolveError;
use crate::option::{OptionId, OptionValue, Registry};
use crate::source::Rank;
use tracing::trace;

/// A value forced onto an option by another option's `implies`
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Implied {
    pub by: OptionId,
    /// Rank of the triggering option's value
    pub rank: Rank,
    pub value: OptionValue,
}

/// Compute the overlay until it stops changing.
///
/// The result is indexed by declaration index.
pub(super) fn settle(registry: &Registry, slots: &[Slot]) -> Result<Vec<Option<Implied>>, ResolveError> {
    let cap = registry.iteration_cap();
    let mut overlay: Vec<Option<Implied>> = vec![None; slots.len()];
    for pass in 1..=cap {
        let next = apply_pass(registry, slots, &overlay);
        if next == overlay {
            trace!("Implied values settled after {pass} pass(es)");
            return Ok(overlay);
        }
        overlay = next;
    }
    Err(ResolveError::ImpliesDiverged(cap))
}

fn apply_pass(registry: &Registry, slots: &[Slot], current: &[Option<Implied>]) -> Vec<Option<Implied>> {
    let mut next: Vec<Option<Implied>> = vec![None; slots.len()];

    for (index, def) in registry.all().iter().enumerate() {
        if def.implies.is_empty() {
            continue;
        }
        let (value, rank) = match &current[index] {
            Some(implied) => (Some(&implied.value), implied.rank),
            None => (slots[index].value.as_ref(), slots[index].rank),
        };
        // Defaults never trigger; only values someone asked for do.
        if rank == Rank::Default || !value.is_some_and(OptionValue::is_truthy) {
            continue;
        }

        for (target, forced) in &def.implies {
            let Some(target) = registry.id_of(target) else {
                continue;
            };
            if slots[target.0].rank >= rank {
                continue;
            }
            // Higher rank wins; on a tie the later declaration does.
            if next[target.0]
                .as_ref()
                .is_none_or(|previous| rank >= previous.rank)
            {
                next[target.0] = Some(Implied {
                    by: OptionId(index),
                    rank,
                    value: forced.clone(),
                });
            }
        }
    }
    next
}
