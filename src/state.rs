//! Opaque, globally unique identities for automaton states.
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A node handle of an automaton.
///
/// States are compared and hashed by id only, are never mutated after
/// creation, and are produced exclusively by machine-construction routines
/// (Thompson subparts, subset construction, totalization, normalization).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State(u64);

impl State {
    /// Mint a fresh state, distinct from every state minted before it.
    pub fn fresh() -> Self {
        State(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for State {
    fn default() -> Self {
        State::fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_states_are_distinct() {
        let a = State::fresh();
        let b = State::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn states_compare_by_id() {
        let a = State::fresh();
        let b = a;
        assert_eq!(a, b);
    }
}
