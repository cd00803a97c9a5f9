//! Finite-state and pushdown automata, plus a regex front end that compiles
//! patterns into nondeterministic finite-state machines (NFSMs) and executes
//! them through a generic configuration-graph runner.
//!
//! The entry points most users want are [`regex::compile`] to build a
//! matcher from a pattern, and [`runner::Runner`] (implemented by
//! [`fsm::Fsm`] and [`pdm::Pdm`]) to run it over a word.
pub mod alphabet;
pub mod fsm;
pub mod frozen;
pub mod match_result;
pub mod pdm;
pub mod regex;
pub mod runner;
pub mod state;

#[cfg(feature = "visualization")]
pub mod formatter;

use std::fmt::Debug;
use std::hash::Hash;

/// A generic alphabet.
///
/// `Eq`, `Ord`, and `Hash` are assumed to be provided for the finite set to
/// simplify data structures by allowing use of different map and set types.
/// `Ord` additionally gives subset construction a deterministic way to
/// canonicalize superstates and enumerate transitions.
pub trait Alphabet: Hash + Eq + Debug + Clone + Copy + Ord {}

impl<T> Alphabet for T where T: Hash + Eq + Debug + Clone + Copy + Ord {}
