//! The automaton core: byte classes, the state pool, and the general
//! matcher.
//!
//! # Module organization
//!
//! - `byte_class`: 256-bit byte sets backing `[...]` classes
//! - `sparse_set`: O(1)-clear working sets for the simulation
//! - `arena`: state pool, `StateId`, and the fragment linker
//! - `nfa`: the two-set simulation with position-aware epsilon closure

mod arena;
mod byte_class;
mod nfa;
mod sparse_set;

pub use arena::{Fragment, OutArm, OutList, OutRef, StateArena, StateId, StateKind};
pub use byte_class::ByteClass;
pub use nfa::Nfa;

pub(crate) use nfa::compile;
