//! The step grid: per-step parameter cells and their transitions.

pub mod cell;
pub mod column;
pub mod store;

pub use cell::Cell;
pub use column::{Column, Scale, LFO_RATES};
pub use store::{Action, SequenceStore, SharedStore, MAX_STEPS};
