//! Generational reproduction operators.
//!
//! Implements:
//! - Rank-based survivor and parent selection per slot
//! - Single-point and uniform crossover
//! - Tournament fill-up when a slot comes out short
//! - Gaussian mutation of every weight

mod crossover;
mod mutation;
mod reproduction;

pub use crossover::{single_point, uniform, CrossoverStrategy};
pub use mutation::mutate;
pub use reproduction::{breed_slot, rank, reproduce, Brood, PARENT_FRACTION, SURVIVOR_FRACTION};
