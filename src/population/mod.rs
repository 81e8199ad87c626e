//! Neuron populations.
//!
//! - Chromosomes and the per-neuron weight layout
//! - Flat pools and subpopulation sets behind one shape-checked store
//! - Selection policies for drawing trial networks

mod chromosome;
mod selection;
mod store;

pub use chromosome::{Chromosome, NeuronLayout};
pub use selection::{Pick, Selection, SelectionPolicy};
pub use store::{Population, PopulationShape};
