//! Controller networks built from coevolved neurons.

mod assembler;
mod controller;

pub use assembler::{assemble, AssembledNetwork};
pub use controller::Controller;
