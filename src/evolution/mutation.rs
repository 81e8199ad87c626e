//! Gaussian weight mutation.

use crate::error::EngineError;
use crate::population::Population;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Add N(0, sigma) noise to every weight of every chromosome
pub fn mutate<R: Rng + ?Sized>(
    population: &mut Population,
    sigma: f64,
    rng: &mut R,
) -> Result<(), EngineError> {
    if sigma == 0.0 {
        return Ok(());
    }
    let noise = Normal::new(0.0, sigma)
        .map_err(|e| EngineError::InvalidConfig(format!("mutation_sigma {}: {}", sigma, e)))?;

    for chromosome in population.iter_mut() {
        for w in chromosome.weights_mut() {
            *w += noise.sample(rng);
        }
    }
    Ok(())
}
