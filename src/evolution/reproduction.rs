//! Rank-based reproduction of neuron (sub)populations.

use super::crossover::CrossoverStrategy;
use crate::error::EngineError;
use crate::evaluation::NeuronFitness;
use crate::population::{Chromosome, Population};
use rand::Rng;

/// Share of each slot carried over unchanged
pub const SURVIVOR_FRACTION: f64 = 0.5;
/// Share of each slot allowed to breed
pub const PARENT_FRACTION: f64 = 0.25;

/// Offspring of one slot
#[derive(Clone, Debug)]
pub struct Brood {
    /// Survivors followed by children, best first
    pub offspring: Vec<Chromosome>,
    /// Children added by tournament fill-up
    pub filled: usize,
}

/// Indices sorted best first; ties keep their original order
pub fn rank(fitness: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    order
}

/// Binary tournament over a best-first slice
fn tournament<'a, R: Rng + ?Sized>(ranked: &'a [Chromosome], rng: &mut R) -> &'a Chromosome {
    let a = rng.gen_range(0..ranked.len());
    let b = rng.gen_range(0..ranked.len());
    &ranked[a.min(b)]
}

/// Breed the next generation of a single slot
pub fn breed_slot<R: Rng + ?Sized>(
    slot: &[Chromosome],
    fitness: &[f64],
    crossover: CrossoverStrategy,
    rng: &mut R,
) -> Brood {
    let size = slot.len();
    let ranked: Vec<Chromosome> = rank(fitness).into_iter().map(|i| slot[i].clone()).collect();

    let n_survivors = (SURVIVOR_FRACTION * size as f64) as usize;
    let n_parents = (PARENT_FRACTION * size as f64) as usize;
    let parents = &ranked[..n_parents];

    let mut offspring = Vec::with_capacity(size);
    offspring.extend_from_slice(&ranked[..n_survivors]);

    for (i, p0) in parents.iter().enumerate() {
        let p1 = &parents[rng.gen_range(0..=i)];
        let (c0, c1) = crossover.apply(p0, p1, rng);
        offspring.push(c0);
        offspring.push(c1);
    }

    let mut filled = 0;
    if !parents.is_empty() {
        while offspring.len() < size {
            let p0 = tournament(parents, rng);
            let p1 = tournament(parents, rng);
            let (c0, _) = crossover.apply(p0, p1, rng);
            offspring.push(c0);
            filled += 1;
        }
    }

    Brood { offspring, filled }
}

/// Replace every slot with its offspring.
///
/// Consumes the old population; the returned one has the same shape or the
/// call fails with [`EngineError::ShapeMismatch`].
pub fn reproduce<R: Rng + ?Sized>(
    mut population: Population,
    fitness: &NeuronFitness,
    crossover: CrossoverStrategy,
    rng: &mut R,
) -> Result<Population, EngineError> {
    let shape = population.shape();
    if fitness.shape() != shape || !fitness.is_rectangular() {
        return Err(EngineError::ShapeMismatch {
            expected: shape,
            found: format!(
                "fitness for {} slots of {}",
                fitness.shape().slots,
                fitness.shape().slot_len
            ),
        });
    }

    let next: Vec<Vec<Chromosome>> = population
        .slots()
        .iter()
        .zip(fitness.slots())
        .map(|(slot, slot_fitness)| {
            let brood = breed_slot(slot, slot_fitness, crossover, &mut *rng);
            if brood.filled > 0 {
                log::debug!("Tournament fill added {} children", brood.filled);
            }
            brood.offspring
        })
        .collect();

    population.replace(next)?;
    Ok(population)
}
