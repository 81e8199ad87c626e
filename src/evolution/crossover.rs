//! Crossover between neuron chromosomes.

use crate::population::Chromosome;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Strategy for crossover operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverStrategy {
    /// Swap every weight from a random cut point onwards
    SinglePoint,
    /// Pick each weight from either parent with a fair coin
    Uniform,
}

impl CrossoverStrategy {
    /// Produce two complementary children
    pub fn apply<R: Rng + ?Sized>(
        &self,
        p0: &Chromosome,
        p1: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        debug_assert_eq!(p0.len(), p1.len());

        match self {
            Self::SinglePoint => {
                let cut = rng.gen_range(0..p0.len());
                single_point(p0, p1, cut)
            }
            Self::Uniform => {
                let mask: Vec<bool> = (0..p0.len()).map(|_| rng.gen_bool(0.5)).collect();
                uniform(p0, p1, &mask)
            }
        }
    }
}

/// Children swap all weights at index `cut` and beyond
pub fn single_point(p0: &Chromosome, p1: &Chromosome, cut: usize) -> (Chromosome, Chromosome) {
    let (a, b) = (p0.weights(), p1.weights());
    let cut = cut.min(a.len());

    let c0 = a[..cut].iter().chain(&b[cut..]).copied().collect();
    let c1 = b[..cut].iter().chain(&a[cut..]).copied().collect();
    (Chromosome::new(c0), Chromosome::new(c1))
}

/// Child 0 takes weight `i` from `p0` where `mask[i]` is set, child 1 the opposite
pub fn uniform(p0: &Chromosome, p1: &Chromosome, mask: &[bool]) -> (Chromosome, Chromosome) {
    let (c0, c1) = p0
        .weights()
        .iter()
        .zip(p1.weights())
        .zip(mask)
        .map(|((&a, &b), &take_first)| if take_first { (a, b) } else { (b, a) })
        .unzip();
    (Chromosome::new(c0), Chromosome::new(c1))
}
