//! Drawing neurons for trial networks.

use super::store::PopulationShape;
use crate::error::EngineError;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One chosen neuron: its subpopulation and its index inside it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pick {
    pub slot: usize,
    pub index: usize,
}

/// Neurons chosen for one trial network, in hidden-unit order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    picks: Vec<Pick>,
}

impl Selection {
    pub fn new(picks: Vec<Pick>) -> Self {
        Self { picks }
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    /// Number of hidden units in the assembled network
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pick> {
        self.picks.iter()
    }
}

/// How a trial network draws its neurons from the population.
///
/// This is the only behavioural difference between the flat-pool and the
/// subpopulation variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Distinct neurons from a single flat pool
    WithoutReplacement { per_network: usize },
    /// Exactly one neuron from every subpopulation
    OnePerSlot,
}

impl SelectionPolicy {
    /// Hidden units of a network drawn from a population of `shape`
    pub fn hidden_units(&self, shape: PopulationShape) -> usize {
        match *self {
            Self::WithoutReplacement { per_network } => per_network,
            Self::OnePerSlot => shape.slots,
        }
    }

    /// Check that this policy can draw from a population of `shape`
    pub fn check(&self, shape: PopulationShape) -> Result<(), EngineError> {
        match *self {
            Self::WithoutReplacement { per_network } => {
                if shape.slots != 1 {
                    return Err(EngineError::InvalidConfig(format!(
                        "sampling without replacement needs a single pool, found {} slots",
                        shape.slots
                    )));
                }
                if per_network == 0 || per_network > shape.slot_len {
                    return Err(EngineError::InvalidConfig(format!(
                        "cannot draw {} distinct neurons from a pool of {}",
                        per_network, shape.slot_len
                    )));
                }
            }
            Self::OnePerSlot => {
                if shape.slots == 0 || shape.slot_len == 0 {
                    return Err(EngineError::InvalidConfig(
                        "one-per-slot selection needs non-empty subpopulations".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Draw the neurons for one trial network
    pub fn draw<R: Rng + ?Sized>(&self, shape: PopulationShape, rng: &mut R) -> Selection {
        let picks = match *self {
            Self::WithoutReplacement { per_network } => {
                index::sample(rng, shape.slot_len, per_network)
                    .into_iter()
                    .map(|index| Pick { slot: 0, index })
                    .collect()
            }
            Self::OnePerSlot => (0..shape.slots)
                .map(|slot| Pick {
                    slot,
                    index: rng.gen_range(0..shape.slot_len),
                })
                .collect(),
        };
        Selection::new(picks)
    }
}
