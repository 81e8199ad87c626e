//! Population storage.

use super::chromosome::Chromosome;
use super::selection::Selection;
use crate::error::EngineError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of subpopulations and the length of each one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopulationShape {
    pub slots: usize,
    pub slot_len: usize,
}

impl PopulationShape {
    pub fn new(slots: usize, slot_len: usize) -> Self {
        Self { slots, slot_len }
    }

    /// Total chromosome count
    pub fn total(&self) -> usize {
        self.slots * self.slot_len
    }
}

/// All chromosomes of a run, grouped into one or more slots.
///
/// A flat pool is the one-slot case. The shape is fixed at construction and
/// every [`Population::replace`] is checked against it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    slots: Vec<Vec<Chromosome>>,
    shape: PopulationShape,
    weights_per_neuron: usize,
}

impl Population {
    /// Create a population with weights drawn uniformly from [-1, 1]
    pub fn initialize<R: Rng + ?Sized>(
        rng: &mut R,
        shape: PopulationShape,
        weights_per_neuron: usize,
    ) -> Self {
        let slots = (0..shape.slots)
            .map(|_| {
                (0..shape.slot_len)
                    .map(|_| Chromosome::random(rng, weights_per_neuron))
                    .collect()
            })
            .collect();

        Self {
            slots,
            shape,
            weights_per_neuron,
        }
    }

    /// Build a population from existing chromosomes
    pub fn from_slots(slots: Vec<Vec<Chromosome>>) -> Result<Self, EngineError> {
        let slot_len = slots.first().map_or(0, Vec::len);
        let weights_per_neuron = slots
            .first()
            .and_then(|slot| slot.first())
            .map_or(0, Chromosome::len);

        if slots.is_empty() || slot_len == 0 {
            return Err(EngineError::InvalidConfig(
                "population needs at least one non-empty slot".to_string(),
            ));
        }

        let mut population = Self {
            slots: Vec::new(),
            shape: PopulationShape::new(slots.len(), slot_len),
            weights_per_neuron,
        };
        population.replace(slots)?;
        Ok(population)
    }

    #[inline]
    pub fn shape(&self) -> PopulationShape {
        self.shape
    }

    #[inline]
    pub fn weights_per_neuron(&self) -> usize {
        self.weights_per_neuron
    }

    /// Total chromosome count
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slots(&self) -> &[Vec<Chromosome>] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> &[Chromosome] {
        &self.slots[slot]
    }

    /// Selected chromosomes in slot order
    pub fn get(&self, selection: &Selection) -> Vec<&Chromosome> {
        selection
            .iter()
            .map(|pick| &self.slots[pick.slot][pick.index])
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chromosome> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chromosome> {
        self.slots.iter_mut().flatten()
    }

    /// Swap in new contents, keeping the original shape
    pub fn replace(&mut self, slots: Vec<Vec<Chromosome>>) -> Result<(), EngineError> {
        let lengths_ok = slots.len() == self.shape.slots
            && slots.iter().all(|slot| slot.len() == self.shape.slot_len);
        if !lengths_ok {
            let lengths: Vec<usize> = slots.iter().map(Vec::len).collect();
            return Err(EngineError::ShapeMismatch {
                expected: self.shape,
                found: format!("{} slots with lengths {:?}", slots.len(), lengths),
            });
        }

        if let Some(bad) = slots
            .iter()
            .flatten()
            .find(|c| c.len() != self.weights_per_neuron)
        {
            return Err(EngineError::ShapeMismatch {
                expected: self.shape,
                found: format!(
                    "chromosome with {} weights, expected {}",
                    bad.len(),
                    self.weights_per_neuron
                ),
            });
        }

        self.slots = slots;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::selection::Pick;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn numbered(slots: usize, slot_len: usize) -> Population {
        let data = (0..slots)
            .map(|s| {
                (0..slot_len)
                    .map(|i| Chromosome::new(vec![(s * 100 + i) as f64; 3]))
                    .collect()
            })
            .collect();
        Population::from_slots(data).unwrap()
    }

    #[test]
    fn test_initialize_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let population = Population::initialize(&mut rng, PopulationShape::new(3, 7), 9);

        assert_eq!(population.shape(), PopulationShape::new(3, 7));
        assert_eq!(population.len(), 21);
        assert!(population.iter().all(|c| c.len() == 9));
        assert!(population
            .iter()
            .flat_map(|c| c.weights())
            .all(|&w| (-1.0..=1.0).contains(&w)));
    }

    #[test]
    fn test_get_in_selection_order() {
        let population = numbered(3, 4);
        let selection = Selection::new(vec![
            Pick { slot: 2, index: 1 },
            Pick { slot: 0, index: 3 },
            Pick { slot: 1, index: 0 },
        ]);

        let chosen = population.get(&selection);
        let firsts: Vec<f64> = chosen.iter().map(|c| c.weights()[0]).collect();
        assert_eq!(firsts, vec![201.0, 3.0, 100.0]);
    }

    #[test]
    fn test_replace_rejects_shape_change() {
        let mut population = numbered(2, 4);

        let short = vec![
            vec![Chromosome::new(vec![0.0; 3]); 4],
            vec![Chromosome::new(vec![0.0; 3]); 3],
        ];
        assert!(matches!(
            population.replace(short),
            Err(EngineError::ShapeMismatch { .. })
        ));

        let wide = vec![vec![Chromosome::new(vec![0.0; 4]); 4]; 2];
        assert!(population.replace(wide).is_err());

        let extra_slot = vec![vec![Chromosome::new(vec![0.0; 3]); 4]; 3];
        assert!(population.replace(extra_slot).is_err());

        // Contents untouched after failed replacements
        assert_eq!(population, numbered(2, 4));
    }

    #[test]
    fn test_replace_accepts_same_shape() {
        let mut population = numbered(2, 4);
        let zeros = vec![vec![Chromosome::new(vec![0.0; 3]); 4]; 2];

        population.replace(zeros).unwrap();
        assert!(population.iter().flat_map(|c| c.weights()).all(|&w| w == 0.0));
    }

    #[test]
    fn test_from_slots_rejects_ragged() {
        let ragged = vec![
            vec![Chromosome::new(vec![0.0; 3]); 4],
            vec![Chromosome::new(vec![0.0; 3]); 5],
        ];
        assert!(Population::from_slots(ragged).is_err());
        assert!(Population::from_slots(Vec::new()).is_err());
    }
}
