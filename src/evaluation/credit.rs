//! Credit assignment from networks back to neurons.

use crate::population::{PopulationShape, Selection};

/// Cumulative fitness and participation counts, parallel to the population
#[derive(Clone, Debug, PartialEq)]
pub struct CreditAccumulator {
    cumulative: Vec<Vec<f64>>,
    counts: Vec<Vec<u32>>,
}

impl CreditAccumulator {
    pub fn new(shape: PopulationShape) -> Self {
        Self {
            cumulative: vec![vec![0.0; shape.slot_len]; shape.slots],
            counts: vec![vec![0; shape.slot_len]; shape.slots],
        }
    }

    /// Count one participation for every selected neuron
    pub fn participate(&mut self, selection: &Selection) {
        for pick in selection.iter() {
            self.counts[pick.slot][pick.index] += 1;
        }
    }

    /// Add a network's fitness to every neuron that built it
    pub fn credit(&mut self, selection: &Selection, fitness: f64) {
        for pick in selection.iter() {
            self.cumulative[pick.slot][pick.index] += fitness;
        }
    }

    pub fn count(&self, slot: usize, index: usize) -> u32 {
        self.counts[slot][index]
    }

    pub fn cumulative(&self, slot: usize, index: usize) -> f64 {
        self.cumulative[slot][index]
    }

    /// Mean fitness per neuron; neurons never selected get zero
    pub fn assign(self) -> NeuronFitness {
        let slots = self
            .cumulative
            .into_iter()
            .zip(self.counts)
            .map(|(sums, counts)| {
                sums.into_iter()
                    .zip(counts)
                    .map(|(sum, count)| sum / f64::from(count.max(1)))
                    .collect()
            })
            .collect();
        NeuronFitness { slots }
    }
}

/// Per-neuron fitness in population shape
#[derive(Clone, Debug, PartialEq)]
pub struct NeuronFitness {
    slots: Vec<Vec<f64>>,
}

impl NeuronFitness {
    pub fn from_slots(slots: Vec<Vec<f64>>) -> Self {
        Self { slots }
    }

    pub fn slot(&self, slot: usize) -> &[f64] {
        &self.slots[slot]
    }

    pub fn slots(&self) -> &[Vec<f64>] {
        &self.slots
    }

    pub fn shape(&self) -> PopulationShape {
        PopulationShape::new(self.slots.len(), self.slots.first().map_or(0, Vec::len))
    }

    /// True when every slot has the same length as the first
    pub fn is_rectangular(&self) -> bool {
        let len = self.shape().slot_len;
        self.slots.iter().all(|s| s.len() == len)
    }
}
