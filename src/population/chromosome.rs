//! Neuron chromosomes and their weight layout.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weight layout of a single hidden neuron.
///
/// A chromosome is `[bias][sensor weights][output weights]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronLayout {
    pub n_sensors: usize,
    pub n_outputs: usize,
}

impl NeuronLayout {
    /// Every hidden neuron carries exactly one bias weight
    pub const N_BIAS: usize = 1;

    pub fn new(n_sensors: usize, n_outputs: usize) -> Self {
        Self {
            n_sensors,
            n_outputs,
        }
    }

    #[inline]
    pub fn weights_per_neuron(&self) -> usize {
        Self::N_BIAS + self.n_sensors + self.n_outputs
    }

    /// Index where the output-side weights start
    #[inline]
    pub fn output_offset(&self) -> usize {
        Self::N_BIAS + self.n_sensors
    }

    /// Length of an assembled network with `n_hidden` neurons
    pub fn network_len(&self, n_hidden: usize) -> usize {
        n_hidden * self.weights_per_neuron() + self.n_outputs
    }
}

/// One evolvable neuron
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    weights: Vec<f64>,
}

impl Chromosome {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Weights drawn uniformly from [-1, 1]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let weights = (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        Self { weights }
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn bias(&self) -> f64 {
        self.weights[0]
    }

    /// Sensor weights, excluding the bias
    pub fn sensor_weights(&self, layout: NeuronLayout) -> &[f64] {
        &self.weights[NeuronLayout::N_BIAS..layout.output_offset()]
    }

    pub fn output_weights(&self, layout: NeuronLayout) -> &[f64] {
        &self.weights[layout.output_offset()..]
    }

    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }
}

impl From<Vec<f64>> for Chromosome {
    fn from(weights: Vec<f64>) -> Self {
        Self::new(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_layout_sizes() {
        let layout = NeuronLayout::new(20, 5);
        assert_eq!(layout.weights_per_neuron(), 26);
        assert_eq!(layout.output_offset(), 21);
        assert_eq!(layout.network_len(10), 265);
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let chromosome = Chromosome::random(&mut rng, 500);

        assert_eq!(chromosome.len(), 500);
        assert!(chromosome.weights().iter().all(|&w| (-1.0..=1.0).contains(&w)));
    }

    #[test]
    fn test_weight_views() {
        let layout = NeuronLayout::new(3, 2);
        let chromosome = Chromosome::new(vec![0.5, 1.0, 2.0, 3.0, -1.0, -2.0]);

        assert_eq!(chromosome.bias(), 0.5);
        assert_eq!(chromosome.sensor_weights(layout), &[1.0, 2.0, 3.0]);
        assert_eq!(chromosome.output_weights(layout), &[-1.0, -2.0]);
    }
}
