//! Building controller weight vectors from neuron chromosomes.

use crate::population::{Chromosome, NeuronLayout};
use serde::{Deserialize, Serialize};

/// Flat controller weights assembled from hidden neurons.
///
/// Layout: `[hidden biases][sensor weights][output biases = 0][output weights]`,
/// each group ordered by hidden unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssembledNetwork {
    /// Number of hidden units the weights were built from
    pub n_hidden: usize,
    pub weights: Vec<f64>,
}

impl AssembledNetwork {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Concatenate the selected neurons into one controller weight vector
pub fn assemble(neurons: &[&Chromosome], layout: NeuronLayout) -> AssembledNetwork {
    let mut weights = Vec::with_capacity(layout.network_len(neurons.len()));

    weights.extend(neurons.iter().map(|n| n.bias()));
    for neuron in neurons {
        weights.extend_from_slice(neuron.sensor_weights(layout));
    }
    weights.extend(std::iter::repeat(0.0).take(layout.n_outputs));
    for neuron in neurons {
        weights.extend_from_slice(neuron.output_weights(layout));
    }

    AssembledNetwork {
        n_hidden: neurons.len(),
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_layout() {
        let layout = NeuronLayout::new(2, 2);
        let a = Chromosome::new(vec![1.0, 11.0, 12.0, 101.0, 102.0]);
        let b = Chromosome::new(vec![2.0, 21.0, 22.0, 201.0, 202.0]);

        let net = assemble(&[&a, &b], layout);

        assert_eq!(net.n_hidden, 2);
        assert_eq!(
            net.weights,
            vec![
                1.0, 2.0, // hidden biases
                11.0, 12.0, 21.0, 22.0, // sensor weights
                0.0, 0.0, // output biases
                101.0, 102.0, 201.0, 202.0, // output weights
            ]
        );
    }

    #[test]
    fn test_assembly_length() {
        let layout = NeuronLayout::new(20, 5);
        let neuron = Chromosome::new(vec![0.3; layout.weights_per_neuron()]);
        let neurons: Vec<&Chromosome> = std::iter::repeat(&neuron).take(10).collect();

        let net = assemble(&neurons, layout);
        assert_eq!(net.len(), layout.network_len(10));
        assert_eq!(net.len(), 10 * 26 + 5);
    }

    #[test]
    fn test_slot_order_preserved() {
        let layout = NeuronLayout::new(1, 1);
        let a = Chromosome::new(vec![1.0, 2.0, 3.0]);
        let b = Chromosome::new(vec![4.0, 5.0, 6.0]);

        let ab = assemble(&[&a, &b], layout);
        let ba = assemble(&[&b, &a], layout);

        assert_eq!(ab.weights, vec![1.0, 4.0, 2.0, 5.0, 0.0, 3.0, 6.0]);
        assert_eq!(ba.weights, vec![4.0, 1.0, 5.0, 2.0, 0.0, 6.0, 3.0]);
    }
}
