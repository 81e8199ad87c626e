//! Two-layer sigmoid controller decoded from an assembled weight vector.

use super::assembler::AssembledNetwork;
use crate::error::EngineError;
use crate::population::NeuronLayout;
use ndarray::{Array1, Array2, ArrayView1};

/// Feed-forward controller with one hidden layer
#[derive(Clone, Debug)]
pub struct Controller {
    hidden_biases: Array1<f64>,
    /// (n_hidden, n_sensors), one row per hidden unit
    sensor_weights: Array2<f64>,
    output_biases: Array1<f64>,
    /// (n_hidden, n_outputs), one row per hidden unit
    output_weights: Array2<f64>,
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Controller {
    /// Decode the weight vector produced by [`assemble`](super::assemble)
    pub fn from_network(network: &AssembledNetwork, layout: NeuronLayout) -> Result<Self, EngineError> {
        let n_hidden = network.n_hidden;
        let expected = layout.network_len(n_hidden);
        if network.weights.len() != expected {
            return Err(EngineError::NetworkSize {
                expected,
                found: network.weights.len(),
            });
        }

        let w = &network.weights;
        let sensors_end = n_hidden + n_hidden * layout.n_sensors;
        let out_bias_end = sensors_end + layout.n_outputs;

        let size_error = |_| EngineError::NetworkSize {
            expected,
            found: w.len(),
        };
        let sensor_weights =
            Array2::from_shape_vec((n_hidden, layout.n_sensors), w[n_hidden..sensors_end].to_vec())
                .map_err(size_error)?;
        let output_weights =
            Array2::from_shape_vec((n_hidden, layout.n_outputs), w[out_bias_end..].to_vec())
                .map_err(size_error)?;

        Ok(Self {
            hidden_biases: Array1::from_vec(w[..n_hidden].to_vec()),
            sensor_weights,
            output_biases: Array1::from_vec(w[sensors_end..out_bias_end].to_vec()),
            output_weights,
        })
    }

    pub fn n_hidden(&self) -> usize {
        self.hidden_biases.len()
    }

    /// Forward pass; outputs lie in (0, 1)
    pub fn forward(&self, inputs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(inputs.len(), self.sensor_weights.ncols());

        let x = ArrayView1::from(inputs);
        let mut hidden = self.sensor_weights.dot(&x) + &self.hidden_biases;
        hidden.mapv_inplace(sigmoid);

        let mut output = hidden.dot(&self.output_weights) + &self.output_biases;
        output.mapv_inplace(sigmoid);

        output.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::assemble;
    use crate::population::Chromosome;

    #[test]
    fn test_decode_rejects_wrong_length() {
        let layout = NeuronLayout::new(3, 2);
        let network = AssembledNetwork {
            n_hidden: 2,
            weights: vec![0.0; 10],
        };
        assert!(matches!(
            Controller::from_network(&network, layout),
            Err(EngineError::NetworkSize { expected: 14, found: 10 })
        ));
    }

    #[test]
    fn test_zero_network_outputs_half() {
        let layout = NeuronLayout::new(4, 3);
        let neuron = Chromosome::new(vec![0.0; layout.weights_per_neuron()]);
        let network = assemble(&[&neuron, &neuron], layout);
        let controller = Controller::from_network(&network, layout).unwrap();

        let out = controller.forward(&[0.3, -0.2, 1.0, 0.5]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&o| (o - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_forward_matches_manual() {
        let layout = NeuronLayout::new(2, 1);
        // bias, w_s0, w_s1, w_out
        let a = Chromosome::new(vec![0.1, 0.5, -0.5, 1.0]);
        let b = Chromosome::new(vec![-0.2, 1.0, 0.25, -2.0]);
        let controller = Controller::from_network(&assemble(&[&a, &b], layout), layout).unwrap();
        assert_eq!(controller.n_hidden(), 2);

        let inputs = [0.8, 0.4];
        let h0 = sigmoid(0.1 + 0.5 * 0.8 - 0.5 * 0.4);
        let h1 = sigmoid(-0.2 + 1.0 * 0.8 + 0.25 * 0.4);
        let expected = sigmoid(h0 * 1.0 + h1 * -2.0);

        let out = controller.forward(&inputs);
        assert!((out[0] - expected).abs() < 1e-12);
    }
}
