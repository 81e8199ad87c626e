//! Built-in pattern task.
//!
//! A deterministic stand-in for an external simulation. Each scenario id
//! seeds a set of sensor patterns and a random linear threshold rule per
//! output; controllers score by how closely their outputs match the rule.

use crate::error::EngineError;
use crate::evaluation::{Evaluator, EvaluatorError, Outcome, ScenarioMode};
use crate::network::{AssembledNetwork, Controller};
use crate::population::NeuronLayout;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Sensor patterns and their target outputs for one scenario
#[derive(Clone, Debug)]
pub struct Scenario {
    pub id: u32,
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
}

impl Scenario {
    /// Generate a scenario deterministically from its id
    pub fn generate(id: u32, layout: NeuronLayout, cases: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(id));

        let rules: Vec<Vec<f64>> = (0..layout.n_outputs)
            .map(|_| (0..layout.n_sensors).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();

        let inputs: Vec<Vec<f64>> = (0..cases)
            .map(|_| (0..layout.n_sensors).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();

        let targets = inputs
            .iter()
            .map(|x| {
                rules
                    .iter()
                    .map(|rule| {
                        let projection: f64 = rule.iter().zip(x).map(|(r, v)| r * v).sum();
                        if projection > 0.0 {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            id,
            inputs,
            targets,
        }
    }

    /// Score in [0, 100]: 100 means every output matches its target exactly
    pub fn score(&self, controller: &Controller) -> f64 {
        let mut error = 0.0;
        let mut count = 0usize;
        for (x, target) in self.inputs.iter().zip(&self.targets) {
            let output = controller.forward(x);
            error += output
                .iter()
                .zip(target)
                .map(|(o, t)| (o - t).abs())
                .sum::<f64>();
            count += target.len();
        }
        if count == 0 {
            return 0.0;
        }
        100.0 * (1.0 - error / count as f64)
    }
}

/// Evaluator over a fixed list of generated scenarios
#[derive(Clone, Debug)]
pub struct PatternTask {
    layout: NeuronLayout,
    scenarios: Vec<Scenario>,
    evaluations: u64,
}

impl PatternTask {
    pub fn new(layout: NeuronLayout, scenario_ids: &[u32], cases: usize) -> Self {
        let scenarios = scenario_ids
            .iter()
            .map(|&id| Scenario::generate(id, layout, cases))
            .collect();

        Self {
            layout,
            scenarios,
            evaluations: 0,
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.network.layout(), &config.task.scenarios, config.task.cases)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Evaluation calls served so far
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Label such as `"123"` built from the scenario ids
    pub fn label(&self) -> String {
        self.scenarios.iter().map(|s| s.id.to_string()).collect()
    }
}

impl Evaluator for PatternTask {
    fn evaluate(
        &mut self,
        network: &AssembledNetwork,
        mode: ScenarioMode,
    ) -> Result<Outcome, EvaluatorError> {
        let controller = Controller::from_network(network, self.layout).map_err(|e| match e {
            EngineError::NetworkSize { expected, found } => EvaluatorError::Malformed(format!(
                "network has {} weights, layout needs {}",
                found, expected
            )),
            other => EvaluatorError::failed(other.to_string()),
        })?;
        self.evaluations += 1;

        match mode {
            ScenarioMode::Single => {
                let scenario = self.scenarios.first().ok_or_else(|| {
                    EvaluatorError::Malformed("pattern task has no scenarios".to_string())
                })?;
                Ok(Outcome::Scalar(scenario.score(&controller)))
            }
            ScenarioMode::Multiple => Ok(Outcome::Scenarios(
                self.scenarios
                    .par_iter()
                    .map(|s| s.score(&controller))
                    .collect(),
            )),
        }
    }
}
