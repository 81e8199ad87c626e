//! Fitness evaluation of randomly assembled trial networks.

use super::credit::CreditAccumulator;
use super::evaluator::{scalar_fitness, Evaluator, ScenarioMode};
use super::tracker::BestSolutionTracker;
use crate::error::EngineError;
use crate::network::assemble;
use crate::population::{NeuronLayout, Population, SelectionPolicy};
use rand::Rng;

/// Result of one generation's evaluation phase
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Per-neuron credit, still in cumulative form
    pub credit: CreditAccumulator,
    /// Fitness of every trial network, in trial order
    pub network_fitness: Vec<f64>,
}

/// Samples trial networks, scores them and collects credit
#[derive(Clone, Debug)]
pub struct Harness {
    pub policy: SelectionPolicy,
    pub layout: NeuronLayout,
    /// Trial networks per generation
    pub n_networks: usize,
    pub mode: ScenarioMode,
}

impl Harness {
    pub fn new(
        policy: SelectionPolicy,
        layout: NeuronLayout,
        n_networks: usize,
        mode: ScenarioMode,
    ) -> Self {
        Self {
            policy,
            layout,
            n_networks,
            mode,
        }
    }

    /// Run every trial of one generation.
    ///
    /// The population is only read. Any evaluator failure aborts the phase.
    pub fn evaluate<E, R>(
        &self,
        population: &Population,
        evaluator: &mut E,
        tracker: &mut BestSolutionTracker,
        generation: usize,
        rng: &mut R,
    ) -> Result<Evaluation, EngineError>
    where
        E: Evaluator + ?Sized,
        R: Rng + ?Sized,
    {
        let shape = population.shape();
        let mut credit = CreditAccumulator::new(shape);
        let mut network_fitness = Vec::with_capacity(self.n_networks);

        for trial in 0..self.n_networks {
            let selection = self.policy.draw(shape, rng);
            credit.participate(&selection);

            let network = assemble(&population.get(&selection), self.layout);
            let outcome = evaluator.evaluate(&network, self.mode)?;
            let fitness = scalar_fitness(&*evaluator, outcome, self.mode)?;
            log::debug!("Trial {} fitness {:.4}", trial, fitness);

            network_fitness.push(fitness);
            tracker.offer(&network, fitness, generation)?;
            credit.credit(&selection, fitness);
        }

        Ok(Evaluation {
            credit,
            network_fitness,
        })
    }
}
