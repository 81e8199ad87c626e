//! Network-level evaluation and neuron-level credit.
//!
//! Fitness is only observable for whole networks, so every trial network's
//! score is shared out to the neurons that built it.

mod credit;
mod evaluator;
mod harness;
mod tracker;

pub use credit::{CreditAccumulator, NeuronFitness};
pub use evaluator::{
    mean_minus_std, scalar_fitness, scenario_values, Evaluator, EvaluatorError, Outcome,
    ScenarioMode,
};
pub use harness::{Evaluation, Harness};
pub use tracker::{BestSolution, BestSolutionTracker, SolutionError};
