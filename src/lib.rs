//! # COEVOLVE
//!
//! Neuron-level cooperative coevolution of feed-forward controllers.
//!
//! ## Features
//!
//! - **Two variants**: SANE (one flat neuron pool) and ESP (one subpopulation
//!   per hidden unit) behind one population store
//! - **Pluggable fitness**: anything implementing [`Evaluator`] can score networks
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//! - **Persistent**: best networks saved as they are found, per-generation logs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coevolve::{Config, Driver, PatternTask};
//!
//! let config = Config::default();
//! let mut task = PatternTask::from_config(&config);
//!
//! let mut driver = Driver::new_with_seed(&config, 42).unwrap();
//! let summary = driver.run(&mut task).unwrap();
//!
//! println!("Generations: {}", summary.generations);
//! println!("Best fitness: {:?}", summary.best_fitness);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use coevolve::config::PopulationConfig;
//! use coevolve::Config;
//!
//! let mut config = Config::default();
//! config.population = PopulationConfig::Esp {
//!     n_subpopulations: 10,
//!     neurons_per_subpopulation: 20,
//! };
//! config.evolution.mutation_sigma = 0.2;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Experiments
//!
//! ```rust,no_run
//! use coevolve::experiment::Experiment;
//! use coevolve::{Config, PatternTask};
//!
//! let config = Config::default();
//! let mut task = PatternTask::from_config(&config);
//!
//! // optimizations/SANE_e1_gen30/run1/...
//! let experiment = Experiment::new(config, task.label());
//! let summaries = experiment.run_all(&mut task).unwrap();
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod experiment;
pub mod network;
pub mod population;
pub mod stats;
pub mod task;

// Re-export main types
pub use config::Config;
pub use driver::Driver;
pub use error::EngineError;
pub use evaluation::{Evaluator, Outcome, ScenarioMode};
pub use population::Population;
pub use task::PatternTask;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark on the built-in pattern task
pub fn benchmark(generations: usize, seed: u64) -> Result<BenchmarkResult, EngineError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.run.generations = generations;
    let mut task = PatternTask::from_config(&config);
    let mut driver = Driver::new_with_seed(&config, seed)?;

    let start = Instant::now();
    let summary = driver.run(&mut task)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        generations,
        neurons: driver.population().len(),
        evaluations: task.evaluations(),
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: generations as f64 / elapsed.as_secs_f64(),
        best_fitness: summary.best_fitness,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: usize,
    pub neurons: usize,
    pub evaluations: u64,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub best_fitness: Option<f64>,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Neurons: {}", self.neurons)?;
        writeln!(f, "Network evaluations: {}", self.evaluations)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} generations/s", self.generations_per_second)?;
        match self.best_fitness {
            Some(best) => writeln!(f, "Best fitness: {:.4}", best)?,
            None => writeln!(f, "Best fitness: none")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_run() {
        let mut config = Config::default();
        config.run.generations = 3;
        let mut task = PatternTask::from_config(&config);

        let mut driver = Driver::new_with_seed(&config, 7).unwrap();
        let summary = driver.run(&mut task).unwrap();

        assert_eq!(summary.generations, 3);
        assert_eq!(summary.history.len(), 3);
        assert_eq!(task.evaluations(), 3 * config.evolution.n_networks as u64);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(2, 1).unwrap();

        assert_eq!(result.generations, 2);
        assert_eq!(result.neurons, 100);
        assert_eq!(result.evaluations, 100);
        assert!(result.generations_per_second > 0.0);
        assert!(result.to_string().contains("Generations: 2"));
    }
}
