//! Generational driver - the main evolution loop.

use crate::config::Config;
use crate::error::EngineError;
use crate::evaluation::{BestSolutionTracker, Evaluator, Harness, NeuronFitness, ScenarioMode};
use crate::evolution::{mutate, reproduce, CrossoverStrategy};
use crate::population::Population;
use crate::stats::{FitnessLog, GenerationStats, RunSummary};
use chrono::Utc;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

/// Where the driver is within a generation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Evaluating,
    AssigningCredit,
    Reproducing,
    Mutating,
    Logging,
    /// All configured generations are done
    Terminal,
}

/// Runs the evaluate, credit, reproduce, mutate, log cycle
pub struct Driver {
    population: Population,
    harness: Harness,
    crossover: CrossoverStrategy,
    mutation_sigma: f64,
    generations: usize,

    tracker: BestSolutionTracker,
    log: Option<FitnessLog>,
    history: Vec<GenerationStats>,
    /// Print the generation summary to stdout instead of logging it
    progress: bool,

    phase: Phase,
    generation: usize,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Driver {
    /// Create a driver with a random seed
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        let seed = config.run.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(config, seed)
    }

    /// Create a driver with a specific seed for reproducibility
    pub fn new_with_seed(config: &Config, seed: u64) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        let shape = config.population.shape();
        let policy = config.population.selection_policy();
        policy.check(shape)?;

        let layout = config.network.layout();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let population = Population::initialize(&mut rng, shape, layout.weights_per_neuron());

        let harness = Harness::new(
            policy,
            layout,
            config.evolution.n_networks,
            ScenarioMode::from_flag(config.run.multi_scenario),
        );

        log::debug!(
            "Driver ready: {} slots x {} neurons, {} weights each, seed {}",
            shape.slots,
            shape.slot_len,
            layout.weights_per_neuron(),
            seed
        );

        Ok(Self {
            population,
            harness,
            crossover: config.crossover(),
            mutation_sigma: config.evolution.mutation_sigma,
            generations: config.run.generations,
            tracker: BestSolutionTracker::new(None),
            log: None,
            history: Vec::new(),
            progress: false,
            phase: Phase::Idle,
            generation: 0,
            rng,
            seed,
        })
    }

    /// Append per-generation lines to `path`, truncating it first
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, EngineError> {
        self.log = Some(FitnessLog::create(path)?);
        Ok(self)
    }

    /// Persist every new best network to `path`
    pub fn with_best_solution_file(mut self, path: PathBuf) -> Self {
        self.tracker = BestSolutionTracker::new(Some(path));
        self
    }

    /// Print every generation summary to stdout, whatever the log level
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generations completed so far
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn tracker(&self) -> &BestSolutionTracker {
        &self.tracker
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reports_progress(&self) -> bool {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Run one full generation.
    ///
    /// Returns `None` once every configured generation has run.
    pub fn step<E: Evaluator + ?Sized>(
        &mut self,
        evaluator: &mut E,
    ) -> Result<Option<GenerationStats>, EngineError> {
        if self.generation >= self.generations {
            self.phase = Phase::Terminal;
            return Ok(None);
        }
        let generation = self.generation;

        self.phase = Phase::Evaluating;
        let evaluation = self.harness.evaluate(
            &self.population,
            evaluator,
            &mut self.tracker,
            generation,
            &mut self.rng,
        )?;

        self.phase = Phase::AssigningCredit;
        let fitness: NeuronFitness = evaluation.credit.assign();

        self.phase = Phase::Reproducing;
        let current = std::mem::take(&mut self.population);
        self.population = reproduce(current, &fitness, self.crossover, &mut self.rng)?;

        self.phase = Phase::Mutating;
        mutate(&mut self.population, self.mutation_sigma, &mut self.rng)?;

        self.phase = Phase::Logging;
        let stats = GenerationStats::from_fitness(generation, &evaluation.network_fitness);
        if self.progress {
            println!("{}", stats.summary());
        } else {
            log::info!("{}", stats.summary());
        }
        if let Some(log) = self.log.as_mut() {
            log.append(&stats)?;
        }
        self.history.push(stats);

        self.generation += 1;
        self.phase = if self.generation >= self.generations {
            Phase::Terminal
        } else {
            Phase::Idle
        };
        Ok(Some(stats))
    }

    /// Run every remaining generation
    pub fn run<E: Evaluator + ?Sized>(&mut self, evaluator: &mut E) -> Result<RunSummary, EngineError> {
        let started_at = Utc::now();

        while self.step(evaluator)?.is_some() {}

        Ok(RunSummary {
            seed: self.seed,
            generations: self.generation,
            best_fitness: self.tracker.best().map(|b| b.fitness),
            history: self.history.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;
    use crate::evaluation::{EvaluatorError, Outcome};
    use crate::network::AssembledNetwork;

    /// Rewards large hidden biases
    struct BiasSum;

    impl Evaluator for BiasSum {
        fn evaluate(
            &mut self,
            network: &AssembledNetwork,
            _mode: ScenarioMode,
        ) -> Result<Outcome, EvaluatorError> {
            Ok(Outcome::Scalar(network.weights[..network.n_hidden].iter().sum()))
        }
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.population = PopulationConfig::Sane {
            total_neurons: 10,
            neurons_per_network: 3,
        };
        config.network.n_sensors = 3;
        config.network.n_outputs = 2;
        config.evolution.n_networks = 8;
        config.run.generations = 4;
        config
    }

    #[test]
    fn test_phases() {
        let mut driver = Driver::new_with_seed(&small_config(), 1).unwrap();
        assert_eq!(driver.phase(), Phase::Idle);

        for expected in 1..=4 {
            assert!(driver.step(&mut BiasSum).unwrap().is_some());
            assert_eq!(driver.generation(), expected);
        }
        assert_eq!(driver.phase(), Phase::Terminal);
        assert!(driver.step(&mut BiasSum).unwrap().is_none());
        assert!(driver.is_finished());
    }

    #[test]
    fn test_shape_invariant_across_generations() {
        let mut config = small_config();
        config.population = PopulationConfig::Esp {
            n_subpopulations: 3,
            neurons_per_subpopulation: 10,
        };
        let mut driver = Driver::new_with_seed(&config, 2).unwrap();
        let shape = driver.population().shape();

        while driver.step(&mut BiasSum).unwrap().is_some() {
            assert_eq!(driver.population().shape(), shape);
            assert_eq!(driver.population().len(), 30);
            assert!(driver.population().iter().all(|c| c.len() == 6));
        }
    }

    #[test]
    fn test_selection_pressure_improves_fitness() {
        let mut config = small_config();
        config.population = PopulationConfig::Sane {
            total_neurons: 40,
            neurons_per_network: 4,
        };
        config.evolution.n_networks = 60;
        config.evolution.mutation_sigma = 0.05;
        config.run.generations = 25;

        let mut driver = Driver::new_with_seed(&config, 3).unwrap();
        let summary = driver.run(&mut BiasSum).unwrap();

        let first = summary.history.first().unwrap().mean;
        let last = summary.history.last().unwrap().mean;
        assert!(last > first, "mean fitness {} -> {}", first, last);
        assert_eq!(summary.generations, 25);
        assert!(summary.best_fitness.is_some());
    }

    #[test]
    fn test_progress_output_still_steps() {
        let driver = Driver::new_with_seed(&small_config(), 4).unwrap();
        assert!(!driver.reports_progress());

        let mut driver = driver.with_progress(true);
        assert!(driver.reports_progress());
        let summary = driver.run(&mut BiasSum).unwrap();
        assert_eq!(summary.history.len(), 4);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = small_config();
        config.evolution.mutation_sigma = f64::INFINITY;
        assert!(matches!(
            Driver::new_with_seed(&config, 0),
            Err(EngineError::InvalidConfig(_))
        ));
    }
}
