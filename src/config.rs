//! Configuration for coevolution runs.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::evolution::CrossoverStrategy;
use crate::population::{NeuronLayout, PopulationShape, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationConfig,
    pub network: NetworkConfig,
    pub evolution: EvolutionConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub task: TaskConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Population layout. The variant decides how trial networks are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum PopulationConfig {
    /// One flat pool; networks sample neurons without replacement
    Sane {
        total_neurons: usize,
        neurons_per_network: usize,
    },
    /// One subpopulation per hidden unit; networks take one neuron from each
    Esp {
        n_subpopulations: usize,
        neurons_per_subpopulation: usize,
    },
}

/// Controller dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of sensor inputs
    pub n_sensors: usize,
    /// Number of controller outputs
    pub n_outputs: usize,
}

/// Reproduction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Trial networks assembled per generation
    pub n_networks: usize,
    /// Standard deviation of the Gaussian weight noise
    pub mutation_sigma: f64,
    /// Crossover policy; defaults depend on the population variant
    #[serde(default)]
    pub crossover: Option<CrossoverStrategy>,
}

/// Run control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Generations per run
    pub generations: usize,
    /// Independent runs per experiment
    pub runs: usize,
    /// Reduce per-scenario outcomes to one fitness
    pub multi_scenario: bool,
    /// Base seed; run `i` (1-based) uses `seed + i - 1`
    #[serde(default)]
    pub seed: Option<u64>,
    /// Root directory for experiment output
    pub output_dir: String,
}

/// Built-in pattern task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Scenario ids. Single-scenario mode only uses the first one.
    pub scenarios: Vec<u32>,
    /// Input cases per scenario
    pub cases: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// Errors from loading or saving configuration files
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML error: {}", e),
            Self::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            network: NetworkConfig::default(),
            evolution: EvolutionConfig::default(),
            run: RunConfig::default(),
            task: TaskConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self::Sane {
            total_neurons: 100,
            neurons_per_network: 10,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            n_sensors: 20,
            n_outputs: 5,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            n_networks: 50,
            mutation_sigma: 0.1,
            crossover: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: 30,
            runs: 1,
            multi_scenario: false,
            seed: None,
            output_dir: "optimizations".to_string(),
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            scenarios: vec![1],
            cases: 16,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl PopulationConfig {
    /// Short algorithm label used in experiment names
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Sane { .. } => "SANE",
            Self::Esp { .. } => "ESP",
        }
    }

    pub fn shape(&self) -> PopulationShape {
        match *self {
            Self::Sane { total_neurons, .. } => PopulationShape::new(1, total_neurons),
            Self::Esp {
                n_subpopulations,
                neurons_per_subpopulation,
            } => PopulationShape::new(n_subpopulations, neurons_per_subpopulation),
        }
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        match *self {
            Self::Sane {
                neurons_per_network,
                ..
            } => SelectionPolicy::WithoutReplacement {
                per_network: neurons_per_network,
            },
            Self::Esp { .. } => SelectionPolicy::OnePerSlot,
        }
    }

    /// Crossover used when the config leaves it unset
    pub fn default_crossover(&self) -> CrossoverStrategy {
        match self {
            Self::Sane { .. } => CrossoverStrategy::SinglePoint,
            Self::Esp { .. } => CrossoverStrategy::Uniform,
        }
    }
}

impl NetworkConfig {
    pub fn layout(&self) -> NeuronLayout {
        NeuronLayout::new(self.n_sensors, self.n_outputs)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Crossover policy in effect for this configuration
    pub fn crossover(&self) -> CrossoverStrategy {
        self.evolution
            .crossover
            .unwrap_or_else(|| self.population.default_crossover())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        match self.population {
            PopulationConfig::Sane {
                total_neurons,
                neurons_per_network,
            } => {
                if total_neurons < 4 {
                    return Err("total_neurons must be >= 4".to_string());
                }
                if neurons_per_network == 0 || neurons_per_network > total_neurons {
                    return Err("neurons_per_network must be between 1 and total_neurons".to_string());
                }
            }
            PopulationConfig::Esp {
                n_subpopulations,
                neurons_per_subpopulation,
            } => {
                if n_subpopulations == 0 {
                    return Err("n_subpopulations must be > 0".to_string());
                }
                if neurons_per_subpopulation < 4 {
                    return Err("neurons_per_subpopulation must be >= 4".to_string());
                }
            }
        }
        if self.network.n_sensors == 0 || self.network.n_outputs == 0 {
            return Err("network sensors/outputs must be > 0".to_string());
        }
        if self.evolution.n_networks == 0 {
            return Err("n_networks must be > 0".to_string());
        }
        if !self.evolution.mutation_sigma.is_finite() || self.evolution.mutation_sigma < 0.0 {
            return Err("mutation_sigma must be a finite value >= 0".to_string());
        }
        if self.run.generations == 0 {
            return Err("generations must be > 0".to_string());
        }
        if self.run.runs == 0 {
            return Err("runs must be > 0".to_string());
        }
        if self.task.scenarios.is_empty() {
            return Err("at least one task scenario is required".to_string());
        }
        if self.task.cases == 0 {
            return Err("task cases must be > 0".to_string());
        }
        Ok(())
    }
}
