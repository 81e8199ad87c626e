//! Best-solution tracking and persistence.

use crate::network::AssembledNetwork;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// The best network seen during a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestSolution {
    /// Version for compatibility checking
    pub version: u32,
    /// Hidden units in the network
    pub n_hidden: usize,
    /// Assembled controller weights
    pub weights: Vec<f64>,
    pub fitness: f64,
    /// Generation the network was found in
    pub generation: usize,
}

impl BestSolution {
    /// Current file format version
    pub const VERSION: u32 = 1;

    const MAGIC: &'static [u8; 4] = b"COEV";

    pub fn new(network: &AssembledNetwork, fitness: f64, generation: usize) -> Self {
        Self {
            version: Self::VERSION,
            n_hidden: network.n_hidden,
            weights: network.weights.clone(),
            fitness,
            generation,
        }
    }

    pub fn network(&self) -> AssembledNetwork {
        AssembledNetwork {
            n_hidden: self.n_hidden,
            weights: self.weights.clone(),
        }
    }

    /// Save to a binary file, replacing any previous contents
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SolutionError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(Self::MAGIC)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        Ok(())
    }

    /// Load from a binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SolutionError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::MAGIC {
            return Err(SolutionError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let solution: BestSolution = bincode::deserialize(&buffer)?;

        if solution.version != Self::VERSION {
            return Err(SolutionError::VersionMismatch {
                expected: Self::VERSION,
                found: solution.version,
            });
        }

        Ok(solution)
    }
}

/// Errors from best-solution persistence
#[derive(Debug)]
pub enum SolutionError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for SolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SolutionError {}

impl From<std::io::Error> for SolutionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for SolutionError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Keeps the best network of a run and writes it out on every strict improvement
#[derive(Debug)]
pub struct BestSolutionTracker {
    best: Option<BestSolution>,
    best_fitness: f64,
    path: Option<PathBuf>,
    writes: usize,
}

impl BestSolutionTracker {
    /// Fitness a network has to beat before it is kept
    pub const INITIAL_THRESHOLD: f64 = 0.0;

    /// Tracker that persists to `path`, or only keeps the best in memory
    pub fn new(path: Option<PathBuf>) -> Self {
        Self::with_threshold(path, Self::INITIAL_THRESHOLD)
    }

    pub fn with_threshold(path: Option<PathBuf>, threshold: f64) -> Self {
        Self {
            best: None,
            best_fitness: threshold,
            path,
            writes: 0,
        }
    }

    /// Record `network` if `fitness` strictly beats the best so far.
    ///
    /// Returns whether the network became the new best.
    pub fn offer(
        &mut self,
        network: &AssembledNetwork,
        fitness: f64,
        generation: usize,
    ) -> Result<bool, SolutionError> {
        if fitness <= self.best_fitness {
            return Ok(false);
        }

        let solution = BestSolution::new(network, fitness, generation);
        if let Some(path) = &self.path {
            solution.save(path)?;
            self.writes += 1;
        }
        log::info!(
            "New best fitness {:.4} in generation {} ({} hidden units)",
            fitness,
            generation + 1,
            network.n_hidden
        );

        self.best_fitness = fitness;
        self.best = Some(solution);
        Ok(true)
    }

    pub fn best(&self) -> Option<&BestSolution> {
        self.best.as_ref()
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Number of durable writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
