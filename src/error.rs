//! Error types shared by the coevolution engine.

use crate::evaluation::{EvaluatorError, SolutionError};
use crate::population::PopulationShape;

/// Errors that abort a run.
///
/// Shape mismatches are logic defects rather than runtime conditions; the
/// driver never tries to recover from them.
#[derive(Debug)]
pub enum EngineError {
    /// Configuration rejected before any population was created
    InvalidConfig(String),
    /// Population shape changed across a generation
    ShapeMismatch {
        expected: PopulationShape,
        found: String,
    },
    /// Assembled weight vector does not match the controller layout
    NetworkSize { expected: usize, found: usize },
    /// The external evaluator failed or returned a malformed outcome
    Evaluator(EvaluatorError),
    /// Best-solution persistence failed
    Solution(SolutionError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::ShapeMismatch { expected, found } => write!(
                f,
                "Population shape mismatch: expected {}x{}, found {}",
                expected.slots, expected.slot_len, found
            ),
            Self::NetworkSize { expected, found } => write!(
                f,
                "Network size mismatch: expected {} weights, found {}",
                expected, found
            ),
            Self::Evaluator(e) => write!(f, "Evaluator error: {}", e),
            Self::Solution(e) => write!(f, "Best solution error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Evaluator(e) => Some(e),
            Self::Solution(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EvaluatorError> for EngineError {
    fn from(e: EvaluatorError) -> Self {
        Self::Evaluator(e)
    }
}

impl From<SolutionError> for EngineError {
    fn from(e: SolutionError) -> Self {
        Self::Solution(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
