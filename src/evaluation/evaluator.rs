//! Capability interface for the external fitness provider.

use crate::network::AssembledNetwork;

/// Which scenarios an evaluation covers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScenarioMode {
    /// A single scenario yielding one fitness
    #[default]
    Single,
    /// Every configured scenario; outcomes are reduced to one fitness
    Multiple,
}

impl ScenarioMode {
    pub fn from_flag(multi_scenario: bool) -> Self {
        if multi_scenario {
            Self::Multiple
        } else {
            Self::Single
        }
    }
}

/// Raw result of one evaluation call
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Scalar(f64),
    Scenarios(Vec<f64>),
}

/// Something that can score a controller.
///
/// Implementations may be stateful simulation sessions; the engine never
/// issues two calls at once.
pub trait Evaluator {
    fn evaluate(
        &mut self,
        network: &AssembledNetwork,
        mode: ScenarioMode,
    ) -> Result<Outcome, EvaluatorError>;

    /// Collapse per-scenario outcomes into one fitness
    fn reduce(&self, outcomes: &[f64]) -> f64 {
        mean_minus_std(outcomes)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(
        &mut self,
        network: &AssembledNetwork,
        mode: ScenarioMode,
    ) -> Result<Outcome, EvaluatorError> {
        (**self).evaluate(network, mode)
    }

    fn reduce(&self, outcomes: &[f64]) -> f64 {
        (**self).reduce(outcomes)
    }
}

/// Mean minus population standard deviation.
///
/// Penalises controllers that only do well on some scenarios.
pub fn mean_minus_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    mean - var.sqrt()
}

/// Turn an outcome into the scalar fitness the engine works with
pub fn scalar_fitness<E: Evaluator + ?Sized>(
    evaluator: &E,
    outcome: Outcome,
    mode: ScenarioMode,
) -> Result<f64, EvaluatorError> {
    let fitness = match (outcome, mode) {
        (Outcome::Scalar(f), _) => f,
        (Outcome::Scenarios(values), _) if values.is_empty() => {
            return Err(EvaluatorError::Malformed(
                "evaluator returned no scenario outcomes".to_string(),
            ));
        }
        (Outcome::Scenarios(values), ScenarioMode::Multiple) => evaluator.reduce(&values),
        (Outcome::Scenarios(values), ScenarioMode::Single) => {
            if values.len() != 1 {
                return Err(EvaluatorError::Malformed(format!(
                    "expected one outcome in single-scenario mode, got {}",
                    values.len()
                )));
            }
            values[0]
        }
    };

    if !fitness.is_finite() {
        return Err(EvaluatorError::Malformed(format!(
            "non-finite fitness {}",
            fitness
        )));
    }
    Ok(fitness)
}

/// Raw per-scenario values of an outcome; a scalar counts as one scenario
pub fn scenario_values(outcome: Outcome) -> Result<Vec<f64>, EvaluatorError> {
    let values = match outcome {
        Outcome::Scalar(f) => vec![f],
        Outcome::Scenarios(values) => values,
    };
    if values.is_empty() {
        return Err(EvaluatorError::Malformed(
            "evaluator returned no scenario outcomes".to_string(),
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(EvaluatorError::Malformed(format!("non-finite fitness {}", bad)));
    }
    Ok(values)
}

/// Errors raised by or about the evaluator
#[derive(Debug)]
pub enum EvaluatorError {
    /// The evaluator returned something the engine cannot use
    Malformed(String),
    /// The evaluator itself failed
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl EvaluatorError {
    pub fn failed<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Failed(err.into())
    }
}

impl std::fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "Malformed outcome: {}", msg),
            Self::Failed(e) => write!(f, "Evaluation failed: {}", e),
        }
    }
}

impl std::error::Error for EvaluatorError {}
