//! Experiment layout: several independent runs under one directory.
//!
//! ```text
//! <output_dir>/<ALG>_e<label>_gen<generations>/
//!     run1/<ALG>_e<label>.bin   best network
//!     run1/data_run_0.txt       mean/max per generation
//!     run1/summary.json
//!     run2/...
//!     gain.txt                  assessment of every run's best network
//! ```

use crate::config::Config;
use crate::driver::Driver;
use crate::error::EngineError;
use crate::evaluation::{
    scalar_fitness, scenario_values, BestSolution, Evaluator, Outcome, ScenarioMode,
};
use crate::stats::RunSummary;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths and run orchestration for one experiment
#[derive(Clone, Debug)]
pub struct Experiment {
    config: Config,
    /// Scenario label used in file names, e.g. `"123"`
    label: String,
    dir: PathBuf,
    /// Print per-generation summaries to stdout
    progress: bool,
}

/// Zero-based index of a 1-based run number
fn run_index(run: usize) -> Result<usize, EngineError> {
    run.checked_sub(1)
        .ok_or_else(|| EngineError::InvalidConfig("run numbers start at 1".to_string()))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

impl Experiment {
    pub fn new(config: Config, label: impl Into<String>) -> Self {
        let label = label.into();
        let name = format!(
            "{}_e{}_gen{}",
            config.population.algorithm(),
            label,
            config.run.generations
        );
        let dir = Path::new(&config.run.output_dir).join(name);

        Self {
            config,
            label,
            dir,
            progress: false,
        }
    }

    /// Print every generation summary to stdout, whatever the log level
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory of run `run` (1-based)
    pub fn run_dir(&self, run: usize) -> PathBuf {
        self.dir.join(format!("run{}", run))
    }

    pub fn solution_path(&self, run: usize) -> PathBuf {
        self.run_dir(run).join(format!(
            "{}_e{}.bin",
            self.config.population.algorithm(),
            self.label
        ))
    }

    pub fn log_path(&self, run: usize) -> Result<PathBuf, EngineError> {
        let index = run_index(run)?;
        Ok(self.run_dir(run).join(format!("data_run_{}.txt", index)))
    }

    pub fn summary_path(&self, run: usize) -> PathBuf {
        self.run_dir(run).join("summary.json")
    }

    /// Assessment output written by [`Experiment::assess`]
    pub fn gain_path(&self) -> PathBuf {
        self.dir.join("gain.txt")
    }

    /// Seed for run `run`, if the config fixes one
    pub fn run_seed(&self, run: usize) -> Result<Option<u64>, EngineError> {
        let index = run_index(run)?;
        Ok(self.config.run.seed.map(|seed| seed.wrapping_add(index as u64)))
    }

    /// Execute a single run with its own log and best-solution file
    pub fn run_one<E: Evaluator + ?Sized>(
        &self,
        run: usize,
        evaluator: &mut E,
    ) -> Result<RunSummary, EngineError> {
        let log_path = self.log_path(run)?;
        std::fs::create_dir_all(self.run_dir(run))?;

        let driver = match self.run_seed(run)? {
            Some(seed) => Driver::new_with_seed(&self.config, seed)?,
            None => Driver::new(&self.config)?,
        };
        let mut driver = driver
            .with_log_file(log_path)?
            .with_best_solution_file(self.solution_path(run))
            .with_progress(self.progress);

        log::info!("Starting run {} (seed {})", run, driver.seed());
        let summary = driver.run(evaluator)?;
        summary.save_json(self.summary_path(run))?;

        log::info!(
            "Run {} finished in {:.1}s, best fitness {}",
            run,
            summary.elapsed_secs(),
            summary
                .best_fitness
                .map_or_else(|| "none".to_string(), |f| format!("{:.4}", f))
        );
        Ok(summary)
    }

    /// Execute every configured run in order, sharing one evaluator
    pub fn run_all<E: Evaluator + ?Sized>(
        &self,
        evaluator: &mut E,
    ) -> Result<Vec<RunSummary>, EngineError> {
        log::info!("Logs will be saved at: {}", self.dir.display());
        (1..=self.config.run.runs)
            .map(|run| self.run_one(run, &mut *evaluator))
            .collect()
    }

    /// Score every run's best network on each scenario of `evaluator`.
    ///
    /// Stops at the first run without a solution file.
    pub fn assess<E: Evaluator + ?Sized>(&self, evaluator: &mut E) -> Result<Assessment, EngineError> {
        let mut solutions = Vec::new();

        for run in 1..=self.config.run.runs {
            let path = self.solution_path(run);
            if !path.exists() {
                log::warn!("Unable to find solution for run {} at {}", run, path.display());
                break;
            }

            let solution = BestSolution::load(&path)?;
            let outcome = evaluator.evaluate(&solution.network(), ScenarioMode::Multiple)?;
            let scenarios = scenario_values(outcome)?;
            let average = mean(&scenarios);
            log::info!("Run {}: average fitness {:.4} over {} scenarios", run, average, scenarios.len());

            solutions.push(SolutionAssessment {
                run,
                scenarios,
                average,
            });
        }

        Ok(Assessment { solutions })
    }
}

/// One best network scored on every scenario
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionAssessment {
    pub run: usize,
    pub scenarios: Vec<f64>,
    /// Plain mean of `scenarios`
    pub average: f64,
}

/// Scenario-by-scenario scores of an experiment's best networks
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assessment {
    pub solutions: Vec<SolutionAssessment>,
}

impl Assessment {
    pub fn averages(&self) -> Vec<f64> {
        self.solutions.iter().map(|s| s.average).collect()
    }

    /// Write per-run blocks and a closing line of averages, replacing `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for solution in &self.solutions {
            writeln!(out, "Gains for run: {}", solution.run)?;
            for value in &solution.scenarios {
                writeln!(out, "{}", value)?;
            }
        }

        let averages: Vec<String> = self.averages().iter().map(f64::to_string).collect();
        writeln!(out)?;
        writeln!(out, "Average gains of all runs: {}", averages.join(" "))?;
        out.flush()
    }
}

/// Result of replaying a saved solution
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplayReport {
    /// Fitness of every evaluation, as the engine sees it
    pub fitness: Vec<f64>,
    /// Per-scenario values of every evaluation; empty for scalar outcomes
    pub scenarios: Vec<Vec<f64>>,
}

impl ReplayReport {
    pub fn mean(&self) -> f64 {
        mean(&self.fitness)
    }

    /// Average of each scenario across evaluations
    pub fn scenario_means(&self) -> Vec<f64> {
        let width = self.scenarios.iter().map(Vec::len).min().unwrap_or(0);
        (0..width)
            .map(|i| {
                let column: Vec<f64> = self.scenarios.iter().map(|s| s[i]).collect();
                mean(&column)
            })
            .collect()
    }

    /// Write one line per evaluation, replacing `path`.
    ///
    /// Each line holds the fitness followed by any per-scenario values. An
    /// `AVERAGE:` line closes the file when there is more than one evaluation.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for (i, fitness) in self.fitness.iter().enumerate() {
            write!(out, "{}", fitness)?;
            for value in self.scenarios.get(i).into_iter().flatten() {
                write!(out, " {}", value)?;
            }
            writeln!(out)?;
        }
        if self.fitness.len() > 1 {
            writeln!(out, "AVERAGE: {}", self.mean())?;
        }
        out.flush()
    }
}

/// Evaluate a stored best solution `iterations` times
pub fn replay<E: Evaluator + ?Sized>(
    solution: &BestSolution,
    evaluator: &mut E,
    mode: ScenarioMode,
    iterations: usize,
) -> Result<ReplayReport, EngineError> {
    let network = solution.network();
    let mut report = ReplayReport {
        fitness: Vec::with_capacity(iterations),
        scenarios: Vec::with_capacity(iterations),
    };

    for game in 0..iterations {
        let outcome = evaluator.evaluate(&network, mode)?;
        let per_scenario = match &outcome {
            Outcome::Scenarios(values) => values.clone(),
            Outcome::Scalar(_) => Vec::new(),
        };
        let value = scalar_fitness(&*evaluator, outcome, mode)?;
        log::info!("Game {}: fitness {:.4}", game + 1, value);

        report.fitness.push(value);
        report.scenarios.push(per_scenario);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;
    use crate::evaluation::EvaluatorError;
    use crate::network::AssembledNetwork;

    /// Scores scenario `i` as `i + 1` plus the first weight
    struct Ladder(usize);

    impl Evaluator for Ladder {
        fn evaluate(
            &mut self,
            network: &AssembledNetwork,
            mode: ScenarioMode,
        ) -> Result<Outcome, EvaluatorError> {
            let base = network.weights.first().copied().unwrap_or(0.0);
            Ok(match mode {
                ScenarioMode::Single => Outcome::Scalar(base + 1.0),
                ScenarioMode::Multiple => {
                    Outcome::Scenarios((0..self.0).map(|i| base + i as f64 + 1.0).collect())
                }
            })
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("coevolve_exp_{}_{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn solution(first_weight: f64) -> BestSolution {
        let network = AssembledNetwork {
            n_hidden: 1,
            weights: vec![first_weight, 0.5, 0.25],
        };
        BestSolution::new(&network, 10.0, 3)
    }

    #[test]
    fn test_layout_names() {
        let mut config = Config::default();
        config.population = PopulationConfig::Esp {
            n_subpopulations: 4,
            neurons_per_subpopulation: 8,
        };
        config.run.generations = 12;
        config.run.output_dir = "out".to_string();

        let experiment = Experiment::new(config, "123");

        assert_eq!(experiment.dir(), Path::new("out/ESP_e123_gen12"));
        assert_eq!(experiment.run_dir(2), Path::new("out/ESP_e123_gen12/run2"));
        assert_eq!(
            experiment.solution_path(1),
            Path::new("out/ESP_e123_gen12/run1/ESP_e123.bin")
        );
        assert_eq!(
            experiment.log_path(3).unwrap(),
            Path::new("out/ESP_e123_gen12/run3/data_run_2.txt")
        );
        assert_eq!(experiment.gain_path(), Path::new("out/ESP_e123_gen12/gain.txt"));
    }

    #[test]
    fn test_run_seeds() {
        let mut config = Config::default();
        config.run.seed = Some(100);
        let experiment = Experiment::new(config.clone(), "1");
        assert_eq!(experiment.run_seed(1).unwrap(), Some(100));
        assert_eq!(experiment.run_seed(3).unwrap(), Some(102));

        config.run.seed = None;
        assert_eq!(Experiment::new(config, "1").run_seed(1).unwrap(), None);
    }

    #[test]
    fn test_run_zero_rejected() {
        let mut config = Config::default();
        config.run.seed = Some(5);
        let experiment = Experiment::new(config, "1");

        assert!(matches!(experiment.log_path(0), Err(EngineError::InvalidConfig(_))));
        assert!(matches!(experiment.run_seed(0), Err(EngineError::InvalidConfig(_))));
        assert!(matches!(
            experiment.run_one(0, &mut Ladder(1)),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_progress_flag() {
        let experiment = Experiment::new(Config::default(), "1");
        assert!(!experiment.progress);
        assert!(experiment.with_progress(true).progress);
    }

    #[test]
    fn test_replay_report_mean() {
        let report = ReplayReport {
            fitness: vec![10.0, 20.0, 60.0],
            scenarios: Vec::new(),
        };
        assert_eq!(report.mean(), 30.0);
        assert_eq!(ReplayReport::default().mean(), 0.0);
    }

    #[test]
    fn test_replay_keeps_scenarios() {
        let report = replay(&solution(1.0), &mut Ladder(3), ScenarioMode::Multiple, 2).unwrap();

        assert_eq!(report.scenarios, vec![vec![2.0, 3.0, 4.0]; 2]);
        assert_eq!(report.scenario_means(), vec![2.0, 3.0, 4.0]);
        // mean 3 minus population std sqrt(2/3)
        let expected = 3.0 - (2.0f64 / 3.0).sqrt();
        assert!(report.fitness.iter().all(|f| (f - expected).abs() < 1e-12));

        let single = replay(&solution(1.0), &mut Ladder(3), ScenarioMode::Single, 1).unwrap();
        assert_eq!(single.fitness, vec![2.0]);
        assert!(single.scenario_means().is_empty());
    }

    #[test]
    fn test_replay_report_file() {
        let dir = temp_dir("replay");
        let path = dir.join("gain.txt");
        std::fs::write(&path, "stale\nstale\nstale\nstale\n").unwrap();

        let report = ReplayReport {
            fitness: vec![1.5, 2.5],
            scenarios: vec![vec![1.0, 2.0], vec![2.0, 3.0]],
        };
        report.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1.5 1 2\n2.5 2 3\nAVERAGE: 2\n"
        );

        let one = ReplayReport {
            fitness: vec![4.0],
            scenarios: vec![Vec::new()],
        };
        one.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_assess_scores_every_run() {
        let dir = temp_dir("assess");
        let mut config = Config::default();
        config.run.runs = 3;
        config.run.output_dir = dir.to_string_lossy().to_string();
        let experiment = Experiment::new(config, "1");

        for run in 1..=3 {
            std::fs::create_dir_all(experiment.run_dir(run)).unwrap();
            solution(run as f64 * 10.0).save(experiment.solution_path(run)).unwrap();
        }

        let assessment = experiment.assess(&mut Ladder(4)).unwrap();
        assert_eq!(assessment.solutions.len(), 3);
        assert_eq!(assessment.solutions[0].scenarios, vec![11.0, 12.0, 13.0, 14.0]);
        assert_eq!(assessment.averages(), vec![12.5, 22.5, 32.5]);

        assessment.save(experiment.gain_path()).unwrap();
        let text = std::fs::read_to_string(experiment.gain_path()).unwrap();
        assert!(text.starts_with("Gains for run: 1\n11\n12\n13\n14\nGains for run: 2\n"));
        assert!(text.ends_with("Average gains of all runs: 12.5 22.5 32.5\n"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_assess_stops_at_missing_run() {
        let dir = temp_dir("assess_gap");
        let mut config = Config::default();
        config.run.runs = 3;
        config.run.output_dir = dir.to_string_lossy().to_string();
        let experiment = Experiment::new(config, "1");

        for run in [1, 3] {
            std::fs::create_dir_all(experiment.run_dir(run)).unwrap();
            solution(0.0).save(experiment.solution_path(run)).unwrap();
        }

        let assessment = experiment.assess(&mut Ladder(2)).unwrap();
        assert_eq!(assessment.solutions.len(), 1);
        assert_eq!(assessment.solutions[0].run, 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
