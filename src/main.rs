//! COEVOLVE - CLI Entry Point
//!
//! Neuron-level cooperative coevolution experiments.

use clap::{Parser, Subcommand};
use coevolve::evaluation::BestSolution;
use coevolve::experiment::{replay, Experiment};
use coevolve::stats::CrossRunStats;
use coevolve::{benchmark, Config, PatternTask, ScenarioMode};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "coevolve")]
#[command(version)]
#[command(about = "Neuron-level cooperative coevolution (SANE and ESP)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an experiment of one or more independent runs
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Override the number of generations
        #[arg(short, long)]
        generations: Option<usize>,

        /// Override the number of runs
        #[arg(short, long)]
        runs: Option<usize>,

        /// Scenario ids, comma separated
        #[arg(long, value_delimiter = ',')]
        scenarios: Option<Vec<u32>>,

        /// Evaluate on every scenario and reduce to mean minus std
        #[arg(short, long)]
        multi: bool,

        /// Output root directory
        #[arg(short, long)]
        output: Option<String>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (no per-generation output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Re-evaluate a saved best network
    Replay {
        /// Best-solution file
        solution: PathBuf,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of evaluations
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Evaluate on every configured scenario
        #[arg(short, long)]
        multi: bool,

        /// Results file (defaults to gain.txt next to the solution)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score every run's best network of an experiment on each scenario
    Assess {
        /// Configuration file the experiment was run with (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Experiment label (defaults to the configured scenario ids)
        #[arg(short, long)]
        label: Option<String>,

        /// Scenario ids to assess on, comma separated
        #[arg(long, value_delimiter = ',')]
        scenarios: Option<Vec<u32>>,

        /// Results file (defaults to <experiment>/gain.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate run logs into mean/std per generation
    Stats {
        /// Experiment directory
        dir: PathBuf,

        /// Output file (defaults to <dir>/stats.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "20")]
        generations: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Show the contents of a best-solution file
    Inspect {
        /// Best-solution file
        solution: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            runs,
            scenarios,
            multi,
            output,
            seed,
            quiet,
        } => {
            let mut config = load_config(&config)?;
            if let Some(g) = generations {
                config.run.generations = g;
            }
            if let Some(r) = runs {
                config.run.runs = r;
            }
            if let Some(ids) = scenarios {
                config.task.scenarios = ids;
            }
            if multi {
                config.run.multi_scenario = true;
            }
            if let Some(dir) = output {
                config.run.output_dir = dir;
            }
            if seed.is_some() {
                config.run.seed = seed;
            }
            run_experiment(config, quiet)
        }

        Commands::Replay {
            solution,
            config,
            iterations,
            multi,
            output,
        } => replay_solution(solution, config, iterations, multi, output),

        Commands::Assess {
            config,
            label,
            scenarios,
            output,
        } => assess_experiment(config, label, scenarios, output),

        Commands::Stats { dir, output } => {
            init_logging("info");
            aggregate_stats(dir, output)
        }

        Commands::Benchmark { generations, seed } => {
            init_logging("warn");
            run_benchmark(generations, seed)
        }

        Commands::Init { output } => generate_config(output),

        Commands::Inspect { solution } => inspect_solution(solution),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    init_logging(&config.logging.log_level);
    Ok(config)
}

fn run_experiment(mut config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !config.run.multi_scenario && config.task.scenarios.len() > 1 {
        log::warn!(
            "Single-scenario mode: only scenario {} is used",
            config.task.scenarios[0]
        );
        config.task.scenarios.truncate(1);
    }
    config.validate()?;

    let mut task = PatternTask::from_config(&config);
    let experiment = Experiment::new(config.clone(), task.label()).with_progress(!quiet);

    println!("Starting {} experiment", config.population.algorithm());
    println!("  Scenarios: {:?}", config.task.scenarios);
    println!("  Generations: {}", config.run.generations);
    println!("  Runs: {}", config.run.runs);
    println!("  Output: {:?}", experiment.dir());
    println!();

    let start = Instant::now();
    let summaries = experiment.run_all(&mut task)?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Experiment Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Network evaluations: {}", task.evaluations());
    for (i, summary) in summaries.iter().enumerate() {
        let last = summary.history.last();
        println!(
            "Run {}: seed {}, final mean {:.2}, final max {:.2}, best {}",
            i + 1,
            summary.seed,
            last.map_or(0.0, |s| s.mean),
            last.map_or(0.0, |s| s.max),
            summary
                .best_fitness
                .map_or_else(|| "none".to_string(), |f| format!("{:.4}", f))
        );
    }

    if summaries.len() > 1 {
        let stats = CrossRunStats::from_dir(experiment.dir())?;
        let path = experiment.dir().join("stats.txt");
        stats.save(&path)?;
        println!("Cross-run stats: {:?}", path);
    }

    Ok(())
}

fn replay_solution(
    solution_path: PathBuf,
    config_path: PathBuf,
    iterations: usize,
    multi: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    println!("Loading solution: {:?}", solution_path);
    let solution = BestSolution::load(&solution_path)?;

    let mode = ScenarioMode::from_flag(multi || config.run.multi_scenario);
    let mut task = PatternTask::from_config(&config);
    let report = replay(&solution, &mut task, mode, iterations)?;

    println!();
    println!("=== Replay Complete ===");
    println!("Stored fitness: {:.4}", solution.fitness);
    println!("Evaluations: {}", report.fitness.len());
    println!("Mean fitness: {:.4}", report.mean());
    let scenario_means = report.scenario_means();
    for (id, value) in config.task.scenarios.iter().zip(&scenario_means) {
        println!("  Scenario {}: {:.4}", id, value);
    }

    let output = output.unwrap_or_else(|| {
        solution_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("gain.txt")
    });
    report.save(&output)?;
    println!("Results saved to: {:?}", output);

    Ok(())
}

fn assess_experiment(
    config_path: PathBuf,
    label: Option<String>,
    scenarios: Option<Vec<u32>>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    // Single-scenario runs are labelled by their first scenario only
    let label = label.unwrap_or_else(|| {
        let trained = if config.run.multi_scenario {
            &config.task.scenarios[..]
        } else {
            &config.task.scenarios[..config.task.scenarios.len().min(1)]
        };
        trained.iter().map(u32::to_string).collect()
    });
    let experiment = Experiment::new(config.clone(), label);

    let mut assess_config = config;
    if let Some(ids) = scenarios {
        assess_config.task.scenarios = ids;
    }
    assess_config.validate()?;
    let mut task = PatternTask::from_config(&assess_config);

    println!("Assessing {:?}", experiment.dir());
    println!("  Scenarios: {:?}", assess_config.task.scenarios);
    println!();

    let assessment = experiment.assess(&mut task)?;
    if assessment.solutions.is_empty() {
        return Err(format!("no best-solution files found under {:?}", experiment.dir()).into());
    }

    let output = output.unwrap_or_else(|| experiment.gain_path());
    assessment.save(&output)?;

    println!("=== Assessment Complete ===");
    for solution in &assessment.solutions {
        println!("Run {}: average {:.4}", solution.run, solution.average);
    }
    println!("Results saved to: {:?}", output);

    Ok(())
}

fn aggregate_stats(dir: PathBuf, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| dir.join("stats.txt"));

    let stats = CrossRunStats::from_dir(&dir)?;
    if stats.runs == 0 {
        return Err(format!("no data_run_*.txt logs found under {:?}", dir).into());
    }
    stats.save(&output)?;

    println!("Aggregated {} runs over {} generations", stats.runs, stats.rows.len());
    println!("Stats saved to: {:?}", output);
    Ok(())
}

fn run_benchmark(generations: usize, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== COEVOLVE Benchmark ===");
    println!("Generations: {}", generations);
    println!("Seed: {}", seed);
    println!();

    let result = benchmark(generations, seed)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn inspect_solution(solution_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Solution Analysis ===");
    println!("File: {:?}", solution_path);
    println!();

    let solution = BestSolution::load(&solution_path)?;

    println!("Format version: {}", solution.version);
    println!("Hidden units: {}", solution.n_hidden);
    println!("Weights: {}", solution.weights.len());
    println!("Fitness: {:.4}", solution.fitness);
    println!("Found in generation: {}", solution.generation + 1);

    if !solution.weights.is_empty() {
        let min = solution.weights.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = solution.weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = solution.weights.iter().sum::<f64>() / solution.weights.len() as f64;
        println!("Weight range: [{:.3}, {:.3}], mean {:.3}", min, max, mean);
    }

    Ok(())
}
