//! Fitness statistics: per generation, per run and across runs.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Summary of one generation's network fitness values
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Zero-based generation index
    pub generation: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl GenerationStats {
    pub fn from_fitness(generation: usize, fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                generation,
                ..Self::default()
            };
        }

        let min = fitness.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = fitness.iter().sum::<f64>() / fitness.len() as f64;

        Self {
            generation,
            min,
            mean,
            max,
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Generation {} done. min: {:.2}, max: {:.2}, avg: {:.2}",
            self.generation + 1,
            self.min,
            self.max,
            self.mean
        )
    }

    /// Line written to the run log
    pub fn log_line(&self) -> String {
        format!("{} {}", self.mean, self.max)
    }
}

/// Per-run text log: one `"<mean> <max>"` line per generation
#[derive(Debug)]
pub struct FitnessLog {
    path: PathBuf,
    file: File,
}

impl FitnessLog {
    /// Create the log, truncating any previous contents
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::create(&path)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn append(&mut self, stats: &GenerationStats) -> std::io::Result<()> {
        writeln!(self.file, "{}", stats.log_line())?;
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a run log back as `(mean, max)` pairs
    pub fn read<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<(f64, f64)>> {
        let reader = BufReader::new(File::open(path)?);
        let mut rows = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace().map(str::parse::<f64>);
            match (fields.next(), fields.next()) {
                (Some(Ok(mean)), Some(Ok(max))) => rows.push((mean, max)),
                _ => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("line {}: expected two numbers, got {:?}", number + 1, line),
                    ))
                }
            }
        }
        Ok(rows)
    }
}

/// Outcome of a complete run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub generations: usize,
    /// Best network fitness seen, if any beat the tracker threshold
    pub best_fitness: Option<f64>,
    pub history: Vec<GenerationStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Save summary to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load summary from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Mean and spread of the logged values for one generation across runs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub average_mean: f64,
    pub std_mean: f64,
    pub average_max: f64,
    pub std_max: f64,
}

/// Mean and population standard deviation
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Aggregated statistics over several run logs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrossRunStats {
    pub runs: usize,
    pub rows: Vec<AggregateRow>,
}

impl CrossRunStats {
    pub const HEADER: &'static str = "average_mean std_mean average_max std_max";

    /// Aggregate already-parsed runs; generations are cut to the shortest run
    pub fn from_runs(runs: &[Vec<(f64, f64)>]) -> Self {
        let generations = runs.iter().map(Vec::len).min().unwrap_or(0);
        let rows = (0..generations)
            .map(|g| {
                let means: Vec<f64> = runs.iter().map(|r| r[g].0).collect();
                let maxes: Vec<f64> = runs.iter().map(|r| r[g].1).collect();
                let (average_mean, std_mean) = mean_std(&means);
                let (average_max, std_max) = mean_std(&maxes);
                AggregateRow {
                    average_mean,
                    std_mean,
                    average_max,
                    std_max,
                }
            })
            .collect();

        Self {
            runs: runs.len(),
            rows,
        }
    }

    /// Find every `data_run_*.txt` in `dir` or its `run*/` folders.
    ///
    /// Other subdirectories are ignored.
    pub fn find_logs<P: AsRef<Path>>(dir: P) -> std::io::Result<Vec<PathBuf>> {
        let is_log = |p: &Path| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("data_run_") && n.ends_with(".txt"))
        };

        let is_run_dir = |p: &Path| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("run"))
        };

        let mut logs = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if is_run_dir(&path) {
                for inner in std::fs::read_dir(&path)? {
                    let inner = inner?.path();
                    if is_log(&inner) {
                        logs.push(inner);
                    }
                }
            } else if path.is_file() && is_log(&path) {
                logs.push(path);
            }
        }
        logs.sort();
        Ok(logs)
    }

    /// Read and aggregate every run log under `dir`
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let logs = Self::find_logs(dir)?;
        let runs = logs
            .par_iter()
            .map(FitnessLog::read)
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::from_runs(&runs))
    }

    /// Write the table with a header line
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut out = String::from(Self::HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!(
                "{} {} {} {}\n",
                row.average_mean, row.std_mean, row.average_max, row.std_max
            ));
        }
        std::fs::write(path, out)
    }
}
