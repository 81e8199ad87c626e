//! Performance benchmarks for COEVOLVE

use coevolve::config::PopulationConfig;
use coevolve::evaluation::{BestSolutionTracker, Harness};
use coevolve::evolution::{breed_slot, mutate, CrossoverStrategy};
use coevolve::network::{assemble, Controller};
use coevolve::population::{Chromosome, NeuronLayout, PopulationShape};
use coevolve::{Config, Driver, PatternTask, Population, ScenarioMode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn benchmark_assemble(c: &mut Criterion) {
    let layout = NeuronLayout::new(20, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let neurons: Vec<Chromosome> = (0..10)
        .map(|_| Chromosome::random(&mut rng, layout.weights_per_neuron()))
        .collect();
    let refs: Vec<&Chromosome> = neurons.iter().collect();

    c.bench_function("assemble_10_hidden", |b| {
        b.iter(|| assemble(black_box(&refs), layout));
    });

    let network = assemble(&refs, layout);
    let controller = Controller::from_network(&network, layout).unwrap();
    let inputs = [0.5f64; 20];
    c.bench_function("controller_forward", |b| {
        b.iter(|| controller.forward(black_box(&inputs)));
    });
}

fn benchmark_reproduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("breed_slot");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for size in [20usize, 100, 500].iter() {
        let slot: Vec<Chromosome> = (0..*size).map(|_| Chromosome::random(&mut rng, 26)).collect();
        let fitness: Vec<f64> = (0..*size).map(|_| rng.gen_range(0.0..100.0)).collect();

        for strategy in [CrossoverStrategy::SinglePoint, CrossoverStrategy::Uniform] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), size),
                size,
                |b, _| {
                    b.iter(|| breed_slot(black_box(&slot), black_box(&fitness), strategy, &mut rng));
                },
            );
        }
    }

    group.finish();
}

fn benchmark_mutation(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut population = Population::initialize(&mut rng, PopulationShape::new(10, 20), 26);

    c.bench_function("mutate_200_neurons", |b| {
        b.iter(|| mutate(black_box(&mut population), 0.1, &mut rng).unwrap());
    });
}

fn benchmark_evaluation(c: &mut Criterion) {
    let config = Config::default();
    let layout = config.network.layout();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let population = Population::initialize(
        &mut rng,
        config.population.shape(),
        layout.weights_per_neuron(),
    );
    let harness = Harness::new(
        config.population.selection_policy(),
        layout,
        config.evolution.n_networks,
        ScenarioMode::Single,
    );
    let mut task = PatternTask::from_config(&config);

    c.bench_function("harness_evaluate_generation", |b| {
        b.iter(|| {
            let mut tracker = BestSolutionTracker::new(None);
            harness
                .evaluate(&population, &mut task, &mut tracker, 0, &mut rng)
                .unwrap()
        });
    });
}

fn benchmark_driver_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("driver_step");

    let variants = [
        (
            "sane",
            PopulationConfig::Sane {
                total_neurons: 100,
                neurons_per_network: 10,
            },
        ),
        (
            "esp",
            PopulationConfig::Esp {
                n_subpopulations: 10,
                neurons_per_subpopulation: 20,
            },
        ),
    ];

    for (name, population) in variants {
        let mut config = Config::default();
        config.population = population;
        config.run.generations = 1_000_000;
        let mut task = PatternTask::from_config(&config);
        let mut driver = Driver::new_with_seed(&config, 42).unwrap();

        group.bench_function(name, |b| {
            b.iter(|| driver.step(&mut task).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_assemble,
    benchmark_reproduction,
    benchmark_mutation,
    benchmark_evaluation,
    benchmark_driver_step,
);
criterion_main!(benches);
