use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::benchmark::{Benchmark, BenchmarkId};
use crate::checkpoint::{run_trial, CheckpointSchedule};
use crate::error::ExperimentError;
use crate::landscape::{reconfigure, sample_landscape, LandscapeConfig};
use crate::optimizers::{bind, NotionOfSuccess, OptimizerVariant};
use crate::snapshot::SnapshotWriter;
use crate::sweep::{run_combination, SweepConfig};
use crate::{benchmark, GLOBAL_SEED};

fn read_output_files(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap().to_string();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect()
}

fn run_small_combination(dir: &Path) {
    let mut rng = StdRng::seed_from_u64(GLOBAL_SEED);
    let mut writer = SnapshotWriter::new(dir, GLOBAL_SEED);
    let config = SweepConfig {
        mu: 6,
        trials: 2,
        reference_point: None,
        schedule: CheckpointSchedule::new(60, 300),
    };

    run_combination(
        BenchmarkId::Zdt1,
        2,
        5,
        0.6,
        &config,
        &mut writer,
        &mut rng,
    )
    .unwrap();
}

#[test]
fn sweep_output_is_reproducible_byte_for_byte() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();

    run_small_combination(first_dir.path());
    run_small_combination(second_dir.path());

    let first = read_output_files(first_dir.path());
    let second = read_output_files(second_dir.path());

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn combination_covers_all_five_optimizer_forms() {
    let dir = tempfile::tempdir().unwrap();
    run_small_combination(dir.path());

    let files = read_output_files(dir.path());
    for label in [
        "(6+1)-MO-CMA-ES-I",
        "(6+1)-MO-CMA-ES-P",
        "(6+6)-MO-CMA-ES-I",
        "(6+6)-MO-CMA-ES-P",
        "NSGAII",
    ] {
        // 2 trials x 6 checkpoints per optimizer form.
        let count = files
            .keys()
            .filter(|name| name.contains(&format!("_{}_", label)))
            .count();
        assert_eq!(count, 12, "missing snapshots for {label}");
    }
}

#[test]
fn full_trial_writes_eleven_increasing_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(GLOBAL_SEED);
    let mut writer = SnapshotWriter::new(dir.path(), GLOBAL_SEED);

    let mut problem = benchmark::configure(BenchmarkId::Zdt1, 2, 5, &mut rng).unwrap();
    let mut optimizer = bind(
        OptimizerVariant::SteadyStateMoCma,
        5,
        0.6,
        NotionOfSuccess::IndividualBased,
        None,
        problem.as_mut(),
        &mut rng,
    )
    .unwrap();

    let schedule = CheckpointSchedule::new(50, 500);
    run_trial(
        problem.as_mut(),
        optimizer.as_mut(),
        1,
        schedule,
        &mut writer,
        &mut rng,
    )
    .unwrap();

    let files = read_output_files(dir.path());
    assert_eq!(files.len(), 11);

    let mut boundaries: Vec<u64> = files
        .keys()
        .map(|name| {
            let stem = name.strip_suffix(".fitness.csv").unwrap();
            stem.rsplit('_').next().unwrap().parse().unwrap()
        })
        .collect();
    boundaries.sort_unstable();

    let expected: Vec<u64> = schedule.boundaries().collect();
    assert_eq!(boundaries, expected);
    assert!(boundaries.windows(2).all(|w| w[0] < w[1]));

    for content in files.values() {
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[..7].iter().all(|line| line.starts_with("# ")));
        assert!(lines.contains(&"# Function: ZDT1: 5 -> 2"));

        let rows = &lines[7..];
        assert_eq!(rows.len(), 5);
        for row in rows {
            assert_eq!(row.split(',').count(), 2);
            for field in row.split(',') {
                assert!(field.parse::<f64>().unwrap().is_finite());
            }
        }
    }
}

#[test]
fn landscape_rows_share_one_fixed_width() {
    let dir = tempfile::tempdir().unwrap();
    let config = LandscapeConfig::default();
    let path = sample_landscape(BenchmarkId::Dtlz2, &config, 777, Some("inspection"), dir.path())
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "DTLZ2.csv");
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    let headers: Vec<&&str> = lines.iter().filter(|l| l.starts_with("# ")).collect();
    assert_eq!(headers.len(), 3);
    assert!(headers[1].starts_with("# Global seed: 777"));
    assert_eq!(*headers[2], "# Note: inspection");

    let rows: Vec<&&str> = lines.iter().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(rows.len(), config.samples);

    // DTLZ is scalable in both directions, so every row is padded out to
    // 4 offsets + 10 variables + 4 objectives.
    let width = 4 + config.max_variables + config.max_objectives;
    for row in &rows {
        assert_eq!(row.split(',').count(), width);
    }
}

#[test]
fn landscape_pads_unused_slots_with_zeros() {
    let dir = tempfile::tempdir().unwrap();
    let config = LandscapeConfig::default();
    let path = sample_landscape(BenchmarkId::Dtlz2, &config, 4242, None, dir.path()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    for row in content.lines().filter(|l| !l.starts_with('#')) {
        let fields: Vec<f64> = row.split(',').map(|f| f.parse().unwrap()).collect();
        let offsets: Vec<usize> = fields[..4].iter().map(|f| *f as usize).collect();

        assert_eq!(offsets[0], 4);
        assert!(offsets[1] >= offsets[0] && offsets[1] <= offsets[2]);
        assert_eq!(offsets[2], 4 + config.max_variables);

        // Unused decision-vector slots.
        for field in &fields[offsets[1]..offsets[2]] {
            assert_eq!(*field, 0.0);
        }
        // Unused objective-vector slots.
        for field in &fields[offsets[3]..] {
            assert_eq!(*field, 0.0);
        }
    }
}

#[test]
fn landscape_freezes_the_configuration_after_the_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let config = LandscapeConfig::default();
    let path = sample_landscape(BenchmarkId::Dtlz2, &config, 90125, None, dir.path()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let offsets: Vec<Vec<&str>> = content
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(|row| row.split(',').take(4).collect())
        .collect();

    let frozen = &offsets[config.reconfigure_prefix - 1];
    for row in &offsets[config.reconfigure_prefix..] {
        assert_eq!(row, frozen);
    }
}

#[test]
fn landscape_respects_fixed_objective_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = LandscapeConfig::default();
    let path = sample_landscape(BenchmarkId::Zdt1, &config, 31337, None, dir.path()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    // ZDT1 objectives are fixed at 2, so rows are narrower than for an
    // objective-scalable benchmark.
    let width = 4 + config.max_variables + 2;
    for row in content.lines().filter(|l| !l.starts_with('#')) {
        assert_eq!(row.split(',').count(), width);
    }
}

/// Dimension-scalable benchmark whose realized variable count clamps below
/// its fixed objective count, making the sampler's restriction
/// unsatisfiable.
#[derive(Debug, Clone)]
struct ClampedBenchmark {
    n_var: usize,
    evaluations: u64,
}

impl Benchmark for ClampedBenchmark {
    fn name(&self) -> &str {
        "CLAMPED"
    }

    fn number_of_objectives(&self) -> usize {
        4
    }

    fn has_scalable_dimensionality(&self) -> bool {
        true
    }

    fn set_number_of_variables(&mut self, n: usize) {
        self.n_var = n.min(3);
    }

    fn number_of_variables(&self) -> usize {
        self.n_var
    }

    fn init(&mut self, _rng: &mut dyn RngCore) {
        self.evaluations = 0;
    }

    fn evaluation_counter(&self) -> u64 {
        self.evaluations
    }

    fn evaluate(&mut self, x: &[f64]) -> Vec<f64> {
        self.evaluations += 1;
        vec![x.iter().sum(); 4]
    }

    fn lower_bound(&self, _i: usize) -> f64 {
        0.0
    }

    fn upper_bound(&self, _i: usize) -> f64 {
        1.0
    }
}

#[test]
fn unsatisfiable_rejection_loop_fails_instead_of_spinning() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut problem = ClampedBenchmark {
        n_var: 3,
        evaluations: 0,
    };

    let err = reconfigure(&mut problem, &LandscapeConfig::default(), &mut rng).unwrap_err();
    assert!(matches!(err, ExperimentError::Configuration(_)));
}
