//! Budget partitioning and the per-trial stepping/checkpointing loop.

use rand::RngCore;
use tracing::debug;

use crate::benchmark::Benchmark;
use crate::error::Result;
use crate::optimizers::MultiObjectiveOptimizer;

pub const CHECKPOINT_INTERVAL: u64 = 5_000;
pub const EVALUATION_BUDGET: u64 = 50_000;

/// Partition of an evaluation budget into fixed-size checkpoint intervals.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointSchedule {
    pub interval: u64,
    pub budget: u64,
}

impl CheckpointSchedule {
    pub fn new(interval: u64, budget: u64) -> Self {
        assert!(interval > 0, "checkpoint interval must be positive");
        assert!(
            budget >= interval,
            "budget must cover at least one interval"
        );
        CheckpointSchedule { interval, budget }
    }

    /// The boundary evaluation counts a trial checkpoints at, starting with
    /// 0 and ending at the first boundary covering the budget.
    pub fn boundaries(&self) -> impl Iterator<Item = u64> + '_ {
        let last = (self.budget + self.interval - 1) / self.interval;
        (0..=last).map(move |k| k * self.interval)
    }
}

impl Default for CheckpointSchedule {
    fn default() -> Self {
        CheckpointSchedule::new(CHECKPOINT_INTERVAL, EVALUATION_BUDGET)
    }
}

/// Descriptive metadata attached to one snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotMeta {
    pub benchmark: String,
    pub variables: usize,
    pub objectives: usize,
    pub optimizer: String,
    /// 1-based trial index.
    pub trial: usize,
    /// Boundary label: the exact interval multiple this checkpoint belongs
    /// to. Used in the destination filename.
    pub boundary: u64,
    /// The problem's live evaluation counter at write time; may exceed the
    /// boundary because a step consumes multiple evaluations.
    pub evaluations: u64,
}

/// Destination for checkpoint snapshots.
pub trait CheckpointSink {
    fn emit(&mut self, meta: &SnapshotMeta, rows: &[Vec<f64>]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stepping,
    Checkpointing,
    Done,
}

/// Runs one trial to completion: a snapshot at boundary 0 before any
/// stepping, then stepping until each successive boundary is reached and
/// snapshotted, ending immediately after the boundary covering the budget.
///
/// A failed step is fatal to the trial and propagates unretried.
pub fn run_trial(
    problem: &mut dyn Benchmark,
    optimizer: &mut dyn MultiObjectiveOptimizer,
    trial: usize,
    schedule: CheckpointSchedule,
    sink: &mut dyn CheckpointSink,
    rng: &mut dyn RngCore,
) -> Result<()> {
    debug!(
        benchmark = problem.name(),
        optimizer = optimizer.label(),
        trial,
        "starting trial"
    );

    emit(problem, optimizer, trial, 0, sink)?;

    let mut phase = Phase::Stepping;
    let mut next_boundary = schedule.interval;

    loop {
        match phase {
            Phase::Stepping => {
                if problem.evaluation_counter() >= next_boundary {
                    phase = Phase::Checkpointing;
                } else {
                    optimizer.step(problem, rng)?;
                }
            }
            Phase::Checkpointing => {
                emit(problem, optimizer, trial, next_boundary, sink)?;
                if next_boundary >= schedule.budget {
                    phase = Phase::Done;
                } else {
                    next_boundary += schedule.interval;
                    phase = Phase::Stepping;
                }
            }
            Phase::Done => return Ok(()),
        }
    }
}

fn emit(
    problem: &dyn Benchmark,
    optimizer: &dyn MultiObjectiveOptimizer,
    trial: usize,
    boundary: u64,
    sink: &mut dyn CheckpointSink,
) -> Result<()> {
    let meta = SnapshotMeta {
        benchmark: problem.name().to_string(),
        variables: problem.number_of_variables(),
        objectives: problem.number_of_objectives(),
        optimizer: optimizer.label().to_string(),
        trial,
        boundary,
        evaluations: problem.evaluation_counter(),
    };
    let rows: Vec<Vec<f64>> = optimizer
        .solution()
        .into_iter()
        .map(|candidate| candidate.objectives)
        .collect();

    sink.emit(&meta, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{configure, BenchmarkId};
    use crate::optimizers::{bind, NotionOfSuccess, OptimizerVariant};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct RecordingSink {
        boundaries: Vec<u64>,
        evaluations: Vec<u64>,
        row_counts: Vec<usize>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink {
                boundaries: Vec::new(),
                evaluations: Vec::new(),
                row_counts: Vec::new(),
            }
        }
    }

    impl CheckpointSink for RecordingSink {
        fn emit(&mut self, meta: &SnapshotMeta, rows: &[Vec<f64>]) -> Result<()> {
            self.boundaries.push(meta.boundary);
            self.evaluations.push(meta.evaluations);
            self.row_counts.push(rows.len());
            Ok(())
        }
    }

    #[test]
    fn default_schedule_has_eleven_boundaries() {
        let schedule = CheckpointSchedule::default();
        let boundaries: Vec<u64> = schedule.boundaries().collect();

        assert_eq!(boundaries.len(), 11);
        assert_eq!(boundaries[0], 0);
        assert_eq!(*boundaries.last().unwrap(), 50_000);
        assert!(boundaries.windows(2).all(|w| w[1] - w[0] == 5_000));
    }

    #[test]
    fn uneven_budget_rounds_the_last_boundary_up() {
        let schedule = CheckpointSchedule::new(100, 250);
        let boundaries: Vec<u64> = schedule.boundaries().collect();
        assert_eq!(boundaries, vec![0, 100, 200, 300]);
    }

    #[test]
    fn trial_checkpoints_every_boundary_exactly_once() {
        let mut rng = StdRng::seed_from_u64(51);
        let mut problem = configure(BenchmarkId::Zdt1, 2, 6, &mut rng).unwrap();
        let mut optimizer = bind(
            OptimizerVariant::SteadyStateMoCma,
            10,
            0.6,
            NotionOfSuccess::IndividualBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap();

        let schedule = CheckpointSchedule::new(50, 500);
        let mut sink = RecordingSink::new();
        run_trial(
            problem.as_mut(),
            optimizer.as_mut(),
            1,
            schedule,
            &mut sink,
            &mut rng,
        )
        .unwrap();

        let expected: Vec<u64> = schedule.boundaries().collect();
        assert_eq!(sink.boundaries, expected);
        assert_eq!(sink.boundaries.len(), 11);
        // Live counters never lag their boundary (except the initial
        // snapshot, whose counter includes the initial population).
        for (boundary, evaluations) in sink.boundaries.iter().zip(&sink.evaluations).skip(1) {
            assert!(evaluations >= boundary);
        }
        // No stepping after the final checkpoint.
        assert_eq!(
            *sink.evaluations.last().unwrap(),
            problem.evaluation_counter()
        );
    }

    #[test]
    fn variable_evaluations_per_step_still_hit_every_boundary() {
        let mut rng = StdRng::seed_from_u64(52);
        let mut problem = configure(BenchmarkId::Zdt1, 2, 6, &mut rng).unwrap();
        // The baseline consumes its whole population size per step.
        let mut optimizer = bind(
            OptimizerVariant::Nsga2,
            10,
            0.6,
            NotionOfSuccess::IndividualBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap();

        let schedule = CheckpointSchedule::new(150, 1_500);
        let mut sink = RecordingSink::new();
        run_trial(
            problem.as_mut(),
            optimizer.as_mut(),
            1,
            schedule,
            &mut sink,
            &mut rng,
        )
        .unwrap();

        let expected: Vec<u64> = schedule.boundaries().collect();
        assert_eq!(sink.boundaries, expected);
        assert!(sink.row_counts.iter().all(|&count| count == 100));
    }
}
