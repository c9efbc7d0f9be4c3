pub mod mocma;
pub mod nsga2;

use rand::RngCore;

use crate::benchmark::Benchmark;
use crate::error::Result;
use mocma::MoCma;
use nsga2::Nsga2;

/// A candidate solution: decision vector plus objective values.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub x: Vec<f64>,
    pub objectives: Vec<f64>,
}

/// How step-size adaptation judges an offspring successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotionOfSuccess {
    /// Successful when the offspring improves on its own parent.
    IndividualBased,
    /// Successful when the offspring survives environmental selection.
    PopulationBased,
}

impl NotionOfSuccess {
    /// One-letter suffix used in optimizer display labels.
    pub fn suffix(self) -> &'static str {
        match self {
            NotionOfSuccess::IndividualBased => "I",
            NotionOfSuccess::PopulationBased => "P",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerVariant {
    /// (mu+1) MO-CMA-ES: one offspring per step.
    SteadyStateMoCma,
    /// (mu+mu) MO-CMA-ES: one offspring per parent per step.
    GenerationalMoCma,
    /// NSGA-II baseline without step-size or success-notion concepts.
    Nsga2,
}

impl OptimizerVariant {
    pub fn supports_notion_of_success(self) -> bool {
        !matches!(self, OptimizerVariant::Nsga2)
    }

    /// Whether `mu` and the initial step size apply to this variant.
    pub fn supports_step_size(self) -> bool {
        !matches!(self, OptimizerVariant::Nsga2)
    }
}

/// The five optimizer forms every sweep combination runs, in order. The
/// success mode paired with the baseline is carried for uniformity and
/// ignored by it.
pub fn sweep_variants() -> [(OptimizerVariant, NotionOfSuccess); 5] {
    [
        (
            OptimizerVariant::SteadyStateMoCma,
            NotionOfSuccess::IndividualBased,
        ),
        (
            OptimizerVariant::SteadyStateMoCma,
            NotionOfSuccess::PopulationBased,
        ),
        (
            OptimizerVariant::GenerationalMoCma,
            NotionOfSuccess::IndividualBased,
        ),
        (
            OptimizerVariant::GenerationalMoCma,
            NotionOfSuccess::PopulationBased,
        ),
        (OptimizerVariant::Nsga2, NotionOfSuccess::IndividualBased),
    ]
}

/// An optimizer bound to one problem instance for the duration of a trial.
pub trait MultiObjectiveOptimizer {
    /// Display label, e.g. `(100+1)-MO-CMA-ES-I`.
    fn label(&self) -> &str;

    /// Advances the search by one step against `problem`. A step consumes an
    /// implementation-defined number of evaluations, so callers must re-check
    /// the evaluation counter after every call.
    fn step(&mut self, problem: &mut dyn Benchmark, rng: &mut dyn RngCore) -> Result<()>;

    /// The current candidate set.
    fn solution(&self) -> Vec<Candidate>;
}

/// Binds an optimizer variant to an already-configured problem instance,
/// evaluating its initial population there.
///
/// `mu`, `initial_sigma` and `success` only apply to variants whose
/// capability flags expose them; the baseline ignores all three. A fresh
/// optimizer must be bound per trial; re-binding is not supported.
pub fn bind(
    variant: OptimizerVariant,
    mu: usize,
    initial_sigma: f64,
    success: NotionOfSuccess,
    reference_point: Option<&[f64]>,
    problem: &mut dyn Benchmark,
    rng: &mut dyn RngCore,
) -> Result<Box<dyn MultiObjectiveOptimizer>> {
    match variant {
        OptimizerVariant::SteadyStateMoCma => Ok(Box::new(MoCma::init(
            true,
            mu,
            initial_sigma,
            success,
            reference_point,
            problem,
            rng,
        )?)),
        OptimizerVariant::GenerationalMoCma => Ok(Box::new(MoCma::init(
            false,
            mu,
            initial_sigma,
            success,
            reference_point,
            problem,
            rng,
        )?)),
        OptimizerVariant::Nsga2 => Ok(Box::new(Nsga2::init(problem, rng)?)),
    }
}
