pub mod dtlz;
pub mod elli;
pub mod ihr;
pub mod rotation;
pub mod zdt;

use dyn_clone::DynClone;
use rand::{Rng, RngCore};

use crate::error::{ExperimentError, Result};
use dtlz::{Dtlz, DtlzVariant};
use elli::{Elli, ElliVariant};
use ihr::{Ihr, IhrVariant};
use zdt::{Zdt, ZdtVariant};

/// A benchmark objective function.
///
/// An instance is created fresh per trial, configured once through
/// [`configure`], and never reshaped afterwards. Every [`Benchmark::evaluate`]
/// call increments the instance's evaluation counter by one; the counter is
/// the time axis the checkpoint scheduler runs on.
pub trait Benchmark: DynClone + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Whether the objective count can be adjusted after construction.
    fn has_scalable_objectives(&self) -> bool {
        false
    }

    fn set_number_of_objectives(&mut self, _n: usize) {}

    fn number_of_objectives(&self) -> usize;

    /// Whether the variable count can be adjusted after construction.
    fn has_scalable_dimensionality(&self) -> bool {
        false
    }

    fn set_number_of_variables(&mut self, _n: usize) {}

    fn number_of_variables(&self) -> usize;

    /// Resets the evaluation counter and performs one-time initialization,
    /// e.g. drawing rotation matrices. Must be called before the first
    /// evaluation and may be called again to re-initialize.
    fn init(&mut self, rng: &mut dyn RngCore);

    fn evaluation_counter(&self) -> u64;

    /// A random point inside the benchmark's starting region.
    fn propose_starting_point(&self, rng: &mut dyn RngCore) -> Vec<f64> {
        (0..self.number_of_variables())
            .map(|i| rng.gen_range(self.lower_bound(i)..=self.upper_bound(i)))
            .collect()
    }

    /// Evaluates the objective vector at `x`, counting one evaluation.
    fn evaluate(&mut self, x: &[f64]) -> Vec<f64>;

    fn lower_bound(&self, i: usize) -> f64;

    fn upper_bound(&self, i: usize) -> f64;

    /// Whether the bounds delimit the feasible region. Unconstrained
    /// benchmarks report `false` and use the bounds only as the starting
    /// region.
    fn is_constrained(&self) -> bool {
        true
    }
}

dyn_clone::clone_trait_object!(Benchmark);

/// Tags for every benchmark the harness knows how to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkId {
    Zdt1,
    Zdt2,
    Zdt3,
    Zdt4,
    Zdt6,
    Ihr1,
    Ihr2,
    Ihr3,
    Ihr4,
    Ihr6,
    Elli1,
    Elli2,
    Cigtab1,
    Cigtab2,
    Dtlz1,
    Dtlz2,
    Dtlz3,
    Dtlz4,
    Dtlz5,
    Dtlz6,
    Dtlz7,
}

impl BenchmarkId {
    /// Constructs the tagged benchmark with `n_var` decision variables.
    /// Objective-scalable benchmarks start at their default objective count.
    pub fn instantiate(self, n_var: usize) -> Box<dyn Benchmark> {
        use BenchmarkId::*;
        match self {
            Zdt1 => Box::new(Zdt::new(ZdtVariant::Zdt1, n_var)),
            Zdt2 => Box::new(Zdt::new(ZdtVariant::Zdt2, n_var)),
            Zdt3 => Box::new(Zdt::new(ZdtVariant::Zdt3, n_var)),
            Zdt4 => Box::new(Zdt::new(ZdtVariant::Zdt4, n_var)),
            Zdt6 => Box::new(Zdt::new(ZdtVariant::Zdt6, n_var)),
            Ihr1 => Box::new(Ihr::new(IhrVariant::Ihr1, n_var)),
            Ihr2 => Box::new(Ihr::new(IhrVariant::Ihr2, n_var)),
            Ihr3 => Box::new(Ihr::new(IhrVariant::Ihr3, n_var)),
            Ihr4 => Box::new(Ihr::new(IhrVariant::Ihr4, n_var)),
            Ihr6 => Box::new(Ihr::new(IhrVariant::Ihr6, n_var)),
            Elli1 => Box::new(Elli::new(ElliVariant::Elli1, n_var)),
            Elli2 => Box::new(Elli::new(ElliVariant::Elli2, n_var)),
            Cigtab1 => Box::new(Elli::new(ElliVariant::Cigtab1, n_var)),
            Cigtab2 => Box::new(Elli::new(ElliVariant::Cigtab2, n_var)),
            Dtlz1 => Box::new(Dtlz::new(DtlzVariant::Dtlz1, n_var)),
            Dtlz2 => Box::new(Dtlz::new(DtlzVariant::Dtlz2, n_var)),
            Dtlz3 => Box::new(Dtlz::new(DtlzVariant::Dtlz3, n_var)),
            Dtlz4 => Box::new(Dtlz::new(DtlzVariant::Dtlz4, n_var)),
            Dtlz5 => Box::new(Dtlz::new(DtlzVariant::Dtlz5, n_var)),
            Dtlz6 => Box::new(Dtlz::new(DtlzVariant::Dtlz6, n_var)),
            Dtlz7 => Box::new(Dtlz::new(DtlzVariant::Dtlz7, n_var)),
        }
    }

    /// Default dimensionality when no caller-chosen count applies, e.g. in
    /// the landscape sampler before its first reconfiguration.
    pub fn default_variables(self) -> usize {
        use BenchmarkId::*;
        match self {
            Zdt1 | Zdt2 | Zdt3 | Zdt4 | Zdt6 => 30,
            Ihr1 | Ihr2 | Ihr3 | Ihr4 | Ihr6 => 10,
            Elli1 | Elli2 | Cigtab1 | Cigtab2 => 10,
            Dtlz1 | Dtlz2 | Dtlz3 | Dtlz4 | Dtlz5 | Dtlz6 | Dtlz7 => 30,
        }
    }
}

/// Shapes a fresh problem instance to the requested objective and variable
/// counts and initializes it.
///
/// The realized objective count is verified against the request; the
/// realized variable count is applied without a matching post-check.
pub fn configure(
    id: BenchmarkId,
    objective_count: usize,
    variable_count: usize,
    rng: &mut dyn RngCore,
) -> Result<Box<dyn Benchmark>> {
    let mut problem = id.instantiate(variable_count);

    if problem.has_scalable_objectives() {
        problem.set_number_of_objectives(objective_count);
    }
    if problem.number_of_objectives() != objective_count {
        return Err(ExperimentError::Configuration(format!(
            "could not set target value for number of objectives: {} provides {}, requested {}",
            problem.name(),
            problem.number_of_objectives(),
            objective_count
        )));
    }

    if problem.has_scalable_dimensionality() {
        problem.set_number_of_variables(variable_count);
    }

    problem.init(rng);

    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn configure_zdt1_with_supported_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let problem = configure(BenchmarkId::Zdt1, 2, 30, &mut rng).unwrap();

        assert_eq!(problem.name(), "ZDT1");
        assert_eq!(problem.number_of_objectives(), 2);
        assert_eq!(problem.number_of_variables(), 30);
        assert_eq!(problem.evaluation_counter(), 0);
    }

    #[test]
    fn configure_rejects_unsupported_objective_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = configure(BenchmarkId::Zdt1, 3, 30, &mut rng).unwrap_err();

        assert!(matches!(err, ExperimentError::Configuration(_)));
    }

    #[test]
    fn configure_scales_objectives_when_supported() {
        let mut rng = StdRng::seed_from_u64(7);
        let problem = configure(BenchmarkId::Dtlz2, 4, 12, &mut rng).unwrap();

        assert_eq!(problem.number_of_objectives(), 4);
        assert_eq!(problem.number_of_variables(), 12);
    }

    #[test]
    fn evaluation_counter_increments_per_call() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut problem = configure(BenchmarkId::Zdt1, 2, 5, &mut rng).unwrap();

        let point = problem.propose_starting_point(&mut rng);
        problem.evaluate(&point);
        problem.evaluate(&point);

        assert_eq!(problem.evaluation_counter(), 2);
    }

    #[test]
    fn starting_point_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let problem = configure(BenchmarkId::Zdt4, 2, 10, &mut rng).unwrap();

        let point = problem.propose_starting_point(&mut rng);
        assert!(point[0] >= 0.0 && point[0] <= 1.0);
        for (i, x_i) in point.iter().enumerate().skip(1) {
            assert!(*x_i >= problem.lower_bound(i) && *x_i <= problem.upper_bound(i));
        }
    }
}
