use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

use crate::benchmark::Benchmark;
use crate::error::{ExperimentError, Result};
use crate::hypervolume;
use crate::optimizers::{Candidate, MultiObjectiveOptimizer, NotionOfSuccess};
use crate::pareto;

/// Constants of the per-individual success-rule strategy, derived once from
/// the problem dimensionality.
#[derive(Debug, Clone, Copy)]
struct StrategyParams {
    /// Step-size damping.
    damping: f64,
    /// Target smoothed success rate.
    target_success: f64,
    /// Smoothing factor for the success-rate average.
    success_smoothing: f64,
    /// Decay of the evolution path.
    path_decay: f64,
    /// Learning rate of the rank-one covariance update.
    cov_learning: f64,
    /// Success-rate threshold above which the path update is damped.
    path_threshold: f64,
}

impl StrategyParams {
    fn for_dimension(n: usize) -> Self {
        let n = n as f64;
        let target_success = 2.0 / 11.0;
        StrategyParams {
            damping: 1.0 + n / 2.0,
            target_success,
            success_smoothing: target_success / (2.0 + target_success),
            path_decay: 2.0 / (n + 2.0),
            cov_learning: 2.0 / (n * n + 6.0),
            path_threshold: 0.44,
        }
    }
}

/// One parent of the MO-CMA-ES population: the candidate itself plus its
/// private step size, smoothed success rate, evolution path and covariance
/// factorization.
#[derive(Debug, Clone)]
struct Individual {
    x: Vec<f64>,
    f: Vec<f64>,
    sigma: f64,
    success_rate: f64,
    path: Array1<f64>,
    cov: Array2<f64>,
    chol: Array2<f64>,
}

impl Individual {
    fn fresh(x: Vec<f64>, f: Vec<f64>, sigma: f64, target_success: f64) -> Self {
        let n = x.len();
        Individual {
            x,
            f,
            sigma,
            success_rate: target_success,
            path: Array1::zeros(n),
            cov: Array2::eye(n),
            chol: Array2::eye(n),
        }
    }

    fn candidate(&self) -> Candidate {
        Candidate {
            x: self.x.clone(),
            objectives: self.f.clone(),
        }
    }
}

/// MO-CMA-ES with hypervolume-based environmental selection.
///
/// Steady-state form samples one offspring from a random parent per step;
/// the generational form samples one offspring per parent. Every individual
/// adapts its own step size through the smoothed success rule and its own
/// covariance through a rank-one evolution-path update.
#[derive(Debug)]
pub struct MoCma {
    label: String,
    mu: usize,
    steady_state: bool,
    success_notion: NotionOfSuccess,
    reference: Option<Vec<f64>>,
    params: StrategyParams,
    population: Vec<Individual>,
}

impl MoCma {
    pub fn init(
        steady_state: bool,
        mu: usize,
        initial_sigma: f64,
        success_notion: NotionOfSuccess,
        reference_point: Option<&[f64]>,
        problem: &mut dyn Benchmark,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let label = if steady_state {
            format!("({}+1)-MO-CMA-ES-{}", mu, success_notion.suffix())
        } else {
            format!("({}+{})-MO-CMA-ES-{}", mu, mu, success_notion.suffix())
        };

        if mu == 0 {
            return Err(ExperimentError::Configuration(format!(
                "{label}: population size must be positive"
            )));
        }
        if !(initial_sigma.is_finite() && initial_sigma > 0.0) {
            return Err(ExperimentError::Configuration(format!(
                "{label}: initial step size must be positive, got {initial_sigma}"
            )));
        }

        let params = StrategyParams::for_dimension(problem.number_of_variables());
        let mut population = Vec::with_capacity(mu);
        for _ in 0..mu {
            let x = problem.propose_starting_point(rng);
            let f = problem.evaluate(&x);
            ensure_finite(&label, &f)?;
            population.push(Individual::fresh(x, f, initial_sigma, params.target_success));
        }

        Ok(MoCma {
            label,
            mu,
            steady_state,
            success_notion,
            reference: reference_point.map(<[f64]>::to_vec),
            params,
            population,
        })
    }

    /// Samples an offspring from `parent`, returning it together with the
    /// realized step normalized by the sampling-time step size.
    fn sample_offspring(
        &self,
        parent: &Individual,
        problem: &mut dyn Benchmark,
        rng: &mut dyn RngCore,
    ) -> Result<(Individual, Array1<f64>)> {
        let n = parent.x.len();
        let z = Array1::from_iter((0..n).map(|_| rng.sample::<f64, _>(StandardNormal)));
        let direction = parent.chol.dot(&z);

        let mut x = parent.x.clone();
        for i in 0..n {
            x[i] += parent.sigma * direction[i];
            if problem.is_constrained() {
                x[i] = x[i].clamp(problem.lower_bound(i), problem.upper_bound(i));
            }
        }

        let normalized_step =
            Array1::from_iter(x.iter().zip(&parent.x).map(|(c, p)| (c - p) / parent.sigma));

        let f = problem.evaluate(&x);
        ensure_finite(&self.label, &f)?;

        let mut child = parent.clone();
        child.x = x;
        child.f = f;
        Ok((child, normalized_step))
    }

    fn update_step_size(&self, individual: &mut Individual, success: bool) {
        let p = &self.params;
        let indicator = if success { 1.0 } else { 0.0 };
        individual.success_rate =
            (1.0 - p.success_smoothing) * individual.success_rate + p.success_smoothing * indicator;
        individual.sigma *= ((individual.success_rate - p.target_success)
            / (p.damping * (1.0 - p.target_success)))
            .exp();
    }

    fn update_covariance(
        &self,
        individual: &mut Individual,
        normalized_step: &Array1<f64>,
    ) -> Result<()> {
        let p = &self.params;
        let complement = (p.path_decay * (2.0 - p.path_decay)).sqrt();

        if individual.success_rate < p.path_threshold {
            individual.path = &individual.path * (1.0 - p.path_decay) + normalized_step * complement;
            let rank_one = outer(&individual.path);
            individual.cov = &individual.cov * (1.0 - p.cov_learning) + &rank_one * p.cov_learning;
        } else {
            individual.path = &individual.path * (1.0 - p.path_decay);
            let rank_one = outer(&individual.path);
            let inflation = &individual.cov * (p.path_decay * (2.0 - p.path_decay));
            individual.cov = &individual.cov * (1.0 - p.cov_learning)
                + (&rank_one + &inflation) * p.cov_learning;
        }

        individual.chol = cholesky(&individual.cov).ok_or_else(|| ExperimentError::Computation {
            optimizer: self.label.clone(),
            reason: "covariance matrix lost positive definiteness".into(),
        })?;

        if !(individual.sigma.is_finite() && individual.sigma > 0.0) {
            return Err(ExperimentError::Computation {
                optimizer: self.label.clone(),
                reason: format!("step size degenerated to {}", individual.sigma),
            });
        }

        Ok(())
    }

    /// Environmental selection of `mu` survivors from the extended
    /// population: fronts are kept whole while they fit; the overflowing
    /// front sheds its least hypervolume contributor until it does.
    fn survivors(&self, extended: &[Individual]) -> Vec<usize> {
        let objectives: Vec<Vec<f64>> = extended.iter().map(|ind| ind.f.clone()).collect();
        let fronts = pareto::nondominated_fronts(&objectives);

        let mut kept = Vec::with_capacity(self.mu);
        for front in fronts {
            if kept.len() + front.len() <= self.mu {
                kept.extend(front);
                if kept.len() == self.mu {
                    break;
                }
            } else {
                let mut front = front;
                while kept.len() + front.len() > self.mu {
                    let front_objectives: Vec<Vec<f64>> =
                        front.iter().map(|&i| objectives[i].clone()).collect();
                    let drop =
                        hypervolume::least_contributor(&front_objectives, self.reference.as_deref());
                    front.remove(drop);
                }
                kept.extend(front);
                break;
            }
        }
        kept
    }

    fn step_steady_state(
        &mut self,
        problem: &mut dyn Benchmark,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let parent_index = rng.gen_range(0..self.population.len());
        let (child, normalized_step) =
            self.sample_offspring(&self.population[parent_index], problem, rng)?;

        let improved_parent = pareto::dominates(&child.f, &self.population[parent_index].f);

        let mut extended = std::mem::take(&mut self.population);
        let child_index = extended.len();
        extended.push(child);

        let kept = self.survivors(&extended);
        let success = match self.success_notion {
            NotionOfSuccess::IndividualBased => improved_parent,
            NotionOfSuccess::PopulationBased => kept.contains(&child_index),
        };

        self.update_step_size(&mut extended[parent_index], success);
        let mut child = extended[child_index].clone();
        self.update_step_size(&mut child, success);
        if success {
            self.update_covariance(&mut child, &normalized_step)?;
        }
        extended[child_index] = child;

        self.population = kept.into_iter().map(|i| extended[i].clone()).collect();
        Ok(())
    }

    fn step_generational(
        &mut self,
        problem: &mut dyn Benchmark,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let mu = self.population.len();
        let mut extended = self.population.clone();
        let mut normalized_steps = Vec::with_capacity(mu);

        for parent_index in 0..mu {
            let (child, normalized_step) =
                self.sample_offspring(&self.population[parent_index], problem, rng)?;
            extended.push(child);
            normalized_steps.push(normalized_step);
        }

        let kept = self.survivors(&extended);

        for parent_index in 0..mu {
            let child_index = mu + parent_index;
            let improved_parent =
                pareto::dominates(&extended[child_index].f, &extended[parent_index].f);
            let success = match self.success_notion {
                NotionOfSuccess::IndividualBased => improved_parent,
                NotionOfSuccess::PopulationBased => kept.contains(&child_index),
            };

            let mut parent = extended[parent_index].clone();
            self.update_step_size(&mut parent, success);
            extended[parent_index] = parent;

            let mut child = extended[child_index].clone();
            self.update_step_size(&mut child, success);
            if success {
                self.update_covariance(&mut child, &normalized_steps[parent_index])?;
            }
            extended[child_index] = child;
        }

        self.population = kept.into_iter().map(|i| extended[i].clone()).collect();
        Ok(())
    }
}

impl MultiObjectiveOptimizer for MoCma {
    fn label(&self) -> &str {
        &self.label
    }

    fn step(&mut self, problem: &mut dyn Benchmark, rng: &mut dyn RngCore) -> Result<()> {
        if self.steady_state {
            self.step_steady_state(problem, rng)
        } else {
            self.step_generational(problem, rng)
        }
    }

    fn solution(&self) -> Vec<Candidate> {
        self.population.iter().map(Individual::candidate).collect()
    }
}

fn ensure_finite(label: &str, objectives: &[f64]) -> Result<()> {
    if objectives.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ExperimentError::Computation {
            optimizer: label.to_string(),
            reason: format!("non-finite objective values {objectives:?}"),
        })
    }
}

fn outer(v: &Array1<f64>) -> Array2<f64> {
    let n = v.len();
    Array2::from_shape_fn((n, n), |(i, j)| v[i] * v[j])
}

/// Lower-triangular Cholesky factor, or `None` when the matrix is not
/// positive definite.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l: Array2<f64> = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{configure, BenchmarkId};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_problem(rng: &mut StdRng) -> Box<dyn Benchmark> {
        configure(BenchmarkId::Zdt1, 2, 6, rng).unwrap()
    }

    #[test]
    fn steady_state_step_consumes_one_evaluation() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut problem = small_problem(&mut rng);
        let mut opt = MoCma::init(
            true,
            10,
            0.6,
            NotionOfSuccess::IndividualBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap();

        let before = problem.evaluation_counter();
        opt.step(problem.as_mut(), &mut rng).unwrap();
        assert_eq!(problem.evaluation_counter(), before + 1);
        assert_eq!(opt.solution().len(), 10);
    }

    #[test]
    fn generational_step_consumes_mu_evaluations() {
        let mut rng = StdRng::seed_from_u64(32);
        let mut problem = small_problem(&mut rng);
        let mut opt = MoCma::init(
            false,
            10,
            0.6,
            NotionOfSuccess::PopulationBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap();

        let before = problem.evaluation_counter();
        opt.step(problem.as_mut(), &mut rng).unwrap();
        assert_eq!(problem.evaluation_counter(), before + 10);
        assert_eq!(opt.solution().len(), 10);
    }

    #[test]
    fn population_size_is_preserved_across_steps() {
        let mut rng = StdRng::seed_from_u64(33);
        let mut problem = small_problem(&mut rng);
        let mut opt = MoCma::init(
            true,
            8,
            0.6,
            NotionOfSuccess::PopulationBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap();

        for _ in 0..50 {
            opt.step(problem.as_mut(), &mut rng).unwrap();
            assert_eq!(opt.solution().len(), 8);
        }
    }

    #[test]
    fn rejects_degenerate_configuration() {
        let mut rng = StdRng::seed_from_u64(34);
        let mut problem = small_problem(&mut rng);

        let err = MoCma::init(
            true,
            0,
            0.6,
            NotionOfSuccess::IndividualBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, ExperimentError::Configuration(_)));

        let err = MoCma::init(
            true,
            4,
            -1.0,
            NotionOfSuccess::IndividualBased,
            None,
            problem.as_mut(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, ExperimentError::Configuration(_)));
    }

    #[test]
    fn cholesky_roundtrip_on_identity() {
        let l = cholesky(&Array2::eye(4)).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(l[[i, j]], expected);
            }
        }
    }

    #[test]
    fn cholesky_rejects_indefinite_matrices() {
        let mut a = Array2::eye(3);
        a[[2, 2]] = -1.0;
        assert!(cholesky(&a).is_none());
    }
}
