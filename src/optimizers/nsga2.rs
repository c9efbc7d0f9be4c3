use std::cmp::Ordering;

use rand::{Rng, RngCore};

use crate::benchmark::Benchmark;
use crate::error::{ExperimentError, Result};
use crate::optimizers::{Candidate, MultiObjectiveOptimizer};
use crate::pareto;

/// Population size of the baseline; fixed because the variant exposes no
/// population-size capability.
pub const DEFAULT_POPULATION: usize = 100;

/// Distribution index of the simulated binary crossover.
const ETA_CROSSOVER: f64 = 20.0;
/// Distribution index of the polynomial mutation.
const ETA_MUTATION: f64 = 20.0;
/// Per-pair crossover probability.
const CROSSOVER_RATE: f64 = 0.9;

#[derive(Debug, Clone)]
struct Ranked {
    x: Vec<f64>,
    f: Vec<f64>,
    front: usize,
    crowding: f64,
}

/// NSGA-II baseline: elitist generational loop with binary tournament on
/// (front, crowding distance), simulated binary crossover and polynomial
/// mutation.
pub struct Nsga2 {
    population: Vec<Ranked>,
}

impl Nsga2 {
    pub fn init(problem: &mut dyn Benchmark, rng: &mut dyn RngCore) -> Result<Self> {
        let mut population = Vec::with_capacity(DEFAULT_POPULATION);
        for _ in 0..DEFAULT_POPULATION {
            let x = problem.propose_starting_point(rng);
            let f = problem.evaluate(&x);
            ensure_finite(&f)?;
            population.push(Ranked {
                x,
                f,
                front: 0,
                crowding: 0.0,
            });
        }

        let mut optimizer = Nsga2 { population };
        optimizer.rank_and_truncate(DEFAULT_POPULATION);
        Ok(optimizer)
    }

    /// Nondominated-sort the population, assign crowding distances, order by
    /// (front, crowding) and keep the best `size` members.
    fn rank_and_truncate(&mut self, size: usize) {
        let objectives: Vec<Vec<f64>> = self.population.iter().map(|c| c.f.clone()).collect();
        let fronts = pareto::nondominated_fronts(&objectives);

        for (front_index, front) in fronts.iter().enumerate() {
            let distances = pareto::crowding_distances(&objectives, front);
            for (&member, distance) in front.iter().zip(distances) {
                self.population[member].front = front_index;
                self.population[member].crowding = distance;
            }
        }

        self.population.sort_by(|a, b| {
            a.front.cmp(&b.front).then(
                b.crowding
                    .partial_cmp(&a.crowding)
                    .unwrap_or(Ordering::Equal),
            )
        });
        self.population.truncate(size);
    }

    fn tournament<'a>(&'a self, rng: &mut dyn RngCore) -> &'a Ranked {
        let a = &self.population[rng.gen_range(0..self.population.len())];
        let b = &self.population[rng.gen_range(0..self.population.len())];

        if a.front != b.front {
            if a.front < b.front {
                a
            } else {
                b
            }
        } else if a.crowding != b.crowding {
            if a.crowding > b.crowding {
                a
            } else {
                b
            }
        } else if rng.gen_range(0..2) == 0 {
            a
        } else {
            b
        }
    }
}

impl MultiObjectiveOptimizer for Nsga2 {
    fn label(&self) -> &str {
        "NSGAII"
    }

    fn step(&mut self, problem: &mut dyn Benchmark, rng: &mut dyn RngCore) -> Result<()> {
        let pop_size = self.population.len();
        let mut offspring = Vec::with_capacity(pop_size + 1);

        while offspring.len() < pop_size {
            let p1 = self.tournament(rng).x.clone();
            let p2 = self.tournament(rng).x.clone();

            let (mut c1, mut c2) = sbx_crossover(&p1, &p2, problem, rng);
            polynomial_mutation(&mut c1, problem, rng);
            polynomial_mutation(&mut c2, problem, rng);

            offspring.push(c1);
            offspring.push(c2);
        }
        offspring.truncate(pop_size);

        for x in offspring {
            let f = problem.evaluate(&x);
            ensure_finite(&f)?;
            self.population.push(Ranked {
                x,
                f,
                front: 0,
                crowding: 0.0,
            });
        }

        self.rank_and_truncate(pop_size);
        Ok(())
    }

    fn solution(&self) -> Vec<Candidate> {
        self.population
            .iter()
            .map(|c| Candidate {
                x: c.x.clone(),
                objectives: c.f.clone(),
            })
            .collect()
    }
}

fn ensure_finite(objectives: &[f64]) -> Result<()> {
    if objectives.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ExperimentError::Computation {
            optimizer: "NSGAII".into(),
            reason: format!("non-finite objective values {objectives:?}"),
        })
    }
}

fn clamp(x: f64, problem: &dyn Benchmark, i: usize) -> f64 {
    if problem.is_constrained() {
        x.clamp(problem.lower_bound(i), problem.upper_bound(i))
    } else {
        x
    }
}

/// Simulated binary crossover with distribution index [`ETA_CROSSOVER`].
fn sbx_crossover(
    p1: &[f64],
    p2: &[f64],
    problem: &dyn Benchmark,
    rng: &mut dyn RngCore,
) -> (Vec<f64>, Vec<f64>) {
    let mut c1 = p1.to_vec();
    let mut c2 = p2.to_vec();

    if rng.gen::<f64>() > CROSSOVER_RATE {
        return (c1, c2);
    }

    for i in 0..c1.len() {
        if rng.gen::<f64>() > 0.5 {
            continue;
        }

        let u: f64 = rng.gen();
        let beta = if u <= 0.5 {
            (2.0 * u).powf(1.0 / (ETA_CROSSOVER + 1.0))
        } else {
            (1.0 / (2.0 * (1.0 - u))).powf(1.0 / (ETA_CROSSOVER + 1.0))
        };

        let mean = 0.5 * (p1[i] + p2[i]);
        let spread = 0.5 * beta * (p2[i] - p1[i]);
        c1[i] = clamp(mean - spread, problem, i);
        c2[i] = clamp(mean + spread, problem, i);
    }

    (c1, c2)
}

/// Polynomial mutation with rate `1/n` and distribution index
/// [`ETA_MUTATION`]. The perturbation scales with the variable's range.
fn polynomial_mutation(x: &mut [f64], problem: &dyn Benchmark, rng: &mut dyn RngCore) {
    let rate = 1.0 / x.len() as f64;

    for i in 0..x.len() {
        if rng.gen::<f64>() > rate {
            continue;
        }

        let u: f64 = rng.gen();
        let delta = if u < 0.5 {
            (2.0 * u).powf(1.0 / (ETA_MUTATION + 1.0)) - 1.0
        } else {
            1.0 - (2.0 * (1.0 - u)).powf(1.0 / (ETA_MUTATION + 1.0))
        };

        let range = problem.upper_bound(i) - problem.lower_bound(i);
        x[i] = clamp(x[i] + delta * range, problem, i);
    }
}
