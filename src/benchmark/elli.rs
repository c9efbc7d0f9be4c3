use ndarray::{Array1, Array2, ArrayView1};
use rand::RngCore;

use crate::benchmark::rotation::random_rotation;
use crate::benchmark::Benchmark;

/// Condition parameter shared by the whole family.
const CONDITION: f64 = 1.0e3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElliVariant {
    Elli1,
    Elli2,
    Cigtab1,
    Cigtab2,
}

impl ElliVariant {
    fn name(self) -> &'static str {
        match self {
            ElliVariant::Elli1 => "ELLI1",
            ElliVariant::Elli2 => "ELLI2",
            ElliVariant::Cigtab1 => "CIGTAB1",
            ElliVariant::Cigtab2 => "CIGTAB2",
        }
    }

    /// The `2` variants rotate each objective independently.
    fn two_rotations(self) -> bool {
        matches!(self, ElliVariant::Elli2 | ElliVariant::Cigtab2)
    }
}

/// Rotated ill-conditioned quadratics: ellipsoid and cigar-tablet pairs.
///
/// Both objectives of a pair share the same quadratic shape; the second is
/// shifted by 2 along every rotated coordinate. Unconstrained; the reported
/// bounds only delimit the starting region.
#[derive(Debug, Clone)]
pub struct Elli {
    variant: ElliVariant,
    n_var: usize,
    rotation_a: Array2<f64>,
    rotation_b: Array2<f64>,
    evaluations: u64,
}

impl Elli {
    pub fn new(variant: ElliVariant, n_var: usize) -> Self {
        Elli {
            variant,
            n_var,
            rotation_a: Array2::eye(n_var),
            rotation_b: Array2::eye(n_var),
            evaluations: 0,
        }
    }

    fn quadratic(&self, y: &Array1<f64>, shift: f64) -> f64 {
        let n = y.len();
        let denom = (n as f64) * CONDITION * CONDITION;
        let exponent_scale = 1.0 / (n as f64 - 1.0).max(1.0);

        let sum = match self.variant {
            ElliVariant::Elli1 | ElliVariant::Elli2 => y
                .iter()
                .enumerate()
                .map(|(i, y_i)| {
                    let weight = CONDITION.powf(2.0 * i as f64 * exponent_scale);
                    weight * (y_i - shift).powi(2)
                })
                .sum::<f64>(),
            ElliVariant::Cigtab1 | ElliVariant::Cigtab2 => y
                .iter()
                .enumerate()
                .map(|(i, y_i)| {
                    let weight = if i == 0 {
                        1.0
                    } else if i == n - 1 {
                        CONDITION * CONDITION
                    } else {
                        CONDITION
                    };
                    weight * (y_i - shift).powi(2)
                })
                .sum::<f64>(),
        };

        sum / denom
    }
}

impl Benchmark for Elli {
    fn name(&self) -> &str {
        self.variant.name()
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn has_scalable_dimensionality(&self) -> bool {
        true
    }

    fn set_number_of_variables(&mut self, n: usize) {
        self.n_var = n;
        self.rotation_a = Array2::eye(n);
        self.rotation_b = Array2::eye(n);
    }

    fn number_of_variables(&self) -> usize {
        self.n_var
    }

    fn init(&mut self, rng: &mut dyn RngCore) {
        self.rotation_a = random_rotation(self.n_var, rng);
        self.rotation_b = if self.variant.two_rotations() {
            random_rotation(self.n_var, rng)
        } else {
            self.rotation_a.clone()
        };
        self.evaluations = 0;
    }

    fn evaluation_counter(&self) -> u64 {
        self.evaluations
    }

    fn evaluate(&mut self, x: &[f64]) -> Vec<f64> {
        self.evaluations += 1;
        let x = ArrayView1::from(x);
        let y = self.rotation_a.dot(&x);
        let z = self.rotation_b.dot(&x);
        vec![self.quadratic(&y, 0.0), self.quadratic(&z, 2.0)]
    }

    fn lower_bound(&self, _i: usize) -> f64 {
        -10.0
    }

    fn upper_bound(&self, _i: usize) -> f64 {
        10.0
    }

    fn is_constrained(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_objective_vanishes_at_the_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        for variant in [ElliVariant::Elli1, ElliVariant::Cigtab1] {
            let mut problem = Elli::new(variant, 10);
            problem.init(&mut rng);
            let f = problem.evaluate(&vec![0.0; 10]);

            assert_abs_diff_eq!(f[0], 0.0, epsilon = 1e-12);
            assert!(f[1] > 0.0);
        }
    }

    #[test]
    fn single_rotation_variants_share_the_rotation() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut problem = Elli::new(ElliVariant::Elli1, 6);
        problem.init(&mut rng);
        assert_eq!(problem.rotation_a, problem.rotation_b);

        let mut problem = Elli::new(ElliVariant::Elli2, 6);
        problem.init(&mut rng);
        assert_ne!(problem.rotation_a, problem.rotation_b);
    }
}
