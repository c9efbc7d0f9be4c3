use std::f64::consts::PI;

use rand::RngCore;

use crate::benchmark::Benchmark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlzVariant {
    Dtlz1,
    Dtlz2,
    Dtlz3,
    Dtlz4,
    Dtlz5,
    Dtlz6,
    Dtlz7,
}

impl DtlzVariant {
    fn name(self) -> &'static str {
        match self {
            DtlzVariant::Dtlz1 => "DTLZ1",
            DtlzVariant::Dtlz2 => "DTLZ2",
            DtlzVariant::Dtlz3 => "DTLZ3",
            DtlzVariant::Dtlz4 => "DTLZ4",
            DtlzVariant::Dtlz5 => "DTLZ5",
            DtlzVariant::Dtlz6 => "DTLZ6",
            DtlzVariant::Dtlz7 => "DTLZ7",
        }
    }
}

/// The DTLZ family, scalable in both objective count and dimensionality.
///
/// The decision vector splits into a position part `x[..m-1]` steering the
/// point along the front and a distance part `x[m-1..]` whose `g` function
/// measures the distance to it.
#[derive(Debug, Clone)]
pub struct Dtlz {
    variant: DtlzVariant,
    n_var: usize,
    n_obj: usize,
    evaluations: u64,
}

/// Multimodal Rastrigin-style distance function.
fn g1(x_m: &[f64]) -> f64 {
    let sum = x_m
        .iter()
        .map(|x_i| (x_i - 0.5).powi(2) - (20.0 * PI * (x_i - 0.5)).cos())
        .sum::<f64>();

    100.0 * (x_m.len() as f64 + sum)
}

/// Unimodal spherical distance function.
fn g2(x_m: &[f64]) -> f64 {
    x_m.iter().map(|x_i| (x_i - 0.5).powi(2)).sum()
}

fn g3(x_m: &[f64]) -> f64 {
    x_m.iter().map(|x_i| x_i.powf(0.1)).sum()
}

/// Maps a position vector onto the spherical front scaled by `1 + g`.
/// `alpha` biases the distribution of points along the front.
fn spherical_target(position: &[f64], g: f64, alpha: f64, f: &mut [f64]) {
    for i in 0..f.len() {
        let mut f_val = 1.0 + g;

        for x_i in &position[..position.len() - i] {
            f_val *= (x_i.powf(alpha) * PI / 2.0).cos();
        }

        if i > 0 {
            f_val *= (position[position.len() - i].powf(alpha) * PI / 2.0).sin();
        }

        f[i] = f_val;
    }
}

/// Linear counterpart of [`spherical_target`] used by DTLZ1.
fn linear_target(position: &[f64], g: f64, f: &mut [f64]) {
    for i in 0..f.len() {
        let mut f_val = 0.5 * (1.0 + g);

        for x_i in &position[..position.len() - i] {
            f_val *= x_i;
        }

        if i > 0 {
            f_val *= 1.0 - position[position.len() - i];
        }

        f[i] = f_val;
    }
}

/// Degenerate-curve reparameterization shared by DTLZ5 and DTLZ6.
fn curve_position(position: &[f64], g: f64) -> Vec<f64> {
    position
        .iter()
        .enumerate()
        .map(|(i, x_i)| {
            if i == 0 {
                *x_i
            } else {
                (1.0 + 2.0 * g * x_i) / (2.0 * (1.0 + g))
            }
        })
        .collect()
}

impl Dtlz {
    pub fn new(variant: DtlzVariant, n_var: usize) -> Self {
        Dtlz {
            variant,
            n_var,
            n_obj: 3,
            evaluations: 0,
        }
    }

    fn objectives(&self, x: &[f64]) -> Vec<f64> {
        let m = self.n_obj;
        let position = &x[..m - 1];
        let distance = &x[m - 1..];
        let mut f = vec![0.0; m];

        match self.variant {
            DtlzVariant::Dtlz1 => linear_target(position, g1(distance), &mut f),
            DtlzVariant::Dtlz2 => spherical_target(position, g2(distance), 1.0, &mut f),
            DtlzVariant::Dtlz3 => spherical_target(position, g1(distance), 1.0, &mut f),
            DtlzVariant::Dtlz4 => spherical_target(position, g2(distance), 100.0, &mut f),
            DtlzVariant::Dtlz5 => {
                let g = g2(distance);
                spherical_target(&curve_position(position, g), g, 1.0, &mut f);
            }
            DtlzVariant::Dtlz6 => {
                let g = g3(distance);
                spherical_target(&curve_position(position, g), g, 1.0, &mut f);
            }
            DtlzVariant::Dtlz7 => {
                let g = 1.0 + 9.0 * distance.iter().sum::<f64>() / distance.len() as f64;

                f[..m - 1].copy_from_slice(position);

                let h_sum = f[..m - 1]
                    .iter()
                    .map(|f_i| f_i / (1.0 + g) * (1.0 + (3.0 * PI * f_i).sin()))
                    .sum::<f64>();

                f[m - 1] = (m as f64 - h_sum) * (1.0 + g);
            }
        }

        f
    }
}

impl Benchmark for Dtlz {
    fn name(&self) -> &str {
        self.variant.name()
    }

    fn has_scalable_objectives(&self) -> bool {
        true
    }

    fn set_number_of_objectives(&mut self, n: usize) {
        self.n_obj = n;
    }

    fn number_of_objectives(&self) -> usize {
        self.n_obj
    }

    fn has_scalable_dimensionality(&self) -> bool {
        true
    }

    fn set_number_of_variables(&mut self, n: usize) {
        self.n_var = n;
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
        self.objectives(x)
    }

    fn lower_bound(&self, _i: usize) -> f64 {
        0.0
    }

    fn upper_bound(&self, _i: usize) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn objective_count_follows_scaling() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut problem = Dtlz::new(DtlzVariant::Dtlz2, 12);
        problem.set_number_of_objectives(5);
        problem.init(&mut rng);

        let x = problem.propose_starting_point(&mut rng);
        assert_eq!(problem.evaluate(&x).len(), 5);
    }

    #[test]
    fn dtlz2_front_points_lie_on_the_unit_sphere() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut problem = Dtlz::new(DtlzVariant::Dtlz2, 12);
        problem.init(&mut rng);

        // Distance part at 0.5 puts the point exactly on the front.
        let mut x = vec![0.5; 12];
        x[0] = 0.3;
        x[1] = 0.7;
        let f = problem.evaluate(&x);

        let norm: f64 = f.iter().map(|v| v * v).sum();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn dtlz1_front_sums_to_one_half() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut problem = Dtlz::new(DtlzVariant::Dtlz1, 7);
        problem.init(&mut rng);

        let mut x = vec![0.5; 7];
        x[0] = 0.2;
        x[1] = 0.9;
        let f = problem.evaluate(&x);

        assert_relative_eq!(f.iter().sum::<f64>(), 0.5, epsilon = 1e-10);
    }
}
