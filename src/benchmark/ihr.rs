use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1};
use rand::RngCore;

use crate::benchmark::rotation::random_rotation;
use crate::benchmark::Benchmark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IhrVariant {
    Ihr1,
    Ihr2,
    Ihr3,
    Ihr4,
    Ihr6,
}

impl IhrVariant {
    fn name(self) -> &'static str {
        match self {
            IhrVariant::Ihr1 => "IHR1",
            IhrVariant::Ihr2 => "IHR2",
            IhrVariant::Ihr3 => "IHR3",
            IhrVariant::Ihr4 => "IHR4",
            IhrVariant::Ihr6 => "IHR6",
        }
    }
}

/// Rotated counterparts of the ZDT benchmarks.
///
/// The decision vector passes through a random orthogonal rotation drawn at
/// `init`, so the objectives are no longer separable in the original
/// coordinates. The auxiliary maps `h`, `h_f` and `h_g` keep the rotated
/// variants well-defined outside the unrotated box.
#[derive(Debug, Clone)]
pub struct Ihr {
    variant: IhrVariant,
    n_var: usize,
    rotation: Array2<f64>,
    y_max: f64,
    evaluations: u64,
}

impl Ihr {
    pub fn new(variant: IhrVariant, n_var: usize) -> Self {
        Ihr {
            variant,
            n_var,
            rotation: Array2::eye(n_var),
            y_max: 1.0,
            evaluations: 0,
        }
    }

    fn h(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x / (self.n_var as f64).sqrt()).exp())
    }

    fn h_f(&self, x: f64, y_0: f64) -> f64 {
        if y_0.abs() <= self.y_max {
            x
        } else {
            1.0 + y_0.abs()
        }
    }

    fn h_g(x: f64) -> f64 {
        x * x / (x.abs() + 0.1)
    }

    fn objectives(&self, x: &[f64]) -> [f64; 2] {
        let y: Array1<f64> = self.rotation.dot(&ArrayView1::from(x));
        let n = y.len() as f64;
        let y_0 = y[0];
        let tail = || y.iter().skip(1).copied();

        match self.variant {
            IhrVariant::Ihr1 => {
                let f1 = y_0.abs();
                let g = 1.0 + 9.0 * tail().map(Self::h_g).sum::<f64>() / (n - 1.0);
                let f2 = g * self.h_f(1.0 - (self.h(y_0) / g).sqrt(), y_0);
                [f1, f2]
            }
            IhrVariant::Ihr2 => {
                let f1 = y_0.abs();
                let g = 1.0 + 9.0 * tail().map(Self::h_g).sum::<f64>() / (n - 1.0);
                let f2 = g * self.h_f(1.0 - (y_0 / g).powi(2), y_0);
                [f1, f2]
            }
            IhrVariant::Ihr3 => {
                let f1 = y_0.abs();
                let g = 1.0 + 9.0 * tail().map(Self::h_g).sum::<f64>() / (n - 1.0);
                let ratio = self.h(y_0) / g;
                let f2 = g * self.h_f(1.0 - ratio.sqrt() - ratio * (10.0 * PI * y_0).sin(), y_0);
                [f1, f2]
            }
            IhrVariant::Ihr4 => {
                let f1 = y_0.abs();
                let g = 1.0
                    + 10.0 * (n - 1.0)
                    + tail()
                        .map(|v| v * v - 10.0 * (4.0 * PI * v).cos())
                        .sum::<f64>();
                let f2 = g * self.h_f(1.0 - (self.h(y_0) / g).sqrt(), y_0);
                [f1, f2]
            }
            IhrVariant::Ihr6 => {
                let f1 = 1.0 - (-4.0 * y_0.abs()).exp() * (6.0 * PI * y_0).sin().powi(6);
                let g = 1.0 + 9.0 * (tail().map(Self::h_g).sum::<f64>() / (n - 1.0)).powf(0.25);
                let f2 = g * self.h_f(1.0 - (f1 / g).powi(2), y_0);
                [f1, f2]
            }
        }
    }
}

impl Benchmark for Ihr {
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
        self.rotation = Array2::eye(n);
        self.y_max = 1.0;
    }

    fn number_of_variables(&self) -> usize {
        self.n_var
    }

    fn init(&mut self, rng: &mut dyn RngCore) {
        self.rotation = random_rotation(self.n_var, rng);
        // The first rotated coordinate stays within [-y_max, y_max] for
        // feasible points; outside it h_f switches to the penalty branch.
        let row_max = self
            .rotation
            .row(0)
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        self.y_max = 1.0 / row_max;
        self.evaluations = 0;
    }

    fn evaluation_counter(&self) -> u64 {
        self.evaluations
    }

    fn evaluate(&mut self, x: &[f64]) -> Vec<f64> {
        self.evaluations += 1;
        self.objectives(x).to_vec()
    }

    fn lower_bound(&self, _i: usize) -> f64 {
        match self.variant {
            IhrVariant::Ihr4 | IhrVariant::Ihr6 => -5.0,
            _ => -1.0,
        }
    }

    fn upper_bound(&self, _i: usize) -> f64 {
        match self.variant {
            IhrVariant::Ihr4 | IhrVariant::Ihr6 => 5.0,
            _ => 1.0,
        }
    }
}
