use std::f64::consts::PI;

use rand::RngCore;

use crate::benchmark::Benchmark;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZdtVariant {
    Zdt1,
    Zdt2,
    Zdt3,
    Zdt4,
    Zdt6,
}

impl ZdtVariant {
    fn name(self) -> &'static str {
        match self {
            ZdtVariant::Zdt1 => "ZDT1",
            ZdtVariant::Zdt2 => "ZDT2",
            ZdtVariant::Zdt3 => "ZDT3",
            ZdtVariant::Zdt4 => "ZDT4",
            ZdtVariant::Zdt6 => "ZDT6",
        }
    }
}

/// The ZDT family of box-constrained two-objective benchmarks.
///
/// All variants share the structure `f1(x1)` plus `f2 = g(x2..xn) * h(f1, g)`
/// and differ in the distance function `g` and the front shape `h`.
#[derive(Debug, Clone)]
pub struct Zdt {
    variant: ZdtVariant,
    n_var: usize,
    evaluations: u64,
}

impl Zdt {
    pub fn new(variant: ZdtVariant, n_var: usize) -> Self {
        Zdt {
            variant,
            n_var,
            evaluations: 0,
        }
    }

    fn objectives(&self, x: &[f64]) -> [f64; 2] {
        let n = x.len() as f64;
        let tail = &x[1..];

        match self.variant {
            ZdtVariant::Zdt1 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * tail.iter().sum::<f64>() / (n - 1.0);
                [f1, g * (1.0 - (f1 / g).sqrt())]
            }
            ZdtVariant::Zdt2 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * tail.iter().sum::<f64>() / (n - 1.0);
                [f1, g * (1.0 - (f1 / g).powi(2))]
            }
            ZdtVariant::Zdt3 => {
                let f1 = x[0];
                let g = 1.0 + 9.0 * tail.iter().sum::<f64>() / (n - 1.0);
                let h = 1.0 - (f1 / g).sqrt() - f1 / g * (10.0 * PI * f1).sin();
                [f1, g * h]
            }
            ZdtVariant::Zdt4 => {
                let f1 = x[0];
                let g = 1.0
                    + 10.0 * (n - 1.0)
                    + tail
                        .iter()
                        .map(|x_i| x_i * x_i - 10.0 * (4.0 * PI * x_i).cos())
                        .sum::<f64>();
                [f1, g * (1.0 - (f1 / g).sqrt())]
            }
            ZdtVariant::Zdt6 => {
                let f1 = 1.0 - (-4.0 * x[0]).exp() * (6.0 * PI * x[0]).sin().powi(6);
                let g = 1.0 + 9.0 * (tail.iter().sum::<f64>() / (n - 1.0)).powf(0.25);
                [f1, g * (1.0 - (f1 / g).powi(2))]
            }
        }
    }
}

impl Benchmark for Zdt {
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
        self.objectives(x).to_vec()
    }

    fn lower_bound(&self, i: usize) -> f64 {
        match self.variant {
            ZdtVariant::Zdt4 if i > 0 => -5.0,
            _ => 0.0,
        }
    }

    fn upper_bound(&self, i: usize) -> f64 {
        match self.variant {
            ZdtVariant::Zdt4 if i > 0 => 5.0,
            _ => 1.0,
        }
    }
}
