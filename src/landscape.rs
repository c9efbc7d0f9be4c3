//! Fixed-width landscape sampling of randomly configured benchmark
//! instances.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::info;

use crate::benchmark::{Benchmark, BenchmarkId};
use crate::error::{ExperimentError, Result};

#[derive(Debug, Clone)]
pub struct LandscapeConfig {
    /// Rows to write.
    pub samples: usize,
    /// Declared maximum objective count for objective-scalable benchmarks.
    pub max_objectives: usize,
    /// Declared maximum variable count for dimension-scalable benchmarks.
    pub max_variables: usize,
    /// Reject configurations with fewer variables than objectives.
    pub restrict_dimensions: bool,
    /// How many leading samples redraw the instance configuration; the rest
    /// keep the last-drawn one and only redraw the starting point.
    pub reconfigure_prefix: usize,
    /// Draw budget of the rejection loop before giving up.
    pub max_rejections: usize,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        LandscapeConfig {
            samples: 10,
            max_objectives: 4,
            max_variables: 10,
            restrict_dimensions: true,
            reconfigure_prefix: 6,
            max_rejections: 100,
        }
    }
}

/// Samples `config.samples` random evaluations of the benchmark and writes
/// them as fixed-width rows to `{benchmark}.csv` under `out_dir`, returning
/// the path written.
///
/// The generator is constructed from `seed`, which is recorded in the file
/// header so an inspection of the output can be traced back to it.
pub fn sample_landscape(
    id: BenchmarkId,
    config: &LandscapeConfig,
    seed: u64,
    note: Option<&str>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut problem = id.instantiate(id.default_variables());

    let path = out_dir.join(format!("{}.csv", problem.name()));
    let stream_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExperimentError::Stream { path, source }
    };

    info!("writing {}", path.display());
    let mut out = BufWriter::new(File::create(&path).map_err(stream_error(&path))?);

    writeln!(
        out,
        "# Generated with {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
    .map_err(stream_error(&path))?;
    writeln!(out, "# Global seed: {}", seed).map_err(stream_error(&path))?;
    if let Some(note) = note {
        writeln!(out, "# Note: {}", note).map_err(stream_error(&path))?;
    }

    for sample in 0..config.samples {
        if sample < config.reconfigure_prefix {
            reconfigure(problem.as_mut(), config, &mut rng)?;
        }

        // Row widths follow the maximum possible counts, not the realized
        // ones, so every row in the file has the same total width.
        let max_objectives = if problem.has_scalable_objectives() {
            config.max_objectives
        } else {
            problem.number_of_objectives()
        };
        let max_variables = if problem.has_scalable_dimensionality() {
            config.max_variables
        } else {
            problem.number_of_variables()
        };

        problem.init(&mut rng);
        let point = problem.propose_starting_point(&mut rng);
        let fitness = problem.evaluate(&point);

        // Cumulative column boundaries for downstream fixed-width parsing.
        let offsets = [
            4,
            4 + problem.number_of_variables(),
            4 + max_variables,
            4 + max_variables + problem.number_of_objectives(),
        ];

        let row = offsets
            .iter()
            .map(ToString::to_string)
            .chain(padded(&point, max_variables))
            .chain(padded(&fitness, max_objectives))
            .join(",");
        writeln!(out, "{}", row).map_err(stream_error(&path))?;
    }

    out.flush().map_err(stream_error(&path))?;
    Ok(path)
}

/// Draws a fresh objective and variable configuration. The variable draw
/// rejects counts below the objective count while the restriction flag is
/// set, bounded by the configured draw budget.
pub(crate) fn reconfigure(
    problem: &mut dyn Benchmark,
    config: &LandscapeConfig,
    rng: &mut dyn RngCore,
) -> Result<()> {
    if problem.has_scalable_objectives() {
        problem.set_number_of_objectives(rng.gen_range(2..=config.max_objectives));
    }

    if problem.has_scalable_dimensionality() {
        for _ in 0..config.max_rejections {
            problem.set_number_of_variables(rng.gen_range(2..=config.max_variables));
            if !config.restrict_dimensions
                || problem.number_of_variables() >= problem.number_of_objectives()
            {
                return Ok(());
            }
        }
        return Err(ExperimentError::Configuration(format!(
            "no variable count in [2, {}] reached the objective count {} of {} within {} draws",
            config.max_variables,
            problem.number_of_objectives(),
            problem.name(),
            config.max_rejections
        )));
    }

    Ok(())
}

/// Values followed by zero-filled padding up to `width` fields.
fn padded(values: &[f64], width: usize) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .copied()
        .chain(std::iter::repeat(0.0))
        .take(width.max(values.len()))
        .map(|v| format!("{v:.10e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_fills_up_to_the_declared_width() {
        let fields: Vec<String> = padded(&[1.5, 2.5], 4).collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[2].parse::<f64>().unwrap(), 0.0);
        assert_eq!(fields[3].parse::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn full_width_values_are_not_truncated() {
        let fields: Vec<String> = padded(&[1.0, 2.0, 3.0], 3).collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2].parse::<f64>().unwrap(), 3.0);
    }
}
