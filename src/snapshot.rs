//! Serialization of checkpoint snapshots into labeled `.fitness.csv` files.

use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::info;

use crate::checkpoint::{CheckpointSink, SnapshotMeta};
use crate::error::{ExperimentError, Result};

/// Writes one snapshot file per checkpoint into a fixed directory.
///
/// The directory must exist before the first write; creating it is the
/// executable's responsibility, done once before the sweep starts.
pub struct SnapshotWriter {
    dir: PathBuf,
    seed: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, seed: u64) -> Self {
        SnapshotWriter {
            dir: dir.into(),
            seed,
        }
    }

    /// Deterministic destination path. Boundary counts are strictly
    /// increasing within a trial, so checkpoints never collide.
    fn destination(&self, meta: &SnapshotMeta) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}_{}.fitness.csv",
            meta.benchmark, meta.optimizer, meta.trial, meta.boundary
        ))
    }
}

impl CheckpointSink for SnapshotWriter {
    fn emit(&mut self, meta: &SnapshotMeta, rows: &[Vec<f64>]) -> Result<()> {
        let path = self.destination(meta);
        info!("writing {}", path.display());
        write_snapshot(&path, self.seed, meta, rows).map_err(|source| ExperimentError::Stream {
            path,
            source,
        })
    }
}

fn write_snapshot(path: &Path, seed: u64, meta: &SnapshotMeta, rows: &[Vec<f64>]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(
        out,
        "# Generated with {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "# Global seed: {}", seed)?;
    writeln!(
        out,
        "# Function: {}: {} -> {}",
        meta.benchmark, meta.variables, meta.objectives
    )?;
    writeln!(out, "# Optimizer: {}", meta.optimizer)?;
    writeln!(out, "# Trial: {}", meta.trial)?;
    writeln!(out, "# Evaluations: {}", meta.evaluations)?;
    writeln!(out, "# Observation: fitness")?;

    for row in rows {
        writeln!(out, "{}", row.iter().map(|v| format!("{v:.10e}")).join(","))?;
    }

    out.flush()
}
