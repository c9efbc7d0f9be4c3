//! Error types for the experiment harness.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level harness error. Every failure is fatal to the current run;
/// there is no recoverable path. Checkpoint files already flushed to disk
/// before the failure remain valid.
#[derive(Error, Debug)]
pub enum ExperimentError {
    /// A benchmark could not be shaped to the requested objective or
    /// variable counts, or a sampler configuration was unsatisfiable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An output file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Stream {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An optimizer step failed internally, e.g. through numerical
    /// divergence. Never retried.
    #[error("computational fault in {optimizer}: {reason}")]
    Computation { optimizer: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
