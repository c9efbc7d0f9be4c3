//! Samples random configurations of one benchmark and writes their
//! evaluations as fixed-width rows to `{benchmark}.csv` in the working
//! directory. Accepts one optional free-text note recorded in the header.

use std::env;
use std::path::Path;

use anyhow::Result;
use rand::Rng;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use moo_bench::benchmark::BenchmarkId;
use moo_bench::landscape::{sample_landscape, LandscapeConfig};

fn setup_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set tracing subscriber");
}

fn main() -> Result<()> {
    setup_logging();

    let note = env::args().nth(1);
    // Fresh entropy per run; the seed lands in the output header so the
    // file can be traced back to its generator state.
    let seed: u64 = rand::thread_rng().gen();

    let path = sample_landscape(
        BenchmarkId::Ihr3,
        &LandscapeConfig::default(),
        seed,
        note.as_deref(),
        Path::new("."),
    )?;
    println!("{}", path.display());

    Ok(())
}
