//! Runs the full benchmark sweep and writes one snapshot file per
//! checkpoint into a fresh `output/` directory.

use std::fs;
use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use moo_bench::snapshot::SnapshotWriter;
use moo_bench::sweep::{default_catalog, run_sweep, SweepConfig};
use moo_bench::GLOBAL_SEED;

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

    let output = Path::new("output");
    if output.exists() {
        info!("removing output directory");
        fs::remove_dir_all(output)?;
    }
    info!("creating output directory");
    fs::create_dir_all(output)?;

    let mut rng = StdRng::seed_from_u64(GLOBAL_SEED);
    let mut writer = SnapshotWriter::new(output, GLOBAL_SEED);
    run_sweep(
        &default_catalog(),
        &SweepConfig::default(),
        &mut writer,
        &mut rng,
    )?;

    Ok(())
}
