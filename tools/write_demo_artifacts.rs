//! Demo Artifact Writer
//!
//! Writes a feature schema, scaler and one JSON model per registry entry so
//! the console can run without the training notebook's outputs.

use anyhow::{Context, Result};
use churn_prediction::{demo, store::ArtifactStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target directory for the artifacts
    #[arg(default_value = "artifacts")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("churn_prediction=info".parse()?)
                .add_directive("write_demo_artifacts=info".parse()?),
        )
        .init();

    let args = Args::parse();
    demo::write_artifacts(&args.dir)
        .with_context(|| format!("Failed to write artifacts to {}", args.dir.display()))?;

    // Read everything back through the normal loading path.
    let store = ArtifactStore::load(&demo::artifacts_config(&args.dir))
        .context("Written artifacts failed to load")?;
    info!(
        dir = %args.dir.display(),
        models = store.registry().len(),
        features = store.schema().len(),
        "Demo artifacts verified"
    );
    Ok(())
}
