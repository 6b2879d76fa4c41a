//! Churn Prediction Console - Main Entry Point
//!
//! Loads the model artifacts once, scores a customer record with one or all
//! models and renders the interpreted result.

use anyhow::{Context, Result};
use churn_prediction::{
    cli::{Cli, Command, PredictArgs, RecordArgs},
    config::{AppConfig, LoggingConfig},
    dataset::DatasetOverview,
    evaluation::{EvaluationTable, EVALUATIONS},
    export::PredictionExport,
    metrics::SessionMetrics,
    models::inference::InferenceEngine,
    report,
    store::ArtifactCache,
    ChurnError,
};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, from_file) = load_config(&cli.config)?;
    init_logging(&config.logging)?;
    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        warn!(path = %cli.config.display(), "Configuration file not found, using defaults");
    }

    let metrics = Arc::new(SessionMetrics::new());
    let outcome = run(cli.command, &config, &metrics);

    if let Err(e) = &outcome {
        if let Some(churn_error) = e.downcast_ref::<ChurnError>() {
            eprintln!("{}", churn_error.user_hint());
        }
    }
    metrics.print_summary();
    outcome
}

fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let config = AppConfig::load_from_path(path)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!("churn_prediction={}", logging.level)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn run(command: Command, config: &AppConfig, metrics: &Arc<SessionMetrics>) -> Result<()> {
    match command {
        Command::Predict(args) => predict(&args, config, metrics),
        Command::Compare(args) => compare(&args, config, metrics),
        Command::Models => {
            print!("{}", report::render_catalog(&config.artifacts));
            Ok(())
        }
        Command::Evaluation => {
            println!("{}\n", EvaluationTable::default());
            for evaluation in EVALUATIONS {
                println!("{evaluation}\n");
            }
            Ok(())
        }
        Command::Overview { dataset } => {
            let path = dataset.unwrap_or_else(|| config.dataset.path.clone());
            let overview = DatasetOverview::load(&path)?;
            println!("{overview}");
            Ok(())
        }
    }
}

/// Load artifacts; failures here disable prediction but nothing else.
fn engine(config: &AppConfig, metrics: &Arc<SessionMetrics>) -> Result<InferenceEngine> {
    let cache = ArtifactCache::new(config.artifacts.clone());
    match cache.get_or_load() {
        Ok(store) => {
            info!(
                models = store.registry().len(),
                features = store.schema().len(),
                loaded_at = %store.loaded_at(),
                "Inference engine ready"
            );
            Ok(InferenceEngine::with_metrics(store, Arc::clone(metrics)))
        }
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Artifacts unavailable");
            Err(e.into())
        }
    }
}

fn predict(args: &PredictArgs, config: &AppConfig, metrics: &Arc<SessionMetrics>) -> Result<()> {
    let record = args.record.build_record()?;
    let engine = engine(config, metrics)?;

    let scored = engine.predict(&record, args.model.as_deref())?;
    let entry = engine.store().registry().get(&scored.result.model)?;
    print!("{}", report::render_prediction(&scored.result, &entry.display_name));

    if args.show_features {
        let names = engine.store().schema().columns();
        println!("\nEncoded features:");
        print!("{}", report::render_features(names, &scored.encoded));
    }

    if args.email {
        println!("\n{}", report::email_template(&scored.result, &record));
    }

    if let Some(target) = &args.export {
        let export = PredictionExport::new(scored.result.clone(), record);
        let path = export
            .save(&config.export.dir, target.as_deref())
            .context("Failed to export prediction")?;
        println!("\nExported to {}", path.display());
    }
    Ok(())
}

fn compare(args: &RecordArgs, config: &AppConfig, metrics: &Arc<SessionMetrics>) -> Result<()> {
    let record = args.build_record()?;
    let engine = engine(config, metrics)?;

    let comparison = engine.compare(&record)?;
    print!(
        "{}",
        report::render_comparison(&comparison, engine.store().registry())
    );
    Ok(())
}
