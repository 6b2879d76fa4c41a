//! Command-line interface definitions and argument parsing

use crate::error::Result;
use crate::presets::{CustomerForm, Preset};
use crate::types::CustomerRecord;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Telco customer churn prediction console
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "config/config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict churn for one customer with a single model
    Predict(PredictArgs),
    /// Run every model on the same customer and show consensus
    Compare(RecordArgs),
    /// List the available models
    Models,
    /// Show held-out evaluation metrics per model
    Evaluation,
    /// Summarize the training dataset
    Overview {
        /// CSV path; defaults to the configured dataset
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
}

/// Options that build the customer record
#[derive(Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Start from a customer record stored as JSON
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Quick-fill preset; repeat to layer presets, later ones win
    #[arg(short, long, value_enum)]
    pub preset: Vec<Preset>,

    /// Field override, e.g. --set tenure=0 --set "Contract=Two year"
    #[arg(short, long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,
}

impl RecordArgs {
    /// Defaults (or `--input`), then presets, then overrides.
    pub fn build_record(&self) -> Result<CustomerRecord> {
        let mut form = match &self.input {
            Some(path) => CustomerForm::from_json_file(path)?,
            None => CustomerForm::default(),
        };
        for preset in &self.preset {
            form.apply_preset(*preset)?;
        }
        for assignment in &self.set {
            form.apply_override(assignment)?;
        }
        form.finish()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct PredictArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Model key; defaults to the configured default model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Export the prediction as CSV, optionally to the given path
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Print an email draft for the account team
    #[arg(long)]
    pub email: bool,

    /// Print the encoded feature vector
    #[arg(long)]
    pub show_features: bool,
}
