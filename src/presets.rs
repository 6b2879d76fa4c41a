//! Customer input form with quick-fill presets

use crate::error::{ChurnError, Result};
use crate::types::record::fields;
use crate::types::CustomerRecord;
use clap::ValueEnum;
use std::path::Path;
use tracing::debug;

/// Quick-fill profiles, applied on top of the form defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Senior,
    Young,
    Business,
    Home,
    FullServices,
    MinimalServices,
    Premium,
    Basic,
}

impl Preset {
    /// `(field, value)` assignments in application order
    pub fn assignments(self) -> &'static [(&'static str, &'static str)] {
        use fields::*;
        match self {
            Preset::Senior => &[
                (SENIOR_CITIZEN, "1"),
                (PARTNER, "Yes"),
                (DEPENDENTS, "Yes"),
                (TENURE, "60"),
                (CONTRACT, "Two year"),
                (MONTHLY_CHARGES, "70"),
                (PAPERLESS_BILLING, "No"),
                (PAYMENT_METHOD, "Bank transfer (automatic)"),
            ],
            Preset::Young => &[
                (SENIOR_CITIZEN, "0"),
                (PARTNER, "No"),
                (DEPENDENTS, "No"),
                (TENURE, "12"),
                (CONTRACT, "Month-to-month"),
                (MONTHLY_CHARGES, "45"),
                (PAPERLESS_BILLING, "Yes"),
                (PAYMENT_METHOD, "Electronic check"),
            ],
            Preset::Business => &[
                (INTERNET_SERVICE, "Fiber optic"),
                (ONLINE_SECURITY, "Yes"),
                (TECH_SUPPORT, "Yes"),
                (CONTRACT, "One year"),
                (MONTHLY_CHARGES, "80"),
                (STREAMING_TV, "No"),
                (STREAMING_MOVIES, "No"),
            ],
            Preset::Home => &[
                (INTERNET_SERVICE, "DSL"),
                (STREAMING_TV, "Yes"),
                (STREAMING_MOVIES, "Yes"),
                (CONTRACT, "Month-to-month"),
                (MONTHLY_CHARGES, "50"),
                (ONLINE_SECURITY, "No"),
                (TECH_SUPPORT, "No"),
            ],
            Preset::FullServices => &[
                (ONLINE_SECURITY, "Yes"),
                (ONLINE_BACKUP, "Yes"),
                (DEVICE_PROTECTION, "Yes"),
                (TECH_SUPPORT, "Yes"),
                (STREAMING_TV, "Yes"),
                (STREAMING_MOVIES, "Yes"),
            ],
            Preset::MinimalServices => &[
                (ONLINE_SECURITY, "No"),
                (ONLINE_BACKUP, "No"),
                (DEVICE_PROTECTION, "No"),
                (TECH_SUPPORT, "No"),
                (STREAMING_TV, "No"),
                (STREAMING_MOVIES, "No"),
            ],
            Preset::Premium => &[
                (MONTHLY_CHARGES, "85"),
                (CONTRACT, "One year"),
                (PAYMENT_METHOD, "Credit card (automatic)"),
                (PAPERLESS_BILLING, "Yes"),
            ],
            Preset::Basic => &[
                (MONTHLY_CHARGES, "35"),
                (CONTRACT, "Month-to-month"),
                (PAYMENT_METHOD, "Electronic check"),
                (PAPERLESS_BILLING, "No"),
            ],
        }
    }
}

/// Request-scoped form state; presets and overrides edit it in place and
/// `finish` hands a validated record to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerForm {
    record: CustomerRecord,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self {
            record: CustomerRecord {
                senior_citizen: 0,
                partner: "No".to_string(),
                dependents: "No".to_string(),
                tenure: 12,
                multiple_lines: "No".to_string(),
                internet_service: "DSL".to_string(),
                online_security: "No".to_string(),
                online_backup: "No".to_string(),
                device_protection: "No".to_string(),
                tech_support: "No".to_string(),
                streaming_tv: "No".to_string(),
                streaming_movies: "No".to_string(),
                contract: "Month-to-month".to_string(),
                paperless_billing: "Yes".to_string(),
                payment_method: "Electronic check".to_string(),
                monthly_charges: 50.0,
                total_charges: 500.0,
            },
        }
    }
}

impl CustomerForm {
    /// Start from a record stored as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ChurnError::invalid_input(path.display().to_string(), e))?;
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| ChurnError::invalid_input(path.display().to_string(), e))?;
        Ok(Self { record })
    }

    pub fn apply_preset(&mut self, preset: Preset) -> Result<()> {
        for (field, value) in preset.assignments() {
            self.record.set_field(field, value)?;
        }
        debug!(preset = ?preset, "Preset applied");
        Ok(())
    }

    /// Apply a `Field=Value` override
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            ChurnError::invalid_input(assignment, "expected Field=Value")
        })?;
        self.record.set_field(field.trim(), value)
    }

    pub fn record(&self) -> &CustomerRecord {
        &self.record
    }

    /// Validate and release the record.
    pub fn finish(self) -> Result<CustomerRecord> {
        self.record.validate()?;
        Ok(self.record)
    }
}
