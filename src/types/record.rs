//! Customer record submitted for churn scoring

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};

/// Field names exactly as they appear in the training dataset.
pub mod fields {
    pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
    pub const PARTNER: &str = "Partner";
    pub const DEPENDENTS: &str = "Dependents";
    pub const TENURE: &str = "tenure";
    pub const MULTIPLE_LINES: &str = "MultipleLines";
    pub const INTERNET_SERVICE: &str = "InternetService";
    pub const ONLINE_SECURITY: &str = "OnlineSecurity";
    pub const ONLINE_BACKUP: &str = "OnlineBackup";
    pub const DEVICE_PROTECTION: &str = "DeviceProtection";
    pub const TECH_SUPPORT: &str = "TechSupport";
    pub const STREAMING_TV: &str = "StreamingTV";
    pub const STREAMING_MOVIES: &str = "StreamingMovies";
    pub const CONTRACT: &str = "Contract";
    pub const PAPERLESS_BILLING: &str = "PaperlessBilling";
    pub const PAYMENT_METHOD: &str = "PaymentMethod";
    pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
    pub const TOTAL_CHARGES: &str = "TotalCharges";

    /// The six add-on services that depend on having internet service.
    pub const INTERNET_ADD_ONS: [&str; 6] = [
        ONLINE_SECURITY,
        ONLINE_BACKUP,
        DEVICE_PROTECTION,
        TECH_SUPPORT,
        STREAMING_TV,
        STREAMING_MOVIES,
    ];
}

pub const MAX_TENURE_MONTHS: u32 = 72;
pub const MAX_MONTHLY_CHARGES: f64 = 120.0;
pub const MAX_TOTAL_CHARGES: f64 = 9000.0;

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_DEPENDENT: &[&str] = &["Yes", "No", "No internet service"];

/// Category values seen at training time for each categorical field.
pub fn known_categories(field: &str) -> Option<&'static [&'static str]> {
    use fields::*;
    let domain: &'static [&'static str] = match field {
        PARTNER | DEPENDENTS | PAPERLESS_BILLING => YES_NO,
        MULTIPLE_LINES => &["Yes", "No", "No phone service"],
        INTERNET_SERVICE => &["DSL", "Fiber optic", "No"],
        ONLINE_SECURITY | ONLINE_BACKUP | DEVICE_PROTECTION | TECH_SUPPORT | STREAMING_TV
        | STREAMING_MOVIES => INTERNET_DEPENDENT,
        CONTRACT => &["Month-to-month", "One year", "Two year"],
        PAYMENT_METHOD => &[
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ],
        _ => return None,
    };
    Some(domain)
}

/// A single raw field value, borrowed from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Numeric(f64),
    Category(&'a str),
}

/// Raw customer attributes as entered by a user.
///
/// Categorical fields hold free-form strings so that values outside the
/// training vocabulary still reach the encoder, which zero-fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    /// 1 if the customer is 65 or older
    pub senior_citizen: u8,

    /// Has a partner (Yes / No)
    pub partner: String,

    /// Has dependents (Yes / No)
    pub dependents: String,

    /// Months with the company
    #[serde(rename = "tenure", alias = "Tenure")]
    pub tenure: u32,

    /// Yes / No / No phone service
    pub multiple_lines: String,

    /// DSL / Fiber optic / No
    pub internet_service: String,

    pub online_security: String,
    pub online_backup: String,
    pub device_protection: String,
    pub tech_support: String,

    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,

    pub streaming_movies: String,

    /// Month-to-month / One year / Two year
    pub contract: String,

    /// Yes / No
    pub paperless_billing: String,

    pub payment_method: String,

    /// Current monthly charge in dollars
    pub monthly_charges: f64,

    /// Lifetime charges in dollars
    pub total_charges: f64,
}

impl CustomerRecord {
    /// All 17 fields in dataset column order.
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); 17] {
        use fields::*;
        use FieldValue::{Category, Numeric};
        [
            (SENIOR_CITIZEN, Numeric(f64::from(self.senior_citizen))),
            (PARTNER, Category(&self.partner)),
            (DEPENDENTS, Category(&self.dependents)),
            (TENURE, Numeric(f64::from(self.tenure))),
            (MULTIPLE_LINES, Category(&self.multiple_lines)),
            (INTERNET_SERVICE, Category(&self.internet_service)),
            (ONLINE_SECURITY, Category(&self.online_security)),
            (ONLINE_BACKUP, Category(&self.online_backup)),
            (DEVICE_PROTECTION, Category(&self.device_protection)),
            (TECH_SUPPORT, Category(&self.tech_support)),
            (STREAMING_TV, Category(&self.streaming_tv)),
            (STREAMING_MOVIES, Category(&self.streaming_movies)),
            (CONTRACT, Category(&self.contract)),
            (PAPERLESS_BILLING, Category(&self.paperless_billing)),
            (PAYMENT_METHOD, Category(&self.payment_method)),
            (MONTHLY_CHARGES, Numeric(self.monthly_charges)),
            (TOTAL_CHARGES, Numeric(self.total_charges)),
        ]
    }

    /// Check numeric fields against the ranges the input form allows.
    pub fn validate(&self) -> Result<()> {
        use fields::*;

        if self.senior_citizen > 1 {
            return Err(ChurnError::invalid_input(SENIOR_CITIZEN, "must be 0 or 1"));
        }
        if self.tenure > MAX_TENURE_MONTHS {
            return Err(ChurnError::invalid_input(
                TENURE,
                format!("{} exceeds {} months", self.tenure, MAX_TENURE_MONTHS),
            ));
        }
        check_range(MONTHLY_CHARGES, self.monthly_charges, MAX_MONTHLY_CHARGES)?;
        check_range(TOTAL_CHARGES, self.total_charges, MAX_TOTAL_CHARGES)?;
        Ok(())
    }

    /// Set a field by its dataset name from a textual value.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        use fields::*;

        let value = value.trim();
        match name {
            SENIOR_CITIZEN => self.senior_citizen = parse_senior(value)?,
            TENURE => {
                self.tenure = value.parse().map_err(|_| {
                    ChurnError::invalid_input(
                        TENURE,
                        format!("'{value}' is not a whole number of months"),
                    )
                })?
            }
            MONTHLY_CHARGES => self.monthly_charges = parse_amount(MONTHLY_CHARGES, value)?,
            TOTAL_CHARGES => self.total_charges = parse_amount(TOTAL_CHARGES, value)?,
            _ => {
                let slot = self
                    .category_mut(name)
                    .ok_or_else(|| ChurnError::invalid_input(name, "no such field"))?;
                *slot = value.to_string();
            }
        }
        Ok(())
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut String> {
        use fields::*;
        let slot = match name {
            PARTNER => &mut self.partner,
            DEPENDENTS => &mut self.dependents,
            MULTIPLE_LINES => &mut self.multiple_lines,
            INTERNET_SERVICE => &mut self.internet_service,
            ONLINE_SECURITY => &mut self.online_security,
            ONLINE_BACKUP => &mut self.online_backup,
            DEVICE_PROTECTION => &mut self.device_protection,
            TECH_SUPPORT => &mut self.tech_support,
            STREAMING_TV => &mut self.streaming_tv,
            STREAMING_MOVIES => &mut self.streaming_movies,
            CONTRACT => &mut self.contract,
            PAPERLESS_BILLING => &mut self.paperless_billing,
            PAYMENT_METHOD => &mut self.payment_method,
            _ => return None,
        };
        Some(slot)
    }
}

fn check_range(field: &str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=max).contains(&value) {
        return Err(ChurnError::invalid_input(
            field,
            format!("{value} is outside 0..={max}"),
        ));
    }
    Ok(())
}

fn parse_senior(value: &str) -> Result<u8> {
    match value {
        "1" | "Yes" | "yes" => Ok(1),
        "0" | "No" | "no" => Ok(0),
        other => Err(ChurnError::invalid_input(
            fields::SENIOR_CITIZEN,
            format!("'{other}' is not 0/1"),
        )),
    }
}

fn parse_amount(field: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| ChurnError::invalid_input(field, format!("'{value}' is not a number")))
}
