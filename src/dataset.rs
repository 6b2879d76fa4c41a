//! Exploratory overview of the Telco churn CSV

use crate::error::{ChurnError, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Categorical columns broken down by churn rate
pub const BREAKDOWN_COLUMNS: [&str; 3] = ["Contract", "InternetService", "PaymentMethod"];

const CHURN_COLUMN: &str = "Churn";
const PREVIEW_ROWS: usize = 5;

/// Churn counts within one category value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryChurn {
    pub total: usize,
    pub churned: usize,
}

impl CategoryChurn {
    pub fn churn_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.churned as f64 / self.total as f64
        }
    }
}

/// Means of a numeric column split by churn status
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplitMean {
    pub churned: f64,
    pub retained: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub churned: usize,
    pub retained: usize,
    pub headers: Vec<String>,
    pub preview: Vec<Vec<String>>,
    /// Column -> value -> counts
    pub breakdowns: BTreeMap<String, BTreeMap<String, CategoryChurn>>,
    pub tenure: SplitMean,
    pub monthly_charges: SplitMean,
}

impl DatasetOverview {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ChurnError::Dataset(format!("cannot open {}: {e}", path.display()))
        })?;
        let overview = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = overview.rows,
            churned = overview.churned,
            "Dataset loaded"
        );
        Ok(overview)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = csv.headers()?.clone();

        let position = |name: &str| headers.iter().position(|h| h == name);
        let churn_idx = position(CHURN_COLUMN)
            .ok_or_else(|| ChurnError::Dataset(format!("missing '{CHURN_COLUMN}' column")))?;
        let tenure_idx = position("tenure");
        let monthly_idx = position("MonthlyCharges");
        let breakdown_idx: Vec<(&str, usize)> = BREAKDOWN_COLUMNS
            .iter()
            .filter_map(|name| position(name).map(|i| (*name, i)))
            .collect();

        let mut overview = Self {
            rows: 0,
            columns: headers.len(),
            churned: 0,
            retained: 0,
            headers: headers.iter().map(str::to_string).collect(),
            preview: Vec::with_capacity(PREVIEW_ROWS),
            breakdowns: BTreeMap::new(),
            tenure: SplitMean::default(),
            monthly_charges: SplitMean::default(),
        };
        let mut tenure = MeanAccumulator::default();
        let mut monthly = MeanAccumulator::default();

        for row in csv.records() {
            let row: StringRecord = row?;
            let churned = match row.get(churn_idx) {
                Some("Yes") => true,
                Some("No") => false,
                other => {
                    return Err(ChurnError::Dataset(format!(
                        "row {}: unexpected Churn value {:?}",
                        overview.rows + 1,
                        other
                    )))
                }
            };

            overview.rows += 1;
            if churned {
                overview.churned += 1;
            } else {
                overview.retained += 1;
            }
            if overview.preview.len() < PREVIEW_ROWS {
                overview.preview.push(row.iter().map(str::to_string).collect());
            }

            for (name, idx) in &breakdown_idx {
                let value = row.get(*idx).unwrap_or_default().to_string();
                let counts = overview
                    .breakdowns
                    .entry(name.to_string())
                    .or_default()
                    .entry(value)
                    .or_default();
                counts.total += 1;
                counts.churned += usize::from(churned);
            }

            tenure.add(numeric(&row, tenure_idx), churned);
            monthly.add(numeric(&row, monthly_idx), churned);
        }

        if overview.rows == 0 {
            return Err(ChurnError::Dataset("dataset has no rows".to_string()));
        }
        overview.tenure = tenure.finish();
        overview.monthly_charges = monthly.finish();
        Ok(overview)
    }

    pub fn churn_share(&self) -> f64 {
        self.churned as f64 / self.rows as f64
    }
}

fn numeric(row: &StringRecord, idx: Option<usize>) -> Option<f64> {
    let raw = row.get(idx?)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(value = raw, "Non-numeric value skipped");
            None
        }
    }
}

#[derive(Default)]
struct MeanAccumulator {
    churned: (f64, usize),
    retained: (f64, usize),
}

impl MeanAccumulator {
    fn add(&mut self, value: Option<f64>, churned: bool) {
        let Some(value) = value else { return };
        let slot = if churned {
            &mut self.churned
        } else {
            &mut self.retained
        };
        slot.0 += value;
        slot.1 += 1;
    }

    fn finish(&self) -> SplitMean {
        let mean = |(sum, n): (f64, usize)| if n == 0 { 0.0 } else { sum / n as f64 };
        SplitMean {
            churned: mean(self.churned),
            retained: mean(self.retained),
        }
    }
}

impl fmt::Display for DatasetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let churn_pct = self.churn_share() * 100.0;

        writeln!(f, "Customers: {}    Columns: {}", self.rows, self.columns)?;
        writeln!(f, "Churned:   {} ({:.1}%)", self.churned, churn_pct)?;
        writeln!(f, "Retained:  {} ({:.1}%)", self.retained, 100.0 - churn_pct)?;

        writeln!(f, "\nFirst {} rows:", self.preview.len())?;
        writeln!(f, "{}", self.headers.join(" | "))?;
        for row in &self.preview {
            writeln!(f, "{}", row.join(" | "))?;
        }

        for (column, values) in &self.breakdowns {
            writeln!(f, "\nChurn rate by {column}:")?;
            for (value, counts) in values {
                writeln!(
                    f,
                    "  {:<28}{:>6.1}%  ({} of {})",
                    value,
                    counts.churn_rate() * 100.0,
                    counts.churned,
                    counts.total
                )?;
            }
        }

        writeln!(f, "\nMean by churn status:     churned   retained")?;
        writeln!(
            f,
            "  tenure (months)      {:>10.1} {:>10.1}",
            self.tenure.churned, self.tenure.retained
        )?;
        write!(
            f,
            "  MonthlyCharges ($)   {:>10.2} {:>10.2}",
            self.monthly_charges.churned, self.monthly_charges.retained
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
customerID,gender,SeniorCitizen,tenure,Contract,InternetService,PaymentMethod,MonthlyCharges,TotalCharges,Churn
0001,Female,0,1,Month-to-month,Fiber optic,Electronic check,90.0,90.0,Yes
0002,Male,0,34,One year,DSL,Mailed check,56.95,1889.5,No
0003,Male,0,2,Month-to-month,DSL,Mailed check,53.85,108.15,Yes
0004,Male,0,45,One year,DSL,Bank transfer (automatic),42.30,1840.75,No
0005,Female,1,8,Month-to-month,Fiber optic,Electronic check,99.65,820.5,No
0006,Female,0,70,Two year,No,Credit card (automatic),20.0, ,No
";

    #[test]
    fn test_counts_and_preview() {
        let overview = DatasetOverview::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(overview.rows, 6);
        assert_eq!(overview.columns, 10);
        assert_eq!(overview.churned, 2);
        assert_eq!(overview.retained, 4);
        assert_eq!(overview.preview.len(), 5);
        assert_eq!(overview.preview[0][0], "0001");
        assert!((overview.churn_share() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakdowns() {
        let overview = DatasetOverview::from_reader(SAMPLE.as_bytes()).unwrap();
        let contract = &overview.breakdowns["Contract"];
        let monthly = contract["Month-to-month"];
        assert_eq!(monthly.total, 3);
        assert_eq!(monthly.churned, 2);
        assert_eq!(contract["Two year"].churn_rate(), 0.0);
        assert_eq!(overview.breakdowns["InternetService"].len(), 3);
    }

    #[test]
    fn test_means_by_churn() {
        let overview = DatasetOverview::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!((overview.tenure.churned - 1.5).abs() < 1e-12);
        assert!((overview.tenure.retained - 39.25).abs() < 1e-12);
        assert!((overview.monthly_charges.churned - 71.925).abs() < 1e-9);
    }

    #[test]
    fn test_summary_rendering() {
        let text = DatasetOverview::from_reader(SAMPLE.as_bytes())
            .unwrap()
            .to_string();
        assert!(text.contains("Churned:   2 (33.3%)"));
        assert!(text.contains("Retained:  4 (66.7%)"));
        assert!(text.contains("Churn rate by Contract:"));
    }

    #[test]
    fn test_missing_churn_column() {
        let err = DatasetOverview::from_reader("a,b\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ChurnError::Dataset(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = DatasetOverview::load("/nonexistent/Churn.csv").unwrap_err();
        assert!(matches!(err, ChurnError::Dataset(_)));
    }
}
