//! Single-prediction CSV export

use crate::error::Result;
use crate::interpret::PredictionResult;
use crate::types::record::FieldValue;
use crate::types::CustomerRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const LEADING_COLUMNS: [&str; 7] = [
    "Prediction_ID",
    "Timestamp",
    "Model",
    "Prediction",
    "Confidence",
    "Prob_Churn",
    "Prob_NoChurn",
];

/// One prediction flattened for CSV: result columns, then the 17 inputs.
#[derive(Debug, Clone)]
pub struct PredictionExport {
    pub prediction_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub result: PredictionResult,
    pub record: CustomerRecord,
}

impl PredictionExport {
    pub fn new(result: PredictionResult, record: CustomerRecord) -> Self {
        Self {
            prediction_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            result,
            record,
        }
    }

    /// `churn_prediction_<model_key>.csv`
    pub fn default_file_name(&self) -> String {
        format!("churn_prediction_{}.csv", self.result.model.replace(' ', "_"))
    }

    pub fn header(&self) -> Vec<&'static str> {
        LEADING_COLUMNS
            .iter()
            .copied()
            .chain(self.record.fields().iter().map(|(name, _)| *name))
            .collect()
    }

    pub fn values(&self) -> Vec<String> {
        let mut values = vec![
            self.prediction_id.to_string(),
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.result.model.clone(),
            self.result.label.as_str().to_string(),
            percent(self.result.confidence),
            percent(self.result.p_churn()),
            percent(self.result.p_no_churn()),
        ];
        values.extend(self.record.fields().iter().map(|(_, value)| match value {
            FieldValue::Numeric(v) => v.to_string(),
            FieldValue::Category(c) => c.to_string(),
        }));
        values
    }

    /// Write the header row and one data row.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header())?;
        csv.write_record(self.values())?;
        csv.flush()?;
        Ok(())
    }

    /// Write into `dir` under the default file name, or to `path` when given.
    pub fn save(&self, dir: &Path, path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => {
                std::fs::create_dir_all(dir)?;
                dir.join(self.default_file_name())
            }
        };

        let file = std::fs::File::create(&target)?;
        self.write_to(file)?;
        info!(
            path = %target.display(),
            prediction_id = %self.prediction_id,
            model = %self.result.model,
            "Prediction exported"
        );
        Ok(target)
    }
}

/// `0.7512 -> "75.12%"`
pub fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::interpret::interpret;
    use crate::types::{ChurnLabel, ClassProbabilities, Prediction};

    fn export() -> PredictionExport {
        let prediction = Prediction {
            label: ChurnLabel::Churn,
            probabilities: ClassProbabilities::from_churn(0.75),
        };
        PredictionExport::new(interpret("xgboost", &prediction), demo::sample_record())
    }

    #[test]
    fn test_csv_layout() {
        let export = export();
        let mut buffer = Vec::new();
        export.write_to(&mut buffer).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 24);
        assert_eq!(&headers[0], "Prediction_ID");
        assert_eq!(&headers[7], "SeniorCitizen");
        assert_eq!(&headers[23], "TotalCharges");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[2], "xgboost");
        assert_eq!(&row[3], "CHURN");
        assert_eq!(&row[4], "75.00%");
        assert_eq!(&row[5], "75.00%");
        assert_eq!(&row[6], "25.00%");
        assert_eq!(&row[10], "24");
        assert_eq!(&row[19], "One year");
        assert!(Uuid::parse_str(&row[0]).is_ok());
        assert!(DateTime::parse_from_rfc3339(&row[1]).is_ok());
    }

    #[test]
    fn test_save_uses_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let export = export();
        let path = export.save(dir.path(), None).unwrap();
        assert_eq!(path, dir.path().join("churn_prediction_xgboost.csv"));
        assert!(std::fs::read_to_string(path).unwrap().starts_with("Prediction_ID,"));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.123456), "12.35%");
        assert_eq!(percent(1.0), "100.00%");
    }
}
