//! Feature encoding for churn model inference.
//!
//! Turns a raw [`CustomerRecord`] into the exact vector the trained
//! classifiers expect: same one-hot columns, same column order, same
//! scaling. The column layout is never hard-coded here; it comes from the
//! [`FeatureSchema`] artifact written at training time, so the reference
//! category dropped for each field is whichever one the schema omits.

use crate::error::{ChurnError, Result};
use crate::scaler::Scaler;
use crate::types::record::{fields, known_categories, CustomerRecord, FieldValue};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Tri-state values that training collapsed into a plain "No".
const COLLAPSED_TO_NO: [&str; 2] = ["No internet service", "No phone service"];

/// Ordered feature columns plus a name lookup, built once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from the training column list.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ChurnError::artifact("feature schema", "no columns"));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(ChurnError::artifact(
                    "feature schema",
                    format!("duplicate column '{name}'"),
                ));
            }
        }

        Ok(Self { columns, index })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, if the schema has it
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

/// Schema-aligned feature values before scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatures(Vec<f64>);

impl AlignedFeatures {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scaled feature vector fed to the classifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector(Vec<f64>);

impl EncodedVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map a tri-state "no service" value to "No"; other values pass through.
pub fn canonical_category(value: &str) -> &str {
    if COLLAPSED_TO_NO.contains(&value) {
        "No"
    } else {
        value
    }
}

/// Name of the indicator column for a categorical value.
pub fn indicator_column(field: &str, value: &str) -> String {
    format!("{field}_{value}")
}

/// Encoder bound to one schema and one fitted scaler.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    schema: &'a FeatureSchema,
    scaler: &'a Scaler,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(schema: &'a FeatureSchema, scaler: &'a Scaler) -> Self {
        Self { schema, scaler }
    }

    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    pub fn feature_names(&self) -> &[String] {
        self.schema.columns()
    }

    /// Expand and reindex a record against the schema, without scaling.
    ///
    /// Columns the record implies but the schema lacks are dropped; schema
    /// columns the record does not imply stay zero. A category outside the
    /// training vocabulary therefore yields all-zero indicators for its
    /// field, the same as the reference category.
    pub fn align(&self, record: &CustomerRecord) -> Result<AlignedFeatures> {
        let mut values = vec![0.0; self.schema.len()];
        let zero_tenure = record.tenure == 0;

        for (field, value) in record.fields() {
            let (column, value) = match value {
                FieldValue::Numeric(_) if field == fields::TOTAL_CHARGES && zero_tenure => {
                    (field.to_string(), 0.0)
                }
                FieldValue::Numeric(v) => (field.to_string(), v),
                FieldValue::Category(raw) => {
                    let category = canonical_category(raw);
                    if let Some(domain) = known_categories(field) {
                        if !domain.contains(&category) {
                            warn!(
                                field = field,
                                value = raw,
                                "Unrecognized category, indicators left at zero"
                            );
                        }
                    }
                    (indicator_column(field, category), 1.0)
                }
            };

            match self.schema.position(&column) {
                Some(position) => values[position] = value,
                None => debug!(column = %column, "Column not in schema, dropped"),
            }
        }

        if values.len() != self.schema.len() {
            return Err(ChurnError::SchemaMismatch {
                context: "aligned features".to_string(),
                expected: self.schema.len(),
                actual: values.len(),
            });
        }

        Ok(AlignedFeatures::new(values))
    }

    /// Align a record and apply the fitted scaler.
    pub fn encode(&self, record: &CustomerRecord) -> Result<EncodedVector> {
        let aligned = self.align(record)?;
        let encoded = self.scaler.transform(&aligned)?;

        if encoded.len() != self.schema.len() {
            return Err(ChurnError::SchemaMismatch {
                context: "encoded vector".to_string(),
                expected: self.schema.len(),
                actual: encoded.len(),
            });
        }

        Ok(encoded)
    }
}
