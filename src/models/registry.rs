//! Ordered collection of fitted classifiers

use crate::config::ModelConfig;
use crate::error::{ChurnError, Result};
use crate::models::classifier::Classifier;

/// A fitted classifier plus its catalog metadata
pub struct ModelEntry {
    pub key: String,
    pub display_name: String,
    pub description: String,
    /// Headline strength shown in the catalog
    pub strength: String,
    pub classifier: Box<dyn Classifier>,
}

impl ModelEntry {
    pub fn new(config: &ModelConfig, classifier: Box<dyn Classifier>) -> Self {
        Self {
            key: config.key.clone(),
            display_name: config.display_name.clone(),
            description: config.description.clone(),
            strength: config.strength.clone(),
            classifier,
        }
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("family", &self.classifier.family())
            .finish()
    }
}

/// Registry in configured (display) order.
#[derive(Debug)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    default_key: String,
}

impl ModelRegistry {
    pub fn new(entries: Vec<ModelEntry>, default_key: &str) -> Result<Self> {
        if !entries.iter().any(|e| e.key == default_key) {
            return Err(ChurnError::UnknownModel(default_key.to_string()));
        }
        Ok(Self {
            entries,
            default_key: default_key.to_string(),
        })
    }

    pub fn get(&self, key: &str) -> Result<&ModelEntry> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| ChurnError::UnknownModel(key.to_string()))
    }

    /// Entry used when the request names no model.
    pub fn default_entry(&self) -> Result<&ModelEntry> {
        self.get(&self.default_key)
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
