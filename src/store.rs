//! Process-wide artifact store, loaded once and read-only afterwards

use crate::config::ArtifactsConfig;
use crate::encoder::{FeatureEncoder, FeatureSchema};
use crate::error::{ChurnError, Result};
use crate::models::loader::ModelLoader;
use crate::models::registry::ModelRegistry;
use crate::scaler::Scaler;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Schema, scaler and classifiers from one training run.
#[derive(Debug)]
pub struct ArtifactStore {
    schema: FeatureSchema,
    scaler: Scaler,
    registry: ModelRegistry,
    loaded_at: DateTime<Utc>,
}

impl ArtifactStore {
    /// Read every artifact named in the configuration.
    pub fn load(config: &ArtifactsConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads);
        let schema = loader.load_schema(config.schema_path())?;
        let scaler = loader.load_scaler(config.scaler_path(), &schema)?;
        let registry = loader.load_all(config, &schema)?;
        Self::from_parts(schema, scaler, registry)
    }

    /// Assemble a store from in-memory parts, checking every dimension.
    pub fn from_parts(
        schema: FeatureSchema,
        scaler: Scaler,
        registry: ModelRegistry,
    ) -> Result<Self> {
        if scaler.n_features() != schema.len() {
            return Err(ChurnError::SchemaMismatch {
                context: "scaler".to_string(),
                expected: schema.len(),
                actual: scaler.n_features(),
            });
        }
        for entry in registry.iter() {
            if entry.classifier.n_features() != schema.len() {
                return Err(ChurnError::SchemaMismatch {
                    context: format!("model '{}'", entry.key),
                    expected: schema.len(),
                    actual: entry.classifier.n_features(),
                });
            }
        }

        Ok(Self {
            schema,
            scaler,
            registry,
            loaded_at: Utc::now(),
        })
    }

    pub fn encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.schema, &self.scaler)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

type StoreLoader = Box<dyn Fn() -> Result<ArtifactStore> + Send + Sync>;

/// Lazily loads the store on first use and hands out shared references.
///
/// Callers keep their `Arc` for the whole request, so `invalidate` never
/// affects a prediction in flight.
pub struct ArtifactCache {
    loader: StoreLoader,
    store: RwLock<Option<Arc<ArtifactStore>>>,
    loads: AtomicU64,
}

impl ArtifactCache {
    pub fn new(config: ArtifactsConfig) -> Self {
        Self::with_loader(move || ArtifactStore::load(&config))
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<ArtifactStore> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            store: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached store, loading it first if needed.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn get_or_load(&self) -> Result<Arc<ArtifactStore>> {
        if let Some(store) = self.read_slot().as_ref() {
            return Ok(Arc::clone(store));
        }

        let mut slot = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have loaded while we waited for the lock.
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new((self.loader)()?);
        let loads = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            models = store.registry().len(),
            features = store.schema().len(),
            loads,
            "Artifact store initialized"
        );
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Drop the cached store so the next `get_or_load` reloads from disk.
    pub fn invalidate(&self) {
        let mut slot = self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.take().is_some() {
            warn!("Artifact store invalidated");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Number of successful loads since creation
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<ArtifactStore>>> {
        self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = ArtifactCache::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            demo::store()
        });

        assert!(!cache.is_loaded());
        let first = cache.get_or_load().unwrap();
        let second = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_invalidate_reloads_without_touching_holders() {
        let cache = ArtifactCache::with_loader(demo::store);
        let before = cache.get_or_load().unwrap();

        cache.invalidate();
        assert!(!cache.is_loaded());

        let after = cache.get_or_load().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.registry().len(), 4);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_failed_load_not_cached() {
        let cache =
            ArtifactCache::with_loader(|| Err(ChurnError::artifact("scaler.json", "missing")));
        assert!(cache.get_or_load().unwrap_err().is_fatal());
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn test_from_parts_rejects_scaler_width() {
        let schema = demo::telco_schema().unwrap();
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = ArtifactStore::from_parts(schema, scaler, demo::registry().unwrap()).unwrap_err();
        assert!(matches!(err, ChurnError::SchemaMismatch { actual: 3, .. }));
    }

    #[test]
    fn test_concurrent_readers_share_one_store() {
        let cache = Arc::new(ArtifactCache::with_loader(demo::store));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_load().map(|s| Arc::as_ptr(&s) as usize))
            })
            .collect();

        let ptrs: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.load_count(), 1);
    }
}
