//! Per-process prediction statistics.

use crate::interpret::{ConfidenceTier, PredictionResult};
use crate::types::ChurnLabel;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept before the oldest half is dropped
const MAX_LATENCY_SAMPLES: usize = 10_000;
/// Agreement samples kept before the oldest half is dropped
const MAX_AGREEMENT_SAMPLES: usize = 1_000;

/// Metrics collector for one console session
pub struct SessionMetrics {
    /// Predictions that produced a result
    pub predictions: AtomicU64,
    /// Predictions that failed
    pub failures: AtomicU64,
    pub churn_count: AtomicU64,
    pub no_churn_count: AtomicU64,
    by_model: RwLock<BTreeMap<String, u64>>,
    by_tier: RwLock<BTreeMap<ConfidenceTier, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Model agreement per comparison run
    agreements: RwLock<Vec<f64>>,
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            churn_count: AtomicU64::new(0),
            no_churn_count: AtomicU64::new(0),
            by_model: RwLock::new(BTreeMap::new()),
            by_tier: RwLock::new(BTreeMap::new()),
            latencies: RwLock::new(Vec::with_capacity(64)),
            agreements: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, result: &PredictionResult, latency: Duration) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        match result.label {
            ChurnLabel::Churn => self.churn_count.fetch_add(1, Ordering::Relaxed),
            ChurnLabel::NoChurn => self.no_churn_count.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut by_model) = self.by_model.write() {
            *by_model.entry(result.model.clone()).or_insert(0) += 1;
        }
        if let Ok(mut by_tier) = self.by_tier.write() {
            *by_tier.entry(result.tier).or_insert(0) += 1;
        }
        self.record_latency(latency);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, latency: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            if times.len() > MAX_LATENCY_SAMPLES {
                times.drain(0..MAX_LATENCY_SAMPLES / 2);
            }
        }
    }

    /// Record consensus agreement from a comparison run
    pub fn record_agreement(&self, agreement: f64) {
        if let Ok(mut agreements) = self.agreements.write() {
            agreements.push(agreement);
            if agreements.len() > MAX_AGREEMENT_SAMPLES {
                agreements.drain(0..MAX_AGREEMENT_SAMPLES / 2);
            }
        }
    }

    pub fn latency_stats(&self) -> LatencyStats {
        let Ok(times) = self.latencies.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = times.clone();
        sorted.sort_unstable();
        let count = sorted.len();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sorted.iter().sum::<u64>() / count as u64,
            p50_us: at(0.50),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    pub fn avg_agreement(&self) -> Option<f64> {
        let agreements = self.agreements.read().ok()?;
        if agreements.is_empty() {
            return None;
        }
        Some(agreements.iter().sum::<f64>() / agreements.len() as f64)
    }

    pub fn predictions_by_model(&self) -> BTreeMap<String, u64> {
        self.by_model.read().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn tier_distribution(&self) -> BTreeMap<ConfidenceTier, u64> {
        self.by_tier.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let total = self.predictions.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        if total == 0 && failures == 0 {
            return;
        }

        let churn = self.churn_count.load(Ordering::Relaxed);
        let latency = self.latency_stats();

        info!(
            predictions = total,
            failures,
            churn,
            no_churn = self.no_churn_count.load(Ordering::Relaxed),
            elapsed_ms = self.start_time.elapsed().as_millis() as u64,
            "Session summary"
        );
        info!(
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            max_us = latency.max_us,
            "Prediction latency"
        );
        for (model, count) in self.predictions_by_model() {
            info!(model = %model, count, "Predictions by model");
        }
        for (tier, count) in self.tier_distribution() {
            info!(tier = %tier, count, "Confidence tier");
        }
        if let Some(agreement) = self.avg_agreement() {
            info!(agreement_pct = agreement * 100.0, "Model agreement");
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
