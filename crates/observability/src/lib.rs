use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    predictions_total: AtomicU64,
    validation_errors_total: AtomicU64,
    unknown_category_total: AtomicU64,
    contract_violations_total: AtomicU64,
    explainer_unavailable_total: AtomicU64,
    tier_low_total: AtomicU64,
    tier_medium_total: AtomicU64,
    tier_high_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_total: u64,
    pub validation_errors_total: u64,
    pub unknown_category_total: u64,
    pub contract_violations_total: u64,
    pub explainer_unavailable_total: u64,
    pub tiers: TierCounts,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counts one successful prediction under its fused tier label
    /// (`"LOW"`, `"MEDIUM"` or `"HIGH"`). Any other label counts towards
    /// the total only.
    pub fn record_prediction(&self, tier: &str, latency: Duration) {
        self.predictions_total.fetch_add(1, Ordering::Relaxed);
        self.total_latency_micros
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);

        let slot = match tier {
            "HIGH" => Some(&self.tier_high_total),
            "MEDIUM" => Some(&self.tier_medium_total),
            "LOW" => Some(&self.tier_low_total),
            _ => None,
        };
        if let Some(slot) = slot {
            slot.fetch_add(1, Ordering::Relaxed);
        }

        counter!("burnwatch_predictions_total", "tier" => tier.to_string()).increment(1);
    }

    pub fn inc_validation_error(&self) {
        self.validation_errors_total.fetch_add(1, Ordering::Relaxed);
        counter!("burnwatch_validation_errors_total").increment(1);
    }

    pub fn inc_unknown_category(&self) {
        self.unknown_category_total.fetch_add(1, Ordering::Relaxed);
        counter!("burnwatch_unknown_category_total").increment(1);
    }

    pub fn inc_contract_violation(&self) {
        self.contract_violations_total
            .fetch_add(1, Ordering::Relaxed);
        counter!("burnwatch_contract_violations_total").increment(1);
    }

    pub fn inc_explainer_unavailable(&self) {
        self.explainer_unavailable_total
            .fetch_add(1, Ordering::Relaxed);
        counter!("burnwatch_explainer_unavailable_total").increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let predictions = self.predictions_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            predictions_total: predictions,
            validation_errors_total: self.validation_errors_total.load(Ordering::Relaxed),
            unknown_category_total: self.unknown_category_total.load(Ordering::Relaxed),
            contract_violations_total: self.contract_violations_total.load(Ordering::Relaxed),
            explainer_unavailable_total: self.explainer_unavailable_total.load(Ordering::Relaxed),
            tiers: TierCounts {
                low: self.tier_low_total.load(Ordering::Relaxed),
                medium: self.tier_medium_total.load(Ordering::Relaxed),
                high: self.tier_high_total.load(Ordering::Relaxed),
            },
            avg_latency_millis: if predictions == 0 {
                0.0
            } else {
                latency as f64 / predictions as f64 / 1000.0
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info,burnwatch_pipeline=info", service_name))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
