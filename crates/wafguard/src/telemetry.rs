//! Anonymized usage reporting.
//!
//! Reports are triggered after a successful admission and are strictly best
//! effort: the admission controller logs a failed report and moves on.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wafguard_client::{RequestMetrics, SetStore, UsageSink};
use wafguard_core::{FamilySets, Result, Scope, UsageSnapshot, USAGE_WINDOW};

use crate::config::TelemetryConfig;

/// Metric counting allowed requests
pub const ALLOWED_REQUESTS: &str = "AllowedRequests";
/// Metric counting blocked requests
pub const BLOCKED_REQUESTS: &str = "BlockedRequests";
/// Rule name aggregating every rule
pub const ALL_RULES: &str = "ALL";

/// Something that reacts to a completed admission
#[async_trait]
pub trait UsageTelemetry: Send + Sync {
    /// Aggregate and ship a usage report for the admission sets
    async fn report(&self, scope: Scope, sets: &FamilySets) -> Result<()>;
}

/// Telemetry turned off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

#[async_trait]
impl UsageTelemetry for NoopTelemetry {
    async fn report(&self, _scope: Scope, _sets: &FamilySets) -> Result<()> {
        Ok(())
    }
}

/// Builds [`UsageSnapshot`]s from set sizes and request counters
pub struct UsageReporter {
    store: Arc<dyn SetStore>,
    metrics: Arc<dyn RequestMetrics>,
    sink: Arc<dyn UsageSink>,
    waf_type: Option<String>,
    provisioner: String,
    bad_bot_rule: String,
    window: Duration,
}

impl UsageReporter {
    /// Create a reporter over the given backends
    pub fn new(
        store: Arc<dyn SetStore>,
        metrics: Arc<dyn RequestMetrics>,
        sink: Arc<dyn UsageSink>,
        config: &TelemetryConfig,
    ) -> Self {
        Self {
            store,
            metrics,
            sink,
            waf_type: config.waf_type.clone(),
            provisioner: config.provisioner.clone(),
            bad_bot_rule: format!("{}BadBotRule", config.metric_name_prefix),
            window: USAGE_WINDOW,
        }
    }

    /// Aggregate a fresh snapshot. Set size lookups must succeed; a counter
    /// without datapoints reads as zero.
    pub async fn snapshot(&self, scope: Scope, sets: &FamilySets) -> Result<UsageSnapshot> {
        let mut snapshot = UsageSnapshot::bad_bot(self.waf_type.clone(), self.provisioner.clone());

        snapshot.allowed_requests = self.counter(ALLOWED_REQUESTS, ALL_RULES).await;
        snapshot.blocked_requests_all = self.counter(BLOCKED_REQUESTS, ALL_RULES).await;

        let v4 = self.store.address_count(scope, &sets.v4).await?;
        let v6 = self.store.address_count(scope, &sets.v6).await?;
        snapshot.bad_bot_ip_set_size = (v4 + v6) as u64;
        snapshot.blocked_requests_bad_bot = self.counter(BLOCKED_REQUESTS, &self.bad_bot_rule).await;

        Ok(snapshot)
    }

    async fn counter(&self, metric: &str, rule: &str) -> u64 {
        match self.metrics.request_sum(metric, rule, self.window).await {
            Ok(sum) => sum,
            Err(e) => {
                debug!(metric, rule, error = %e, "metric unavailable, reporting 0");
                0
            }
        }
    }
}

#[async_trait]
impl UsageTelemetry for UsageReporter {
    async fn report(&self, scope: Scope, sets: &FamilySets) -> Result<()> {
        let snapshot = self.snapshot(scope, sets).await?;
        info!(?snapshot, "sending usage data");
        if let Err(e) = self.sink.send_usage(&snapshot).await {
            warn!(error = %e, "usage report rejected");
            return Err(e);
        }
        Ok(())
    }
}
