//! API endpoint modules and their capability trait bindings.

mod ipset;
mod ledger;
mod metrics;

pub use ipset::IpSetApi;
pub use ledger::{LedgerApi, TableLedger};
pub use metrics::MetricsApi;

use crate::store::{RequestMetrics, SetStore, UsageSink};
use crate::WafClient;
use async_trait::async_trait;
use std::time::Duration;
use wafguard_core::{IpSetRef, IpSetSnapshot, Result, Scope, UsageSnapshot};

#[async_trait]
impl SetStore for WafClient {
    async fn get_ip_set(&self, scope: Scope, set: &IpSetRef) -> Result<IpSetSnapshot> {
        self.ip_sets().get(scope, set).await
    }

    async fn update_ip_set(
        &self,
        scope: Scope,
        set: &IpSetRef,
        addresses: &[String],
        lock_token: &str,
    ) -> Result<String> {
        self.ip_sets()
            .update(scope, set, addresses.to_vec(), lock_token)
            .await
    }
}

#[async_trait]
impl RequestMetrics for WafClient {
    async fn request_sum(&self, metric: &str, rule: &str, period: Duration) -> Result<u64> {
        self.metrics().sum(metric, rule, period).await
    }
}

#[async_trait]
impl UsageSink for WafClient {
    async fn send_usage(&self, snapshot: &UsageSnapshot) -> Result<()> {
        self.metrics().send_usage(snapshot).await
    }
}
