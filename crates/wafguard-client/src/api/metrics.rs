//! Request metric and usage report endpoints.

use crate::WafClient;
use serde::Deserialize;
use std::time::Duration;
use wafguard_core::{GuardError, Result, UsageSnapshot};

#[derive(Debug, Deserialize)]
struct MetricSum {
    #[serde(rename = "Sum", default)]
    sum: u64,
}

/// Request metric and usage report endpoints
pub struct MetricsApi<'a> {
    client: &'a WafClient,
}

impl<'a> MetricsApi<'a> {
    pub(crate) const fn new(client: &'a WafClient) -> Self {
        Self { client }
    }

    /// Sum of a request metric (`AllowedRequests`, `BlockedRequests`) for a
    /// rule over the trailing period
    pub async fn sum(&self, metric: &str, rule: &str, period: Duration) -> Result<u64> {
        let period = period.as_secs().to_string();
        let response: MetricSum = self
            .client
            .get(&["metrics", metric], &[("rule", rule), ("period", period.as_str())])
            .await?;
        Ok(response.sum)
    }

    /// Post an anonymized usage report
    pub async fn send_usage(&self, snapshot: &UsageSnapshot) -> Result<()> {
        let url = self
            .client
            .usage_url()
            .ok_or_else(|| GuardError::Config(String::from("no usage report URL configured")))?;
        self.client.post_to(url, snapshot).await
    }
}
