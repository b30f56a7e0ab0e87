//! Capability traits the control loop depends on.

use async_trait::async_trait;
use std::time::Duration;
use wafguard_core::{IpSetRef, IpSetSnapshot, LedgerEntry, Result, Scope, UsageSnapshot};

/// Versioned IP set storage with optimistic concurrency.
///
/// Every read hands back a lock token; every update must present the token
/// from its read. A stale token fails with
/// [`GuardError::TokenMismatch`](wafguard_core::GuardError::TokenMismatch)
/// and leaves the set untouched.
#[async_trait]
pub trait SetStore: Send + Sync {
    /// Fetch the current addresses and lock token of a set
    async fn get_ip_set(&self, scope: Scope, set: &IpSetRef) -> Result<IpSetSnapshot>;

    /// Replace the set's addresses, returning the next lock token
    async fn update_ip_set(
        &self,
        scope: Scope,
        set: &IpSetRef,
        addresses: &[String],
        lock_token: &str,
    ) -> Result<String>;

    /// Number of networks currently in a set
    async fn address_count(&self, scope: Scope, set: &IpSetRef) -> Result<usize> {
        Ok(self.get_ip_set(scope, set).await?.addresses.len())
    }
}

/// Durable store of retention records
#[async_trait]
pub trait RetentionLedger: Send + Sync {
    /// Insert or replace the entry under its (id, name, scope) key
    async fn put_entry(&self, entry: &LedgerEntry) -> Result<()>;
}

/// Source of firewall request counters
#[async_trait]
pub trait RequestMetrics: Send + Sync {
    /// Sum of `metric` for `rule` over the trailing `period`
    async fn request_sum(&self, metric: &str, rule: &str, period: Duration) -> Result<u64>;
}

/// Destination for anonymized usage reports
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Deliver one report
    async fn send_usage(&self, snapshot: &UsageSnapshot) -> Result<()>;
}
