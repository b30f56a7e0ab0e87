//! In-process backends.
//!
//! These honor the same contracts as the HTTP client: the set store rotates
//! its lock token on every accepted update and rejects stale tokens without
//! touching the set.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use wafguard_core::{
    GuardError, IpSetRef, IpSetSnapshot, LedgerEntry, Result, Scope, UsageSnapshot,
};

use crate::store::{RequestMetrics, RetentionLedger, SetStore, UsageSink};

#[derive(Debug, Clone)]
struct StoredSet {
    addresses: Vec<String>,
    lock_token: String,
}

/// Versioned IP sets held in memory
#[derive(Debug, Default)]
pub struct MemorySetStore {
    sets: Mutex<HashMap<(Scope, String), StoredSet>>,
    generation: AtomicU64,
    updates: AtomicUsize,
}

impl MemorySetStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a set with initial contents
    #[must_use]
    pub fn with_set<I, S>(mut self, scope: Scope, set: &IpSetRef, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lock_token = self.next_token();
        self.sets.get_mut().insert(
            (scope, set.id.clone()),
            StoredSet {
                addresses: addresses.into_iter().map(Into::into).collect(),
                lock_token,
            },
        );
        self
    }

    /// Current addresses of a set, if it exists
    pub async fn addresses(&self, scope: Scope, set: &IpSetRef) -> Option<Vec<String>> {
        self.sets
            .lock()
            .await
            .get(&(scope, set.id.clone()))
            .map(|stored| stored.addresses.clone())
    }

    /// Number of accepted updates
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Rotate a set's token as if another writer had updated it
    pub async fn touch(&self, scope: Scope, set: &IpSetRef) {
        let token = self.next_token();
        if let Some(stored) = self.sets.lock().await.get_mut(&(scope, set.id.clone())) {
            stored.lock_token = token;
        }
    }

    fn next_token(&self) -> String {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{generation}")
    }
}

#[async_trait]
impl SetStore for MemorySetStore {
    async fn get_ip_set(&self, scope: Scope, set: &IpSetRef) -> Result<IpSetSnapshot> {
        self.sets
            .lock()
            .await
            .get(&(scope, set.id.clone()))
            .map(|stored| IpSetSnapshot {
                addresses: stored.addresses.clone(),
                lock_token: stored.lock_token.clone(),
            })
            .ok_or_else(|| GuardError::NotFound {
                resource: format!("IP set {set}"),
            })
    }

    async fn update_ip_set(
        &self,
        scope: Scope,
        set: &IpSetRef,
        addresses: &[String],
        lock_token: &str,
    ) -> Result<String> {
        let mut sets = self.sets.lock().await;
        let stored = sets
            .get_mut(&(scope, set.id.clone()))
            .ok_or_else(|| GuardError::NotFound {
                resource: format!("IP set {set}"),
            })?;

        if stored.lock_token != lock_token {
            return Err(GuardError::TokenMismatch {
                set: set.name.clone(),
            });
        }

        stored.addresses = addresses.to_vec();
        stored.lock_token = self.next_token();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored.lock_token.clone())
    }
}

/// Retention ledger held in memory
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose writes all fail with a persistence error
    #[must_use]
    pub fn unavailable() -> Self {
        let ledger = Self::default();
        ledger.unavailable.store(true, Ordering::SeqCst);
        ledger
    }

    /// Snapshot of the stored entries
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().await.clone()
    }

    /// Number of write attempts, successful or not
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetentionLedger for MemoryLedger {
    async fn put_entry(&self, entry: &LedgerEntry) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GuardError::Persistence(String::from("ledger unavailable")));
        }

        let mut entries = self.entries.lock().await;
        let same_key = |e: &LedgerEntry| {
            e.ip_set_id == entry.ip_set_id
                && e.ip_set_name == entry.ip_set_name
                && e.scope == entry.scope
        };
        match entries.iter_mut().find(|e| same_key(e)) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        Ok(())
    }
}

/// Fixed request counters keyed by (metric, rule)
#[derive(Debug, Default)]
pub struct StaticMetrics {
    sums: HashMap<(String, String), u64>,
}

impl StaticMetrics {
    /// No counters; every lookup fails
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a counter
    #[must_use]
    pub fn with_sum(mut self, metric: &str, rule: &str, sum: u64) -> Self {
        self.sums.insert((metric.to_string(), rule.to_string()), sum);
        self
    }
}

#[async_trait]
impl RequestMetrics for StaticMetrics {
    async fn request_sum(&self, metric: &str, rule: &str, _period: Duration) -> Result<u64> {
        self.sums
            .get(&(metric.to_string(), rule.to_string()))
            .copied()
            .ok_or_else(|| GuardError::Upstream(format!("no datapoints for {metric}/{rule}")))
    }
}

/// Usage sink that keeps every report it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<UsageSnapshot>>,
    failing: bool,
}

impl RecordingSink {
    /// Sink that accepts reports
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects every report
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Reports received so far
    pub async fn reports(&self) -> Vec<UsageSnapshot> {
        self.reports.lock().await.clone()
    }
}

#[async_trait]
impl UsageSink for RecordingSink {
    async fn send_usage(&self, snapshot: &UsageSnapshot) -> Result<()> {
        if self.failing {
            return Err(GuardError::Upstream(String::from("usage endpoint unreachable")));
        }
        self.reports.lock().await.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4() -> IpSetRef {
        IpSetRef::new("badbot-v4", "id-4")
    }

    #[tokio::test]
    async fn test_update_rotates_token() {
        let store = MemorySetStore::new().with_set(Scope::Regional, &v4(), ["198.51.100.0/24"]);
        let snapshot = store.get_ip_set(Scope::Regional, &v4()).await.unwrap();

        let next = store
            .update_ip_set(
                Scope::Regional,
                &v4(),
                &["203.0.113.5/32".to_string()],
                &snapshot.lock_token,
            )
            .await
            .unwrap();

        assert_ne!(next, snapshot.lock_token);
        assert_eq!(store.update_count(), 1);
        assert_eq!(
            store.addresses(Scope::Regional, &v4()).await.unwrap(),
            vec!["203.0.113.5/32"]
        );
    }

    #[tokio::test]
    async fn test_stale_token_rejected_without_effect() {
        let store = MemorySetStore::new().with_set(Scope::Regional, &v4(), ["198.51.100.0/24"]);
        let snapshot = store.get_ip_set(Scope::Regional, &v4()).await.unwrap();
        store.touch(Scope::Regional, &v4()).await;

        let err = store
            .update_ip_set(Scope::Regional, &v4(), &[], &snapshot.lock_token)
            .await
            .unwrap_err();

        assert!(matches!(err, GuardError::TokenMismatch { .. }));
        assert_eq!(store.update_count(), 0);
        assert_eq!(
            store.addresses(Scope::Regional, &v4()).await.unwrap(),
            vec!["198.51.100.0/24"]
        );
    }

    #[tokio::test]
    async fn test_scopes_are_distinct() {
        let store = MemorySetStore::new().with_set(Scope::Regional, &v4(), Vec::<String>::new());
        let err = store.get_ip_set(Scope::CloudFront, &v4()).await.unwrap_err();
        assert!(matches!(err, GuardError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_address_count_default_method() {
        let store = MemorySetStore::new().with_set(
            Scope::Regional,
            &v4(),
            ["198.51.100.0/24", "203.0.113.5/32"],
        );
        assert_eq!(store.address_count(Scope::Regional, &v4()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ledger_upserts_by_key() {
        let ledger = MemoryLedger::new();
        let entry = LedgerEntry {
            ip_set_id: "id-4".into(),
            ip_set_name: "badbot-v4".into(),
            scope: "REGIONAL".into(),
            ip_address_list: vec![],
            lock_token: "token-1".into(),
            retention_minutes: 15,
            creation_time: 0,
            expiration_time: 900,
            created_by_user: "stack".into(),
        };
        ledger.put_entry(&entry).await.unwrap();
        let replacement = LedgerEntry {
            lock_token: "token-2".into(),
            ..entry
        };
        ledger.put_entry(&replacement).await.unwrap();

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lock_token, "token-2");
        assert_eq!(ledger.write_attempts(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_ledger() {
        let ledger = MemoryLedger::unavailable();
        let entry = LedgerEntry {
            ip_set_id: "id".into(),
            ip_set_name: "name".into(),
            scope: "REGIONAL".into(),
            ip_address_list: vec![],
            lock_token: "t".into(),
            retention_minutes: 15,
            creation_time: 0,
            expiration_time: 0,
            created_by_user: "stack".into(),
        };
        let err = ledger.put_entry(&entry).await.unwrap_err();
        assert!(matches!(err, GuardError::Persistence(_)));
        assert!(ledger.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_static_metrics_lookup() {
        let metrics = StaticMetrics::new().with_sum("AllowedRequests", "ALL", 42);
        let period = Duration::from_secs(60);
        assert_eq!(
            metrics.request_sum("AllowedRequests", "ALL", period).await.unwrap(),
            42
        );
        assert!(metrics.request_sum("BlockedRequests", "ALL", period).await.is_err());
    }
}
