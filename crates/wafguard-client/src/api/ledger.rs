//! Retention ledger API endpoints.

use crate::store::RetentionLedger;
use crate::WafClient;
use async_trait::async_trait;
use wafguard_core::{GuardError, LedgerEntry, Result};

/// Retention ledger API endpoints for one table
pub struct LedgerApi<'a> {
    client: &'a WafClient,
    table: String,
}

impl<'a> LedgerApi<'a> {
    pub(crate) const fn new(client: &'a WafClient, table: String) -> Self {
        Self { client, table }
    }

    /// Insert or replace an entry. Every failure surfaces as
    /// [`GuardError::Persistence`].
    pub async fn put(&self, entry: &LedgerEntry) -> Result<()> {
        self.client
            .put_empty(&["tables", self.table.as_str(), "items"], entry)
            .await
            .map_err(|e| GuardError::Persistence(format!("table {}: {e}", self.table)))
    }
}

/// Owned handle on one ledger table, usable as a [`RetentionLedger`]
#[derive(Clone)]
pub struct TableLedger {
    client: WafClient,
    table: String,
}

impl TableLedger {
    /// Bind a client to a table
    #[must_use]
    pub fn new(client: WafClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Name of the bound table
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl RetentionLedger for TableLedger {
    async fn put_entry(&self, entry: &LedgerEntry) -> Result<()> {
        self.client.ledger(self.table.as_str()).put(entry).await
    }
}
