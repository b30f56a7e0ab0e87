use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored for any field the triggering notification did not carry
pub const ABSENT: &str = "None";

/// Retention ledger record: when the addresses submitted in one set update
/// are due to leave the set again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Set id (partition key)
    #[serde(rename = "IPSetId")]
    pub ip_set_id: String,

    /// Set name
    #[serde(rename = "IPSetName")]
    pub ip_set_name: String,

    /// Set scope
    #[serde(rename = "Scope")]
    pub scope: String,

    /// Address list submitted with the update
    #[serde(rename = "IPAddressList")]
    pub ip_address_list: Vec<String>,

    /// Token presented with the update
    #[serde(rename = "LockToken")]
    pub lock_token: String,

    /// Effective retention window, never below the floor
    #[serde(rename = "IPRetentionPeriodMinute")]
    pub retention_minutes: u32,

    /// Wall-clock epoch seconds when the entry was built
    #[serde(rename = "CreationTime")]
    pub creation_time: i64,

    /// Epoch seconds after which the addresses should be removed
    #[serde(rename = "ExpirationTime")]
    pub expiration_time: i64,

    /// Stack that owns the retention pipeline
    #[serde(rename = "CreatedByUser")]
    pub created_by_user: String,
}

impl LedgerEntry {
    /// Expiration as a UTC timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiration_time, 0)
    }

    /// Returns true if every identity field fell back to [`ABSENT`]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.ip_set_id == ABSENT && self.ip_set_name == ABSENT && self.scope == ABSENT
    }
}
