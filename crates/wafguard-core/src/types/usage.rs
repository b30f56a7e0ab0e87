use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rolling window the usage counters cover
pub const USAGE_WINDOW: Duration = Duration::from_secs(12 * 3600);

/// Anonymized usage report, rebuilt from scratch every reporting cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Report category
    pub data_type: String,

    /// Combined size of the v4 and v6 bad-bot sets
    pub bad_bot_ip_set_size: u64,

    /// Requests allowed by any rule in the window
    pub allowed_requests: u64,

    /// Requests blocked by any rule in the window
    pub blocked_requests_all: u64,

    /// Requests blocked by the bad-bot rule in the window
    pub blocked_requests_bad_bot: u64,

    /// Front-end type the firewall protects
    pub waf_type: Option<String>,

    /// How the stack was provisioned
    pub provisioner: String,
}

impl UsageSnapshot {
    /// Empty bad-bot report
    #[must_use]
    pub fn bad_bot(waf_type: Option<String>, provisioner: impl Into<String>) -> Self {
        Self {
            data_type: String::from("bad_bot"),
            bad_bot_ip_set_size: 0,
            allowed_requests: 0,
            blocked_requests_all: 0,
            blocked_requests_bad_bot: 0,
            waf_type,
            provisioner: provisioner.into(),
        }
    }
}
