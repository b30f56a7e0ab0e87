//! Retention recording: turn set-mutation notifications into ledger entries.
//!
//! Every accepted set update produces a notification. The recorder writes an
//! entry saying when the submitted addresses are due to expire, unless:
//!
//! - the update was made by the expiry reaper itself (its removals must not
//!   re-arm retention for the addresses that remain), or
//! - retention is disabled for the set's category.
//!
//! Windows below [`MIN_RETENTION_MINUTES`] are raised to it. Disabled and
//! floored are different states: `0` and negatives disable, `1..15` floor.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use wafguard_client::RetentionLedger;
use wafguard_core::{GuardError, LedgerEntry, MutationDetail, Result, ABSENT};

use crate::config::RetentionConfig;

/// Shortest window ever persisted
pub const MIN_RETENTION_MINUTES: u32 = 15;

/// Timestamp format of mutation notifications
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Wall-clock source for entry creation times
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Who performed a set update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorClass {
    /// A person or any system other than the reaper
    HumanOrOtherSystem,
    /// The expiry reaper removing expired addresses
    ExpiryReaper,
}

/// Classify the principal behind a set update. An empty role name matches
/// nothing.
#[must_use]
pub fn classify_actor(actor_arn: &str, reaper_role: &str) -> ActorClass {
    if !reaper_role.is_empty() && actor_arn.contains(reaper_role) {
        ActorClass::ExpiryReaper
    } else {
        ActorClass::HumanOrOtherSystem
    }
}

/// Effective retention for a set category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionWindow {
    /// No ledger entries are written
    Disabled,
    /// Addresses expire this many minutes after the update
    Minutes(u32),
}

impl RetentionWindow {
    /// Resolve a configured window: `<= 0` disables, anything below the
    /// floor is raised to it. Windows above [`u32::MAX`] are rejected when
    /// the configuration is loaded; here they clamp.
    #[must_use]
    pub fn from_configured(minutes: i64) -> Self {
        if minutes <= 0 {
            return Self::Disabled;
        }
        let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
        Self::Minutes(minutes.max(MIN_RETENTION_MINUTES))
    }
}

/// Epoch seconds `minutes` after `event_time` (`YYYY-MM-DDTHH:MM:SSZ`, UTC)
pub fn expiration_epoch(event_time: &str, minutes: u32) -> Result<i64> {
    let start = NaiveDateTime::parse_from_str(event_time, EVENT_TIME_FORMAT)
        .map_err(|e| GuardError::validation(format!("invalid event time {event_time:?}: {e}")))?
        .and_utc();
    let end = start
        .checked_add_signed(TimeDelta::minutes(i64::from(minutes)))
        .ok_or_else(|| GuardError::validation(format!("expiration overflows for {event_time}")))?;
    Ok(end.timestamp())
}

/// Why a notification produced no ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The update came from the expiry reaper
    ExpiryReaper,
    /// Retention is disabled for the set's category
    RetentionDisabled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpiryReaper => {
                f.write_str("set update was made by the expiry reaper, not a user; skipped")
            }
            Self::RetentionDisabled => f.write_str("IP retention is not enabled for this set; skipped"),
        }
    }
}

/// Result of handling one notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Outcome")]
pub enum RecordOutcome {
    /// An entry was written
    Recorded(LedgerEntry),
    /// Nothing was written
    Skipped {
        /// Machine-readable reason
        #[serde(rename = "Reason")]
        reason: SkipReason,
        /// Human-readable reason
        #[serde(rename = "Message")]
        message: String,
    },
}

impl RecordOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped {
            reason,
            message: reason.to_string(),
        }
    }

    /// The written entry, if any
    #[must_use]
    pub const fn entry(&self) -> Option<&LedgerEntry> {
        match self {
            Self::Recorded(entry) => Some(entry),
            Self::Skipped { .. } => None,
        }
    }
}

/// Writes retention ledger entries for set-mutation notifications
pub struct RetentionRecorder {
    ledger: Arc<dyn RetentionLedger>,
    config: RetentionConfig,
    clock: Clock,
}

impl RetentionRecorder {
    /// Recorder using the system clock
    pub fn new(ledger: Arc<dyn RetentionLedger>, config: RetentionConfig) -> Self {
        Self {
            ledger,
            config,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall-clock source
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Classify the actor behind a notification
    #[must_use]
    pub fn actor_class(&self, detail: &MutationDetail) -> ActorClass {
        classify_actor(
            detail.actor_arn(),
            self.config.reaper_role_name.as_deref().unwrap_or_default(),
        )
    }

    /// Record one notification.
    ///
    /// A notification without request parameters still produces an entry,
    /// with every identity field set to [`ABSENT`] and an empty address list.
    /// A notification without an actor ARN is treated as a non-reaper update.
    #[instrument(skip_all, fields(actor = detail.actor_arn()))]
    pub async fn record(&self, detail: &MutationDetail) -> Result<RecordOutcome> {
        if self.actor_class(detail) == ActorClass::ExpiryReaper {
            info!("update made by the expiry reaper; not recording retention");
            return Ok(RecordOutcome::skipped(SkipReason::ExpiryReaper));
        }

        let set_name = detail
            .request_parameters
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or(ABSENT);

        let minutes = match RetentionWindow::from_configured(self.config.configured_minutes(set_name)) {
            RetentionWindow::Disabled => {
                info!(set = set_name, "IP retention is not set; nothing to record");
                return Ok(RecordOutcome::skipped(SkipReason::RetentionDisabled));
            }
            RetentionWindow::Minutes(minutes) => minutes,
        };

        let entry = self.make_entry(detail, minutes)?;

        if let Err(e) = self.ledger.put_entry(&entry).await {
            error!(error = %e, set = %entry.ip_set_name, "failed to write retention entry");
            return Err(e);
        }

        info!(
            set = %entry.ip_set_name,
            minutes,
            expires = entry.expiration_time,
            "retention entry written"
        );
        Ok(RecordOutcome::Recorded(entry))
    }

    fn make_entry(&self, detail: &MutationDetail, minutes: u32) -> Result<LedgerEntry> {
        let event_time = detail
            .event_time
            .as_deref()
            .ok_or_else(|| GuardError::validation("notification has no eventTime"))?;
        let expiration_time = expiration_epoch(event_time, minutes)?;

        let params = detail.request_parameters.clone().unwrap_or_else(|| {
            warn!("notification carries no request parameters; recording placeholder entry");
            Default::default()
        });
        let or_absent = |value: Option<String>| value.unwrap_or_else(|| ABSENT.to_string());

        Ok(LedgerEntry {
            ip_set_id: or_absent(params.id),
            ip_set_name: or_absent(params.name),
            scope: or_absent(params.scope),
            ip_address_list: params.addresses.unwrap_or_default(),
            lock_token: or_absent(params.lock_token),
            retention_minutes: minutes,
            creation_time: (self.clock)().timestamp(),
            expiration_time,
            created_by_user: or_absent(self.config.stack_name.clone()),
        })
    }
}
