//! Configuration for the admission and retention handlers.
//!
//! Deployed handlers read environment variables through
//! [`GuardConfig::from_env`]. Everything goes through
//! [`GuardConfig::from_lookup`], so tests hand in a map instead of mutating
//! the process environment. Local runs can use a TOML file instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use wafguard_core::{FamilySets, GuardError, IpSetRef, Result, Scope};

/// Environment key for the set scope.
pub const ENV_SCOPE: &str = "SCOPE";
/// Environment key for the v4 admission set name.
pub const ENV_SET_NAME_V4: &str = "IP_SET_NAME_BAD_BOTV4";
/// Environment key for the v4 admission set id.
pub const ENV_SET_ID_V4: &str = "IP_SET_ID_BAD_BOTV4";
/// Environment key for the v6 admission set name.
pub const ENV_SET_NAME_V6: &str = "IP_SET_NAME_BAD_BOTV6";
/// Environment key for the v6 admission set id.
pub const ENV_SET_ID_V6: &str = "IP_SET_ID_BAD_BOTV6";
/// Environment key for the allow-list retention window.
pub const ENV_ALLOWED_MINUTES: &str = "IP_RETENTION_PERIOD_ALLOWED_MINUTE";
/// Environment key for the deny-list retention window.
pub const ENV_DENIED_MINUTES: &str = "IP_RETENTION_PERIOD_DENIED_MINUTE";
/// Environment key for the expiry reaper's role name.
pub const ENV_REAPER_ROLE: &str = "REMOVE_EXPIRED_IP_LAMBDA_ROLE_NAME";
/// Environment key for the ledger table.
pub const ENV_TABLE_NAME: &str = "TABLE_NAME";
/// Environment key for the owning stack name.
pub const ENV_STACK_NAME: &str = "STACK_NAME";
/// Environment key for the allow-list set name marker.
pub const ENV_ALLOW_LIST_MARKER: &str = "ALLOW_LIST_MARKER";
/// Environment key enabling usage reports (`yes` to enable).
pub const ENV_SEND_USAGE: &str = "SEND_ANONYMIZED_USAGE_DATA";
/// Environment key for the protected front-end type.
pub const ENV_LOG_TYPE: &str = "LOG_TYPE";
/// Environment key for the provisioning tool.
pub const ENV_PROVISIONER: &str = "provisioner";
/// Environment key for the rule metric name prefix.
pub const ENV_METRIC_PREFIX: &str = "METRIC_NAME_PREFIX";
/// Environment key for the store API base URL.
pub const ENV_STORE_URL: &str = "WAFGUARD_STORE_URL";
/// Environment key for the usage report endpoint.
pub const ENV_USAGE_URL: &str = "WAFGUARD_METRICS_URL";
/// Environment key for the log filter.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Retention window value meaning "retention disabled".
pub const RETENTION_DISABLED: i64 = -1;

/// Largest retention window a ledger entry can carry, in minutes.
pub const MAX_RETENTION_MINUTES: i64 = u32::MAX as i64;

/// Complete handler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Scope every set lives in.
    #[serde(default = "default_scope")]
    pub scope: Scope,

    /// Sets the access handler admits observed addresses into.
    #[serde(default)]
    pub admission_sets: Option<FamilySets>,

    /// Retention recorder settings.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Usage report settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Base URL of the set store / ledger API.
    #[serde(default)]
    pub store_url: Option<String>,

    /// `tracing` filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Retention recorder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Window for allow-list sets, in minutes (`<= 0` disables).
    #[serde(default = "default_retention_minutes")]
    pub allowed_minutes: i64,

    /// Window for deny-list sets, in minutes (`<= 0` disables).
    #[serde(default = "default_retention_minutes")]
    pub denied_minutes: i64,

    /// Substring identifying allow-list set names.
    #[serde(default = "default_allow_list_marker")]
    pub allow_list_marker: String,

    /// Role name the expiry reaper runs as.
    #[serde(default)]
    pub reaper_role_name: Option<String>,

    /// Ledger table name.
    #[serde(default)]
    pub table_name: Option<String>,

    /// Stack recorded as the creator of ledger entries.
    #[serde(default)]
    pub stack_name: Option<String>,
}

/// Usage report settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Send anonymized usage reports after admissions.
    #[serde(default)]
    pub enabled: bool,

    /// Endpoint reports are posted to.
    #[serde(default)]
    pub usage_url: Option<String>,

    /// Front-end type the firewall protects.
    #[serde(default)]
    pub waf_type: Option<String>,

    /// Provisioning tool.
    #[serde(default = "default_provisioner")]
    pub provisioner: String,

    /// Prefix of per-rule metric names.
    #[serde(default)]
    pub metric_name_prefix: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            admission_sets: None,
            retention: RetentionConfig::default(),
            telemetry: TelemetryConfig::default(),
            store_url: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            allowed_minutes: RETENTION_DISABLED,
            denied_minutes: RETENTION_DISABLED,
            allow_list_marker: default_allow_list_marker(),
            reaper_role_name: None,
            table_name: None,
            stack_name: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            usage_url: None,
            waf_type: None,
            provisioner: default_provisioner(),
            metric_name_prefix: String::new(),
        }
    }
}

impl RetentionConfig {
    /// Returns true if `set_name` names an allow-list set.
    #[must_use]
    pub fn is_allow_list(&self, set_name: &str) -> bool {
        !self.allow_list_marker.is_empty() && set_name.contains(&self.allow_list_marker)
    }

    /// Reject windows a ledger entry cannot carry.
    pub fn validate(&self) -> Result<()> {
        for (key, minutes) in [
            (ENV_ALLOWED_MINUTES, self.allowed_minutes),
            (ENV_DENIED_MINUTES, self.denied_minutes),
        ] {
            if minutes > MAX_RETENTION_MINUTES {
                return Err(GuardError::Config(format!(
                    "{key} must be at most {MAX_RETENTION_MINUTES} minutes, got {minutes}"
                )));
            }
        }
        Ok(())
    }

    /// Configured window, in minutes, for the set named `set_name`.
    #[must_use]
    pub fn configured_minutes(&self, set_name: &str) -> i64 {
        if self.is_allow_list(set_name) {
            self.allowed_minutes
        } else {
            self.denied_minutes
        }
    }
}

impl GuardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from a key/value map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Read configuration through an arbitrary lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scope = get(ENV_SCOPE)
            .map(|s| s.parse::<Scope>())
            .transpose()?
            .unwrap_or_else(default_scope);

        let admission_sets = match (
            get(ENV_SET_NAME_V4),
            get(ENV_SET_ID_V4),
            get(ENV_SET_NAME_V6),
            get(ENV_SET_ID_V6),
        ) {
            (Some(name4), Some(id4), Some(name6), Some(id6)) => Some(FamilySets {
                v4: IpSetRef::new(name4, id4),
                v6: IpSetRef::new(name6, id6),
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(GuardError::Config(format!(
                    "admission sets need all of {ENV_SET_NAME_V4}, {ENV_SET_ID_V4}, \
                     {ENV_SET_NAME_V6}, {ENV_SET_ID_V6}"
                )))
            }
        };

        let retention = RetentionConfig {
            allowed_minutes: parse_minutes(ENV_ALLOWED_MINUTES, get(ENV_ALLOWED_MINUTES))?,
            denied_minutes: parse_minutes(ENV_DENIED_MINUTES, get(ENV_DENIED_MINUTES))?,
            allow_list_marker: get(ENV_ALLOW_LIST_MARKER).unwrap_or_else(default_allow_list_marker),
            reaper_role_name: get(ENV_REAPER_ROLE),
            table_name: get(ENV_TABLE_NAME),
            stack_name: get(ENV_STACK_NAME),
        };
        retention.validate()?;

        let telemetry = TelemetryConfig {
            enabled: get(ENV_SEND_USAGE).is_some_and(|v| v.eq_ignore_ascii_case("yes")),
            usage_url: get(ENV_USAGE_URL),
            waf_type: get(ENV_LOG_TYPE),
            provisioner: get(ENV_PROVISIONER).unwrap_or_else(default_provisioner),
            metric_name_prefix: get(ENV_METRIC_PREFIX).unwrap_or_default(),
        };

        Ok(Self {
            scope,
            admission_sets,
            retention,
            telemetry,
            store_url: get(ENV_STORE_URL),
            log_level: get(ENV_LOG_LEVEL).unwrap_or_else(default_log_level),
        })
    }

    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| GuardError::Config(format!("failed to read {}: {e}", path.display())))?;
            let config: Self =
                toml::from_str(&content).map_err(|e| GuardError::Config(e.to_string()))?;
            config.retention.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Admission sets, or a configuration error naming what is missing.
    pub fn require_admission_sets(&self) -> Result<&FamilySets> {
        self.admission_sets
            .as_ref()
            .ok_or_else(|| GuardError::Config(String::from("no admission IP sets configured")))
    }

    /// Store URL, or a configuration error.
    pub fn require_store_url(&self) -> Result<&str> {
        self.store_url
            .as_deref()
            .ok_or_else(|| GuardError::Config(format!("{ENV_STORE_URL} is not set")))
    }
}

fn parse_minutes(key: &str, raw: Option<String>) -> Result<i64> {
    raw.map_or(Ok(RETENTION_DISABLED), |value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| GuardError::Config(format!("{key} must be an integer, got {value:?}")))
    })
}

// Default value functions for serde.
const fn default_scope() -> Scope {
    Scope::Regional
}

const fn default_retention_minutes() -> i64 {
    RETENTION_DISABLED
}

fn default_allow_list_marker() -> String {
    String::from("Whitelist")
}

fn default_provisioner() -> String {
    String::from("cfn")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.scope, Scope::Regional);
        assert!(config.admission_sets.is_none());
        assert_eq!(config.retention.allowed_minutes, RETENTION_DISABLED);
        assert_eq!(config.retention.allow_list_marker, "Whitelist");
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.provisioner, "cfn");
    }

    #[test]
    fn test_from_map_full() {
        let config = GuardConfig::from_map(&vars(&[
            (ENV_SCOPE, "CLOUDFRONT"),
            (ENV_SET_NAME_V4, "badbot-v4"),
            (ENV_SET_ID_V4, "id-4"),
            (ENV_SET_NAME_V6, "badbot-v6"),
            (ENV_SET_ID_V6, "id-6"),
            (ENV_ALLOWED_MINUTES, "30"),
            (ENV_DENIED_MINUTES, "60"),
            (ENV_REAPER_ROLE, "some_role"),
            (ENV_TABLE_NAME, "retention"),
            (ENV_STACK_NAME, "waf-stack"),
            (ENV_SEND_USAGE, "Yes"),
            (ENV_LOG_TYPE, "cloudfront"),
        ]))
        .unwrap();

        assert_eq!(config.scope, Scope::CloudFront);
        let sets = config.require_admission_sets().unwrap();
        assert_eq!(sets.v4, IpSetRef::new("badbot-v4", "id-4"));
        assert_eq!(sets.v6, IpSetRef::new("badbot-v6", "id-6"));
        assert_eq!(config.retention.allowed_minutes, 30);
        assert_eq!(config.retention.denied_minutes, 60);
        assert_eq!(config.retention.reaper_role_name.as_deref(), Some("some_role"));
        assert_eq!(config.retention.stack_name.as_deref(), Some("waf-stack"));
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.waf_type.as_deref(), Some("cloudfront"));
    }

    #[test]
    fn test_missing_retention_means_disabled() {
        let config = GuardConfig::from_map(&HashMap::new()).unwrap();
        assert_eq!(config.retention.allowed_minutes, RETENTION_DISABLED);
        assert_eq!(config.retention.denied_minutes, RETENTION_DISABLED);
    }

    #[test]
    fn test_non_integer_retention_rejected() {
        let err = GuardConfig::from_map(&vars(&[(ENV_DENIED_MINUTES, "an hour")])).unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_oversized_retention_rejected() {
        let too_long = (MAX_RETENTION_MINUTES + 1).to_string();
        let err = GuardConfig::from_map(&vars(&[(ENV_ALLOWED_MINUTES, too_long.as_str())]))
            .unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));

        let max = MAX_RETENTION_MINUTES.to_string();
        let config = GuardConfig::from_map(&vars(&[(ENV_DENIED_MINUTES, max.as_str())])).unwrap();
        assert_eq!(config.retention.denied_minutes, MAX_RETENTION_MINUTES);
    }

    #[test]
    fn test_load_rejects_oversized_retention() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "[retention]\ndenied_minutes = 9999999999\n").unwrap();
        assert!(matches!(
            GuardConfig::load(tmpfile.path()),
            Err(GuardError::Config(_))
        ));
    }

    #[test]
    fn test_partial_admission_sets_rejected() {
        let err = GuardConfig::from_map(&vars(&[
            (ENV_SET_NAME_V4, "badbot-v4"),
            (ENV_SET_ID_V4, "id-4"),
        ]))
        .unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_usage_disabled_unless_yes() {
        let config = GuardConfig::from_map(&vars(&[(ENV_SEND_USAGE, "true")])).unwrap();
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_window_selection_by_marker() {
        let retention = RetentionConfig {
            allowed_minutes: 30,
            denied_minutes: 60,
            ..RetentionConfig::default()
        };
        assert_eq!(retention.configured_minutes("prodWhitelistSetIPV4"), 30);
        assert_eq!(retention.configured_minutes("prodDenylistSetIPV4"), 60);
        assert_eq!(retention.configured_minutes("None"), 60);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = GuardConfig::load(Path::new("/tmp/nonexistent_wafguard_config.toml")).unwrap();
        assert_eq!(config.scope, Scope::Regional);
    }

    #[test]
    fn test_load_toml() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            r#"
scope = "CLOUDFRONT"
store_url = "http://localhost:8080"

[admission_sets.v4]
name = "badbot-v4"
id = "id-4"

[admission_sets.v6]
name = "badbot-v6"
id = "id-6"

[retention]
denied_minutes = 90
reaper_role_name = "reaper"
"#
        )
        .unwrap();

        let config = GuardConfig::load(tmpfile.path()).unwrap();
        assert_eq!(config.scope, Scope::CloudFront);
        assert_eq!(config.require_store_url().unwrap(), "http://localhost:8080");
        assert_eq!(config.require_admission_sets().unwrap().v6.name, "badbot-v6");
        assert_eq!(config.retention.denied_minutes, 90);
        assert_eq!(config.retention.allowed_minutes, RETENTION_DISABLED);
        assert_eq!(config.log_level, "info");
    }
}
