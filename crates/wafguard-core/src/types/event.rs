//! Inbound event shapes: the request that triggers an admission and the
//! set-mutation notification that triggers a retention record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API-gateway style request event that reached the access endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    /// Network-layer metadata added by the front-end
    #[serde(default)]
    pub request_context: RequestContext,

    /// Raw request headers (gateways send `null` when there are none)
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl AccessEvent {
    /// Look up a header by name, ignoring ASCII case
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// Request context attached by the gateway or load balancer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Immediate caller identity
    #[serde(default)]
    pub identity: CallerIdentity,

    /// Present when the request came through a regional load balancer.
    /// A key that is present with a `null` value still counts.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub elb: Option<serde_json::Value>,
}

// Only called when the key exists, so `null` becomes `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Immediate hop that delivered the request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    /// User agent of the connecting peer
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Raw connection address
    #[serde(default)]
    pub source_ip: Option<String>,
}

/// Event-bus envelope around a set-mutation notification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationEnvelope {
    /// The audited API call
    #[serde(default)]
    pub detail: MutationDetail,
}

/// Audit record of a single set update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationDetail {
    /// UTC time of the call, `YYYY-MM-DDTHH:MM:SSZ`
    #[serde(default)]
    pub event_time: Option<String>,

    /// Principal that performed the update
    #[serde(default)]
    pub user_identity: UserIdentity,

    /// Parameters of the update call; absent on partial events
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

impl MutationDetail {
    /// ARN of the acting principal, empty when the event carries none
    #[must_use]
    pub fn actor_arn(&self) -> &str {
        self.user_identity.arn.as_deref().unwrap_or_default()
    }
}

/// Principal identity in an audit record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Principal ARN
    #[serde(default)]
    pub arn: Option<String>,
}

/// Parameters the set update was called with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    /// Set id
    #[serde(default)]
    pub id: Option<String>,

    /// Set name
    #[serde(default)]
    pub name: Option<String>,

    /// Set scope
    #[serde(default)]
    pub scope: Option<String>,

    /// Full address list submitted
    #[serde(default)]
    pub addresses: Option<Vec<String>>,

    /// Token presented on the update
    #[serde(default)]
    pub lock_token: Option<String>,
}
