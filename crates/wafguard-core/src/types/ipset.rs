use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AddressFamily;
use crate::GuardError;

/// Where the firewall's IP sets live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scope {
    /// Regional resources (load balancers, API gateways)
    Regional,
    /// Global CDN distributions
    CloudFront,
}

impl Scope {
    /// Wire name of the scope
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regional => "REGIONAL",
            Self::CloudFront => "CLOUDFRONT",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REGIONAL" | "ALB" => Ok(Self::Regional),
            "CLOUDFRONT" => Ok(Self::CloudFront),
            other => Err(GuardError::Config(format!("unknown scope: {other}"))),
        }
    }
}

/// Identity of a single IP set within a scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpSetRef {
    /// Set name
    pub name: String,
    /// Set id or ARN
    pub id: String,
}

impl IpSetRef {
    /// Create a reference from a name and id/ARN
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for IpSetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// The v4/v6 pair of sets an admission targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySets {
    /// Set receiving IPv4 host networks
    pub v4: IpSetRef,
    /// Set receiving IPv6 host networks
    pub v6: IpSetRef,
}

impl FamilySets {
    /// Select the set for an address family
    #[must_use]
    pub const fn for_family(&self, family: AddressFamily) -> &IpSetRef {
        match family {
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        }
    }
}

/// Current contents of an IP set plus the token needed to change it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpSetSnapshot {
    /// CIDR strings currently in the set
    pub addresses: Vec<String>,
    /// Consistency token from the same read
    pub lock_token: String,
}

/// Set descriptor as returned by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpSetDescriptor {
    /// Set name
    pub name: String,
    /// Set id
    pub id: String,
    /// CIDR strings
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Response to a set read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIpSetResponse {
    /// The set itself
    #[serde(rename = "IPSet")]
    pub ip_set: IpSetDescriptor,
    /// Token to present on the next update
    #[serde(rename = "LockToken")]
    pub lock_token: String,
}

impl From<GetIpSetResponse> for IpSetSnapshot {
    fn from(resp: GetIpSetResponse) -> Self {
        Self {
            addresses: resp.ip_set.addresses,
            lock_token: resp.lock_token,
        }
    }
}

/// Request body for a set update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateIpSetRequest {
    /// Full replacement address list
    pub addresses: Vec<String>,
    /// Token from the preceding read
    pub lock_token: String,
}

/// Response to a successful set update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateIpSetResponse {
    /// Token for the next update
    pub next_lock_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!("REGIONAL".parse::<Scope>().unwrap(), Scope::Regional);
        assert_eq!("cloudfront".parse::<Scope>().unwrap(), Scope::CloudFront);
        assert_eq!("ALB".parse::<Scope>().unwrap(), Scope::Regional);
        assert!("GLOBAL".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_serde() {
        let json = serde_json::to_string(&Scope::CloudFront).unwrap();
        assert_eq!(json, "\"CLOUDFRONT\"");
        let parsed: Scope = serde_json::from_str("\"REGIONAL\"").unwrap();
        assert_eq!(parsed, Scope::Regional);
    }

    #[test]
    fn test_get_response_deserialize() {
        let json = r#"{
            "IPSet": {"Name": "badbot-v4", "Id": "abc-123", "Addresses": ["198.51.100.0/24"]},
            "LockToken": "tok-1"
        }"#;
        let snapshot: IpSetSnapshot = serde_json::from_str::<GetIpSetResponse>(json)
            .unwrap()
            .into();
        assert_eq!(snapshot.addresses, vec!["198.51.100.0/24"]);
        assert_eq!(snapshot.lock_token, "tok-1");
    }

    #[test]
    fn test_update_request_serialize() {
        let req = UpdateIpSetRequest {
            addresses: vec!["203.0.113.5/32".into()],
            lock_token: "tok-1".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["Addresses"][0], "203.0.113.5/32");
        assert_eq!(value["LockToken"], "tok-1");
    }

    #[test]
    fn test_family_sets_selection() {
        let sets = FamilySets {
            v4: IpSetRef::new("v4", "id4"),
            v6: IpSetRef::new("v6", "id6"),
        };
        assert_eq!(sets.for_family(AddressFamily::V4).name, "v4");
        assert_eq!(sets.for_family(AddressFamily::V6).name, "v6");
    }
}
