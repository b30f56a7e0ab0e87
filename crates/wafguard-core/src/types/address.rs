use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::{GuardError, Result};

/// IP address family; v4 and v6 addresses always live in distinct sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    /// Dotted-quad IPv4
    #[serde(rename = "IPV4")]
    V4,
    /// Colon-hex IPv6
    #[serde(rename = "IPV6")]
    V6,
}

impl AddressFamily {
    /// Host prefix length for this family
    #[must_use]
    pub const fn host_prefix(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPV4"),
            Self::V6 => f.write_str("IPV6"),
        }
    }
}

/// A single source address seen on an inbound request.
///
/// The family comes from the literal itself, so a caller cannot route a v6
/// address into a v4 set by mislabeling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservedAddress {
    ip: IpAddr,
}

impl ObservedAddress {
    /// Parse an IPv4 or IPv6 literal. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        trimmed
            .parse::<IpAddr>()
            .map(|ip| Self { ip })
            .map_err(|_| GuardError::validation(format!("invalid IP address: {trimmed:?}")))
    }

    /// The parsed address
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Family derived from the literal
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        match self.ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Single-host network form, e.g. `203.0.113.5/32` or `2001:db8::1/128`
    #[must_use]
    pub fn network(&self) -> String {
        format!("{}/{}", self.ip, self.family().host_prefix())
    }
}

impl From<IpAddr> for ObservedAddress {
    fn from(ip: IpAddr) -> Self {
        Self { ip }
    }
}

impl fmt::Display for ObservedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ip.fmt(f)
    }
}
