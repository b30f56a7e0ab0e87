//! Source address extraction.
//!
//! Forwarding headers are attacker-controlled unless the hop that set them is
//! trusted, so only the nearest trusted front-end's header is read. First
//! match wins:
//!
//! 1. the CDN edge (identified by its user agent): first `X-Forwarded-For` entry
//! 2. a regional load balancer (`requestContext.elb` present): first
//!    `x-forwarded-for` entry
//! 3. anything else: the raw connection address

use tracing::debug;
use wafguard_core::{AccessEvent, GuardError, ObservedAddress, Result};

/// User agent the CDN edge presents on origin requests.
pub const TRUSTED_CDN_USER_AGENT: &str = "Amazon CloudFront";

/// Forwarding header set by trusted front-ends.
pub const FORWARDED_FOR: &str = "X-Forwarded-For";

/// The hop that delivered a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// Trusted CDN edge
    TrustedCdn,
    /// Regional load balancer
    LoadBalancer,
    /// Direct connection; headers are not trusted
    Direct,
}

impl Hop {
    /// Classify the immediate hop of a request
    #[must_use]
    pub fn of(event: &AccessEvent) -> Self {
        let context = &event.request_context;
        if context.identity.user_agent.as_deref() == Some(TRUSTED_CDN_USER_AGENT) {
            Self::TrustedCdn
        } else if context.elb.is_some() {
            Self::LoadBalancer
        } else {
            Self::Direct
        }
    }
}

/// Extract the client address a request should be attributed to
pub fn source_address(event: &AccessEvent) -> Result<ObservedAddress> {
    let hop = Hop::of(event);
    let raw = match hop {
        Hop::TrustedCdn | Hop::LoadBalancer => event
            .header(FORWARDED_FOR)
            .and_then(first_forwarded)
            .ok_or_else(|| {
                GuardError::validation(format!("{hop:?} request without {FORWARDED_FOR} header"))
            })?,
        Hop::Direct => event
            .request_context
            .identity
            .source_ip
            .as_deref()
            .ok_or_else(|| GuardError::validation("request has no source address"))?,
    };

    debug!(?hop, source = raw, "resolved request source");
    ObservedAddress::parse(raw)
}

/// First (client-most) entry of a comma-separated forwarding chain
fn first_forwarded(chain: &str) -> Option<&str> {
    chain
        .split(',')
        .next()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}
