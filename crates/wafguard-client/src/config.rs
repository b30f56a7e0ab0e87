//! Client configuration types.

use std::num::NonZeroU32;

/// Client-side throttle for calls to the store API.
///
/// Firewall management APIs enforce low per-account request rates; throttling
/// locally turns bursts into short waits instead of `429` failures.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: NonZeroU32,

    /// Requests allowed in a burst
    pub burst_size: NonZeroU32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitConfig {
    /// Five requests per second with a burst of five
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests_per_second: NonZeroU32::MIN.saturating_add(4),
            burst_size: NonZeroU32::MIN.saturating_add(4),
        }
    }

    /// Set the sustained rate
    #[must_use]
    pub const fn per_second(mut self, rate: NonZeroU32) -> Self {
        self.requests_per_second = rate;
        self
    }

    /// Set the burst size
    #[must_use]
    pub const fn burst(mut self, burst: NonZeroU32) -> Self {
        self.burst_size = burst;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_second.get(), 5);
        assert_eq!(config.burst_size.get(), 5);
    }

    #[test]
    fn test_builder_methods() {
        let config = RateLimitConfig::new()
            .per_second(NonZeroU32::new(20).unwrap())
            .burst(NonZeroU32::new(40).unwrap());
        assert_eq!(config.requests_per_second.get(), 20);
        assert_eq!(config.burst_size.get(), 40);
    }
}
