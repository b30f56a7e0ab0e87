//! Backend clients for wafguard.
//!
//! The control loop only talks to the capability traits in [`store`]:
//! [`SetStore`] for the versioned IP sets, [`RetentionLedger`] for expiry
//! records, and [`RequestMetrics`] / [`UsageSink`] for usage telemetry.
//!
//! [`WafClient`] implements all four over HTTP. The [`memory`] module holds
//! in-process implementations for tests and local dry runs.

#![doc(html_root_url = "https://docs.rs/wafguard-client/1.0.0")]

mod client;
mod config;
pub mod api;
pub mod memory;
pub mod store;

pub use client::{WafClient, WafClientBuilder};
pub use config::*;
pub use store::{RequestMetrics, RetentionLedger, SetStore, UsageSink};
pub use wafguard_core::{GuardError, Result};
