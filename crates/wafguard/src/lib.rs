//! wafguard: IP set admission and retention for a web application firewall.
//!
//! Two independent, stateless invocations make up the control loop:
//!
//! ```text
//! request ──► AccessHandler ──► AdmissionController ──► SetStore (conditional update)
//!                                        │
//!                                        └──► UsageTelemetry (best effort)
//!
//! set-mutation notification ──► RetentionHandler ──► RetentionRecorder ──► RetentionLedger
//!                                                        │
//!                                   (skips updates made by the expiry reaper)
//! ```
//!
//! The set store's lock token is the only concurrency control. A writer that
//! loses the race fails with [`GuardError::Conflict`] and the invoking
//! platform redelivers the event; nothing here retries internally.
//!
//! The expiry reaper itself lives outside this crate. The recorder only needs
//! its role name, to recognize the reaper's removals and keep them out of the
//! ledger.

pub mod admission;
pub mod config;
pub mod handler;
pub mod retention;
pub mod source;
pub mod telemetry;

// Re-exports for convenience.
pub use admission::{AdmissionController, MutationResult};
pub use config::GuardConfig;
pub use handler::{AccessHandler, AccessResponse, RetentionHandler};
pub use retention::{ActorClass, RecordOutcome, RetentionRecorder, RetentionWindow};
pub use wafguard_core::{GuardError, Result};
