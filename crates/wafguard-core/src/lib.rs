//! Core types and error taxonomy for wafguard.
//!
//! This crate provides the foundational types shared by the store client and
//! the control-loop handlers:
//!
//! - **Types**: IP set identity, address family classification, inbound
//!   events, retention ledger records and usage snapshots
//! - **Errors**: The [`GuardError`] taxonomy and its [`ErrorKind`] projection
//!
//! # Example
//!
//! ```rust,ignore
//! use wafguard_core::{AddressFamily, ObservedAddress, Result};
//!
//! fn classify(raw: &str) -> Result<()> {
//!     let observed = ObservedAddress::parse(raw)?;
//!     println!("{} -> {}", observed.network(), observed.family());
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/wafguard-core/1.0.0")]

mod error;
pub mod types;

pub use error::{ErrorKind, GuardError, Result};
pub use types::*;
