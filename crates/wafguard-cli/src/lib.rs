//! # wafguard-cli
//!
//! Drives the wafguard handlers with JSON events read from a file or stdin.
//!
//! - `wafguard access --event <path|->`: admit the request's source address
//! - `wafguard retention --event <path|->`: record retention for a set update
//! - `wafguard config`: print the resolved configuration

pub mod cli;
pub mod output;

pub use cli::run;
