//! karmabot - per-channel karma ledger for team chat.
//!
//! The binary wires these modules together; integration tests drive the
//! [`bot::Bot`] directly with an in-memory [`platform::Platform`].

pub mod bot;
pub mod commands;
pub mod config;
pub mod cooldown;
pub mod db;
pub mod error;
pub mod http;
pub mod metrics;
pub mod notify;
pub mod platform;
pub mod telemetry;
