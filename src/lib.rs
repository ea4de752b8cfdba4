//! Airside vehicle-operating-license workflow service.
//!
//! The core of the crate is the licensing workflow under
//! [`workflows::licensing`]: a closed status graph, a pure transition engine,
//! an owned record store with change broadcasting, role-scoped register
//! views, and an audit timeline rebuilt from each record's event log. The
//! binary in `main.rs` wires that core behind an HTTP facade and a CLI.

pub mod config;
pub mod error;
pub mod identity;
pub mod telemetry;
pub mod workflows;
