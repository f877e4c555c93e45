//! # maya-bridge-core
//!
//! Core types shared by the Maya remote-execution bridge.
//!
//! This crate provides the data model that crosses the bridge boundary:
//! - Connection targets (TCP host/port or Unix socket path)
//! - The fixed-shape result envelope produced by every remote execution
//! - The bridge response returned to callers, including error shapes
//! - Error types used internally by transports

pub mod error;
pub mod response;
pub mod target;

pub use error::{BridgeError, Result};
pub use response::{BridgeResponse, ResultEnvelope};
pub use target::{ConnectionTarget, DEFAULT_HOST, DEFAULT_PORT};
