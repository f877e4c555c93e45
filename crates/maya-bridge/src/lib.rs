//! Remote-execution bridge to a running Maya session
//!
//! This crate provides:
//! - The execution envelope: Python that wraps a fragment with output capture,
//!   error containment and an undo chunk, then prints one sentinel-wrapped
//!   JSON line
//! - Sentinel framing: incremental reply reassembly and payload extraction
//! - Transports: TCP and Unix socket connectors behind the [`Connector`] trait
//! - [`BridgeClient`]: one fragment in, one [`BridgeResponse`] out, never an error
//!
//! Fragments are trusted code. The envelope adds containment, not a sandbox.

pub mod client;
pub mod envelope;
pub mod framing;
pub mod transport;

pub use client::{BridgeClient, BridgeConfig};
pub use envelope::{EnvelopeOptions, normalize_fragment, quote_python_str, render, to_host_path};
pub use framing::{SENTINEL_END, SENTINEL_START, parse_reply, read_reply};
pub use maya_bridge_core::{BridgeError, BridgeResponse, ConnectionTarget, Result, ResultEnvelope};
pub use transport::{Connection, Connector, SocketConnector};
