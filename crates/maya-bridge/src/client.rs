//! Bridge client: one fragment in, one response out
//!
//! Every call opens a fresh connection, sends the rendered envelope in a single
//! write, reads until the end sentinel (or EOF) and drops the connection. All
//! failures come back as [`BridgeResponse`] values; `execute` never errors.

use crate::envelope::{self, EnvelopeOptions};
use crate::framing;
use crate::transport::{Connection, Connector, SocketConnector};
use maya_bridge_core::{BridgeError, BridgeResponse, ConnectionTarget, Result};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Configuration for the bridge client
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Command port to connect to
    pub target: ConnectionTarget,
    /// Bound on connect, on the request write, and on each read
    pub timeout: Duration,
    /// Bytes requested per read
    pub read_chunk_size: usize,
    /// Largest reply accepted before giving up
    pub max_reply_bytes: usize,
    /// Envelope generation options
    pub envelope: EnvelopeOptions,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            target: ConnectionTarget::default(),
            timeout: Duration::from_secs(15),
            read_chunk_size: 16384,
            max_reply_bytes: 64 * 1024 * 1024,
            envelope: EnvelopeOptions::default(),
        }
    }
}

impl BridgeConfig {
    /// Config for a specific target
    pub fn with_target(target: ConnectionTarget) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Config for a TCP host and port
    pub fn with_tcp(host: impl Into<String>, port: u16) -> Self {
        Self::with_target(ConnectionTarget::tcp(host, port))
    }
}

/// Client for a Maya command port
pub struct BridgeClient<C = SocketConnector> {
    config: BridgeConfig,
    connector: C,
}

impl BridgeClient {
    /// Client over real sockets
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_connector(config, SocketConnector)
    }
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl<C: Connector> BridgeClient<C> {
    /// Client over a custom transport
    pub fn with_connector(config: BridgeConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.config.target
    }

    /// The exact request text `execute` would send for `fragment`
    pub fn render(&self, fragment: &str) -> String {
        envelope::render(fragment, &self.config.envelope)
    }

    /// Run `fragment` in the remote interpreter
    ///
    /// Transport failures and timeouts become `{"error": ...}`; remote
    /// exceptions show up in `stdout` behind the error marker.
    pub async fn execute(&self, fragment: &str) -> BridgeResponse {
        match self.execute_inner(fragment).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Bridge call to {} failed: {}", self.config.target, e);
                e.into()
            }
        }
    }

    async fn execute_inner(&self, fragment: &str) -> Result<BridgeResponse> {
        self.config.envelope.validate()?;
        let request = self.render(fragment);
        let target = &self.config.target;
        let limit = self.config.timeout;

        debug!("Connecting to {}", target);
        let mut conn = timeout(limit, self.connector.connect(target))
            .await
            .map_err(|_| BridgeError::Timeout(format!("connect to {} after {:?}", target, limit)))??;

        let reply = self.exchange(conn.as_mut(), &request).await?;
        // Best effort: the connection is dropped right after either way
        let _ = conn.shutdown().await;

        let response = framing::parse_reply(&reply);
        info!(
            "Bridge call to {} finished ({} request bytes, {} reply bytes)",
            target,
            request.len(),
            reply.len()
        );
        Ok(response)
    }

    async fn exchange(&self, conn: &mut dyn Connection, request: &str) -> Result<String> {
        let limit = self.config.timeout;

        debug!("Sending {} bytes", request.len());
        timeout(limit, async {
            conn.write_all(request.as_bytes()).await?;
            conn.flush().await
        })
        .await
        .map_err(|_| BridgeError::Timeout(format!("sending request after {:?}", limit)))?
        .map_err(|e| BridgeError::IoError(format!("send failed: {}", e)))?;

        framing::read_reply(
            conn,
            self.config.read_chunk_size,
            self.config.max_reply_bytes,
            limit,
        )
        .await
    }
}
