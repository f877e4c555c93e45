//! Transport abstractions for the bridge
//!
//! A [`Connector`] opens one fresh byte stream per call. [`SocketConnector`]
//! handles TCP and Unix domain sockets; tests plug in in-memory streams.

use async_trait::async_trait;
use maya_bridge_core::{BridgeError, ConnectionTarget, Result};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// A bidirectional byte stream to the command port
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Opens connections to a [`ConnectionTarget`]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new connection; the caller owns and drops it
    async fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>>;
}

/// Real sockets: TCP, or a Unix domain socket where supported
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketConnector;

#[async_trait]
impl Connector for SocketConnector {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>> {
        match target {
            ConnectionTarget::Tcp { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|e| BridgeError::ConnectError(format!("{}: {}", target, e)))?;
                // Requests go out in a single write; don't hold the tail back
                if let Err(e) = stream.set_nodelay(true) {
                    debug!("Could not set TCP_NODELAY on {}: {}", target, e);
                }
                Ok(Box::new(stream))
            }
            ConnectionTarget::Unix(path) => connect_unix(path).await,
        }
    }
}

#[cfg(unix)]
async fn connect_unix(path: &Path) -> Result<Box<dyn Connection>> {
    let stream = tokio::net::UnixStream::connect(path).await.map_err(|e| {
        BridgeError::ConnectError(format!("unix:{}: {}", path.display(), e))
    })?;
    Ok(Box::new(stream))
}

#[cfg(not(unix))]
async fn connect_unix(path: &Path) -> Result<Box<dyn Connection>> {
    Err(BridgeError::ConfigError(format!(
        "unix:{}: Unix domain sockets are not supported on this platform",
        path.display()
    )))
}
