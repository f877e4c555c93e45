//! Connection targets for the Maya command port

use crate::error::{BridgeError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default host for the command port
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default Python command port
pub const DEFAULT_PORT: u16 = 7022;

/// Where the Maya command port is listening
///
/// `commandPort -n ":7022"` opens a TCP port; a name without a colon opens a
/// Unix domain socket instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionTarget {
    /// TCP host and port
    Tcp { host: String, port: u16 },
    /// Unix domain socket path
    Unix(PathBuf),
}

impl ConnectionTarget {
    /// TCP target
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        ConnectionTarget::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Unix socket target
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        ConnectionTarget::Unix(path.into())
    }
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        Self::tcp(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Tcp { host, port } if host.contains(':') => {
                write!(f, "[{}]:{}", host, port)
            }
            ConnectionTarget::Tcp { host, port } => write!(f, "{}:{}", host, port),
            ConnectionTarget::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Parses `host:port`, `[v6]:port`, `:port`, a bare port, or `unix:<path>`.
impl FromStr for ConnectionTarget {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(path) = s.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(BridgeError::ConfigError(
                    "unix target needs a socket path".to_string(),
                ));
            }
            return Ok(Self::unix(path));
        }

        if let Ok(port) = s.parse::<u16>() {
            return Ok(Self::tcp(DEFAULT_HOST, port));
        }

        let (host, port) = s.rsplit_once(':').ok_or_else(|| {
            BridgeError::ConfigError(format!("expected host:port, got {:?}", s))
        })?;
        let port = port
            .parse::<u16>()
            .map_err(|e| BridgeError::ConfigError(format!("invalid port {:?}: {}", port, e)))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        let host = if host.is_empty() { DEFAULT_HOST } else { host };

        Ok(Self::tcp(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target() {
        let target = ConnectionTarget::default();
        assert_eq!(target, ConnectionTarget::tcp("127.0.0.1", 7022));
        assert_eq!(target.to_string(), "127.0.0.1:7022");
    }

    #[test]
    fn test_parse_host_port() {
        let target: ConnectionTarget = "maya-box.local:7001".parse().unwrap();
        assert_eq!(target, ConnectionTarget::tcp("maya-box.local", 7001));
    }

    #[test]
    fn test_parse_command_port_style() {
        // Same spelling Maya's commandPort uses for "all interfaces"
        let target: ConnectionTarget = ":7022".parse().unwrap();
        assert_eq!(target, ConnectionTarget::tcp(DEFAULT_HOST, 7022));

        let target: ConnectionTarget = "7030".parse().unwrap();
        assert_eq!(target, ConnectionTarget::tcp(DEFAULT_HOST, 7030));
    }

    #[test]
    fn test_parse_ipv6() {
        let target: ConnectionTarget = "[::1]:7022".parse().unwrap();
        assert_eq!(target, ConnectionTarget::tcp("::1", 7022));
        assert_eq!(target.to_string(), "[::1]:7022");
    }

    #[test]
    fn test_parse_unix() {
        let target: ConnectionTarget = "unix:/tmp/mayaCommand".parse().unwrap();
        assert_eq!(target, ConnectionTarget::unix("/tmp/mayaCommand"));
        assert_eq!(target.to_string(), "unix:/tmp/mayaCommand");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("unix:".parse::<ConnectionTarget>().is_err());
        assert!("localhost".parse::<ConnectionTarget>().is_err());
        assert!("localhost:99999".parse::<ConnectionTarget>().is_err());
    }
}
