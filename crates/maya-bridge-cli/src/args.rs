//! Command-line arguments for maya-exec

use anyhow::{Context, Result};
use clap::Parser;
use maya_bridge::{BridgeConfig, ConnectionTarget, EnvelopeOptions};
use maya_bridge_core::{DEFAULT_HOST, DEFAULT_PORT};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "maya-exec")]
#[command(about = "Run Python in a live Maya session through its command port")]
#[command(
    long_about = "Sends one Python fragment to Maya's commandPort and prints the JSON reply:\n\
    {\"stdout\": ..., \"result\": ...} on success, {\"error\": ...} on failure.\n\n\
    Open the port in Maya first:\n\
    cmds.commandPort(n=':7022', sourceType='python', echoOutput=True)"
)]
#[command(version)]
pub struct Cli {
    /// Python code to run (read from --file or stdin when omitted)
    pub code: Option<String>,

    /// Read the Python code from a file
    #[arg(short, long, conflicts_with = "code")]
    pub file: Option<PathBuf>,

    /// Command port as `host:port`, `:port`, `[v6]:port` or `unix:<path>`
    /// (overrides --host/--port/--socket)
    #[arg(short, long, env = "MAYA_BRIDGE_TARGET")]
    pub target: Option<ConnectionTarget>,

    /// Command port host
    #[arg(long, env = "MAYA_BRIDGE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Command port number
    #[arg(short, long, env = "MAYA_BRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Unix socket of a named command port (overrides --host/--port)
    #[arg(long, env = "MAYA_BRIDGE_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Connect/read timeout in seconds
    #[arg(long, env = "MAYA_BRIDGE_TIMEOUT", default_value_t = 15)]
    pub timeout: u64,

    /// Don't wrap the code in an undo chunk
    #[arg(long)]
    pub no_undo: bool,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn target(&self) -> ConnectionTarget {
        if let Some(target) = &self.target {
            return target.clone();
        }
        match &self.socket {
            Some(path) => ConnectionTarget::unix(path),
            None => ConnectionTarget::tcp(self.host.clone(), self.port),
        }
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig {
            target: self.target(),
            timeout: Duration::from_secs(self.timeout),
            envelope: if self.no_undo {
                EnvelopeOptions::without_undo()
            } else {
                EnvelopeOptions::default()
            },
            ..Default::default()
        }
    }

    /// Code from the positional argument, the file, or stdin, in that order
    pub fn read_code(&self) -> Result<String> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }

        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read code from stdin")?;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["maya-exec", "print(1)"]).unwrap();
        assert_eq!(cli.code.as_deref(), Some("print(1)"));

        let config = cli.config();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.envelope.undo_chunk);
        if std::env::var_os("MAYA_BRIDGE_TARGET").is_none()
            && std::env::var_os("MAYA_BRIDGE_HOST").is_none()
            && std::env::var_os("MAYA_BRIDGE_PORT").is_none()
            && std::env::var_os("MAYA_BRIDGE_SOCKET").is_none()
        {
            assert_eq!(config.target, ConnectionTarget::tcp("127.0.0.1", 7022));
        }
    }

    #[test]
    fn test_socket_overrides_tcp() {
        let cli = Cli::try_parse_from([
            "maya-exec",
            "--host",
            "10.0.0.5",
            "--socket",
            "/tmp/mayaCommand",
            "pass",
        ])
        .unwrap();
        assert_eq!(cli.target(), ConnectionTarget::unix("/tmp/mayaCommand"));
    }

    #[test]
    fn test_target_argument() {
        let cli = Cli::try_parse_from(["maya-exec", "--target", "render-01:7001", "pass"]).unwrap();
        assert_eq!(cli.target(), ConnectionTarget::tcp("render-01", 7001));

        let cli = Cli::try_parse_from([
            "maya-exec",
            "-t",
            "unix:/tmp/mayaCommand",
            "--host",
            "10.0.0.5",
            "--socket",
            "/tmp/other",
            "pass",
        ])
        .unwrap();
        assert_eq!(cli.config().target, ConnectionTarget::unix("/tmp/mayaCommand"));

        let cli = Cli::try_parse_from(["maya-exec", "--target", ":7005", "pass"]).unwrap();
        assert_eq!(cli.target(), ConnectionTarget::tcp("127.0.0.1", 7005));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let err = Cli::try_parse_from(["maya-exec", "--target", "render-01:port", "pass"])
            .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
        assert!(Cli::try_parse_from(["maya-exec", "--target", "unix:", "pass"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "maya-exec",
            "--host",
            "render-01",
            "-p",
            "7001",
            "--timeout",
            "3",
            "--no-undo",
            "--pretty",
            "pass",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.target, ConnectionTarget::tcp("render-01", 7001));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.envelope.undo_chunk);
        assert!(cli.pretty);
    }

    #[test]
    fn test_code_and_file_conflict() {
        assert!(Cli::try_parse_from(["maya-exec", "--file", "a.py", "print(1)"]).is_err());
    }

    #[test]
    fn test_read_code_from_file() {
        let path = std::env::temp_dir().join(format!("maya-exec-{}.py", std::process::id()));
        std::fs::write(&path, "print('from file')\n").unwrap();

        let cli = Cli::try_parse_from(["maya-exec", "--file", path.to_str().unwrap()]).unwrap();
        assert_eq!(cli.read_code().unwrap(), "print('from file')\n");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_has_context() {
        let cli = Cli::try_parse_from(["maya-exec", "--file", "/nonexistent/fragment.py"]).unwrap();
        let err = cli.read_code().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fragment.py"));
    }
}
