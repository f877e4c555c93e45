//! Sentinel framing for command-port replies
//!
//! The command port has no message boundaries: a reply is whatever text the
//! interpreter writes back, possibly preceded by echoed input or a banner and
//! possibly split across many reads. The payload is the text between the first
//! [`SENTINEL_START`] and the following [`SENTINEL_END`]; both are matched as
//! exact substrings.

use maya_bridge_core::{BridgeError, BridgeResponse, Result};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Shared prefix of both sentinels
pub const SENTINEL_STEM: &str = "MCP_JSON_";

/// Marks the start of the JSON payload
pub const SENTINEL_START: &str = "MCP_JSON_START:";

/// Marks the end of the JSON payload
pub const SENTINEL_END: &str = ":MCP_JSON_END";

/// Read until the accumulated bytes contain [`SENTINEL_END`] or the remote
/// closes the connection.
///
/// Bytes are collected before decoding, so a UTF-8 sequence split across reads
/// survives; invalid sequences are replaced. Each read is bounded by
/// `read_timeout` and the whole reply by `max_bytes`.
pub async fn read_reply<R>(
    reader: &mut R,
    chunk_size: usize,
    max_bytes: usize,
    read_timeout: Duration,
) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let end = SENTINEL_END.as_bytes();
    let mut reply: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let n = timeout(read_timeout, reader.read(&mut chunk))
            .await
            .map_err(|_| {
                BridgeError::Timeout(format!(
                    "no reply data within {:?} ({} bytes received)",
                    read_timeout,
                    reply.len()
                ))
            })?
            .map_err(|e| BridgeError::IoError(format!("read failed: {}", e)))?;

        if n == 0 {
            debug!("Remote closed the connection after {} bytes", reply.len());
            break;
        }

        // The end sentinel may straddle the previous chunk boundary
        let scan_from = reply.len().saturating_sub(end.len() - 1);
        reply.extend_from_slice(&chunk[..n]);

        if reply.len() > max_bytes {
            return Err(BridgeError::ReplyTooLarge(max_bytes));
        }

        if contains(&reply[scan_from..], end) {
            debug!("End sentinel received ({} bytes)", reply.len());
            break;
        }
    }

    Ok(String::from_utf8_lossy(&reply).into_owned())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Turn a complete reply into a [`BridgeResponse`]
///
/// - start and end sentinels: the payload, validated as JSON
/// - payload present but not JSON: a parse error carrying the whole reply
/// - no start sentinel, or start without end: the whole reply as `stdout`
pub fn parse_reply(reply: &str) -> BridgeResponse {
    let cleaned = reply.replace('\0', "");
    let cleaned = cleaned.trim();

    let Some(start) = cleaned.find(SENTINEL_START) else {
        debug!("Reply has no result envelope, returning it as stdout");
        return BridgeResponse::fallback(cleaned);
    };

    let rest = &cleaned[start + SENTINEL_START.len()..];
    let Some(end) = rest.find(SENTINEL_END) else {
        warn!("Reply ended before the end sentinel, returning it as stdout");
        return BridgeResponse::fallback(cleaned);
    };

    match BridgeResponse::from_payload(rest[..end].trim()) {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to parse reply payload: {}", e);
            BridgeResponse::parse_error(&e, cleaned)
        }
    }
}
