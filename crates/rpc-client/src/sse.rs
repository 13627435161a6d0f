//! Incremental reader for the `queue/data` server-sent event stream.
//!
//! The poll endpoint keeps the response open and writes one `data: {...}`
//! line per queue event.  This module splits the raw body into lines as
//! chunks arrive and decodes each `data:` payload into a [`QueueEvent`]:
//! - [`drain_data_lines`] -- pull complete `data:` payloads from a byte buffer
//! - [`queue_event_stream`] -- build a `BoxStream` of events from a response
//!
//! Dropping the returned stream drops the response and releases the
//! connection, which is how callers cancel the poll once they have their
//! result.

use tm_domain::error::Result;
use tm_domain::stream::BoxStream;

use crate::client::from_reqwest;
use crate::types::QueueEvent;

/// Extract complete `data:` payloads from an SSE byte buffer.
///
/// Only lines terminated by `\n` are consumed; a trailing partial line stays
/// in the buffer for the next call.  Lines are split on raw bytes so a
/// multi-byte character cut across two chunks is reassembled before it is
/// decoded.  `event:`, `id:`, `retry:` and comment lines are ignored.
pub(crate) fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut data_lines = Vec::new();

    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() {
                data_lines.push(data.to_string());
            }
        }
    }

    data_lines
}

/// Decode one `data:` payload.  Payloads that are not queue events (keep-alive
/// text, truncated JSON) are skipped rather than failing the whole poll.
fn parse_event(data: &str) -> Option<QueueEvent> {
    match serde_json::from_str::<QueueEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, payload = %data, "skipping undecodable queue event");
            None
        }
    }
}

/// Build a [`BoxStream`] of queue events from a streaming `reqwest::Response`.
///
/// The stream:
/// 1. Buffers incoming chunks and yields an event per complete `data:` line
/// 2. Flushes a final unterminated line when the body closes
/// 3. Yields a transport error once and ends if a chunk read fails
pub(crate) fn queue_event_stream(
    response: reqwest::Response,
) -> BoxStream<'static, Result<QueueEvent>> {
    let stream = async_stream::stream! {
        let mut response = response;
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    for data in drain_data_lines(&mut buffer) {
                        if let Some(event) = parse_event(&data) {
                            yield Ok(event);
                        }
                    }
                }
                Ok(None) => {
                    if !buffer.is_empty() {
                        buffer.push(b'\n');
                        for data in drain_data_lines(&mut buffer) {
                            if let Some(event) = parse_event(&data) {
                                yield Ok(event);
                            }
                        }
                    }
                    break;
                }
                Err(e) => {
                    yield Err(from_reqwest(e));
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
