//! SSE streaming infrastructure for the chat-completion adapter.
//!
//! Receive a `reqwest::Response`, buffer chunks, split on `\n\n`, extract
//! `data:` payloads, and feed each payload to a parser that returns
//! `Vec<Result<StreamEvent>>`.
//!
//! - [`drain_data_lines`] pulls complete `data:` payloads from an SSE buffer
//! - [`sse_response_stream`] builds a `BoxStream` from a response + parser closure

use crate::util::from_reqwest;
use ym_domain::error::Result;
use ym_domain::stream::{BoxStream, StreamEvent};

/// Extract complete `data:` payloads from an SSE buffer.
///
/// SSE events are delimited by `\n\n`. Each event block may contain
/// `event:`, `data:`, `id:`, or `retry:` lines; only `data:` matters.
///
/// The buffer is drained in-place: consumed bytes are removed and any
/// trailing partial event remains for the next call.
pub(crate) fn drain_data_lines(buffer: &mut String) -> Vec<String> {
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }

    let mut data_lines = Vec::new();

    while let Some(pos) = buffer.find("\n\n") {
        let block: String = buffer.drain(..pos).collect();
        buffer.drain(..2);

        for line in block.lines() {
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data.to_string());
                }
            }
        }
    }

    data_lines
}

/// Move the longest valid UTF-8 prefix of `pending` into `buffer`.
///
/// A multi-byte character split across two network chunks stays in
/// `pending` until its remaining bytes arrive.
pub(crate) fn decode_utf8_prefix(pending: &mut Vec<u8>, buffer: &mut String) {
    let valid = match std::str::from_utf8(pending.as_slice()) {
        Ok(s) => s.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => {
            // Genuinely invalid bytes: decode lossily rather than stall.
            buffer.push_str(&String::from_utf8_lossy(pending.as_slice()));
            pending.clear();
            return;
        }
    };
    let rest = pending.split_off(valid);
    buffer.push_str(&String::from_utf8_lossy(pending.as_slice()));
    *pending = rest;
}

/// Build a [`BoxStream`] from an SSE `reqwest::Response` and a parser closure.
///
/// The stream:
/// 1. Buffers incoming chunks and drains complete SSE events
/// 2. Flushes the remaining buffer when the response body closes
/// 3. Emits a fallback `Done` event if the parser never produced one
pub(crate) fn sse_response_stream<F>(
    response: reqwest::Response,
    mut parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut response = response;
        let mut pending: Vec<u8> = Vec::new();
        let mut buffer = String::new();
        let mut done_emitted = false;
        let mut failed = false;

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    pending.extend_from_slice(&bytes);
                    decode_utf8_prefix(&mut pending, &mut buffer);

                    for data in drain_data_lines(&mut buffer) {
                        for event in parse_data(&data) {
                            if matches!(&event, Ok(StreamEvent::Done { finish_reason: Some(_), .. })) {
                                done_emitted = true;
                            }
                            yield event;
                        }
                    }
                }
                Ok(None) => {
                    if !pending.is_empty() {
                        buffer.push_str(&String::from_utf8_lossy(&pending));
                        pending.clear();
                    }
                    if !buffer.trim().is_empty() {
                        buffer.push_str("\n\n");
                        for data in drain_data_lines(&mut buffer) {
                            for event in parse_data(&data) {
                                if matches!(&event, Ok(StreamEvent::Done { finish_reason: Some(_), .. })) {
                                    done_emitted = true;
                                }
                                yield event;
                            }
                        }
                    }
                    break;
                }
                Err(e) => {
                    yield Err(from_reqwest(e));
                    failed = true;
                    break;
                }
            }
        }

        if !done_emitted && !failed {
            yield Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            });
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_single_complete_event() {
        let mut buf = String::from("event: message\ndata: {\"hello\":\"world\"}\n\n");
        let lines = drain_data_lines(&mut buf);
        assert_eq!(lines, vec!["{\"hello\":\"world\"}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_multiple_events() {
        let mut buf = String::from("data: first\n\ndata: second\n\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["first", "second"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_partial_event_stays_in_buffer() {
        let mut buf = String::from("data: complete\n\ndata: partial");
        assert_eq!(drain_data_lines(&mut buf), vec!["complete"]);
        assert_eq!(buf, "data: partial");
    }

    #[test]
    fn drain_handles_crlf_delimiters() {
        let mut buf = String::from("data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["one", "two"]);
    }

    #[test]
    fn drain_ignores_non_data_lines() {
        let mut buf = String::from("event: ping\nid: 42\nretry: 5000\ndata: payload\n\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["payload"]);
    }

    #[test]
    fn drain_done_sentinel_preserved() {
        let mut buf = String::from("data: [DONE]\n\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["[DONE]"]);
    }

    #[test]
    fn split_multibyte_char_waits_for_rest() {
        let bytes = "data: é\n\n".as_bytes();
        // 'é' is two bytes; cut between them.
        let cut = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut pending = bytes[..cut].to_vec();
        let mut buffer = String::new();
        decode_utf8_prefix(&mut pending, &mut buffer);
        assert_eq!(buffer, "data: ");
        assert_eq!(pending.len(), 1);

        pending.extend_from_slice(&bytes[cut..]);
        decode_utf8_prefix(&mut pending, &mut buffer);
        assert!(pending.is_empty());
        assert_eq!(drain_data_lines(&mut buffer), vec!["é"]);
    }
}
