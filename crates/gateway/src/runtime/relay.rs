//! Stream relay: provider events in, UTF-8 text chunks out.

use futures_core::Stream;
use tokio::sync::mpsc;
use ym_domain::error::{Error, Result};
use ym_domain::stream::StreamEvent;

/// Forward every non-empty content delta as soon as it arrives.
///
/// Tool-call fragments and `Done` events carry no text and are skipped.
/// An error ends the stream with that error, which aborts the chunked
/// HTTP body instead of leaving it hanging.
pub fn relay(
    mut rx: mpsc::Receiver<Result<StreamEvent>>,
) -> impl Stream<Item = std::result::Result<String, Error>> + Send + 'static {
    async_stream::stream! {
        let mut chunks = 0usize;
        while let Some(item) = rx.recv().await {
            match item {
                Ok(event) => {
                    let delta = event.content_delta();
                    if !delta.is_empty() {
                        chunks += 1;
                        yield Ok(delta.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, chunks, "relay aborted by stream error");
                    yield Err(e);
                    break;
                }
            }
        }
        tracing::debug!(chunks, "relay finished");
    }
}
