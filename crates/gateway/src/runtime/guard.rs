//! Guarded consumption of a provider stream.
//!
//! A producer task pulls events from the provider and pushes them onto a
//! bounded channel. Each pull races against the request's cancellation
//! token and an idle timeout, so a stalled upstream never hangs the
//! request. Dropping the receiver (client went away) ends the task and
//! with it the upstream connection.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use ym_domain::error::{Error, Result};
use ym_domain::stream::{BoxStream, StreamEvent};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct StreamGuard {
    pub cancel: CancellationToken,
    /// Maximum silence between two events.
    pub idle_timeout: Duration,
}

impl StreamGuard {
    pub fn new(cancel: CancellationToken, idle_timeout: Duration) -> Self {
        Self {
            cancel,
            idle_timeout,
        }
    }
}

/// Spawn the producer task and hand back the consuming end.
///
/// Events arrive in upstream order. At most one error is delivered, and it
/// is always the last item.
pub fn spawn_pump(
    mut upstream: BoxStream<'static, Result<StreamEvent>>,
    guard: StreamGuard,
) -> mpsc::Receiver<Result<StreamEvent>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                biased;
                _ = guard.cancel.cancelled() => {
                    tracing::debug!("provider stream cancelled");
                    let _ = tx.send(Err(Error::Cancelled("request cancelled".into()))).await;
                    break;
                }
                _ = tx.closed() => {
                    tracing::debug!("stream consumer dropped; closing upstream");
                    break;
                }
                next = tokio::time::timeout(guard.idle_timeout, upstream.next()) => next,
            };

            match next {
                Err(_) => {
                    tracing::warn!(
                        idle_secs = guard.idle_timeout.as_secs_f64(),
                        "provider stream idle timeout"
                    );
                    let _ = tx
                        .send(Err(Error::Timeout(format!(
                            "no data from provider for {:?}",
                            guard.idle_timeout
                        ))))
                        .await;
                    break;
                }
                Ok(None) => break,
                Ok(Some(item)) => {
                    let failed = item.is_err();
                    if tx.send(item).await.is_err() || failed {
                        break;
                    }
                }
            }
        }
    });

    rx
}
