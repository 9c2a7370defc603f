//! Per-connection outbound mailbox and its writer task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use quizhub_core::session::SessionCode;

use crate::hub::ConnectionId;
use crate::transport::Transport;

/// One encoded event, shared by every mailbox it is delivered to.
pub(crate) type Frame = Arc<str>;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Enqueued for the writer task.
    Delivered,
    /// The mailbox stayed full for the whole send timeout.
    TimedOut,
    /// The mailbox was already closed, or its writer has exited.
    Closed,
}

/// Bounded outbound queue of one connection.
///
/// The sender sits behind a lock so that enqueueing and closing can never
/// interleave: once [`Mailbox::close`] returns, no further frame reaches the
/// writer.
#[derive(Debug)]
pub(crate) struct Mailbox {
    slot: Mutex<Option<mpsc::Sender<Frame>>>,
}

impl Mailbox {
    /// Creates a mailbox with room for `capacity` frames.
    pub(crate) fn new(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Enqueues `frame`, waiting at most `timeout` for room. A mailbox that
    /// times out or turns out to be closed is closed for good.
    pub(crate) async fn deliver(&self, frame: Frame, timeout: Duration) -> Delivery {
        let mut slot = self.slot.lock().await;
        let Some(tx) = slot.as_ref() else {
            return Delivery::Closed;
        };
        match tx.send_timeout(frame, timeout).await {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => {
                *slot = None;
                Delivery::TimedOut
            }
            Err(mpsc::error::SendTimeoutError::Closed(_)) => {
                *slot = None;
                Delivery::Closed
            }
        }
    }

    /// Closes the mailbox. The writer drains what is already queued and then
    /// exits. Returns `false` if it was already closed.
    pub(crate) async fn close(&self) -> bool {
        self.slot.lock().await.take().is_some()
    }
}

/// Spawns the task that owns `transport` and drains `frames` into it.
///
/// Each write is bounded by `send_timeout`; a write that fails or stalls ends
/// the task, which drops the receiver so the hub sees the mailbox as closed
/// on its next delivery.
pub(crate) fn spawn_writer<T: Transport>(
    code: SessionCode,
    connection_id: ConnectionId,
    mut frames: mpsc::Receiver<Frame>,
    mut transport: T,
    send_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            match tokio::time::timeout(send_timeout, transport.send(&frame)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(%code, %connection_id, error = %e, "transport write failed");
                    break;
                }
                Err(_) => {
                    warn!(%code, %connection_id, "transport write stalled");
                    break;
                }
            }
        }
        drop(frames);
        if tokio::time::timeout(send_timeout, transport.close())
            .await
            .is_err()
        {
            debug!(%code, %connection_id, "transport close stalled");
        }
        debug!(%code, %connection_id, "writer task finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(s: &str) -> Frame {
        Arc::from(s)
    }

    #[tokio::test]
    async fn test_deliver_enqueues_frame() {
        let (mailbox, mut rx) = Mailbox::new(4);

        let outcome = mailbox.deliver(frame("a"), Duration::from_secs(1)).await;

        assert_eq!(outcome, Delivery::Delivered);
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_close_ends_the_stream_and_rejects_later_frames() {
        let (mailbox, mut rx) = Mailbox::new(4);
        mailbox.deliver(frame("a"), Duration::from_secs(1)).await;

        assert!(mailbox.close().await);
        assert!(!mailbox.close().await);

        let outcome = mailbox.deliver(frame("b"), Duration::from_secs(1)).await;
        assert_eq!(outcome, Delivery::Closed);
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_mailbox_times_out_and_closes() {
        let (mailbox, _rx) = Mailbox::new(1);
        mailbox.deliver(frame("a"), Duration::from_secs(1)).await;

        let started = tokio::time::Instant::now();
        let outcome = mailbox.deliver(frame("b"), Duration::from_secs(1)).await;

        assert_eq!(outcome, Delivery::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(
            mailbox.deliver(frame("c"), Duration::from_secs(1)).await,
            Delivery::Closed
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_reports_closed() {
        let (mailbox, rx) = Mailbox::new(4);
        drop(rx);

        let outcome = mailbox.deliver(frame("a"), Duration::from_secs(1)).await;

        assert_eq!(outcome, Delivery::Closed);
    }
}
