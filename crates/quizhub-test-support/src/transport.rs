//! Test transports — `Transport` implementations for orchestrator tests.

use async_trait::async_trait;
use quizhub_broadcast::{HubEvent, Transport, TransportError};
use tokio::sync::mpsc;

/// Forwards every frame it is asked to write into a channel the test holds.
#[derive(Debug)]
pub struct RecordingTransport {
    frames: mpsc::UnboundedSender<String>,
}

impl RecordingTransport {
    /// Creates a transport and the receiving end of its frame log.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (frames, rx) = mpsc::unbounded_channel();
        (Self { frames }, rx)
    }

    /// Drains every frame recorded so far and decodes it.
    ///
    /// # Panics
    ///
    /// Panics if a recorded frame is not a valid `HubEvent`.
    pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<HubEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            events.push(decode_frame(&frame));
        }
        events
    }
}

fn decode_frame(frame: &str) -> HubEvent {
    HubEvent::decode(frame).unwrap_or_else(|e| panic!("undecodable frame {frame:?}: {e}"))
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.frames
            .send(frame.to_owned())
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) {}
}

/// A transport whose writes never complete.
#[derive(Debug)]
pub struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn send(&mut self, _frame: &str) -> Result<(), TransportError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn close(&mut self) {}
}

/// A transport whose peer has already gone away.
#[derive(Debug)]
pub struct ClosedTransport;

#[async_trait]
impl Transport for ClosedTransport {
    async fn send(&mut self, _frame: &str) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }

    async fn close(&mut self) {}
}
