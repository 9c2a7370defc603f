//! Observer transport port.

use async_trait::async_trait;
use thiserror::Error;

/// Failure writing to an observer's transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer went away.
    #[error("transport closed")]
    Closed,

    /// Any other I/O failure.
    #[error("transport error: {0}")]
    Io(String),
}

/// Outbound half of one observer connection.
///
/// Only the connection's writer task ever calls these methods, so writes to
/// one transport are never interleaved.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Writes one encoded event frame.
    async fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Closes the transport. Called once, after the last frame.
    async fn close(&mut self);
}
