//! WebSocket observer connections.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use quizhub_broadcast::{Transport, TransportError};
use quizhub_core::session::SessionCode;
use quizhub_session::SessionOrchestrator;
use tracing::{debug, warn};

/// Outbound half of an observer's WebSocket.
pub struct WsTransport {
    sink: SplitSink<WebSocket, Message>,
}

impl WsTransport {
    /// Wraps the sending half of a split socket.
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            debug!(error = %e, "websocket close failed");
        }
    }
}

/// Runs one observer connection: registers its sending half with the
/// session's hub, then reads until the client goes away and unregisters.
///
/// Observers only listen; anything they send besides a close is ignored.
pub async fn serve_observer(
    orchestrator: Arc<SessionOrchestrator>,
    code: SessionCode,
    socket: WebSocket,
) {
    let (sink, mut stream) = socket.split();
    let connection = match orchestrator.connect(code, WsTransport::new(sink)).await {
        Ok(connection) => connection,
        Err(e) => {
            warn!(%code, error = %e, "observer connection refused");
            return;
        }
    };

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%code, connection_id = %connection, error = %e, "websocket read failed");
                break;
            }
        }
    }

    orchestrator.disconnect(code, connection).await;
}
