//! Fan-out hub for one play session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use quizhub_core::error::DomainError;
use quizhub_core::session::SessionCode;

use crate::event::HubEvent;
use crate::mailbox::{Delivery, Frame, Mailbox, spawn_writer};
use crate::transport::Transport;

/// Capacity of a hub's inbound event queue.
pub const HUB_INBOX_CAPACITY: usize = 1024;

/// Tunables shared by every hub in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Frames a connection may have queued before it counts as slow.
    pub mailbox_capacity: usize,
    /// How long a delivery may wait on a full mailbox before the connection
    /// is evicted.
    pub send_timeout: Duration,
    /// How long a finished session's hub lingers so observers receive the
    /// terminal event.
    pub teardown_grace: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
            send_timeout: Duration::from_secs(1),
            teardown_grace: Duration::from_secs(3),
        }
    }
}

/// Identifier of one observer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Connections = RwLock<HashMap<ConnectionId, Arc<Mailbox>>>;

/// Owns the live observer connections of one session and fans events out to
/// them.
///
/// Publishing only enqueues into the hub's inbox; a dedicated fan-out task
/// encodes each event once and offers it to every mailbox concurrently, so a
/// stalled observer delays the loop by at most one send timeout before it is
/// evicted.
pub struct BroadcastHub {
    code: SessionCode,
    config: HubConfig,
    inbox: mpsc::Sender<HubEvent>,
    connections: Arc<Connections>,
    closed: AtomicBool,
}

impl fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("code", &self.code)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl BroadcastHub {
    /// Creates a hub and starts its fan-out task. Must be called inside a
    /// tokio runtime.
    #[must_use]
    pub fn spawn(code: SessionCode, config: HubConfig) -> Arc<Self> {
        let (inbox, events) = mpsc::channel(HUB_INBOX_CAPACITY);
        let connections: Arc<Connections> = Arc::new(RwLock::new(HashMap::new()));

        tokio::spawn(fan_out(code, config, Arc::clone(&connections), events));
        debug!(%code, "broadcast hub started");

        Arc::new(Self {
            code,
            config,
            inbox,
            connections,
            closed: AtomicBool::new(false),
        })
    }

    /// The session this hub serves.
    #[must_use]
    pub fn code(&self) -> SessionCode {
        self.code
    }

    /// Returns `true` once the hub has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Queues `event` for every connection registered when it is fanned out.
    ///
    /// Never waits. Returns `false` if the event was dropped because the hub
    /// is closed or its inbox is full.
    pub fn publish(&self, event: HubEvent) -> bool {
        if self.is_closed() {
            debug!(code = %self.code, event_type = event.event_type(), "publish to closed hub ignored");
            return false;
        }
        match self.inbox.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(code = %self.code, event_type = event.event_type(), "hub inbox full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Adds an observer connection and starts its writer task.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the hub has been torn down.
    pub async fn register<T: Transport>(&self, transport: T) -> Result<ConnectionId, DomainError> {
        let id = ConnectionId::new();
        let (mailbox, frames) = Mailbox::new(self.config.mailbox_capacity);
        {
            let mut connections = self.connections.write().await;
            if self.is_closed() {
                return Err(DomainError::InvalidState(format!(
                    "session {} is no longer live",
                    self.code
                )));
            }
            connections.insert(id, Arc::new(mailbox));
        }
        spawn_writer(self.code, id, frames, transport, self.config.send_timeout);
        info!(code = %self.code, connection_id = %id, "observer connected");
        Ok(id)
    }

    /// Removes a connection and closes its mailbox so its writer task ends.
    /// Returns `false` if the connection was not registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().await.remove(&id);
        match removed {
            Some(mailbox) => {
                mailbox.close().await;
                info!(code = %self.code, connection_id = %id, "observer disconnected");
                true
            }
            None => false,
        }
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Tears the hub down: later publishes are ignored, later registrations
    /// are refused, and every remaining connection is unregistered.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mailboxes: Vec<Arc<Mailbox>> = {
            let mut connections = self.connections.write().await;
            connections.drain().map(|(_, mailbox)| mailbox).collect()
        };
        let remaining = mailboxes.len();
        for mailbox in mailboxes {
            mailbox.close().await;
        }
        info!(code = %self.code, remaining, "broadcast hub closed");
    }
}

async fn fan_out(
    code: SessionCode,
    config: HubConfig,
    connections: Arc<Connections>,
    mut events: mpsc::Receiver<HubEvent>,
) {
    while let Some(event) = events.recv().await {
        let frame: Frame = match event.encode() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                warn!(%code, error = %e, "failed to encode event");
                continue;
            }
        };
        let targets: Vec<(ConnectionId, Arc<Mailbox>)> = connections
            .read()
            .await
            .iter()
            .map(|(id, mailbox)| (*id, Arc::clone(mailbox)))
            .collect();
        debug!(%code, event_type = event.event_type(), recipients = targets.len(), "fanning out event");

        let outcomes = join_all(targets.iter().map(|(id, mailbox)| {
            let frame = Arc::clone(&frame);
            async move { (*id, mailbox.deliver(frame, config.send_timeout).await) }
        }))
        .await;

        let dead: Vec<(ConnectionId, Delivery)> = outcomes
            .into_iter()
            .filter(|(_, outcome)| *outcome != Delivery::Delivered)
            .collect();
        if dead.is_empty() {
            continue;
        }
        let mut live = connections.write().await;
        for (id, outcome) in dead {
            if live.remove(&id).is_some() {
                warn!(%code, connection_id = %id, ?outcome, "evicting observer connection");
            }
        }
    }
    debug!(%code, "fan-out task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::transport::TransportError;

    /// Forwards every frame to an unbounded channel.
    struct ChannelTransport(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl Transport for ChannelTransport {
        async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
            self.0.send(frame.to_owned()).map_err(|_| TransportError::Closed)
        }

        async fn close(&mut self) {}
    }

    /// Accepts nothing: every write hangs forever.
    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn send(&mut self, _frame: &str) -> Result<(), TransportError> {
            std::future::pending::<()>().await;
            Ok(())
        }

        async fn close(&mut self) {}
    }

    fn config(mailbox_capacity: usize) -> HubConfig {
        HubConfig {
            mailbox_capacity,
            send_timeout: Duration::from_secs(1),
            teardown_grace: Duration::from_secs(3),
        }
    }

    fn channel() -> (ChannelTransport, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelTransport(tx), rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> HubEvent {
        let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("transport channel closed");
        HubEvent::decode(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_every_connection() {
        let hub = BroadcastHub::spawn(SessionCode(11_111), config(8));
        let (a, mut rx_a) = channel();
        let (b, mut rx_b) = channel();
        hub.register(a).await.unwrap();
        hub.register(b).await.unwrap();

        assert!(hub.publish(HubEvent::Reload));
        assert!(hub.publish(HubEvent::chat("Ada", "hi")));

        assert_eq!(next_event(&mut rx_a).await, HubEvent::Reload);
        assert_eq!(next_event(&mut rx_a).await, HubEvent::chat("Ada", "hi"));
        assert_eq!(next_event(&mut rx_b).await, HubEvent::Reload);
        assert_eq!(next_event(&mut rx_b).await, HubEvent::chat("Ada", "hi"));
    }

    #[tokio::test]
    async fn test_publish_without_connections_is_harmless() {
        let hub = BroadcastHub::spawn(SessionCode(11_112), config(8));
        assert!(hub.publish(HubEvent::Reload));
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_closes_transport_stream() {
        let hub = BroadcastHub::spawn(SessionCode(11_113), config(8));
        let (a, mut rx_a) = channel();
        let id = hub.register(a).await.unwrap();

        assert!(hub.unregister(id).await);
        assert!(!hub.unregister(id).await);
        assert_eq!(hub.connection_count().await, 0);

        // The writer task owned the transport; once it exits the channel
        // reports closed.
        let end = tokio::time::timeout(Duration::from_secs(5), rx_a.recv())
            .await
            .unwrap();
        assert!(end.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_connection_is_evicted_while_fast_one_keeps_receiving() {
        let hub = BroadcastHub::spawn(SessionCode(22_222), config(2));
        let (fast, mut rx_fast) = channel();
        hub.register(fast).await.unwrap();
        hub.register(StalledTransport).await.unwrap();
        assert_eq!(hub.connection_count().await, 2);

        let started = Instant::now();
        for _ in 0..6 {
            assert!(hub.publish(HubEvent::Reload));
        }

        for _ in 0..6 {
            assert_eq!(next_event(&mut rx_fast).await, HubEvent::Reload);
        }
        assert!(started.elapsed() < Duration::from_secs(2));

        while hub.connection_count().await > 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let evicted_after = started.elapsed();
        assert!(evicted_after >= Duration::from_secs(1), "evicted too early: {evicted_after:?}");
        assert!(evicted_after < Duration::from_millis(1_100), "evicted too late: {evicted_after:?}");
    }

    #[tokio::test]
    async fn test_connection_with_dead_writer_is_evicted_on_next_publish() {
        let hub = BroadcastHub::spawn(SessionCode(33_333), config(8));
        let (gone, rx_gone) = channel();
        drop(rx_gone);
        hub.register(gone).await.unwrap();

        // First frame makes the writer fail and exit; a later one finds the
        // mailbox closed.
        hub.publish(HubEvent::Reload);
        for _ in 0..100 {
            if hub.connection_count().await == 0 {
                break;
            }
            hub.publish(HubEvent::Reload);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_closed_hub_ignores_publish_and_refuses_register() {
        let hub = BroadcastHub::spawn(SessionCode(44_444), config(8));
        let (a, mut rx_a) = channel();
        hub.register(a).await.unwrap();

        hub.close().await;

        assert!(hub.is_closed());
        assert_eq!(hub.connection_count().await, 0);
        assert!(!hub.publish(HubEvent::Reload));
        let (b, _rx_b) = channel();
        assert!(matches!(
            hub.register(b).await,
            Err(DomainError::InvalidState(_))
        ));
        let end = tokio::time::timeout(Duration::from_secs(5), rx_a.recv())
            .await
            .unwrap();
        assert!(end.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unregister_races_safely_with_publish() {
        let hub = BroadcastHub::spawn(SessionCode(55_555), config(4));
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..16 {
            let (t, rx) = channel();
            ids.push(hub.register(t).await.unwrap());
            receivers.push(rx);
        }

        let publisher = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for _ in 0..200 {
                    hub.publish(HubEvent::Reload);
                    tokio::task::yield_now().await;
                }
            })
        };
        for id in ids {
            hub.unregister(id).await;
        }
        publisher.await.unwrap();

        assert_eq!(hub.connection_count().await, 0);
        for mut rx in receivers {
            // Every stream terminates: nothing is written after close.
            let drained = tokio::time::timeout(Duration::from_secs(5), async {
                while rx.recv().await.is_some() {}
            })
            .await;
            assert!(drained.is_ok());
        }
    }
}
