//! QuizHub Broadcast — live fan-out of session events.
//!
//! One [`BroadcastHub`] per active session owns that session's observer
//! connections. Each connection gets a bounded mailbox drained by its own
//! writer task, so a slow observer is evicted instead of stalling the rest.
//! [`HubRegistry`] maps session codes to hubs for the whole process.

pub mod event;
pub mod hub;
mod mailbox;
pub mod registry;
pub mod transport;

pub use event::HubEvent;
pub use hub::{BroadcastHub, ConnectionId, HubConfig};
pub use registry::HubRegistry;
pub use transport::{Transport, TransportError};
