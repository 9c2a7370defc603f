//! Events pushed to observers.
//!
//! Events are invalidation signals, not state snapshots: on `reload` an
//! observer re-fetches the session. Only chat carries a payload, and chat is
//! never persisted.

use serde::{Deserialize, Serialize};

/// Event published to every observer of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HubEvent {
    /// Session state changed; re-fetch it.
    Reload,
    /// A chat line from a participant.
    Chat {
        /// Display name of the sender.
        sender: String,
        /// Message text.
        message: String,
    },
}

impl HubEvent {
    /// Builds a chat event.
    #[must_use]
    pub fn chat(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Chat {
            sender: sender.into(),
            message: message.into(),
        }
    }

    /// Type tag as it appears on the wire.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Chat { .. } => "chat",
        }
    }

    /// Encodes the event as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; with this enum's shape it does not
    /// occur in practice.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `frame` is not a known event.
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
