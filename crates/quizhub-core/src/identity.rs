//! Caller identity as delivered by the external authenticator.

use serde::{Deserialize, Serialize};

/// A verified caller. The core never checks credentials; it only compares
/// identities for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque identity key (the user's email address).
    pub email: String,
    /// Human-readable name shown to other participants.
    pub display_name: String,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns `true` if this identity has the given key.
    #[must_use]
    pub fn is(&self, email: &str) -> bool {
        self.email == email
    }
}
