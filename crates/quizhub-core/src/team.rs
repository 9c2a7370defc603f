//! Teams: the scoring units of a play session.

use serde::{Deserialize, Serialize};

/// A team within one play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Name, unique within the owning session.
    pub name: String,
    /// Accumulated points. May go negative after adjustments.
    pub points: i64,
    /// Identities (emails) assigned to this team.
    pub members: Vec<String>,
}

impl Team {
    /// Creates an empty team with zero points.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: 0,
            members: Vec::new(),
        }
    }

    /// Applies a signed point delta.
    pub fn add_points(&mut self, delta: i64) {
        self.points = self.points.saturating_add(delta);
    }

    /// Returns `true` if `email` is a member of this team.
    #[must_use]
    pub fn has_member(&self, email: &str) -> bool {
        self.members.iter().any(|m| m == email)
    }

    /// Adds `email` to the team. No-op if already a member.
    pub(crate) fn add_member(&mut self, email: &str) {
        if !self.has_member(email) {
            self.members.push(email.to_owned());
        }
    }

    /// Removes `email` from the team. No-op if not a member.
    pub(crate) fn remove_member(&mut self, email: &str) {
        self.members.retain(|m| m != email);
    }
}
