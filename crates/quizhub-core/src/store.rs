//! Durable store port.
//!
//! The live session engine reads quizzes and questions and reads/writes play
//! sessions through this trait. Teams persist as part of their session, so
//! every session write carries its teams with it.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::quiz::{Question, Quiz, QuizId};
use crate::session::{PlaySession, SessionCode};

/// Store trait for quizzes and play sessions.
///
/// Implementations report missing rows as `DomainError::NotFound` and every
/// other failure as `DomainError::Infrastructure`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a quiz definition.
    async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, DomainError>;

    /// Load a quiz's questions in play order.
    async fn get_questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, DomainError>;

    /// Insert a new session. Fails with `DomainError::Conflict` if the code
    /// is already taken.
    async fn create_session(&self, session: &PlaySession) -> Result<(), DomainError>;

    /// Load a session by code.
    async fn get_session(&self, code: SessionCode) -> Result<PlaySession, DomainError>;

    /// Overwrite an existing session.
    async fn save_session(&self, session: &PlaySession) -> Result<(), DomainError>;

    /// Delete a session.
    async fn delete_session(&self, code: SessionCode) -> Result<(), DomainError>;

    /// Returns `true` if a session with this code exists.
    async fn session_exists(&self, code: SessionCode) -> Result<bool, DomainError> {
        match self.get_session(code).await {
            Ok(_) => Ok(true),
            Err(DomainError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
