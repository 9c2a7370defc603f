//! Test stores — `Store` implementations for error-path tests.

use async_trait::async_trait;
use quizhub_core::error::DomainError;
use quizhub_core::quiz::{Question, Quiz, QuizId};
use quizhub_core::session::{PlaySession, SessionCode};
use quizhub_core::store::Store;

fn refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

/// A store that fails every call with an infrastructure error.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn get_quiz(&self, _quiz_id: QuizId) -> Result<Quiz, DomainError> {
        Err(refused())
    }

    async fn get_questions_for_quiz(&self, _quiz_id: QuizId) -> Result<Vec<Question>, DomainError> {
        Err(refused())
    }

    async fn create_session(&self, _session: &PlaySession) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn get_session(&self, _code: SessionCode) -> Result<PlaySession, DomainError> {
        Err(refused())
    }

    async fn save_session(&self, _session: &PlaySession) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn delete_session(&self, _code: SessionCode) -> Result<(), DomainError> {
        Err(refused())
    }
}

/// Wraps another store, passing reads and creates through while every
/// `save_session` and `delete_session` fails. Used to check that nothing is
/// broadcast for a change that was never persisted.
#[derive(Debug)]
pub struct ReadOnlyStore<S>(pub S);

#[async_trait]
impl<S: Store> Store for ReadOnlyStore<S> {
    async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, DomainError> {
        self.0.get_quiz(quiz_id).await
    }

    async fn get_questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, DomainError> {
        self.0.get_questions_for_quiz(quiz_id).await
    }

    async fn create_session(&self, session: &PlaySession) -> Result<(), DomainError> {
        self.0.create_session(session).await
    }

    async fn get_session(&self, code: SessionCode) -> Result<PlaySession, DomainError> {
        self.0.get_session(code).await
    }

    async fn save_session(&self, _session: &PlaySession) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn delete_session(&self, _code: SessionCode) -> Result<(), DomainError> {
        Err(refused())
    }
}
