//! In-memory implementation of the `Store` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use quizhub_core::error::DomainError;
use quizhub_core::quiz::{Question, Quiz, QuizId};
use quizhub_core::session::{PlaySession, SessionCode};
use quizhub_core::store::Store;

#[derive(Debug)]
struct QuizRecord {
    quiz: Quiz,
    questions: Vec<Question>,
}

/// Process-local store backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    quizzes: RwLock<HashMap<QuizId, QuizRecord>>,
    sessions: RwLock<HashMap<SessionCode, PlaySession>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a quiz together with its questions, in play order.
    pub async fn insert_quiz(&self, quiz: Quiz, questions: Vec<Question>) {
        debug!(quiz_id = quiz.id, questions = questions.len(), "quiz stored");
        self.quizzes
            .write()
            .await
            .insert(quiz.id, QuizRecord { quiz, questions });
    }

    /// Number of stored quizzes.
    pub async fn quiz_count(&self) -> usize {
        self.quizzes.read().await.len()
    }
}

fn quiz_not_found(quiz_id: QuizId) -> DomainError {
    DomainError::NotFound(format!("quiz {quiz_id} not found"))
}

fn session_not_found(code: SessionCode) -> DomainError {
    DomainError::NotFound(format!("session {code} not found"))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_quiz(&self, quiz_id: QuizId) -> Result<Quiz, DomainError> {
        self.quizzes
            .read()
            .await
            .get(&quiz_id)
            .map(|record| record.quiz.clone())
            .ok_or_else(|| quiz_not_found(quiz_id))
    }

    async fn get_questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, DomainError> {
        self.quizzes
            .read()
            .await
            .get(&quiz_id)
            .map(|record| record.questions.clone())
            .ok_or_else(|| quiz_not_found(quiz_id))
    }

    async fn create_session(&self, session: &PlaySession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.code) {
            return Err(DomainError::Conflict(format!(
                "session code {} is already in use",
                session.code
            )));
        }
        sessions.insert(session.code, session.clone());
        Ok(())
    }

    async fn get_session(&self, code: SessionCode) -> Result<PlaySession, DomainError> {
        self.sessions
            .read()
            .await
            .get(&code)
            .cloned()
            .ok_or_else(|| session_not_found(code))
    }

    async fn save_session(&self, session: &PlaySession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.code) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(session_not_found(session.code)),
        }
    }

    async fn delete_session(&self, code: SessionCode) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .remove(&code)
            .map(|_| ())
            .ok_or_else(|| session_not_found(code))
    }
}
