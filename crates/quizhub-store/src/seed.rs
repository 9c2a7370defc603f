//! Loading quiz definitions from a JSON seed document.
//!
//! The document is an array of entries, each holding one quiz and its
//! questions in play order:
//!
//! ```json
//! [
//!   {
//!     "quiz": { "id": 1, "name": "Capitals", "private": false, "collaborators": [] },
//!     "questions": [
//!       { "id": 1, "quiz_id": 1, "text": "Capital of France?", "answer": "Paris", "points": 1 }
//!     ]
//!   }
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use quizhub_core::quiz::{Question, Quiz, QuizId};

use crate::memory::InMemoryStore;

/// One quiz with its questions.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSeed {
    /// The quiz definition.
    pub quiz: Quiz,
    /// Its questions, in play order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Errors raised while loading a seed document.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid seed JSON.
    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The same quiz id appears twice.
    #[error("quiz {0} is defined more than once")]
    DuplicateQuiz(QuizId),

    /// A question names a different quiz than the entry it sits in.
    #[error("question {question_id} belongs to quiz {found}, not quiz {expected}")]
    MismatchedQuestion {
        /// The offending question.
        question_id: u64,
        /// The quiz of the enclosing entry.
        expected: QuizId,
        /// The quiz named by the question.
        found: QuizId,
    },
}

/// Parses and validates a seed document.
///
/// # Errors
///
/// Returns `SeedError` if the JSON is malformed, a quiz id repeats, or a
/// question is filed under the wrong quiz.
pub fn parse_seed(json: &str) -> Result<Vec<QuizSeed>, SeedError> {
    let seeds: Vec<QuizSeed> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for seed in &seeds {
        if !seen.insert(seed.quiz.id) {
            return Err(SeedError::DuplicateQuiz(seed.quiz.id));
        }
        if let Some(stray) = seed.questions.iter().find(|q| q.quiz_id != seed.quiz.id) {
            return Err(SeedError::MismatchedQuestion {
                question_id: stray.id,
                expected: seed.quiz.id,
                found: stray.quiz_id,
            });
        }
    }
    Ok(seeds)
}

impl InMemoryStore {
    /// Loads every quiz in `json` into the store. Returns the number of
    /// quizzes loaded.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the document fails [`parse_seed`]; nothing is
    /// loaded in that case.
    pub async fn load_seed(&self, json: &str) -> Result<usize, SeedError> {
        let seeds = parse_seed(json)?;
        let count = seeds.len();
        for seed in seeds {
            self.insert_quiz(seed.quiz, seed.questions).await;
        }
        Ok(count)
    }

    /// Reads `path` and loads it with [`InMemoryStore::load_seed`].
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read, or any error
    /// [`InMemoryStore::load_seed`] reports.
    pub async fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<usize, SeedError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let count = self.load_seed(&json).await?;
        info!(path = %path.display(), quizzes = count, "quiz seed loaded");
        Ok(count)
    }
}
