//! Quiz definitions consumed by play sessions.
//!
//! Quizzes and their questions are authored elsewhere; a play session only
//! ever reads them.

use serde::{Deserialize, Serialize};

/// Identifier of a quiz in the store.
pub type QuizId = u64;

/// Identifier of a question in the store.
pub type QuestionId = u64;

/// An immutable quiz definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Quiz identifier.
    pub id: QuizId,
    /// Display name.
    pub name: String,
    /// Private quizzes are visible only to their collaborators.
    #[serde(default)]
    pub private: bool,
    /// Identities (emails) allowed to edit and always allowed to view.
    #[serde(default)]
    pub collaborators: Vec<String>,
}

impl Quiz {
    /// Returns `true` if `email` is one of the quiz's collaborators.
    #[must_use]
    pub fn is_collaborator(&self, email: &str) -> bool {
        self.collaborators.iter().any(|c| c == email)
    }

    /// Returns `true` if `email` may view the quiz: it is public, or the
    /// caller collaborates on it.
    #[must_use]
    pub fn can_view(&self, email: &str) -> bool {
        !self.private || self.is_collaborator(email)
    }
}

/// One question of a quiz, including its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier.
    pub id: QuestionId,
    /// The owning quiz.
    pub quiz_id: QuizId,
    /// Prompt text.
    pub text: String,
    /// Answer text, revealed by the quiz master.
    pub answer: String,
    /// Suggested points for a correct answer.
    #[serde(default)]
    pub points: u32,
    /// Optional image shown with the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    /// Optional audio clip played with the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_link: Option<String>,
    /// Optional answer timer in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<u32>,
}

/// A question as shown to observers. The answer is deliberately absent; it
/// only becomes visible through the session's revealed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Question identifier.
    pub id: QuestionId,
    /// Prompt text.
    pub text: String,
    /// Suggested points for a correct answer.
    pub points: u32,
    /// Optional image shown with the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    /// Optional audio clip played with the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_link: Option<String>,
    /// Optional answer timer in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<u32>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            points: question.points,
            image_link: question.image_link.clone(),
            audio_link: question.audio_link.clone(),
            timer_seconds: question.timer_seconds,
        }
    }
}
