//! Read model returned to observers.

use quizhub_core::quiz::QuestionView;
use quizhub_core::session::PlaySession;
use serde::Serialize;

/// A session as observers see it: the persisted state plus the current
/// question, resolved at read time. The question never carries its answer;
/// a revealed answer is only visible through `current_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The persisted session.
    #[serde(flatten)]
    pub session: PlaySession,
    /// The question at `current_question_index`, once the session has been
    /// started.
    pub current_question: Option<QuestionView>,
}
