//! Fixture builders for quizzes, questions and callers.

use chrono::{DateTime, TimeZone, Utc};
use quizhub_core::identity::Identity;
use quizhub_core::quiz::{Question, Quiz, QuizId};

/// Email of the quiz master in every fixture.
const QUIZ_MASTER: &str = "qm@example.com";

/// The instant every `FixedClock::default()` reports.
///
/// # Panics
///
/// Never in practice; the date is a valid constant.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// The quiz master's identity.
#[must_use]
pub fn quiz_master() -> Identity {
    Identity::new(QUIZ_MASTER, "Quiz Master")
}

/// A participant identity named `name`, with email `{name}@example.com`.
#[must_use]
pub fn participant(name: &str) -> Identity {
    Identity::new(format!("{}@example.com", name.to_lowercase()), name)
}

/// Question `id` of quiz `quiz_id`, answered `Answer {id}`.
fn question_fixture(quiz_id: QuizId, id: u64) -> Question {
    Question {
        id,
        quiz_id,
        text: format!("Question {id}?"),
        answer: format!("Answer {id}"),
        points: 1,
        image_link: None,
        audio_link: None,
        timer_seconds: None,
    }
}

/// A public quiz owned by the [`quiz_master`] with `question_count` questions
/// numbered from 1.
#[must_use]
pub fn quiz_fixture(quiz_id: QuizId, question_count: u64) -> (Quiz, Vec<Question>) {
    let quiz = Quiz {
        id: quiz_id,
        name: format!("Quiz {quiz_id}"),
        private: false,
        collaborators: vec![QUIZ_MASTER.to_owned()],
    };
    let questions = (1..=question_count)
        .map(|id| question_fixture(quiz_id, id))
        .collect();
    (quiz, questions)
}
