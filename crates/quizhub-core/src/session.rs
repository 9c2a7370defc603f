//! Play sessions: one live run of a quiz.
//!
//! [`PlaySession`] is the persisted snapshot of a session together with the
//! pure transition logic that governs it. Every transition checks
//! authorization first, then the lifecycle state, and only then mutates, so
//! a rejected call leaves the session untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::identity::Identity;
use crate::quiz::{Question, QuizId};
use crate::team::Team;

/// Smallest session code handed out.
pub const SESSION_CODE_MIN: u32 = 10_000;

/// Largest session code handed out.
pub const SESSION_CODE_MAX: u32 = 99_999;

/// Short numeric code participants use to join a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(pub u32);

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(SessionCode)
            .map_err(|_| DomainError::Validation(format!("bad session code: {s:?}")))
    }
}

/// Lifecycle of a play session. Strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Created, waiting for the quiz master to start.
    Initialized,
    /// Questions are being played.
    InProgress,
    /// Terminal. Only reads are accepted.
    Finished,
}

/// Persisted state of one play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    /// Join code.
    pub code: SessionCode,
    /// The quiz being played.
    pub quiz_id: QuizId,
    /// Identity (email) of the owner; the only caller allowed to drive the
    /// session.
    pub quiz_master: String,
    /// Lifecycle state.
    pub state: SessionState,
    /// Zero-based index into the quiz's questions.
    pub current_question_index: usize,
    /// Number of questions in the quiz, captured at start.
    pub question_count: usize,
    /// Answer of the current question once revealed.
    pub current_answer: Option<String>,
    /// Participants who joined, in join order, without duplicates.
    pub users: Vec<String>,
    /// Teams in creation order.
    pub teams: Vec<Team>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl PlaySession {
    /// Creates a new session in the `Initialized` state.
    #[must_use]
    pub fn new(
        code: SessionCode,
        quiz_id: QuizId,
        quiz_master: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            quiz_id,
            quiz_master: quiz_master.into(),
            state: SessionState::Initialized,
            current_question_index: 0,
            question_count: 0,
            current_answer: None,
            users: Vec::new(),
            teams: Vec::new(),
            created_at,
        }
    }

    /// Returns `true` if `caller` owns this session.
    #[must_use]
    pub fn is_quiz_master(&self, caller: &Identity) -> bool {
        caller.is(&self.quiz_master)
    }

    /// Returns `true` once the session has reached `Finished`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Looks up a team by name. Surrounding whitespace is ignored, as it is
    /// when the team is created.
    #[must_use]
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.team_position(name).map(|i| &self.teams[i])
    }

    /// Returns the current question from the quiz's ordered questions, once
    /// the session has been started.
    #[must_use]
    pub fn current_question<'q>(&self, questions: &'q [Question]) -> Option<&'q Question> {
        match self.state {
            SessionState::Initialized => None,
            SessionState::InProgress | SessionState::Finished => {
                questions.get(self.current_question_index)
            }
        }
    }

    /// Moves the session from `Initialized` to `InProgress` on the first
    /// question.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` if `caller` is not the quiz
    /// master, and `DomainError::InvalidState` if the session was already
    /// started or the quiz has no questions.
    pub fn start(&mut self, caller: &Identity, question_count: usize) -> Result<(), DomainError> {
        self.require_quiz_master(caller, "start")?;
        if self.state != SessionState::Initialized {
            return Err(DomainError::InvalidState(format!(
                "session {} has already been started",
                self.code
            )));
        }
        if question_count == 0 {
            return Err(DomainError::InvalidState(format!(
                "quiz {} has no questions",
                self.quiz_id
            )));
        }

        self.state = SessionState::InProgress;
        self.question_count = question_count;
        self.current_question_index = 0;
        self.current_answer = None;
        Ok(())
    }

    /// Advances to the next question, staying on the last one at the end.
    /// Always hides the revealed answer. Returns `false` if neither the
    /// question nor the answer changed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` for anyone but the quiz master and
    /// `DomainError::InvalidState` unless the session is `InProgress`.
    pub fn next_question(&mut self, caller: &Identity) -> Result<bool, DomainError> {
        self.require_quiz_master(caller, "change questions")?;
        self.require_in_progress()?;

        let last = self.question_count.saturating_sub(1);
        Ok(self.move_to((self.current_question_index + 1).min(last)))
    }

    /// Steps back to the previous question, staying on the first one at the
    /// start. Always hides the revealed answer. Returns `false` if neither
    /// the question nor the answer changed.
    ///
    /// # Errors
    ///
    /// Same as [`PlaySession::next_question`].
    pub fn prev_question(&mut self, caller: &Identity) -> Result<bool, DomainError> {
        self.require_quiz_master(caller, "change questions")?;
        self.require_in_progress()?;

        Ok(self.move_to(self.current_question_index.saturating_sub(1)))
    }

    fn move_to(&mut self, index: usize) -> bool {
        let moved = index != self.current_question_index;
        let hidden = self.current_answer.take().is_some();
        self.current_question_index = index;
        moved || hidden
    }

    /// Reveals the current question's answer. Revealing twice is the same as
    /// revealing once.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` for anyone but the quiz master,
    /// `DomainError::InvalidState` unless `InProgress`, and
    /// `DomainError::NotFound` if `questions` has no entry at the current
    /// index.
    pub fn reveal_answer(
        &mut self,
        caller: &Identity,
        questions: &[Question],
    ) -> Result<(), DomainError> {
        self.require_quiz_master(caller, "reveal answers")?;
        self.require_in_progress()?;

        let question = questions.get(self.current_question_index).ok_or_else(|| {
            DomainError::NotFound(format!(
                "question {} of quiz {}",
                self.current_question_index, self.quiz_id
            ))
        })?;
        self.current_answer = Some(question.answer.clone());
        Ok(())
    }

    /// Finishes the session. Allowed from `Initialized` (abandonment) and
    /// `InProgress`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` for anyone but the quiz master and
    /// `DomainError::InvalidState` if the session is already finished.
    pub fn end(&mut self, caller: &Identity) -> Result<(), DomainError> {
        self.require_quiz_master(caller, "end")?;
        self.require_not_finished()?;

        self.state = SessionState::Finished;
        Ok(())
    }

    /// Adds `participant` to the session. Returns `false` if they had already
    /// joined, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the session is finished.
    pub fn join(&mut self, participant: &Identity) -> Result<bool, DomainError> {
        self.require_not_finished()?;

        if self.users.iter().any(|u| participant.is(u)) {
            return Ok(false);
        }
        self.users.push(participant.email.clone());
        Ok(true)
    }

    /// Creates an empty team.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` for anyone but the quiz master,
    /// `DomainError::InvalidState` if finished, `DomainError::Validation` for
    /// a blank name, and `DomainError::Conflict` if the name is taken.
    pub fn add_team(&mut self, caller: &Identity, name: &str) -> Result<(), DomainError> {
        self.require_quiz_master(caller, "create teams")?;
        self.require_not_finished()?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "team name must not be empty".to_owned(),
            ));
        }
        if self.team(name).is_some() {
            return Err(DomainError::Conflict(format!(
                "team {name:?} already exists in session {}",
                self.code
            )));
        }

        self.teams.push(Team::new(name));
        Ok(())
    }

    /// Puts `user` on the named team. Participants pick their own team, so
    /// `caller` must be `user`. Assignment is last-write-wins: the user is
    /// taken off any other team first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` if `caller` is not `user`,
    /// `DomainError::InvalidState` if finished or `user` has not joined, and
    /// `DomainError::NotFound` for an unknown team.
    pub fn assign_user_to_team(
        &mut self,
        caller: &Identity,
        team_name: &str,
        user: &str,
    ) -> Result<(), DomainError> {
        if !caller.is(user) {
            return Err(DomainError::NotAuthorized(
                "participants may only choose their own team".to_owned(),
            ));
        }
        self.require_not_finished()?;
        if !self.users.iter().any(|u| u == user) {
            return Err(DomainError::InvalidState(format!(
                "{user} has not joined session {}",
                self.code
            )));
        }
        let target = self
            .team_position(team_name)
            .ok_or_else(|| self.team_not_found(team_name))?;

        for (i, team) in self.teams.iter_mut().enumerate() {
            if i == target {
                team.add_member(user);
            } else {
                team.remove_member(user);
            }
        }
        Ok(())
    }

    /// Applies a signed point delta to the named team.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAuthorized` for anyone but the quiz master,
    /// `DomainError::InvalidState` if finished, and `DomainError::NotFound`
    /// for an unknown team.
    pub fn adjust_team_score(
        &mut self,
        caller: &Identity,
        team_name: &str,
        delta: i64,
    ) -> Result<(), DomainError> {
        self.require_quiz_master(caller, "adjust scores")?;
        self.require_not_finished()?;

        let target = self
            .team_position(team_name)
            .ok_or_else(|| self.team_not_found(team_name))?;
        self.teams[target].add_points(delta);
        Ok(())
    }

    fn team_position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.teams.iter().position(|t| t.name == name)
    }

    fn require_quiz_master(&self, caller: &Identity, action: &str) -> Result<(), DomainError> {
        if self.is_quiz_master(caller) {
            Ok(())
        } else {
            Err(DomainError::NotAuthorized(format!(
                "only the quiz master may {action} session {}",
                self.code
            )))
        }
    }

    fn require_in_progress(&self) -> Result<(), DomainError> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(DomainError::InvalidState(format!(
                "session {} is not in progress",
                self.code
            )))
        }
    }

    fn require_not_finished(&self) -> Result<(), DomainError> {
        if self.is_finished() {
            Err(DomainError::InvalidState(format!(
                "session {} has finished",
                self.code
            )))
        } else {
            Ok(())
        }
    }

    fn team_not_found(&self, team_name: &str) -> DomainError {
        DomainError::NotFound(format!("team {team_name:?} in session {}", self.code))
    }
}
