//! The session orchestrator.
//!
//! Each mutating operation follows the same path: take the session's write
//! lock, load it from the store, apply the transition, save it, and only then
//! publish to the session's hub. A failure at any step returns before
//! anything is published.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use quizhub_broadcast::{ConnectionId, HubEvent, HubRegistry, Transport};
use quizhub_core::clock::Clock;
use quizhub_core::command::Command;
use quizhub_core::error::DomainError;
use quizhub_core::identity::Identity;
use quizhub_core::quiz::{Question, QuestionView};
use quizhub_core::rng::DeterministicRng;
use quizhub_core::session::{
    PlaySession, SESSION_CODE_MAX, SESSION_CODE_MIN, SessionCode, SessionState,
};
use quizhub_core::store::Store;
use tracing::{debug, info, instrument};

use crate::application::locks::SessionLocks;
use crate::domain::commands::{
    AddTeam, AdjustTeamScore, AssignUserToTeam, CreateSession, DeleteSession, EndSession,
    JoinSession, NextQuestion, PrevQuestion, RevealAnswer, SendChat, StartSession,
};
use crate::domain::view::SessionView;

/// Attempts at drawing an unused session code before giving up.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Whether a transition needs the quiz's questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Questions {
    Load,
    Skip,
}

/// Authorization-gated operations on live play sessions.
pub struct SessionOrchestrator {
    store: Arc<dyn Store>,
    hubs: Arc<HubRegistry>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn DeterministicRng>>,
    locks: SessionLocks,
}

impl fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("hubs", &self.hubs)
            .finish_non_exhaustive()
    }
}

impl SessionOrchestrator {
    /// Creates an orchestrator over `store`, publishing through `hubs`.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        hubs: Arc<HubRegistry>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            store,
            hubs,
            clock,
            rng: Mutex::new(rng),
            locks: SessionLocks::default(),
        }
    }

    /// The hub registry this orchestrator publishes through.
    #[must_use]
    pub fn hubs(&self) -> &Arc<HubRegistry> {
        &self.hubs
    }

    /// Opens a new session on `command.quiz_id` with `caller` as quiz master.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the quiz does not exist,
    /// `DomainError::NotAuthorized` if it is private and `caller` does not
    /// collaborate on it, and `DomainError::Infrastructure` if no free code
    /// could be found or the store fails.
    #[instrument(skip_all, fields(correlation_id = %command.correlation_id, quiz_id = command.quiz_id))]
    pub async fn create_session(
        &self,
        caller: &Identity,
        command: &CreateSession,
    ) -> Result<PlaySession, DomainError> {
        let quiz = self.store.get_quiz(command.quiz_id).await?;
        if !quiz.can_view(&caller.email) {
            return Err(DomainError::NotAuthorized(format!(
                "{} may not view quiz {}",
                caller.email, quiz.id
            )));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.draw_code();
            let _guard = self.locks.acquire(code).await;
            if self.store.session_exists(code).await? {
                debug!(%code, "session code taken, drawing again");
                continue;
            }
            let session = PlaySession::new(code, quiz.id, caller.email.clone(), self.clock.now());
            match self.store.create_session(&session).await {
                Ok(()) => {
                    self.hubs.get_or_create(code).await;
                    info!(%code, quiz_master = %caller.email, "session created");
                    return Ok(session);
                }
                Err(DomainError::Conflict(_)) => {
                    debug!(%code, "session code claimed concurrently, drawing again");
                }
                Err(e) => return Err(e),
            }
        }
        Err(DomainError::Infrastructure(
            "unable to allocate a session code".to_owned(),
        ))
    }

    /// Loads a session together with its current question.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the session does not exist.
    pub async fn get_session(&self, code: SessionCode) -> Result<SessionView, DomainError> {
        let session = self.store.get_session(code).await?;
        let current_question = if session.state == SessionState::Initialized {
            None
        } else {
            let questions = self.store.get_questions_for_quiz(session.quiz_id).await?;
            session.current_question(&questions).map(QuestionView::from)
        };
        Ok(SessionView {
            session,
            current_question,
        })
    }

    /// Starts the session on its first question.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `InvalidState` if
    /// already started or the quiz is empty, `NotFound` for an unknown
    /// session.
    pub async fn start(&self, caller: &Identity, command: &StartSession) -> Result<(), DomainError> {
        self.apply(command, Questions::Load, |session, questions| {
            session.start(caller, questions.len()).map(|()| true)
        })
        .await
    }

    /// Finishes the session and schedules its hub for teardown once
    /// observers have had time to receive the final reload.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `InvalidState` if
    /// already finished, `NotFound` for an unknown session.
    pub async fn end(&self, caller: &Identity, command: &EndSession) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session.end(caller).map(|()| true)
        })
        .await?;
        self.hubs.schedule_teardown(command.code).await;
        Ok(())
    }

    /// Moves to the next question. Staying on the last question with no
    /// answer revealed changes nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `InvalidState`
    /// unless the session is in progress, `NotFound` for an unknown session.
    pub async fn next_question(
        &self,
        caller: &Identity,
        command: &NextQuestion,
    ) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session.next_question(caller)
        })
        .await
    }

    /// Moves to the previous question, with the same no-op rule as
    /// [`SessionOrchestrator::next_question`].
    ///
    /// # Errors
    ///
    /// Same as [`SessionOrchestrator::next_question`].
    pub async fn prev_question(
        &self,
        caller: &Identity,
        command: &PrevQuestion,
    ) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session.prev_question(caller)
        })
        .await
    }

    /// Reveals the current question's answer.
    ///
    /// # Errors
    ///
    /// Same as [`SessionOrchestrator::next_question`].
    pub async fn reveal_answer(
        &self,
        caller: &Identity,
        command: &RevealAnswer,
    ) -> Result<(), DomainError> {
        self.apply(command, Questions::Load, |session, questions| {
            session.reveal_answer(caller, questions).map(|()| true)
        })
        .await
    }

    /// Adds `caller` to the session's participants. Joining again changes
    /// nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the session is finished, `NotFound` for an unknown
    /// session.
    pub async fn join(&self, caller: &Identity, command: &JoinSession) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| session.join(caller))
            .await
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `Validation` for a
    /// blank name, `Conflict` for a duplicate, `InvalidState` if finished.
    pub async fn add_team(&self, caller: &Identity, command: &AddTeam) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session.add_team(caller, &command.team_name).map(|()| true)
        })
        .await
    }

    /// Puts a participant on a team.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the participant being assigned,
    /// `InvalidState` if finished or the participant has not joined,
    /// `NotFound` for an unknown team or session.
    pub async fn assign_user_to_team(
        &self,
        caller: &Identity,
        command: &AssignUserToTeam,
    ) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session
                .assign_user_to_team(caller, &command.team_name, &command.user)
                .map(|()| true)
        })
        .await
    }

    /// Adds a signed point delta to a team.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `InvalidState` if
    /// finished, `NotFound` for an unknown team or session.
    pub async fn adjust_team_score(
        &self,
        caller: &Identity,
        command: &AdjustTeamScore,
    ) -> Result<(), DomainError> {
        self.apply(command, Questions::Skip, |session, _| {
            session
                .adjust_team_score(caller, &command.team_name, command.delta)
                .map(|()| true)
        })
        .await
    }

    /// Deletes the session. Observers get a final reload. The hub is
    /// unregistered at once, so the freed code can host a new session, and
    /// closed after the teardown grace period.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` unless `caller` is the quiz master, `NotFound` for an
    /// unknown session.
    #[instrument(skip_all, fields(correlation_id = %command.correlation_id, code = %command.code))]
    pub async fn delete_session(
        &self,
        caller: &Identity,
        command: &DeleteSession,
    ) -> Result<(), DomainError> {
        let code = command.code;
        let _guard = self.locks.acquire(code).await;
        let session = self.store.get_session(code).await?;
        if !session.is_quiz_master(caller) {
            return Err(DomainError::NotAuthorized(format!(
                "only the quiz master may delete session {code}"
            )));
        }
        self.store.delete_session(code).await?;
        self.publish(code, HubEvent::Reload).await;
        self.hubs.retire(code).await;
        info!("session deleted");
        Ok(())
    }

    /// Sends a chat line from `caller` to every observer. Chat is not
    /// persisted.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank message, `NotFound` for an unknown session,
    /// `InvalidState` if it has finished.
    #[instrument(skip_all, fields(correlation_id = %command.correlation_id, code = %command.code))]
    pub async fn broadcast_chat_message(
        &self,
        caller: &Identity,
        command: &SendChat,
    ) -> Result<(), DomainError> {
        if command.message.trim().is_empty() {
            return Err(DomainError::Validation(
                "chat message must not be empty".to_owned(),
            ));
        }
        self.require_live(command.code).await?;
        self.publish(
            command.code,
            HubEvent::chat(caller.display_name.clone(), command.message.clone()),
        )
        .await;
        Ok(())
    }

    /// Registers an observer connection on the session's hub.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown session, `InvalidState` if it has finished
    /// or its hub is being torn down.
    #[instrument(skip(self, transport))]
    pub async fn connect<T: Transport>(
        &self,
        code: SessionCode,
        transport: T,
    ) -> Result<ConnectionId, DomainError> {
        self.require_live(code).await?;
        self.hubs.get_or_create(code).await.register(transport).await
    }

    /// Removes an observer connection. Returns `false` if it was not
    /// registered, for instance because the hub already evicted it.
    pub async fn disconnect(&self, code: SessionCode, connection: ConnectionId) -> bool {
        match self.hubs.get(code).await {
            Some(hub) => hub.unregister(connection).await,
            None => false,
        }
    }

    /// Load, transition, save, publish. `transition` returns whether it
    /// changed the session; an unchanged session is neither saved nor
    /// announced.
    #[instrument(
        skip_all,
        fields(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            code = %command.session_code(),
        )
    )]
    async fn apply<C, F>(
        &self,
        command: &C,
        questions: Questions,
        transition: F,
    ) -> Result<(), DomainError>
    where
        C: Command,
        F: FnOnce(&mut PlaySession, &[Question]) -> Result<bool, DomainError> + Send,
    {
        let code = command.session_code();
        let _guard = self.locks.acquire(code).await;

        let mut session = self.store.get_session(code).await?;
        let questions = match questions {
            Questions::Load => self.store.get_questions_for_quiz(session.quiz_id).await?,
            Questions::Skip => Vec::new(),
        };
        if !transition(&mut session, &questions)? {
            debug!("no change");
            return Ok(());
        }
        self.store.save_session(&session).await?;
        self.publish(code, HubEvent::Reload).await;
        info!(state = ?session.state, index = session.current_question_index, "session updated");
        Ok(())
    }

    async fn require_live(&self, code: SessionCode) -> Result<(), DomainError> {
        let session = self.store.get_session(code).await?;
        if session.is_finished() {
            return Err(DomainError::InvalidState(format!(
                "session {code} has finished"
            )));
        }
        Ok(())
    }

    async fn publish(&self, code: SessionCode, event: HubEvent) {
        self.hubs.get_or_create(code).await.publish(event);
    }

    fn draw_code(&self) -> SessionCode {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        SessionCode(rng.next_u32_range(SESSION_CODE_MIN, SESSION_CODE_MAX))
    }
}
