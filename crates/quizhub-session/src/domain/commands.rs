//! Commands accepted by the session orchestrator.

use quizhub_core::command::Command;
use quizhub_core::quiz::QuizId;
use quizhub_core::session::SessionCode;
use uuid::Uuid;

/// Command to open a new play session for a quiz. The caller becomes its
/// quiz master.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The quiz to play.
    pub quiz_id: QuizId,
}

/// Command to start a session on its first question.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to finish a session.
#[derive(Debug, Clone)]
pub struct EndSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for EndSession {
    fn command_type(&self) -> &'static str {
        "session.end"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to advance to the next question.
#[derive(Debug, Clone)]
pub struct NextQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for NextQuestion {
    fn command_type(&self) -> &'static str {
        "session.next_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to step back to the previous question.
#[derive(Debug, Clone)]
pub struct PrevQuestion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for PrevQuestion {
    fn command_type(&self) -> &'static str {
        "session.prev_question"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to reveal the current question's answer.
#[derive(Debug, Clone)]
pub struct RevealAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for RevealAnswer {
    fn command_type(&self) -> &'static str {
        "session.reveal_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to join a session as a participant.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "session.join"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to create a team.
#[derive(Debug, Clone)]
pub struct AddTeam {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
    /// Name of the new team.
    pub team_name: String,
}

impl Command for AddTeam {
    fn command_type(&self) -> &'static str {
        "session.add_team"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to put a participant on a team.
#[derive(Debug, Clone)]
pub struct AssignUserToTeam {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
    /// The team to join.
    pub team_name: String,
    /// Identity (email) of the participant being assigned.
    pub user: String,
}

impl Command for AssignUserToTeam {
    fn command_type(&self) -> &'static str {
        "session.assign_user_to_team"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to add (or subtract) points for a team.
#[derive(Debug, Clone)]
pub struct AdjustTeamScore {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
    /// The team to score.
    pub team_name: String,
    /// Signed point delta.
    pub delta: i64,
}

impl Command for AdjustTeamScore {
    fn command_type(&self) -> &'static str {
        "session.adjust_team_score"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to broadcast a chat line to every observer.
#[derive(Debug, Clone)]
pub struct SendChat {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
    /// Message text.
    pub message: String,
}

impl Command for SendChat {
    fn command_type(&self) -> &'static str {
        "session.send_chat"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}

/// Command to delete a session outright.
#[derive(Debug, Clone)]
pub struct DeleteSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target session.
    pub code: SessionCode,
}

impl Command for DeleteSession {
    fn command_type(&self) -> &'static str {
        "session.delete"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_code(&self) -> SessionCode {
        self.code
    }
}
