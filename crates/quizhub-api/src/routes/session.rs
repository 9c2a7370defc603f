//! Routes for live play sessions.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use quizhub_core::error::DomainError;
use quizhub_core::quiz::QuizId;
use quizhub_core::session::SessionCode;
use quizhub_session::SessionView;
use quizhub_session::domain::commands;

use crate::error::ApiError;
use crate::identity::Caller;
use crate::state::AppState;
use crate::ws;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// The quiz to play.
    pub quiz_id: QuizId,
}

/// Request body for POST /{code}/teams.
#[derive(Debug, Deserialize)]
pub struct AddTeamRequest {
    /// Name of the new team.
    pub team_name: String,
}

/// Request body for POST /{code}/teams/assign.
#[derive(Debug, Deserialize)]
pub struct AssignTeamRequest {
    /// The team to join.
    pub team_name: String,
    /// The participant being assigned. Must be the caller.
    pub email: String,
}

/// Request body for POST /{code}/teams/points.
#[derive(Debug, Deserialize)]
pub struct AdjustScoreRequest {
    /// The team to score.
    pub team_name: String,
    /// Signed point delta.
    pub points: i64,
}

/// Request body for POST /{code}/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Message text.
    pub message: String,
}

/// POST /
#[instrument(skip(state, caller, request), fields(quiz_id = request.quiz_id))]
async fn create_session(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::CreateSession {
        correlation_id: Uuid::new_v4(),
        quiz_id: request.quiz_id,
    };

    info!(correlation_id = %command.correlation_id, "handling create_session command");

    let session = state.orchestrator.create_session(&caller, &command).await?;

    Ok(Json(SessionView {
        session,
        current_question: None,
    }))
}

/// GET /{code}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<SessionCode>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.orchestrator.get_session(code).await?;
    Ok(Json(view))
}

/// DELETE /{code}
#[instrument(skip(state, caller))]
async fn delete_session(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteSession {
        correlation_id: Uuid::new_v4(),
        code,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_session command");

    state.orchestrator.delete_session(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/start
#[instrument(skip(state, caller))]
async fn start(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        code,
    };

    info!(correlation_id = %command.correlation_id, "handling start command");

    state.orchestrator.start(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/end
#[instrument(skip(state, caller))]
async fn end(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::EndSession {
        correlation_id: Uuid::new_v4(),
        code,
    };

    info!(correlation_id = %command.correlation_id, "handling end command");

    state.orchestrator.end(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/next
#[instrument(skip(state, caller))]
async fn next_question(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::NextQuestion {
        correlation_id: Uuid::new_v4(),
        code,
    };
    state.orchestrator.next_question(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/prev
#[instrument(skip(state, caller))]
async fn prev_question(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::PrevQuestion {
        correlation_id: Uuid::new_v4(),
        code,
    };
    state.orchestrator.prev_question(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/reveal
#[instrument(skip(state, caller))]
async fn reveal_answer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::RevealAnswer {
        correlation_id: Uuid::new_v4(),
        code,
    };
    state.orchestrator.reveal_answer(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/join
#[instrument(skip(state, caller))]
async fn join(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
) -> Result<StatusCode, ApiError> {
    let command = commands::JoinSession {
        correlation_id: Uuid::new_v4(),
        code,
    };
    state.orchestrator.join(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/teams
#[instrument(skip(state, caller, request), fields(team_name = %request.team_name))]
async fn add_team(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
    Json(request): Json<AddTeamRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::AddTeam {
        correlation_id: Uuid::new_v4(),
        code,
        team_name: request.team_name,
    };
    state.orchestrator.add_team(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/teams/assign
#[instrument(skip(state, caller, request), fields(team_name = %request.team_name))]
async fn assign_user_to_team(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
    Json(request): Json<AssignTeamRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::AssignUserToTeam {
        correlation_id: Uuid::new_v4(),
        code,
        team_name: request.team_name,
        user: request.email,
    };
    state
        .orchestrator
        .assign_user_to_team(&caller, &command)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/teams/points
#[instrument(skip(state, caller, request), fields(team_name = %request.team_name, points = request.points))]
async fn adjust_team_score(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
    Json(request): Json<AdjustScoreRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::AdjustTeamScore {
        correlation_id: Uuid::new_v4(),
        code,
        team_name: request.team_name,
        delta: request.points,
    };
    state.orchestrator.adjust_team_score(&caller, &command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{code}/chat
#[instrument(skip(state, caller, request))]
async fn send_chat(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(code): Path<SessionCode>,
    Json(request): Json<ChatRequest>,
) -> Result<StatusCode, ApiError> {
    let command = commands::SendChat {
        correlation_id: Uuid::new_v4(),
        code,
        message: request.message,
    };
    state
        .orchestrator
        .broadcast_chat_message(&caller, &command)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{code}/ws
///
/// Unknown and finished sessions are refused before the upgrade request
/// itself is checked.
#[instrument(skip(state, upgrade))]
async fn observe(
    State(state): State<AppState>,
    Path(code): Path<SessionCode>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let view = state.orchestrator.get_session(code).await?;
    if view.session.is_finished() {
        return Err(ApiError(DomainError::InvalidState(format!(
            "session {code} has finished"
        ))));
    }
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    let orchestrator = state.orchestrator;
    Ok(upgrade.on_upgrade(move |socket| ws::serve_observer(orchestrator, code, socket)))
}

/// Returns the router for play sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{code}", get(get_session).delete(delete_session))
        .route("/{code}/start", post(start))
        .route("/{code}/end", post(end))
        .route("/{code}/next", post(next_question))
        .route("/{code}/prev", post(prev_question))
        .route("/{code}/reveal", post(reveal_answer))
        .route("/{code}/join", post(join))
        .route("/{code}/teams", post(add_team))
        .route("/{code}/teams/assign", post(assign_user_to_team))
        .route("/{code}/teams/points", post(adjust_team_score))
        .route("/{code}/chat", post(send_chat))
        .route("/{code}/ws", get(observe))
}
