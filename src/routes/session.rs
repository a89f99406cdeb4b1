use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupSessionBody {
    student_id: String,
    grade: String,
    board: String,
    subject: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartFocusBody {
    student_id: String,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteFocusBody {
    student_id: String,
    minutes: u32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/setup", post(setup_session))
        .route("/focus/start", post(start_focus))
        .route("/focus/complete", post(complete_focus))
}

async fn setup_session(
    State(state): State<AppState>,
    Json(body): Json<SetupSessionBody>,
) -> Result<impl IntoResponse, AppError> {
    if body.student_id.trim().is_empty() {
        return Err(AppError::validation("studentId must not be empty"));
    }

    let snapshot = state
        .engine()
        .setup_session(&body.student_id, &body.grade, &body.board, &body.subject)
        .await?;
    Ok(ok(snapshot))
}

async fn start_focus(
    State(state): State<AppState>,
    Json(body): Json<StartFocusBody>,
) -> Result<impl IntoResponse, AppError> {
    let started = state
        .engine()
        .start_focus_session(&body.student_id, body.subject)
        .await?;
    Ok(ok(started))
}

async fn complete_focus(
    State(state): State<AppState>,
    Json(body): Json<CompleteFocusBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .engine()
        .complete_focus_session(&body.student_id, body.minutes)
        .await?
        .ok_or_else(|| AppError::bad_request("no focus session in progress"))?;
    Ok(ok(outcome))
}
