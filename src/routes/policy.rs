use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::put;
use axum::{Json, Router};

use crate::engine::PolicyPatch;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:student_id", put(update_policy))
}

async fn update_policy(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(patch): Json<PolicyPatch>,
) -> Result<impl IntoResponse, AppError> {
    let policy = state.engine().update_policy(&student_id, patch).await?;
    Ok(ok(policy))
}
