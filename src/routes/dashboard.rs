use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::engine::economy::LeaderMetric;
use crate::response::{ok, AppError};
use crate::state::AppState;

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    metric: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetData {
    student_id: String,
    deleted: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:student_id", get(dashboard).delete(reset_student))
}

pub fn leaderboard_router() -> Router<AppState> {
    Router::new().route("/", get(leaderboard))
}

async fn dashboard(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = state.engine().dashboard(&student_id).await?;
    Ok(ok(dashboard))
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let metric = match query.metric.as_deref() {
        None => LeaderMetric::Coins,
        Some(raw) => LeaderMetric::parse(raw)
            .ok_or_else(|| AppError::validation(format!("unknown leaderboard metric: {raw}")))?,
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);

    let entries = state.engine().leaderboard(metric, limit).await?;
    Ok(ok(entries))
}

async fn reset_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.engine().reset_student(&student_id).await?;
    Ok(ok(ResetData {
        student_id,
        deleted,
    }))
}
