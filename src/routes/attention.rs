use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::attention::AttentionSample;
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestBody {
    student_id: String,
    /// Attention score in [0, 1].
    score: f64,
    /// Sensor timestamp; defaults to the server clock when omitted.
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ingest", post(ingest))
}

async fn ingest(
    State(state): State<AppState>,
    Json(body): Json<IngestBody>,
) -> Result<impl IntoResponse, AppError> {
    if !(0.0..=1.0).contains(&body.score) {
        return Err(AppError::validation("score must be within [0, 1]"));
    }

    let sample = AttentionSample {
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
        score: body.score,
    };

    let outcome = state
        .engine()
        .ingest_attention(&body.student_id, sample)
        .await?;
    Ok(ok(outcome))
}
