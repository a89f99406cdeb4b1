mod attention;
mod dashboard;
mod health;
mod perks;
mod policy;
mod quiz;
mod session;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::ErrorResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/session", session::router())
        .nest("/api/quiz", quiz::router())
        .nest("/api/perks", perks::router())
        .nest("/api/attention", attention::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/leaderboard", dashboard::leaderboard_router())
        .nest("/api/policy", policy::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(ErrorResponse {
            success: false,
            error: "route not found".to_string(),
            code: "NOT_FOUND".to_string(),
        }),
    )
        .into_response()
}
