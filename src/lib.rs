pub mod config;
pub mod engine;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::engine::prompts::BuiltinPromptSource;
use crate::engine::question_bank::BuiltinQuestionBank;
use crate::engine::{EngineConfig, TutorEngine};
use crate::state::AppState;
use crate::store::ProgressStore;

/// Builds the full application router against the given data directory.
/// Used by `main` indirectly and by the integration tests directly.
pub fn create_app(data_dir: &Path) -> std::io::Result<axum::Router> {
    let store = Arc::new(ProgressStore::open(data_dir)?);
    let bank = Arc::new(BuiltinQuestionBank::with_override_file(
        data_dir.join("questions.json"),
    ));
    let prompts = Arc::new(BuiltinPromptSource::new());
    let engine = Arc::new(TutorEngine::new(
        EngineConfig::default(),
        store,
        bank,
        prompts,
    ));
    let state = AppState::new(engine);

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
