#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use tutor_backend_rust::engine::prompts::BuiltinPromptSource;
use tutor_backend_rust::engine::question_bank::BuiltinQuestionBank;
use tutor_backend_rust::engine::{EngineConfig, TutorEngine};
use tutor_backend_rust::store::ProgressStore;

/// Full router against a throwaway data directory. Keep the TempDir alive for
/// the duration of the test.
pub fn create_test_app() -> (Router, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let app = tutor_backend_rust::create_app(dir.path()).expect("create app");
    (app, dir)
}

pub fn create_test_engine() -> (Arc<TutorEngine>, TempDir) {
    create_test_engine_with(EngineConfig::default())
}

pub fn create_test_engine_with(config: EngineConfig) -> (Arc<TutorEngine>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(ProgressStore::open(dir.path()).expect("open store"));
    let engine = Arc::new(TutorEngine::new(
        config,
        store,
        Arc::new(BuiltinQuestionBank::new()),
        Arc::new(BuiltinPromptSource::new()),
    ));
    (engine, dir)
}

pub fn create_test_store() -> (Arc<ProgressStore>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(ProgressStore::open(dir.path()).expect("open store"));
    (store, dir)
}
