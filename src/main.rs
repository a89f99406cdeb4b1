use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tutor_backend_rust::config::Config;
use tutor_backend_rust::engine::question_bank::BuiltinQuestionBank;
use tutor_backend_rust::engine::prompts::BuiltinPromptSource;
use tutor_backend_rust::engine::{EngineConfig, TutorEngine};
use tutor_backend_rust::logging;
use tutor_backend_rust::routes;
use tutor_backend_rust::state::AppState;
use tutor_backend_rust::store::ProgressStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let store = match ProgressStore::open(&config.data_dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::error!(error = %err, dir = %config.data_dir.display(), "failed to open progress store");
            std::process::exit(1);
        }
    };

    let bank = Arc::new(BuiltinQuestionBank::with_override_file(
        config.data_dir.join("questions.json"),
    ));
    let prompts = Arc::new(BuiltinPromptSource::new());

    let engine = Arc::new(TutorEngine::new(
        EngineConfig::from_env(),
        store,
        bank,
        prompts,
    ));
    let state = AppState::new(engine);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "tutor-backend-rust listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
