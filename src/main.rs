use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_judge::{
    api,
    arbiter::Arbiter,
    llm,
    state::{AppState, EvaluationConfig},
};

const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3001);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivia_judge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting trivia judge...");

    let config = EvaluationConfig::from_env();

    // Without providers only fuzzy matches can be answered
    let llm_config = llm::LlmConfig::from_env();
    let arbiter = match llm_config.build_manager() {
        Ok(manager) => {
            tracing::info!(
                providers = manager.providers.len(),
                "LLM providers initialized successfully"
            );
            Some(Arbiter::new(manager, &llm_config))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize LLM providers: {}. Answers that need arbitration will fail.",
                e
            );
            None
        }
    };

    let state = Arc::new(AppState::new(arbiter, config));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = match std::env::var("JUDGE_ADDR") {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid JUDGE_ADDR {:?}: {}, using default", value, e);
            SocketAddr::from(DEFAULT_ADDR)
        }),
        Err(_) => SocketAddr::from(DEFAULT_ADDR),
    };
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
