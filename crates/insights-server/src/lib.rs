pub mod routes;
pub mod state;

use axum::Router;
use insights_core::config::AppConfig;
use insights_core::source::ConversationSource;
use insights_core::store::LoadOutcome;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = state.config.server.cors;

    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::conversation_routes())
        .merge(routes::insights_routes())
        .merge(routes::reload_routes())
        .with_state(state);

    // Middleware stack.
    app = app.layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Load the source once, then start the HTTP server.
pub async fn serve(config: AppConfig, source: Arc<dyn ConversationSource>) -> anyhow::Result<()> {
    let state = AppState::new(config.clone(), source);

    match state.reload().await {
        LoadOutcome::Replaced { count } => {
            tracing::info!("Serving {} conversations from {}", count, state.source.describe())
        }
        _ => tracing::warn!(
            "Initial load from {} failed; serving an empty set until /api/reload succeeds",
            state.source.describe()
        ),
    }

    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
