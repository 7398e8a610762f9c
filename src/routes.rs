use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Headroom on top of the image limit for the prompt and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Chat page
        .route("/", get(handlers::index))
        .route("/turn", post(handlers::submit_turn))
        .route("/session", post(handlers::new_session))

        // JSON API
        .route("/api/health", get(handlers::health_check))
        .route("/api/agent", get(handlers::agent_definition))

        // Static file serving
        .nest_service("/static", ServeDir::new(&state.config.ui.static_dir))
}

/// The full application with body limit, tracing and CORS layers applied.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.ui.max_upload_bytes + FORM_OVERHEAD_BYTES;

    create_routes(&state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
