use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Keyword synthesizer
        .route("/api/generate", post(handlers::generate))
        // Model-backed generation with synthesizer fallback
        .route("/generate", post(handlers::generate_with_model))
        // Advisors
        .route("/api/cost", post(handlers::estimate_cost))
        .route("/api/explain", post(handlers::explain))
        .route("/api/export-terraform", post(handlers::export_terraform))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::save_settings),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
