pub mod api;
pub mod config;
pub mod episode_store;
pub mod error;
pub mod health;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let max_body_bytes = config.limits.max_body_bytes;
    let allow_any_origin = config.allow_any_origin;
    let state = AppState::new(config);

    let mut app = Router::new()
        .route("/save", post(api::save_episode))
        .route("/episodes", get(api::list_episodes))
        .route("/episodes/{name}", get(api::get_episode))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    if allow_any_origin {
        app = app.layer(CorsLayer::permissive());
    }

    let app = app
        .fallback_service(ServeDir::new(&web_root))
        .with_state(state.clone());

    (app, state)
}
