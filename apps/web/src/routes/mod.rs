pub mod flash;
pub mod form;
pub mod generate;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(form::handle_index))
        .route("/generate", post(generate::handle_generate))
        .route("/health", get(health::health_handler))
        .fallback(form::handle_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(form::handle_panic))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
