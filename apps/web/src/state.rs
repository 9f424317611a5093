use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Requests share nothing mutable; the config is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}
