use crate::api::{auth, handlers, AppState};
use crate::config::ServerConfig;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router.
///
/// Session resolution runs before method dispatch on protected routes, so an
/// unauthenticated caller is rejected before anything else happens.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let protected = Router::new()
        // Issue search
        .route(
            &server.search_path,
            post(handlers::search_issues).fallback(handlers::method_not_allowed),
        )
        // Page-embedding settings
        .route("/widget/settings", get(handlers::widget_settings))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .merge(protected)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new().include_headers(false)),
        )
}
