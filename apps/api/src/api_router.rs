use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let step_routes = Router::new()
        .route(
            "/steps/resolve-window",
            post(handlers::steps::resolve_window_handler),
        )
        .route("/steps/query-logs", post(handlers::steps::query_logs_handler))
        .route(
            "/steps/record-events",
            post(handlers::steps::record_events_handler),
        )
        .route("/steps/open-ticket", post(handlers::steps::open_ticket_handler));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(step_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
