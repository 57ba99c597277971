//! API routes

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Donation feed (read-only)
        .route("/donations", get(handlers::donations::list_donations))
        // Finance dashboard
        .nest("/finance", finance_routes())
}

/// Finance dashboard routes
fn finance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/meetings",
            get(handlers::finance::list_meetings).post(handlers::finance::add_meeting),
        )
        .route("/meetings/:id", put(handlers::finance::commit_meeting))
        .route("/live-balance", get(handlers::finance::live_balance))
}
