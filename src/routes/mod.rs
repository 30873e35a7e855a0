use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::health;
use crate::state::AppState;

pub(crate) mod booking;
pub(crate) mod mpesa;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(booking::booking_routes())
        .merge(mpesa::mpesa_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
