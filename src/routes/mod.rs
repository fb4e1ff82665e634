pub mod debug;
pub mod hybrid_route;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes/hybrid", post(hybrid_route::create_hybrid_route))
        .route("/calculate-route", post(hybrid_route::create_hybrid_route))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
