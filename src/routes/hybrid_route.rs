use crate::error::Result;
use crate::models::{HybridRouteRequest, HybridRouteResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /routes/hybrid (also served as POST /calculate-route)
/// Decide between driving all the way and driving to a drop-off point then walking
pub async fn create_hybrid_route(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<HybridRouteRequest>, JsonRejection>,
) -> Result<Json<HybridRouteResponse>> {
    let Json(request) = payload?;
    let response = state.planner.plan(&request).await?;

    match &response {
        HybridRouteResponse::DriveOnly { .. } => {
            tracing::info!(recommendation = "drive_only", "Route computed: drive only");
        }
        HybridRouteResponse::Hybrid { dropoff_point, .. } => {
            tracing::info!(
                recommendation = "hybrid",
                optimization = %dropoff_point.optimization_type,
                "Route computed: hybrid, drop-off {:.0}m from destination ({})",
                dropoff_point.distance_from_destination_m, dropoff_point.optimization_type
            );
        }
    }

    Ok(Json(response))
}
