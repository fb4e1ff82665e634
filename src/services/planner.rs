use crate::config::DropoffConfig;
use crate::error::{AppError, Result};
use crate::models::dropoff::whole_minutes;
use crate::models::route::{
    DrivingLeg, DropoffPointSummary, HybridLegs, RouteSummary, WalkingLeg, DRIVE_ONLY_MESSAGE,
};
use crate::models::{
    Coordinates, DropoffDecision, EvaluationStats, FilterOutcome, HybridRouteRequest,
    HybridRouteResponse, Location, TravelMode,
};
use crate::services::dropoff::DropoffSelector;
use crate::services::polyline::PathCodec;
use crate::services::routing::{Geocoder, RoutingProvider};
use std::sync::Arc;

/// End-to-end drive-then-walk planning: full route, drop-off search, walking leg.
pub struct HybridRoutePlanner {
    routing: Arc<dyn RoutingProvider>,
    geocoder: Arc<dyn Geocoder>,
    selector: DropoffSelector,
    codec: PathCodec,
}

impl HybridRoutePlanner {
    pub fn new(
        routing: Arc<dyn RoutingProvider>,
        geocoder: Arc<dyn Geocoder>,
        config: DropoffConfig,
    ) -> Self {
        let selector = DropoffSelector::new(routing.clone(), config);
        HybridRoutePlanner {
            routing,
            geocoder,
            selector,
            codec: PathCodec::default(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.routing.provider_name()
    }

    pub async fn plan(&self, request: &HybridRouteRequest) -> Result<HybridRouteResponse> {
        let (origin, destination, cutoff_m) = request
            .validate(self.selector.config().default_cutoff_m)
            .map_err(AppError::InvalidRequest)?;

        let origin_coords = self.resolve(&origin).await?;
        let destination_coords = self.resolve(&destination).await?;

        tracing::info!(
            cutoff_m,
            "Hybrid route request: {} -> {}, cutoff {:.0}m",
            origin, destination, cutoff_m
        );

        let full_route = self
            .routing
            .get_route(&origin_coords, &destination_coords, TravelMode::Driving, false)
            .await?;

        // Distances are measured to where the provider actually ends the route
        let dropoff_target = full_route.end_location().unwrap_or(destination_coords);

        let path = self.codec.decode(&full_route.geometry).map_err(|e| {
            AppError::MapboxApi(format!("Invalid route geometry: {}", e))
        })?;

        let full_drive_route = RouteSummary::new(
            full_route.geometry.clone(),
            full_route.distance_meters,
            full_route.duration_seconds,
        );

        let (decision, stats) = match self.selector.filter(&path, &dropoff_target, cutoff_m) {
            FilterOutcome::Candidates(candidates) => {
                let selection = self
                    .selector
                    .select_dropoff(&candidates, &dropoff_target)
                    .await;
                (selection.decision, selection.stats)
            }
            FilterOutcome::Fallback(candidate) => (
                DropoffDecision::fallback(candidate),
                EvaluationStats::default(),
            ),
            FilterOutcome::Exhausted => (DropoffDecision::None, EvaluationStats::default()),
        };

        let (Some(candidate), Some(optimization_type)) =
            (decision.candidate().copied(), decision.optimization_type())
        else {
            tracing::info!("No drop-off point found, recommending drive-only");
            return Ok(HybridRouteResponse::DriveOnly {
                full_drive_route,
                message: DRIVE_ONLY_MESSAGE.to_string(),
            });
        };

        let walking_leg = self.walking_leg(&candidate.point, &dropoff_target).await;
        let time_saved_s = decision.time_advantage_s().filter(|adv| *adv > 0.0);

        let dropoff_point = DropoffPointSummary {
            lat: candidate.point.lat,
            lng: candidate.point.lng,
            distance_from_destination_m: candidate.distance_to_destination_m,
            distance_from_destination: format!(
                "{:.0} meters",
                candidate.distance_to_destination_m
            ),
            optimization_type,
            optimization_reason: decision.rationale().unwrap_or("N/A").to_string(),
            time_saved_s,
            time_saved: time_saved_s
                .map(|s| format!("{} minutes", whole_minutes(s)))
                .unwrap_or_else(|| "N/A".to_string()),
        };

        Ok(HybridRouteResponse::Hybrid {
            hybrid_route: HybridLegs {
                driving_leg: DrivingLeg {
                    origin,
                    dropoff: candidate.point,
                    polyline: full_route.geometry,
                },
                walking_leg,
            },
            full_drive_route,
            dropoff_point,
            evaluation: stats,
        })
    }

    async fn resolve(&self, location: &Location) -> Result<Coordinates> {
        if let Some(coords) = location.as_coordinates() {
            return Ok(coords);
        }

        let query = location.to_string();
        match self.geocoder.geocode(&query).await? {
            Some(coords) => {
                tracing::debug!("Geocoded '{}' to ({:.5}, {:.5})", query, coords.lat, coords.lng);
                Ok(coords)
            }
            None => Err(AppError::NotFound(format!("Location not found: {}", query))),
        }
    }

    /// Walking directions for the last stretch. Failure leaves the leg
    /// marked unavailable instead of failing the request.
    async fn walking_leg(&self, from: &Coordinates, to: &Coordinates) -> WalkingLeg {
        match self
            .routing
            .get_route(from, to, TravelMode::Walking, false)
            .await
        {
            Ok(route) => WalkingLeg::new(route.geometry, route.distance_meters, route.duration_seconds),
            Err(e) => {
                tracing::warn!(error = %e, "Walking leg unavailable: {}", e);
                WalkingLeg::unavailable()
            }
        }
    }
}
