//! Routing collaborator contracts.
//!
//! The drop-off search never talks to a directions API directly. It asks a
//! [`RoutingProvider`] for one route at a time and treats every
//! [`RouteError`] as "this candidate cannot be evaluated".

use crate::models::{Coordinates, TravelMode};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route found")]
    NotFound,

    #[error("routing query timed out")]
    Timeout,

    /// Transport failures and upstream 5xx responses.
    #[error("routing service unavailable: {0}")]
    Unavailable(String),

    /// Upstream rejected or garbled the exchange (4xx, malformed payloads).
    #[error("routing service error: {0}")]
    Upstream(String),

    #[error("invalid routing request: {0}")]
    InvalidRequest(String),
}

impl RouteError {
    /// Failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, RouteError::Timeout | RouteError::Unavailable(_))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub start_location: Option<Coordinates>,
    pub end_location: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Route {
    /// Encoded polyline of the whole route
    pub geometry: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    /// Where the provider snapped the destination, when it says so.
    pub fn end_location(&self) -> Option<Coordinates> {
        self.legs.last().and_then(|leg| leg.end_location)
    }
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn get_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
        use_live_traffic: bool,
    ) -> Result<Route, RouteError>;

    fn provider_name(&self) -> &'static str;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text place, `None` when nothing matches.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, RouteError>;
}
