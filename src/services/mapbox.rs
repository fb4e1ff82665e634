use crate::constants::{
    DEFAULT_ROUTING_MAX_RETRIES, DEFAULT_ROUTING_QUERY_TIMEOUT_SECS, ROUTING_RETRY_BACKOFF_MS,
};
use crate::models::{Coordinates, TravelMode};
use crate::services::routing::{Geocoder, Route, RouteError, RouteLeg, RoutingProvider};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

const MAPBOX_DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";
const MAPBOX_GEOCODING_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// How the client authenticates with the directions API.
#[derive(Clone, Debug)]
pub enum AuthMode {
    /// Current default: send `access_token` query param (direct Mapbox).
    DirectToken,
    /// Proxy mode: send `Authorization: Bearer` header.
    BearerHeader,
}

#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    api_key: String,
    base_url: String,
    auth_mode: AuthMode,
    query_timeout: Duration,
    max_retries: u32,
}

impl MapboxClient {
    pub fn new(api_key: String) -> Self {
        MapboxClient {
            client: Client::new(),
            api_key,
            base_url: MAPBOX_DIRECTIONS_BASE_URL.to_string(),
            auth_mode: AuthMode::DirectToken,
            query_timeout: Duration::from_secs(DEFAULT_ROUTING_QUERY_TIMEOUT_SECS),
            max_retries: DEFAULT_ROUTING_MAX_RETRIES,
        }
    }

    pub fn with_config(api_key: String, base_url: String, auth_mode: AuthMode) -> Self {
        MapboxClient {
            base_url,
            auth_mode,
            ..MapboxClient::new(api_key)
        }
    }

    /// Per-query timeout and retry budget for transient failures.
    pub fn with_limits(mut self, query_timeout: Duration, max_retries: u32) -> Self {
        self.query_timeout = query_timeout;
        self.max_retries = max_retries;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth_mode {
            AuthMode::DirectToken => request.query(&[("access_token", &self.api_key)]),
            AuthMode::BearerHeader => request.bearer_auth(&self.api_key),
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or the retry budget
    /// is spent. Backoff grows linearly with the attempt number.
    async fn with_retries<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, RouteError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RouteError>>,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Err(e) if e.is_transient() && tries < self.max_retries => {
                    tries += 1;
                    tracing::warn!(
                        operation,
                        attempt = tries,
                        error = %e,
                        "Transient Mapbox failure on {}, retrying ({}/{}): {}",
                        operation, tries, self.max_retries, e
                    );
                    tokio::time::sleep(Duration::from_millis(
                        ROUTING_RETRY_BACKOFF_MS * u64::from(tries),
                    ))
                    .await;
                }
                result => return result,
            }
        }
    }

    /// Get directions between two points.
    /// Returns the first route with encoded geometry, distance, duration and legs.
    pub async fn get_directions(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
        use_live_traffic: bool,
    ) -> Result<Route, RouteError> {
        let profile = mode.mapbox_profile(use_live_traffic);
        // Format coordinates as "lng,lat;lng,lat"
        let url = format!(
            "{}/{}/{},{};{},{}",
            self.base_url, profile, origin.lng, origin.lat, destination.lng, destination.lat
        );

        tracing::debug!(
            profile,
            "Mapbox directions request: ({:.5}, {:.5}) -> ({:.5}, {:.5}), profile {}",
            origin.lat, origin.lng, destination.lat, destination.lng, profile
        );

        let url = url.as_str();
        self.with_retries("directions", || async move {
            let request = self
                .client
                .get(url)
                .timeout(self.query_timeout)
                .query(&[
                    ("geometries", "polyline"),
                    ("overview", "full"),
                    ("steps", "false"),
                ]);

            let response = self
                .authorize(request)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(
                    status = %status,
                    profile,
                    "Mapbox API HTTP error {}: {}",
                    status, error_text
                );
                return Err(classify_http_error(status, &error_text));
            }

            let directions: MapboxDirectionsApiResponse = response.json().await.map_err(|e| {
                RouteError::Upstream(format!("Failed to parse response: {}", e))
            })?;

            let route = directions.into_route()?;
            tracing::debug!(
                distance_km = %format!("{:.2}", route.distance_meters / 1000.0),
                duration_min = %format!("{:.1}", route.duration_seconds / 60.0),
                profile,
                "Mapbox response: {:.2}km, {:.1}min ({})",
                route.distance_meters / 1000.0, route.duration_seconds / 60.0, profile
            );
            Ok(route)
        })
        .await
    }

    /// Forward-geocode free text to the best matching coordinates.
    pub async fn forward_geocode(&self, query: &str) -> Result<Option<Coordinates>, RouteError> {
        let url = format!(
            "{}/{}.json",
            MAPBOX_GEOCODING_BASE_URL,
            urlencoding::encode(query.trim())
        );

        let url = url.as_str();
        self.with_retries("geocoding", || async move {
            let request = self
                .client
                .get(url)
                .timeout(self.query_timeout)
                .query(&[("limit", "1")]);

            let response = self
                .authorize(request)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(status = %status, "Mapbox geocoding HTTP error {}: {}", status, error_text);
                return Err(classify_http_error(status, &error_text));
            }

            let geocoded: MapboxGeocodingApiResponse = response.json().await.map_err(|e| {
                RouteError::Upstream(format!("Failed to parse geocoding response: {}", e))
            })?;

            Ok(geocoded.best_match())
        })
        .await
    }
}

#[async_trait]
impl RoutingProvider for MapboxClient {
    async fn get_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
        use_live_traffic: bool,
    ) -> Result<Route, RouteError> {
        self.get_directions(origin, destination, mode, use_live_traffic)
            .await
    }

    fn provider_name(&self) -> &'static str {
        "mapbox"
    }
}

#[async_trait]
impl Geocoder for MapboxClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, RouteError> {
        self.forward_geocode(query).await
    }
}

fn transport_error(e: reqwest::Error) -> RouteError {
    if e.is_timeout() {
        RouteError::Timeout
    } else {
        RouteError::Unavailable(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP status to a routing error. Mapbox reports
/// unroutable coordinates as 422 with a `NoSegment`/`NoRoute` code.
fn classify_http_error(status: StatusCode, body: &str) -> RouteError {
    if status == StatusCode::NOT_FOUND
        || (status == StatusCode::UNPROCESSABLE_ENTITY
            && (body.contains("NoSegment") || body.contains("NoRoute")))
    {
        return RouteError::NotFound;
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return RouteError::Unavailable(format!("HTTP {}: {}", status, body));
    }
    RouteError::Upstream(format!("HTTP {}: {}", status, body))
}

// Mapbox API response types

#[derive(Debug, Deserialize)]
struct MapboxDirectionsApiResponse {
    code: String,
    #[serde(default)]
    routes: Vec<MapboxRoute>,
    #[serde(default)]
    waypoints: Vec<MapboxWaypoint>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    distance: f64, // meters
    duration: f64, // seconds
    geometry: String,
    #[serde(default)]
    legs: Vec<MapboxLeg>,
}

#[derive(Debug, Deserialize)]
struct MapboxLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct MapboxWaypoint {
    location: [f64; 2], // [lng, lat]
}

impl MapboxWaypoint {
    fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.location[1], self.location[0]).ok()
    }
}

impl MapboxDirectionsApiResponse {
    fn into_route(self) -> Result<Route, RouteError> {
        if self.code == "NoRoute" || self.code == "NoSegment" {
            return Err(RouteError::NotFound);
        }
        if self.code != "Ok" {
            return Err(RouteError::Upstream(format!(
                "Unexpected response code: {}",
                self.code
            )));
        }

        let waypoints = self.waypoints;
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(RouteError::NotFound)?;

        // Leg i runs from waypoint i to waypoint i + 1
        let legs = route
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| RouteLeg {
                distance_meters: leg.distance,
                duration_seconds: leg.duration,
                start_location: waypoints.get(i).and_then(MapboxWaypoint::coordinates),
                end_location: waypoints.get(i + 1).and_then(MapboxWaypoint::coordinates),
            })
            .collect();

        Ok(Route {
            geometry: route.geometry,
            distance_meters: route.distance,
            duration_seconds: route.duration,
            legs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingApiResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    center: [f64; 2], // [lng, lat]
}

impl MapboxGeocodingApiResponse {
    fn best_match(&self) -> Option<Coordinates> {
        self.features
            .first()
            .and_then(|f| Coordinates::new(f.center[1], f.center[0]).ok())
    }
}
