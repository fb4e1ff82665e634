use async_trait::async_trait;
use lastmile::config::DropoffConfig;
use lastmile::constants::EARTH_RADIUS_M;
use lastmile::models::{Coordinates, TravelMode};
use lastmile::services::planner::HybridRoutePlanner;
use lastmile::services::polyline::PathCodec;
use lastmile::services::routing::{Geocoder, Route, RouteError, RoutingProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Destination used by every synthetic scenario.
#[allow(dead_code)]
pub fn destination() -> Coordinates {
    Coordinates::new(0.0, 0.0).unwrap()
}

/// Point `meters` due north of the shared destination.
#[allow(dead_code)]
pub fn meters_north(meters: f64) -> Coordinates {
    Coordinates::new((meters / EARTH_RADIUS_M).to_degrees(), 0.0).unwrap()
}

/// Straight driving path heading south onto the destination, origin first.
/// Point `i` counted from the destination sits `offset + i * spacing` meters away.
#[allow(dead_code)]
pub fn path_into_destination(count: usize, spacing: f64, offset: f64) -> Vec<Coordinates> {
    (0..count)
        .rev()
        .map(|i| meters_north(offset + i as f64 * spacing))
        .collect()
}

type DurationTable = dyn Fn(f64) -> Option<(f64, f64)> + Send + Sync;

/// Deterministic routing provider.
///
/// Plain driving queries return the scripted full route. Every other query is
/// answered from `durations`, keyed by the origin's distance to the
/// destination; `None` makes that query fail.
#[allow(dead_code)]
pub struct FakeRoutingProvider {
    full_route: std::result::Result<Route, RouteError>,
    durations: Box<DurationTable>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRoutingProvider {
    pub fn new<F>(path: &[Coordinates], durations: F) -> Self
    where
        F: Fn(f64) -> Option<(f64, f64)> + Send + Sync + 'static,
    {
        let route = Route {
            geometry: PathCodec::default().encode(path).unwrap(),
            distance_meters: 1_200.0,
            duration_seconds: 240.0,
            legs: Vec::new(),
        };
        FakeRoutingProvider {
            full_route: Ok(route),
            durations: Box::new(durations),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose base driving query already fails.
    pub fn failing(error: RouteError) -> Self {
        FakeRoutingProvider {
            full_route: Err(error),
            durations: Box::new(|_| None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingProvider for FakeRoutingProvider {
    async fn get_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
        mode: TravelMode,
        use_live_traffic: bool,
    ) -> std::result::Result<Route, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if mode == TravelMode::Driving && !use_live_traffic {
            return self.full_route.clone();
        }

        let distance = origin.distance_to(destination);
        let (driving, walking) = (self.durations)(distance).ok_or(RouteError::NotFound)?;
        let duration_seconds = match mode {
            TravelMode::Driving => driving,
            TravelMode::Walking => walking,
        };

        Ok(Route {
            geometry: PathCodec::default()
                .encode(&[*origin, *destination])
                .unwrap(),
            distance_meters: distance,
            duration_seconds,
            legs: Vec::new(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Resolves a fixed set of place names.
#[allow(dead_code)]
pub struct FakeGeocoder {
    pub places: Vec<(&'static str, Coordinates)>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> std::result::Result<Option<Coordinates>, RouteError> {
        Ok(self
            .places
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(query))
            .map(|(_, coords)| *coords))
    }
}

/// Planner over the fake collaborators. "Home" is the path's first point and
/// "Office" the shared destination.
#[allow(dead_code)]
pub fn planner_with(provider: Arc<FakeRoutingProvider>, path: &[Coordinates]) -> HybridRoutePlanner {
    let home = path.first().copied().unwrap_or_else(|| meters_north(1_000.0));
    let geocoder = Arc::new(FakeGeocoder {
        places: vec![("Home", home), ("Office", destination())],
    });
    HybridRoutePlanner::new(provider, geocoder, test_config())
}

/// Defaults with a tight timeout so failing scenarios stay fast.
#[allow(dead_code)]
pub fn test_config() -> DropoffConfig {
    DropoffConfig {
        query_timeout: std::time::Duration::from_secs(2),
        ..DropoffConfig::default()
    }
}

/// Check if we should skip real API tests
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok() || std::env::var("MAPBOX_API_KEY").is_err()
}
