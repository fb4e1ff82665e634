use crate::models::{Coordinates, EvaluationStats, Location, OptimizationType};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
}

impl TravelMode {
    /// Returns the Mapbox profile name for this travel mode. Live traffic
    /// only changes the driving profile.
    pub fn mapbox_profile(&self, use_live_traffic: bool) -> &'static str {
        match (self, use_live_traffic) {
            (TravelMode::Driving, true) => "driving-traffic",
            (TravelMode::Driving, false) => "driving",
            (TravelMode::Walking, _) => "walking",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Walking => write!(f, "walking"),
        }
    }
}

// Request/Response types for API endpoints

#[derive(Debug, Clone, Deserialize)]
pub struct HybridRouteRequest {
    #[serde(default)]
    pub origin: Option<Location>,
    #[serde(default)]
    pub destination: Option<Location>,
    /// Walking radius in meters; the configured default applies when absent
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub cutoff_distance: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Web forms tend to send numbers as strings ("500").
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid cutoff_distance: '{}'", s))),
    }
}

impl HybridRouteRequest {
    /// Checks required fields and returns `(origin, destination, cutoff_m)`.
    pub fn validate(&self, default_cutoff_m: f64) -> Result<(Location, Location, f64), String> {
        let (origin, destination) = match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) if !origin.is_blank() && !destination.is_blank() => {
                (origin.clone(), destination.clone())
            }
            _ => return Err("Origin and destination are required".to_string()),
        };

        let cutoff = self.cutoff_distance.unwrap_or(default_cutoff_m);
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err("cutoff_distance must be a positive number of meters".to_string());
        }

        Ok((origin, destination, cutoff))
    }
}

/// Distance and duration of a route or leg, raw and human readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteSummary {
    pub polyline: String,
    pub distance_m: f64,
    pub duration_s: f64,
    pub distance: String,
    pub duration: String,
}

impl RouteSummary {
    pub fn new(polyline: String, distance_m: f64, duration_s: f64) -> Self {
        RouteSummary {
            polyline,
            distance: format_distance(distance_m),
            duration: format_duration(duration_s),
            distance_m,
            duration_s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrivingLeg {
    pub origin: Location,
    pub dropoff: Coordinates,
    /// Full driving geometry; clients draw it up to `dropoff`
    pub polyline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkingLeg {
    pub polyline: Option<String>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub distance: String,
    pub duration: String,
}

impl WalkingLeg {
    pub fn new(polyline: String, distance_m: f64, duration_s: f64) -> Self {
        WalkingLeg {
            polyline: Some(polyline),
            distance_m: Some(distance_m),
            duration_s: Some(duration_s),
            distance: format_distance(distance_m),
            duration: format_duration(duration_s),
        }
    }

    /// Walking directions could not be fetched for the chosen point.
    pub fn unavailable() -> Self {
        WalkingLeg {
            polyline: None,
            distance_m: None,
            duration_s: None,
            distance: "N/A".to_string(),
            duration: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HybridLegs {
    pub driving_leg: DrivingLeg,
    pub walking_leg: WalkingLeg,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropoffPointSummary {
    pub lat: f64,
    pub lng: f64,
    pub distance_from_destination_m: f64,
    pub distance_from_destination: String,
    pub optimization_type: OptimizationType,
    pub optimization_reason: String,
    /// Seconds saved by walking; only present when walking is faster
    pub time_saved_s: Option<f64>,
    pub time_saved: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "recommendation", rename_all = "snake_case")]
pub enum HybridRouteResponse {
    DriveOnly {
        full_drive_route: RouteSummary,
        message: String,
    },
    Hybrid {
        full_drive_route: RouteSummary,
        hybrid_route: HybridLegs,
        dropoff_point: DropoffPointSummary,
        evaluation: EvaluationStats,
    },
}

pub const DRIVE_ONLY_MESSAGE: &str = "No optimal drop-off point found. Driving all the way is \
recommended as it saves time compared to any walking option within your specified radius.";

/// "850 m" below one kilometer, "1.2 km" above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Rounded to whole minutes: "1 min", "12 mins", "1 hour 5 mins".
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds / 60.0).round().max(0.0) as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    let minutes_text = if minutes == 1 {
        "1 min".to_string()
    } else {
        format!("{} mins", minutes)
    };

    match hours {
        0 => minutes_text,
        1 => format!("1 hour {}", minutes_text),
        _ => format!("{} hours {}", hours, minutes_text),
    }
}
