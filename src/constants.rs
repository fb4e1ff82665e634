//! Stable application-wide constants.
//!
//! Values here are structural invariants of the drop-off search and default
//! fallbacks for env-var-based configuration. For knobs that benefit from
//! runtime experimentation, see [`DropoffConfig`](crate::config::DropoffConfig).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Geometry ---

/// Mean Earth radius in meters used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Decimal precision of encoded polylines returned by the directions API.
pub const POLYLINE_PRECISION: u32 = 5;

// --- Drop-off search defaults ---

/// Inner radius of the candidate band. Points closer than this to the
/// destination are never proposed as a drop-off.
pub const DEFAULT_MIN_DROPOFF_DISTANCE_M: f64 = 100.0;
/// Walking radius used when a request omits `cutoff_distance`.
pub const DEFAULT_CUTOFF_DISTANCE_M: f64 = 500.0;
/// Width of the distance buckets used to spread samples across the band.
pub const DEFAULT_BUCKET_WIDTH_M: f64 = 50.0;
/// Samples taken from each distance bucket.
pub const DEFAULT_MAX_SAMPLES_PER_BUCKET: usize = 3;
/// Hard cap on sampled candidates. Each sample costs two routing queries.
pub const DEFAULT_MAX_SAMPLES: usize = 20;

// --- Routing provider limits ---

/// Per-query timeout for routing and geocoding calls.
pub const DEFAULT_ROUTING_QUERY_TIMEOUT_SECS: u64 = 10;
/// Retries for transient provider failures (timeouts, 5xx, transport).
pub const DEFAULT_ROUTING_MAX_RETRIES: u32 = 1;
/// Linear backoff step between retries.
pub const ROUTING_RETRY_BACKOFF_MS: u64 = 250;
/// Upper bounds accepted from configuration.
pub const MAX_ROUTING_QUERY_TIMEOUT_SECS: u64 = 120;
pub const MAX_ROUTING_RETRIES: u32 = 5;
pub const MAX_EVALUATION_DEADLINE_SECS: u64 = 3600;
