use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mapbox_api_key: String,
    /// Optional proxy in front of the directions API. When set, the client
    /// authenticates with a bearer header instead of the `access_token` query.
    pub mapbox_base_url: Option<String>,
    pub dropoff: DropoffConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropoffConfig {
    /// Inner radius (meters) of the candidate band around the destination
    pub min_distance_m: f64,

    /// Walking radius applied when the request does not carry one
    pub default_cutoff_m: f64,

    /// Width (meters) of the distance buckets used for sampling
    pub bucket_width_m: f64,

    /// Maximum samples taken from a single bucket
    pub max_samples_per_bucket: usize,

    /// Maximum sampled candidates per run (two routing queries each)
    pub max_samples: usize,

    /// Timeout applied to every routing query
    pub query_timeout: Duration,

    /// Retries for transient routing failures before a candidate is dropped
    pub max_retries: u32,

    /// Deadline for the whole evaluation loop
    pub evaluation_deadline: Duration,
}

impl Default for DropoffConfig {
    fn default() -> Self {
        let query_timeout = Duration::from_secs(DEFAULT_ROUTING_QUERY_TIMEOUT_SECS);
        Self {
            min_distance_m: DEFAULT_MIN_DROPOFF_DISTANCE_M,
            default_cutoff_m: DEFAULT_CUTOFF_DISTANCE_M,
            bucket_width_m: DEFAULT_BUCKET_WIDTH_M,
            max_samples_per_bucket: DEFAULT_MAX_SAMPLES_PER_BUCKET,
            max_samples: DEFAULT_MAX_SAMPLES,
            query_timeout,
            max_retries: DEFAULT_ROUTING_MAX_RETRIES,
            evaluation_deadline: Self::derived_deadline(DEFAULT_MAX_SAMPLES, query_timeout),
        }
    }
}

impl DropoffConfig {
    /// Upper bound on the evaluation loop: every sample issues two queries.
    /// Capped at `MAX_EVALUATION_DEADLINE_SECS`.
    pub fn derived_deadline(max_samples: usize, query_timeout: Duration) -> Duration {
        let queries = u32::try_from(max_samples)
            .unwrap_or(u32::MAX)
            .saturating_mul(2);
        query_timeout
            .saturating_mul(queries)
            .min(Duration::from_secs(MAX_EVALUATION_DEADLINE_SECS))
    }

    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let min_distance_m: f64 = env::var("DROPOFF_MIN_DISTANCE_M")
            .unwrap_or_else(|_| defaults.min_distance_m.to_string())
            .parse()
            .map_err(|_| "Invalid DROPOFF_MIN_DISTANCE_M")?;

        let default_cutoff_m: f64 = env::var("DROPOFF_DEFAULT_CUTOFF_M")
            .unwrap_or_else(|_| defaults.default_cutoff_m.to_string())
            .parse()
            .map_err(|_| "Invalid DROPOFF_DEFAULT_CUTOFF_M")?;

        let bucket_width_m: f64 = env::var("DROPOFF_BUCKET_WIDTH_M")
            .unwrap_or_else(|_| defaults.bucket_width_m.to_string())
            .parse()
            .map_err(|_| "Invalid DROPOFF_BUCKET_WIDTH_M")?;

        let max_samples_per_bucket: usize = env::var("DROPOFF_MAX_PER_BUCKET")
            .unwrap_or_else(|_| defaults.max_samples_per_bucket.to_string())
            .parse()
            .map_err(|_| "Invalid DROPOFF_MAX_PER_BUCKET")?;

        let max_samples: usize = env::var("DROPOFF_MAX_SAMPLES")
            .unwrap_or_else(|_| defaults.max_samples.to_string())
            .parse()
            .map_err(|_| "Invalid DROPOFF_MAX_SAMPLES")?;

        let query_timeout_secs: u64 = env::var("ROUTING_QUERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_ROUTING_QUERY_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTING_QUERY_TIMEOUT_SECS")?;
        let query_timeout = Duration::from_secs(query_timeout_secs);

        let max_retries: u32 = env::var("ROUTING_MAX_RETRIES")
            .unwrap_or_else(|_| defaults.max_retries.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTING_MAX_RETRIES")?;

        let evaluation_deadline = match env::var("DROPOFF_EVALUATION_DEADLINE_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|_| "Invalid DROPOFF_EVALUATION_DEADLINE_SECS")?,
            ),
            Err(_) => Self::derived_deadline(max_samples, query_timeout),
        };

        let config = Self {
            min_distance_m,
            default_cutoff_m,
            bucket_width_m,
            max_samples_per_bucket,
            max_samples,
            query_timeout,
            max_retries,
            evaluation_deadline,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.min_distance_m.is_finite() || self.min_distance_m < 0.0 {
            return Err("DROPOFF_MIN_DISTANCE_M must be a non-negative number".to_string());
        }
        if !self.default_cutoff_m.is_finite() || self.default_cutoff_m <= 0.0 {
            return Err("DROPOFF_DEFAULT_CUTOFF_M must be greater than 0".to_string());
        }
        if !self.bucket_width_m.is_finite() || self.bucket_width_m <= 0.0 {
            return Err("DROPOFF_BUCKET_WIDTH_M must be greater than 0".to_string());
        }
        if self.max_samples_per_bucket == 0 {
            return Err("DROPOFF_MAX_PER_BUCKET must be at least 1".to_string());
        }
        if self.max_samples == 0 {
            return Err("DROPOFF_MAX_SAMPLES must be at least 1".to_string());
        }
        if self.query_timeout.is_zero()
            || self.query_timeout > Duration::from_secs(MAX_ROUTING_QUERY_TIMEOUT_SECS)
        {
            return Err(format!(
                "ROUTING_QUERY_TIMEOUT_SECS must be between 1 and {}",
                MAX_ROUTING_QUERY_TIMEOUT_SECS
            ));
        }
        if self.max_retries > MAX_ROUTING_RETRIES {
            return Err(format!(
                "ROUTING_MAX_RETRIES must be at most {}",
                MAX_ROUTING_RETRIES
            ));
        }
        if self.evaluation_deadline.is_zero()
            || self.evaluation_deadline > Duration::from_secs(MAX_EVALUATION_DEADLINE_SECS)
        {
            return Err(format!(
                "DROPOFF_EVALUATION_DEADLINE_SECS must be between 1 and {}",
                MAX_EVALUATION_DEADLINE_SECS
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            mapbox_api_key: env::var("MAPBOX_API_KEY").map_err(|_| "MAPBOX_API_KEY must be set")?,
            mapbox_base_url: env::var("MAPBOX_BASE_URL").ok(),
            dropoff: DropoffConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
