mod geometry;
mod sampling;

pub use geometry::filter_candidates;
pub use sampling::{bucket_floor, sample};

use crate::config::DropoffConfig;
use crate::constants::ROUTING_RETRY_BACKOFF_MS;
use crate::models::dropoff::whole_minutes;
use crate::models::{
    Candidate, Coordinates, DropoffDecision, EvaluatedCandidate, EvaluationStats, FilterOutcome,
    TravelMode,
};
use crate::services::routing::{RouteError, RoutingProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub decision: DropoffDecision,
    pub stats: EvaluationStats,
}

/// Chooses where along a driving path to stop and walk.
///
/// Holds no per-run state: one selector can serve concurrent requests as long
/// as the injected provider can.
#[derive(Clone)]
pub struct DropoffSelector {
    routing: Arc<dyn RoutingProvider>,
    config: DropoffConfig,
}

impl DropoffSelector {
    pub fn new(routing: Arc<dyn RoutingProvider>, config: DropoffConfig) -> Self {
        DropoffSelector { routing, config }
    }

    pub fn config(&self) -> &DropoffConfig {
        &self.config
    }

    /// Geometry filter with the configured inner radius.
    pub fn filter(
        &self,
        path: &[Coordinates],
        destination: &Coordinates,
        cutoff_m: f64,
    ) -> FilterOutcome {
        filter_candidates(path, destination, self.config.min_distance_m, cutoff_m)
    }

    /// Sample `candidates`, query both travel modes for each sample in order
    /// and keep the one with the largest `driving - walking` advantage.
    /// Earlier samples win ties. Failed queries drop the candidate; if every
    /// candidate drops, the decision is [`DropoffDecision::None`].
    pub async fn select_dropoff(
        &self,
        candidates: &[Candidate],
        destination: &Coordinates,
    ) -> Selection {
        let samples = sample(
            candidates,
            self.config.bucket_width_m,
            self.config.max_samples_per_bucket,
            self.config.max_samples,
        );
        let mut stats = EvaluationStats {
            sampled: samples.len(),
            ..EvaluationStats::default()
        };

        if let (Some(nearest), Some(farthest)) = (
            candidates
                .iter()
                .map(|c| c.distance_to_destination_m)
                .reduce(f64::min),
            candidates
                .iter()
                .map(|c| c.distance_to_destination_m)
                .reduce(f64::max),
        ) {
            tracing::debug!(
                candidates = candidates.len(),
                sampled = samples.len(),
                "Total candidates: {}, sampled: {}, distance range {:.0}m to {:.0}m",
                candidates.len(), samples.len(), nearest, farthest
            );
        }

        // None when the deadline lies beyond what the clock can represent
        let deadline = Instant::now().checked_add(self.config.evaluation_deadline);
        let mut best: Option<EvaluatedCandidate> = None;

        for (idx, candidate) in samples.iter().enumerate() {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                let skipped = samples.len() - idx;
                stats.failed += skipped;
                tracing::warn!(
                    skipped,
                    "Evaluation deadline of {:?} reached, skipping {} remaining candidates",
                    self.config.evaluation_deadline, skipped
                );
                break;
            }

            match self.evaluate(candidate, destination, deadline).await {
                Ok(evaluated) => {
                    stats.evaluated += 1;
                    tracing::debug!(
                        point = idx + 1,
                        bucket_m = bucket_floor(
                            candidate.distance_to_destination_m,
                            self.config.bucket_width_m
                        ),
                        "Point {}/{}: {:.0}m - drive {:.0}s, walk {:.0}s, advantage {:.0}s",
                        idx + 1,
                        samples.len(),
                        candidate.distance_to_destination_m,
                        evaluated.driving_duration_s,
                        evaluated.walking_duration_s,
                        evaluated.time_advantage_s
                    );

                    if best.map_or(true, |b| evaluated.time_advantage_s > b.time_advantage_s) {
                        best = Some(evaluated);
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::debug!(
                        point = idx + 1,
                        error = %e,
                        "Routing failed for point at {:.0}m: {}",
                        candidate.distance_to_destination_m, e
                    );
                }
            }
        }

        let decision = match best {
            Some(selected) => {
                tracing::info!(
                    distance_m = %format!("{:.0}", selected.candidate.distance_to_destination_m),
                    advantage_min = whole_minutes(selected.time_advantage_s),
                    evaluated = stats.evaluated,
                    failed = stats.failed,
                    "Best drop-off {:.0}m from destination, advantage {:.0}s ({}/{} evaluated)",
                    selected.candidate.distance_to_destination_m,
                    selected.time_advantage_s,
                    stats.evaluated,
                    stats.sampled
                );
                DropoffDecision::from_best(selected)
            }
            None => {
                tracing::info!(
                    sampled = stats.sampled,
                    failed = stats.failed,
                    "No candidate could be evaluated, recommending drive-only"
                );
                DropoffDecision::None
            }
        };

        Selection { decision, stats }
    }

    async fn evaluate(
        &self,
        candidate: &Candidate,
        destination: &Coordinates,
        deadline: Option<Instant>,
    ) -> Result<EvaluatedCandidate, RouteError> {
        let driving = self
            .query_duration(&candidate.point, destination, TravelMode::Driving, true, deadline)
            .await?;
        let walking = self
            .query_duration(&candidate.point, destination, TravelMode::Walking, false, deadline)
            .await?;

        Ok(EvaluatedCandidate::new(*candidate, driving, walking))
    }

    async fn query_duration(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        mode: TravelMode,
        use_live_traffic: bool,
        deadline: Option<Instant>,
    ) -> Result<f64, RouteError> {
        let call_deadline = match (deadline, Instant::now().checked_add(self.call_budget())) {
            (Some(run), Some(call)) => Some(run.min(call)),
            (run, call) => run.or(call),
        };
        let query = self.routing.get_route(from, to, mode, use_live_traffic);

        let route = match call_deadline {
            Some(at) => tokio::time::timeout_at(at, query)
                .await
                .map_err(|_| RouteError::Timeout)??,
            None => query.await?,
        };

        Ok(route.duration_seconds)
    }

    /// Longest a single provider call may take, retries included.
    fn call_budget(&self) -> Duration {
        let retries = u64::from(self.config.max_retries);
        let backoff_steps = retries.saturating_mul(retries + 1) / 2;
        let backoff = Duration::from_millis(ROUTING_RETRY_BACKOFF_MS.saturating_mul(backoff_steps));
        self.config
            .query_timeout
            .saturating_mul(self.config.max_retries.saturating_add(1))
            .saturating_add(backoff)
    }
}
