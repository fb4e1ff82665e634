use crate::models::{Candidate, Coordinates, FilterOutcome};

/// Scan a driving path for drop-off candidates around `destination`.
///
/// The path is stored origin-first; it is walked from its last point back
/// toward the origin so that "first" always means nearest the destination
/// side. Points with `min_distance_m <= d <= cutoff_m` become candidates.
/// When none qualify, the same scan returns the first point whose distance
/// reaches the cutoff as a fallback.
pub fn filter_candidates(
    path: &[Coordinates],
    destination: &Coordinates,
    min_distance_m: f64,
    cutoff_m: f64,
) -> FilterOutcome {
    let scan = || {
        path.iter()
            .enumerate()
            .rev()
            .map(|(index, point)| Candidate::new(*point, index, point.distance_to(destination)))
    };

    let candidates: Vec<Candidate> = scan()
        .filter(|c| {
            c.distance_to_destination_m >= min_distance_m && c.distance_to_destination_m <= cutoff_m
        })
        .collect();

    if !candidates.is_empty() {
        tracing::debug!(
            candidates = candidates.len(),
            path_points = path.len(),
            "Found {} candidate points within {:.0}-{:.0}m of destination",
            candidates.len(), min_distance_m, cutoff_m
        );
        return FilterOutcome::Candidates(candidates);
    }

    match scan().find(|c| c.distance_to_destination_m >= cutoff_m) {
        Some(fallback) => {
            tracing::debug!(
                path_index = fallback.path_index,
                distance_m = %format!("{:.0}", fallback.distance_to_destination_m),
                "No candidates within radius, falling back to point at {:.0}m",
                fallback.distance_to_destination_m
            );
            FilterOutcome::Fallback(fallback)
        }
        None => {
            tracing::debug!(
                path_points = path.len(),
                "No path point reaches the {:.0}m cutoff",
                cutoff_m
            );
            FilterOutcome::Exhausted
        }
    }
}
