use crate::models::Candidate;
use std::collections::BTreeMap;

/// Pick a bounded, distance-spread subset of `candidates` for evaluation.
///
/// Candidates are grouped into `bucket_width_m` distance bands. Bands are
/// visited farthest first and each contributes up to `max_per_bucket`
/// evenly strided members in their original order. The concatenation is
/// truncated to `max_total`.
pub fn sample(
    candidates: &[Candidate],
    bucket_width_m: f64,
    max_per_bucket: usize,
    max_total: usize,
) -> Vec<Candidate> {
    if max_per_bucket == 0 || max_total == 0 || bucket_width_m <= 0.0 {
        return Vec::new();
    }

    let mut buckets: BTreeMap<i64, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        let key = (candidate.distance_to_destination_m / bucket_width_m).floor() as i64;
        buckets.entry(key).or_default().push(*candidate);
    }

    buckets
        .values()
        .rev()
        .flat_map(|bucket| {
            let take = max_per_bucket.min(bucket.len());
            let stride = (bucket.len() / take).max(1);
            bucket.iter().step_by(stride).take(take).copied()
        })
        .take(max_total)
        .collect()
}

/// Lower bound of the bucket `distance_m` falls in.
pub fn bucket_floor(distance_m: f64, bucket_width_m: f64) -> f64 {
    (distance_m / bucket_width_m).floor() * bucket_width_m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn candidates(distances: &[f64]) -> Vec<Candidate> {
        distances
            .iter()
            .enumerate()
            .map(|(i, d)| Candidate::new(Coordinates { lat: 0.0, lng: 0.0 }, i, *d))
            .collect()
    }

    fn distances(sampled: &[Candidate]) -> Vec<f64> {
        sampled.iter().map(|c| c.distance_to_destination_m).collect()
    }

    #[test]
    fn test_buckets_visited_farthest_first() {
        let input = candidates(&[110.0, 160.0, 210.0, 260.0]);
        let sampled = sample(&input, 50.0, 3, 20);
        assert_eq!(distances(&sampled), vec![260.0, 210.0, 160.0, 110.0]);
    }

    #[test]
    fn test_stride_within_bucket_preserves_order() {
        // Seven points in the 100m bucket: stride 7 / 3 = 2 picks 0, 2, 4
        let input = candidates(&[101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        let sampled = sample(&input, 50.0, 3, 20);
        assert_eq!(distances(&sampled), vec![101.0, 103.0, 105.0]);
    }

    #[test]
    fn test_small_bucket_taken_whole() {
        let input = candidates(&[120.0, 130.0]);
        let sampled = sample(&input, 50.0, 3, 20);
        assert_eq!(distances(&sampled), vec![120.0, 130.0]);
    }

    #[test]
    fn test_total_cap() {
        let many: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
        let sampled = sample(&candidates(&many), 50.0, 3, 20);
        assert_eq!(sampled.len(), 20);
        // Farthest bucket [450, 500) comes first
        assert!(sampled[0].distance_to_destination_m >= 450.0);
    }

    #[test]
    fn test_degenerate_limits() {
        let input = candidates(&[120.0, 130.0]);
        assert!(sample(&input, 50.0, 0, 20).is_empty());
        assert!(sample(&input, 50.0, 3, 0).is_empty());
        assert!(sample(&[], 50.0, 3, 20).is_empty());
    }

    #[test]
    fn test_bucket_floor() {
        assert_eq!(bucket_floor(149.9, 50.0), 100.0);
        assert_eq!(bucket_floor(150.0, 50.0), 150.0);
    }
}
