use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded path point that falls inside the drop-off band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub point: Coordinates,
    /// Position of the point in the decoded path (0 = origin end)
    pub path_index: usize,
    /// Haversine distance to the destination in meters
    pub distance_to_destination_m: f64,
}

impl Candidate {
    pub fn new(point: Coordinates, path_index: usize, distance_to_destination_m: f64) -> Self {
        Candidate {
            point,
            path_index,
            distance_to_destination_m,
        }
    }
}

/// A candidate with both remaining-leg durations resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub driving_duration_s: f64,
    pub walking_duration_s: f64,
    /// `driving - walking`; positive means walking the rest is faster
    pub time_advantage_s: f64,
}

impl EvaluatedCandidate {
    pub fn new(candidate: Candidate, driving_duration_s: f64, walking_duration_s: f64) -> Self {
        EvaluatedCandidate {
            candidate,
            driving_duration_s,
            walking_duration_s,
            time_advantage_s: driving_duration_s - walking_duration_s,
        }
    }
}

/// Result of scanning a driving path for drop-off candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Points inside `[min_distance, cutoff]`, ordered destination-first.
    Candidates(Vec<Candidate>),
    /// Nothing inside the band; first point at or beyond the cutoff.
    Fallback(Candidate),
    /// Nothing inside the band and no point reaches the cutoff.
    Exhausted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationType {
    /// Walking the remainder beats driving it
    Optimized,
    /// Driving stays faster everywhere; best of the evaluated points
    DistanceBased,
    /// No path point inside the band
    Fallback,
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationType::Optimized => write!(f, "optimized"),
            OptimizationType::DistanceBased => write!(f, "distance_based"),
            OptimizationType::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropoffDecision {
    Optimized {
        selected: EvaluatedCandidate,
        rationale: String,
    },
    DistanceBased {
        selected: EvaluatedCandidate,
        rationale: String,
    },
    Fallback {
        candidate: Candidate,
        rationale: String,
    },
    /// Drive all the way
    None,
}

impl DropoffDecision {
    /// Compose the decision for the best evaluated candidate.
    pub fn from_best(selected: EvaluatedCandidate) -> Self {
        let minutes = whole_minutes(selected.time_advantage_s);
        if selected.time_advantage_s > 0.0 {
            DropoffDecision::Optimized {
                selected,
                rationale: format!("Walking saves {} min vs driving", minutes),
            }
        } else {
            DropoffDecision::DistanceBased {
                selected,
                rationale: format!(
                    "Driving is {} min faster, but this is the closest viable option",
                    minutes
                ),
            }
        }
    }

    pub fn fallback(candidate: Candidate) -> Self {
        DropoffDecision::Fallback {
            candidate,
            rationale: "No candidates within radius".to_string(),
        }
    }

    pub fn optimization_type(&self) -> Option<OptimizationType> {
        match self {
            DropoffDecision::Optimized { .. } => Some(OptimizationType::Optimized),
            DropoffDecision::DistanceBased { .. } => Some(OptimizationType::DistanceBased),
            DropoffDecision::Fallback { .. } => Some(OptimizationType::Fallback),
            DropoffDecision::None => None,
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            DropoffDecision::Optimized { selected, .. }
            | DropoffDecision::DistanceBased { selected, .. } => Some(&selected.candidate),
            DropoffDecision::Fallback { candidate, .. } => Some(candidate),
            DropoffDecision::None => None,
        }
    }

    pub fn time_advantage_s(&self) -> Option<f64> {
        match self {
            DropoffDecision::Optimized { selected, .. }
            | DropoffDecision::DistanceBased { selected, .. } => Some(selected.time_advantage_s),
            _ => None,
        }
    }

    pub fn rationale(&self) -> Option<&str> {
        match self {
            DropoffDecision::Optimized { rationale, .. }
            | DropoffDecision::DistanceBased { rationale, .. }
            | DropoffDecision::Fallback { rationale, .. } => Some(rationale),
            DropoffDecision::None => None,
        }
    }

    pub fn is_drive_only(&self) -> bool {
        matches!(self, DropoffDecision::None)
    }
}

/// Counters reported by one evaluation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationStats {
    pub sampled: usize,
    pub evaluated: usize,
    pub failed: usize,
}

/// Whole minutes in `seconds`, ignoring sign.
pub fn whole_minutes(seconds: f64) -> u64 {
    (seconds.abs() / 60.0).floor() as u64
}
