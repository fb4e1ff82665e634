pub mod coordinates;
pub mod dropoff;
pub mod route;

pub use coordinates::{Coordinates, Location};
pub use dropoff::{
    Candidate, DropoffDecision, EvaluatedCandidate, EvaluationStats, FilterOutcome,
    OptimizationType,
};
pub use route::{HybridRouteRequest, HybridRouteResponse, TravelMode};
