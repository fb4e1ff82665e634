pub mod dropoff;
pub mod mapbox;
pub mod planner;
pub mod polyline;
pub mod routing;
