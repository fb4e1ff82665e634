//! Encoded polyline geometry.
//!
//! Directions responses carry route geometry as an encoded polyline
//! (latitude first, scaled by `10^precision`). The wire format itself is
//! handled by the `polyline` crate; this module converts between its
//! `geo-types` line strings and [`Coordinates`].

use crate::constants::POLYLINE_PRECISION;
use crate::models::Coordinates;
use geo_types::Coord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("malformed polyline: {0}")]
    Decode(String),

    #[error("cannot encode path: {0}")]
    Encode(String),

    #[error("decoded point {index} is out of range: {reason}")]
    OutOfRange { index: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    precision: u32,
}

impl Default for PathCodec {
    fn default() -> Self {
        PathCodec::new(POLYLINE_PRECISION)
    }
}

impl PathCodec {
    pub fn new(precision: u32) -> Self {
        PathCodec { precision }
    }

    /// Decode an encoded polyline into an ordered coordinate sequence.
    pub fn decode(&self, encoded: &str) -> Result<Vec<Coordinates>, PolylineError> {
        let line = polyline::decode_polyline(encoded, self.precision)
            .map_err(|e| PolylineError::Decode(e.to_string()))?;

        line.0
            .into_iter()
            .enumerate()
            .map(|(index, coord)| {
                Coordinates::new(coord.y, coord.x)
                    .map_err(|reason| PolylineError::OutOfRange { index, reason })
            })
            .collect()
    }

    /// Encode coordinates; `decode(encode(p))` matches `p` to the codec precision.
    pub fn encode(&self, points: &[Coordinates]) -> Result<String, PolylineError> {
        let coords = points.iter().map(|p| Coord { x: p.lng, y: p.lat });
        polyline::encode_coordinates(coords, self.precision)
            .map_err(|e| PolylineError::Encode(e.to_string()))
    }
}
