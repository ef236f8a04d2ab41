use std::error::Error;
use std::fmt;

use crate::mission::{MarkerId, RouteId};

/// Failures surfaced by mission operations. Validation errors are reported
/// at the boundary where user input enters the model; they never leave a
/// mission partially updated.
#[derive(Debug)]
pub enum PlanError {
    /// Grid references must be exactly four digits.
    InvalidGrid(String),
    /// Leg speeds must lie in 0..=9999 km/h.
    InvalidSpeed(u32),
    LegOutOfRange { index: usize, legs: usize },
    TooFewVertices(usize),
    UnknownRoute(RouteId),
    UnknownMarker(MarkerId),
    /// The imported document failed to parse; nothing was applied.
    BadDocument(serde_json::Error),
    /// The mission is being edited or is following a remote stream.
    Locked,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidGrid(grid) => {
                write!(f, "not a four digit grid reference: {:?}", grid)
            }
            PlanError::InvalidSpeed(speed) => {
                write!(f, "speed {} km/h is outside 0..=9999", speed)
            }
            PlanError::LegOutOfRange { index, legs } => {
                write!(f, "leg index {} out of range for {} legs", index, legs)
            }
            PlanError::TooFewVertices(count) => {
                write!(f, "a route needs at least 2 vertices, got {}", count)
            }
            PlanError::UnknownRoute(id) => write!(f, "no route with id {}", id.0),
            PlanError::UnknownMarker(id) => write!(f, "no marker with id {}", id.0),
            PlanError::BadDocument(err) => write!(f, "malformed mission document: {}", err),
            PlanError::Locked => {
                write!(f, "the mission is locked while editing or connected")
            }
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlanError::BadDocument(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> PlanError {
        PlanError::BadDocument(err)
    }
}
