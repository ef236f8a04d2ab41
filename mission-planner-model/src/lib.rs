//! Data model for the mission planner: the theater catalogue, the live
//! mission state, flight-leg math, and the portable JSON wire format shared
//! with exported `plan.json` files and the live relay.

pub mod calc;
pub mod codec;
pub mod error;
pub mod mission;
pub mod theater;

#[cfg(test)]
mod tests;

pub use crate::calc::MapPoint;
pub use crate::error::PlanError;
pub use crate::mission::{
    EntityId, Frontline, FrontlineId, Leg, Marker, MarkerColor, MarkerId, MarkerKind, Mission,
    Route, RouteId,
};
pub use crate::theater::TheaterConfig;
