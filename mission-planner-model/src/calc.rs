//! Flight math: distances, headings, times, grid references and camera
//! bounds. Everything here is a pure function of its inputs.

use geo::{Coord, EuclideanDistance, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::theater::TheaterConfig;

const SECONDS_IN_HOUR: f64 = 3600.0;
// Extra room around the theater edges so the camera can overscroll a little.
const BORDER: f64 = 5.0;

/// A position in map space. `lat` grows north and `lng` east, both measured
/// in the raw pixel units of the active theater.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct MapPoint {
    pub lat: f64,
    pub lng: f64,
}

impl MapPoint {
    pub fn new(lat: f64, lng: f64) -> MapPoint {
        MapPoint { lat, lng }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// Straight-line distance in raw map units. Multiply by the theater's scale
/// to get kilometers.
pub fn distance(a: MapPoint, b: MapPoint) -> f64 {
    a.to_point().euclidean_distance(&b.to_point())
}

/// The map widget hands us angles counter-clockwise from the +x axis; pilots
/// read compasses clockwise from north. The 450 offset does the axis flip
/// and the quarter turn in one modular step.
pub fn geometric_degrees_to_geographic(mut degrees: f64) -> f64 {
    if degrees < 0.0 {
        degrees += 360.0;
    }
    (450.0 - degrees) % 360.0
}

/// Compass heading from `a` to `b`, in degrees.
pub fn heading(a: MapPoint, b: MapPoint) -> f64 {
    let radians = (b.lat - a.lat).atan2(b.lng - a.lng);
    geometric_degrees_to_geographic(radians.to_degrees())
}

/// Reciprocal bearing, for flying the leg in the other direction.
pub fn invert_heading(heading: f64) -> f64 {
    (360.0 + (heading - 180.0)) % 360.0
}

pub fn midpoint(a: MapPoint, b: MapPoint) -> MapPoint {
    MapPoint::new((a.lat + b.lat) / 2.0, (a.lng + b.lng) / 2.0)
}

/// Time of flight in seconds. Not defined for zero speed (yields `inf`);
/// speed inputs are validated where they enter the model, not here.
pub fn time_seconds(speed_kmh: f64, distance_km: f64) -> f64 {
    let km_per_second = speed_kmh / SECONDS_IN_HOUR;
    distance_km / km_per_second
}

/// Floor and left-pad with zeros, e.g. `pad(7.9, 3)` is `"007"`.
pub fn pad(num: f64, size: usize) -> String {
    format!("{:0width$}", num.floor() as i64, width = size)
}

/// `M:SS`, rounded to the nearest whole second.
pub fn format_time(time_in_seconds: f64) -> String {
    let total = time_in_seconds.round();
    let minutes = (total / 60.0).floor() as i64;
    let seconds = total % 60.0;
    format!("{}:{}", minutes, pad(seconds, 2))
}

/// Resolve a 4-digit `RRCC` in-game grid reference (2-digit row, 2-digit
/// column) to a point. Grid cells are square-ish; the side length is the
/// mean of the horizontal and vertical cell sizes, and rows count down from
/// the top edge of the theater.
pub fn grid_point(grid: &str, config: &TheaterConfig) -> Result<MapPoint, PlanError> {
    if grid.len() != 4 || !grid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlanError::InvalidGrid(grid.to_string()));
    }
    let width = config.lng_max - config.lng_min;
    let height = config.lat_max - config.lat_min;
    let grid_width = width / config.lng_grid_max;
    let grid_height = height / config.lat_grid_max;
    let side = (grid_width + grid_height) / 2.0;
    let row: f64 = grid[..2]
        .parse()
        .map_err(|_| PlanError::InvalidGrid(grid.to_string()))?;
    let col: f64 = grid[2..]
        .parse()
        .map_err(|_| PlanError::InvalidGrid(grid.to_string()))?;
    Ok(MapPoint::new(
        config.lat_max - row * side,
        col * side,
    ))
}

/// The camera's pan limits: the theater bounds plus a small border.
pub fn max_bounds(config: &TheaterConfig) -> Rect<f64> {
    Rect::new(
        Coord {
            x: config.lng_min - BORDER,
            y: config.lat_min - BORDER,
        },
        Coord {
            x: config.lng_max + BORDER,
            y: config.lat_max + BORDER,
        },
    )
}

/// Initial camera position. Assumes `lat_min`/`lng_min` are zero, which the
/// registry guarantees.
pub fn center(config: &TheaterConfig) -> MapPoint {
    MapPoint::new(config.lat_max / 2.0, config.lng_max / 2.0)
}
