//! Conversion between the live [`Mission`] and the portable JSON document
//! written to `plan.json` and pushed over the live relay.
//!
//! The wire format and the live map differ by one axis flip: imported
//! latitudes are transformed as `lat' = latMax - lat`, exports emit live
//! coordinates untouched. A lone serialize→deserialize cycle therefore
//! mirrors latitudes and a second cycle restores them. Embedding stat
//! servers produce documents in the wire convention, so the asymmetry stays.

use log::info;
use serde::{Deserialize, Serialize};

use crate::calc::MapPoint;
use crate::error::PlanError;
use crate::mission::{
    MarkerAttrs, MarkerColor, MarkerKind, Mission, DEFAULT_FLIGHT_NAME, DEFAULT_FLIGHT_SPEED,
    DEFAULT_MARKER_NAME,
};
use crate::theater::{self, TheaterConfig};

/// The wire form of a whole mission.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MissionDocument {
    pub map_hash: String,
    #[serde(default)]
    pub routes: Vec<RouteDocument>,
    #[serde(default)]
    pub points: Vec<PointDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frontline: Vec<FrontlineDocument>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RouteDocument {
    pub lat_lngs: Vec<MapPoint>,
    #[serde(default = "default_flight_name")]
    pub name: String,
    #[serde(default = "default_flight_speed")]
    pub speed: u32,
    #[serde(default)]
    pub speeds: Vec<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PointDocument {
    pub lat_lng: MapPoint,
    #[serde(default = "default_marker_name")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: MarkerKind,
    #[serde(default)]
    pub color: MarkerColor,
    #[serde(default)]
    pub notes: String,
}

/// Two polylines per entry, stored as bare `[lat, lng]` pairs.
pub type FrontlineDocument = (Vec<[f64; 2]>, Vec<[f64; 2]>);

fn default_flight_name() -> String {
    DEFAULT_FLIGHT_NAME.to_string()
}

fn default_flight_speed() -> u32 {
    DEFAULT_FLIGHT_SPEED
}

fn default_marker_name() -> String {
    DEFAULT_MARKER_NAME.to_string()
}

pub fn to_json(doc: &MissionDocument) -> String {
    serde_json::to_string(doc).unwrap()
}

pub fn from_json(raw: &str) -> Result<MissionDocument, PlanError> {
    Ok(serde_json::from_str(raw)?)
}

/// Snapshot the live mission. Coordinates go out exactly as stored.
pub fn serialize(mission: &Mission, config: &TheaterConfig) -> MissionDocument {
    MissionDocument {
        map_hash: config.hash.to_string(),
        routes: mission
            .routes()
            .iter()
            .map(|route| RouteDocument {
                lat_lngs: route.vertices().to_vec(),
                name: route.name.clone(),
                speed: route.base_speed,
                speeds: route.leg_speeds().to_vec(),
            })
            .collect(),
        points: mission
            .markers()
            .iter()
            .map(|marker| PointDocument {
                lat_lng: marker.position,
                name: marker.name.clone(),
                kind: marker.kind,
                color: marker.color,
                notes: marker.notes.clone(),
            })
            .collect(),
        frontline: mission
            .frontlines()
            .iter()
            .map(|front| (to_pairs(&front.side_a), to_pairs(&front.side_b)))
            .collect(),
    }
}

/// Build a live mission from a document. The theater is resolved through the
/// registry (unknown hashes fall back to the default theater); every
/// imported latitude is flipped into live map space. Fails atomically: any
/// bad entry means no mission.
pub fn deserialize(
    doc: &MissionDocument,
) -> Result<(Mission, &'static TheaterConfig), PlanError> {
    let config = theater::resolve(&doc.map_hash);
    let mut mission = Mission::new();

    for route in &doc.routes {
        let vertices = route
            .lat_lngs
            .iter()
            .map(|point| invert_lat(*point, config))
            .collect();
        mission.add_imported_route(
            vertices,
            route.name.clone(),
            route.speed,
            route.speeds.clone(),
        )?;
    }

    for point in &doc.points {
        mission.add_marker(
            invert_lat(point.lat_lng, config),
            MarkerAttrs {
                name: Some(point.name.clone()),
                kind: Some(point.kind),
                color: Some(point.color),
                notes: Some(point.notes.clone()),
            },
        );
    }

    for (side_a, side_b) in &doc.frontline {
        mission.add_frontline(from_pairs(side_a, config), from_pairs(side_b, config));
    }

    info!(
        "imported {} routes, {} points, {} frontlines onto {}",
        doc.routes.len(),
        doc.points.len(),
        doc.frontline.len(),
        config.name,
    );
    Ok((mission, config))
}

fn invert_lat(point: MapPoint, config: &TheaterConfig) -> MapPoint {
    MapPoint::new(config.lat_max - point.lat, point.lng)
}

fn to_pairs(points: &[MapPoint]) -> Vec<[f64; 2]> {
    points.iter().map(|point| [point.lat, point.lng]).collect()
}

fn from_pairs(pairs: &[[f64; 2]], config: &TheaterConfig) -> Vec<MapPoint> {
    pairs
        .iter()
        .map(|pair| invert_lat(MapPoint::new(pair[0], pair[1]), config))
        .collect()
}
