//! The live, editable mission: routes, point markers and frontlines.

use serde::{Deserialize, Serialize};

use crate::calc::{self, MapPoint};
use crate::error::PlanError;
use crate::theater::TheaterConfig;

pub const DEFAULT_FLIGHT_NAME: &str = "New Flight";
pub const DEFAULT_FLIGHT_SPEED: u32 = 300;
pub const DEFAULT_MARKER_NAME: &str = "New Marker";
pub const MAX_LEG_SPEED: u32 = 9999;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RouteId(pub u32);
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct MarkerId(pub u32);
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FrontlineId(pub u32);

/// Discriminates the kinds of entity a mission can own.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum EntityId {
    Route(RouteId),
    Marker(MarkerId),
    Frontline(FrontlineId),
}

/// Icon families the map widget knows how to draw.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    Aerodrome,
    Fighter,
    Attacker,
    Bomber,
    Transport,
    Ship,
    Tank,
    Train,
    Flak,
    Balloon,
    City,
    #[default]
    #[serde(other)]
    GenericMarker,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerColor {
    Red,
    Blue,
    Green,
    White,
    Yellow,
    #[default]
    #[serde(other)]
    Black,
}

/// A flight plan: an ordered polyline plus one speed per leg. The vertex and
/// speed lists are kept private so `leg_speeds.len() == vertices.len() - 1`
/// holds after every mutation.
#[derive(Clone, Debug)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    /// The speed new legs start out with, km/h.
    pub base_speed: u32,
    vertices: Vec<MapPoint>,
    leg_speeds: Vec<u32>,
}

fn broadcast_speed(speed: u32, legs: usize) -> Vec<u32> {
    vec![speed; legs]
}

impl Route {
    fn new(id: RouteId, vertices: Vec<MapPoint>, name: String, base_speed: u32) -> Route {
        let leg_speeds = broadcast_speed(base_speed, vertices.len().saturating_sub(1));
        Route {
            id,
            name,
            base_speed,
            vertices,
            leg_speeds,
        }
    }

    pub fn vertices(&self) -> &[MapPoint] {
        &self.vertices
    }

    pub fn leg_speeds(&self) -> &[u32] {
        &self.leg_speeds
    }

    /// Replace the geometry. Per-leg speeds survive only when asked for and
    /// the leg count is unchanged; otherwise they are rebuilt from
    /// `base_speed`.
    pub fn replace_vertices(&mut self, vertices: Vec<MapPoint>, preserve_leg_speeds: bool) {
        let legs = vertices.len().saturating_sub(1);
        if !preserve_leg_speeds || legs != self.leg_speeds.len() {
            self.leg_speeds = broadcast_speed(self.base_speed, legs);
        }
        self.vertices = vertices;
    }

    pub fn set_leg_speed(&mut self, index: usize, speed: u32) -> Result<(), PlanError> {
        if speed > MAX_LEG_SPEED {
            return Err(PlanError::InvalidSpeed(speed));
        }
        let legs = self.leg_speeds.len();
        match self.leg_speeds.get_mut(index) {
            Some(slot) => {
                *slot = speed;
                Ok(())
            }
            None => Err(PlanError::LegOutOfRange { index, legs }),
        }
    }

    /// Changing the base speed throws away per-leg overrides.
    pub fn set_base_speed(&mut self, speed: u32) {
        self.base_speed = speed;
        self.leg_speeds = broadcast_speed(speed, self.vertices.len().saturating_sub(1));
    }

    /// Derive the timed legs for this route on the given theater. Never
    /// cached; geometry or speed edits are picked up on the next call.
    pub fn legs(&self, config: &TheaterConfig) -> Vec<Leg> {
        self.vertices
            .windows(2)
            .zip(&self.leg_speeds)
            .map(|(pair, &speed)| Leg::new(pair[0], pair[1], speed, config))
            .collect()
    }

    fn attach_leg_speeds(&mut self, speeds: Vec<u32>) {
        if speeds.len() == self.leg_speeds.len() {
            self.leg_speeds = speeds;
        }
    }
}

/// One straight segment between two consecutive route vertices, with
/// everything the map widget needs to label it.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    /// Scaled to kilometers with the theater's scale factor.
    pub distance: f64,
    pub heading: f64,
    pub inverted_heading: f64,
    pub speed: u32,
    pub eta_seconds: f64,
    pub midpoint: MapPoint,
    /// Preformatted `[12.3km|090°/270°|300kph|4:05]` text.
    pub label: String,
}

impl Leg {
    fn new(from: MapPoint, to: MapPoint, speed: u32, config: &TheaterConfig) -> Leg {
        let distance = config.scale * calc::distance(from, to);
        let heading = calc::heading(from, to);
        let inverted_heading = calc::invert_heading(heading);
        let eta_seconds = calc::time_seconds(f64::from(speed), distance);
        let label = format!(
            "[{:.1}km|{}°/{}°|{}kph|{}]",
            distance,
            calc::pad(heading.round(), 3),
            calc::pad(inverted_heading.round(), 3),
            speed,
            calc::format_time(eta_seconds),
        );
        Leg {
            distance,
            heading,
            inverted_heading,
            speed,
            eta_seconds,
            midpoint: calc::midpoint(from, to),
            label,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MarkerAttrs {
    pub name: Option<String>,
    pub kind: Option<MarkerKind>,
    pub color: Option<MarkerColor>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Marker {
    pub id: MarkerId,
    pub position: MapPoint,
    pub name: String,
    pub kind: MarkerKind,
    pub color: MarkerColor,
    pub notes: String,
}

/// A pair of opposing front lines. Display-only: imported and exported, but
/// not editable through the route/marker pipeline.
#[derive(Clone, Debug)]
pub struct Frontline {
    pub id: FrontlineId,
    pub side_a: Vec<MapPoint>,
    pub side_b: Vec<MapPoint>,
}

/// Everything currently drawn: routes, markers and frontlines, with ids that
/// stay stable for the session.
#[derive(Clone, Debug, Default)]
pub struct Mission {
    routes: Vec<Route>,
    markers: Vec<Marker>,
    frontlines: Vec<Frontline>,
    next_id: u32,
}

impl Mission {
    pub fn new() -> Mission {
        Mission::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_route(
        &mut self,
        vertices: Vec<MapPoint>,
        name: Option<String>,
        base_speed: Option<u32>,
    ) -> Result<RouteId, PlanError> {
        if vertices.len() < 2 {
            return Err(PlanError::TooFewVertices(vertices.len()));
        }
        let id = RouteId(self.next_id());
        self.routes.push(Route::new(
            id,
            vertices,
            name.unwrap_or_else(|| DEFAULT_FLIGHT_NAME.to_string()),
            base_speed.unwrap_or(DEFAULT_FLIGHT_SPEED),
        ));
        Ok(id)
    }

    /// Import path: attach the document's per-leg speeds verbatim when they
    /// line up with the geometry, otherwise fall back to the base speed.
    pub(crate) fn add_imported_route(
        &mut self,
        vertices: Vec<MapPoint>,
        name: String,
        base_speed: u32,
        leg_speeds: Vec<u32>,
    ) -> Result<RouteId, PlanError> {
        let id = self.add_route(vertices, Some(name), Some(base_speed))?;
        if let Some(route) = self.routes.iter_mut().find(|r| r.id == id) {
            route.attach_leg_speeds(leg_speeds);
        }
        Ok(id)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }

    fn route_mut(&mut self, id: RouteId) -> Result<&mut Route, PlanError> {
        self.routes
            .iter_mut()
            .find(|route| route.id == id)
            .ok_or(PlanError::UnknownRoute(id))
    }

    pub fn set_route_leg_speed(
        &mut self,
        id: RouteId,
        index: usize,
        speed: u32,
    ) -> Result<(), PlanError> {
        self.route_mut(id)?.set_leg_speed(index, speed)
    }

    pub fn replace_route_vertices(
        &mut self,
        id: RouteId,
        vertices: Vec<MapPoint>,
        preserve_leg_speeds: bool,
    ) -> Result<(), PlanError> {
        if vertices.len() < 2 {
            return Err(PlanError::TooFewVertices(vertices.len()));
        }
        self.route_mut(id)?
            .replace_vertices(vertices, preserve_leg_speeds);
        Ok(())
    }

    /// Rename and/or re-speed a route. A changed base speed regenerates all
    /// per-leg speeds; an unchanged one leaves overrides alone.
    pub fn update_route_info(
        &mut self,
        id: RouteId,
        name: Option<String>,
        base_speed: Option<u32>,
    ) -> Result<(), PlanError> {
        let route = self.route_mut(id)?;
        if let Some(name) = name {
            route.name = name;
        }
        if let Some(speed) = base_speed {
            if speed != route.base_speed {
                route.set_base_speed(speed);
            }
        }
        Ok(())
    }

    pub fn remove_route(&mut self, id: RouteId) -> Result<Route, PlanError> {
        let index = self
            .routes
            .iter()
            .position(|route| route.id == id)
            .ok_or(PlanError::UnknownRoute(id))?;
        Ok(self.routes.remove(index))
    }

    pub fn compute_legs(&self, id: RouteId, config: &TheaterConfig) -> Result<Vec<Leg>, PlanError> {
        self.route(id)
            .map(|route| route.legs(config))
            .ok_or(PlanError::UnknownRoute(id))
    }

    pub fn add_marker(&mut self, position: MapPoint, attrs: MarkerAttrs) -> MarkerId {
        let id = MarkerId(self.next_id());
        self.markers.push(Marker {
            id,
            position,
            name: attrs.name.unwrap_or_else(|| DEFAULT_MARKER_NAME.to_string()),
            kind: attrs.kind.unwrap_or_default(),
            color: attrs.color.unwrap_or_default(),
            notes: attrs.notes.unwrap_or_default(),
        });
        id
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    pub fn update_marker(&mut self, id: MarkerId, attrs: MarkerAttrs) -> Result<(), PlanError> {
        let marker = self
            .markers
            .iter_mut()
            .find(|marker| marker.id == id)
            .ok_or(PlanError::UnknownMarker(id))?;
        if let Some(name) = attrs.name {
            marker.name = name;
        }
        if let Some(kind) = attrs.kind {
            marker.kind = kind;
        }
        if let Some(color) = attrs.color {
            marker.color = color;
        }
        if let Some(notes) = attrs.notes {
            marker.notes = notes;
        }
        Ok(())
    }

    pub fn move_marker(&mut self, id: MarkerId, position: MapPoint) -> Result<(), PlanError> {
        let marker = self
            .markers
            .iter_mut()
            .find(|marker| marker.id == id)
            .ok_or(PlanError::UnknownMarker(id))?;
        marker.position = position;
        Ok(())
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Result<Marker, PlanError> {
        let index = self
            .markers
            .iter()
            .position(|marker| marker.id == id)
            .ok_or(PlanError::UnknownMarker(id))?;
        Ok(self.markers.remove(index))
    }

    pub fn add_frontline(&mut self, side_a: Vec<MapPoint>, side_b: Vec<MapPoint>) -> FrontlineId {
        let id = FrontlineId(self.next_id());
        self.frontlines.push(Frontline { id, side_a, side_b });
        id
    }

    pub fn frontlines(&self) -> &[Frontline] {
        &self.frontlines
    }

    pub fn clear(&mut self) {
        self.routes.clear();
        self.markers.clear();
        self.frontlines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.markers.is_empty() && self.frontlines.is_empty()
    }
}
