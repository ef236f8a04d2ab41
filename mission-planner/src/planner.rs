//! Coordinates the mission model with the presentation layer: the active
//! theater, the session flags, and the decoration-ownership cascade.

use geo::Rect;
use log::info;

use mission_planner_model::calc::{self, MapPoint};
use mission_planner_model::codec;
use mission_planner_model::mission::{EntityId, Leg, MarkerAttrs, MarkerId, Mission, RouteId};
use mission_planner_model::theater::{self, TheaterConfig};
use mission_planner_model::PlanError;

use crate::ownership::Ownership;

/// Credentials of the channel this session is streaming to or following.
/// Followers have no leader code.
#[derive(Clone, PartialEq, Debug)]
pub struct StreamInfo {
    pub name: String,
    pub password: String,
    pub code: Option<String>,
}

/// Flags that gate what the user may do right now. The presentation layer
/// drives the transitions; everything else just asks `can_edit`.
#[derive(Clone, Debug)]
pub struct Session {
    /// The widget is mid-edit or mid-delete.
    pub changing: bool,
    /// Following someone else's stream; the mission is remote-controlled.
    pub connected: bool,
    /// Publishing our own mission to a channel.
    pub streaming: bool,
    pub colors_inverted: bool,
    pub show_background: bool,
    pub stream_info: Option<StreamInfo>,
}

impl Default for Session {
    fn default() -> Session {
        Session {
            changing: false,
            connected: false,
            streaming: false,
            colors_inverted: false,
            show_background: true,
            stream_info: None,
        }
    }
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn can_edit(&self) -> bool {
        !self.changing && !self.connected
    }

    pub fn edit_start(&mut self) {
        self.changing = true;
    }

    pub fn edit_stop(&mut self) {
        self.changing = false;
    }

    // The widget fires distinct edit and delete events; they gate the same
    // way, but both entry points are kept so the shell wires up 1:1.
    pub fn delete_start(&mut self) {
        self.changing = true;
    }

    pub fn delete_stop(&mut self) {
        self.changing = false;
    }

    pub fn start_stream(&mut self, info: StreamInfo) {
        self.streaming = true;
        self.stream_info = Some(info);
    }

    pub fn stop_stream(&mut self) {
        self.streaming = false;
    }

    pub fn connect(&mut self, info: StreamInfo) {
        self.connected = true;
        self.stream_info = Some(info);
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

/// The one logical writer of the mission. Mutating operations refuse with
/// [`PlanError::Locked`] while an edit is in progress or the session follows
/// a remote stream; remote updates bypass the lock and replace the mission
/// wholesale (last writer wins).
pub struct Planner {
    theater: &'static TheaterConfig,
    mission: Mission,
    pub session: Session,
    ownership: Ownership,
}

impl Planner {
    pub fn new(map_hash: &str) -> Planner {
        Planner {
            theater: theater::resolve(map_hash),
            mission: Mission::new(),
            session: Session::new(),
            ownership: Ownership::default(),
        }
    }

    pub fn theater(&self) -> &'static TheaterConfig {
        self.theater
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    fn ensure_unlocked(&self) -> Result<(), PlanError> {
        if self.session.can_edit() {
            Ok(())
        } else {
            Err(PlanError::Locked)
        }
    }

    /// Switch theaters. Changing maps throws the whole mission away; the
    /// coordinate spaces are unrelated. Returns whether anything changed.
    pub fn select_theater(&mut self, hash: &str) -> bool {
        let next = theater::resolve(hash);
        if std::ptr::eq(next, self.theater) {
            return false;
        }
        info!("switching theater {} -> {}", self.theater.name, next.name);
        self.theater = next;
        self.mission.clear();
        self.ownership.clear();
        true
    }

    pub fn add_route(
        &mut self,
        vertices: Vec<MapPoint>,
        name: Option<String>,
        base_speed: Option<u32>,
    ) -> Result<RouteId, PlanError> {
        self.ensure_unlocked()?;
        self.mission.add_route(vertices, name, base_speed)
    }

    pub fn replace_route_vertices(
        &mut self,
        id: RouteId,
        vertices: Vec<MapPoint>,
        preserve_leg_speeds: bool,
    ) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission
            .replace_route_vertices(id, vertices, preserve_leg_speeds)
    }

    pub fn set_route_leg_speed(
        &mut self,
        id: RouteId,
        index: usize,
        speed: u32,
    ) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission.set_route_leg_speed(id, index, speed)
    }

    pub fn update_route_info(
        &mut self,
        id: RouteId,
        name: Option<String>,
        base_speed: Option<u32>,
    ) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission.update_route_info(id, name, base_speed)
    }

    /// Remove a route and return the decoration ids that died with it.
    pub fn remove_route(&mut self, id: RouteId) -> Result<Vec<u32>, PlanError> {
        self.ensure_unlocked()?;
        self.mission.remove_route(id)?;
        Ok(self.ownership.release_owned(EntityId::Route(id)))
    }

    pub fn route_legs(&self, id: RouteId) -> Result<Vec<Leg>, PlanError> {
        self.mission.compute_legs(id, self.theater)
    }

    pub fn add_marker(
        &mut self,
        position: MapPoint,
        attrs: MarkerAttrs,
    ) -> Result<MarkerId, PlanError> {
        self.ensure_unlocked()?;
        Ok(self.mission.add_marker(position, attrs))
    }

    pub fn update_marker(&mut self, id: MarkerId, attrs: MarkerAttrs) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission.update_marker(id, attrs)
    }

    pub fn move_marker(&mut self, id: MarkerId, position: MapPoint) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission.move_marker(id, position)
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Result<Vec<u32>, PlanError> {
        self.ensure_unlocked()?;
        self.mission.remove_marker(id)?;
        Ok(self.ownership.release_owned(EntityId::Marker(id)))
    }

    pub fn claim_visual(&mut self, visual: u32, owner: EntityId) {
        self.ownership.claim(visual, owner);
    }

    pub fn visual_owner(&self, visual: u32) -> Option<EntityId> {
        self.ownership.owner(visual)
    }

    /// The exact `plan.json` body. Exporting is allowed even while locked;
    /// spectators may save what they are watching.
    pub fn export_state(&self) -> String {
        codec::to_json(&codec::serialize(&self.mission, self.theater))
    }

    /// Atomic: the document is parsed and built completely before anything
    /// is replaced, so a bad file leaves the current mission alone.
    pub fn import_state(&mut self, raw: &str) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.apply_document(raw)
    }

    /// The follower path: a remote update replaces the mission wholesale,
    /// edit lock or not.
    pub fn apply_remote_update(&mut self, raw: &str) -> Result<(), PlanError> {
        self.apply_document(raw)
    }

    fn apply_document(&mut self, raw: &str) -> Result<(), PlanError> {
        let doc = codec::from_json(raw)?;
        let (mission, config) = codec::deserialize(&doc)?;
        self.theater = config;
        self.mission = mission;
        self.ownership.clear();
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), PlanError> {
        self.ensure_unlocked()?;
        self.mission.clear();
        self.ownership.clear();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.mission.is_empty()
    }

    /// Resolve a grid reference and pair it with the theater's grid-hop zoom
    /// so the shell can move the camera in one step.
    pub fn grid_jump(&self, code: &str) -> Result<(MapPoint, u8), PlanError> {
        let point = calc::grid_point(code, self.theater)?;
        Ok((point, self.theater.grid_hop_zoom))
    }

    pub fn view_center(&self) -> MapPoint {
        calc::center(self.theater)
    }

    pub fn max_bounds(&self) -> Rect<f64> {
        calc::max_bounds(self.theater)
    }
}
