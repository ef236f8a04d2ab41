//! The wasm-bindgen boundary the browser shell drives. Thin wrappers over
//! [`Planner`] plus the HTTP transport for the relay: synchronous XHR for
//! the request/response commands (channel setup and lookup block the modal
//! that issued them) and fetch for the fire-and-forget ones.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

use log::warn;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use mission_planner_model::calc::MapPoint;
use mission_planner_model::mission::{
    EntityId, MarkerAttrs, MarkerColor, MarkerId, MarkerKind, RouteId,
};

use crate::planner::{Planner, StreamInfo};
use crate::relay::{self, Outcome, Relay, RelayError, Scripts};

static START: Once = Once::new();

/// Marker attributes as the shell's modals hand them over; every field is
/// optional and falls back to the model defaults.
#[derive(Deserialize, Default)]
struct MarkerAttrsInput {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<MarkerKind>,
    color: Option<MarkerColor>,
    notes: Option<String>,
}

impl From<MarkerAttrsInput> for MarkerAttrs {
    fn from(input: MarkerAttrsInput) -> MarkerAttrs {
        MarkerAttrs {
            name: input.name,
            kind: input.kind,
            color: input.color,
            notes: input.notes,
        }
    }
}

#[derive(Serialize)]
struct GridJump {
    point: MapPoint,
    zoom: u8,
}

#[wasm_bindgen]
pub struct JsMissionPlanner {
    planner: Planner,
    relay: Relay,
    stream_error: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl JsMissionPlanner {
    #[wasm_bindgen(constructor)]
    pub fn new(map_hash: &str, relay_host: &str) -> JsMissionPlanner {
        START.call_once(|| {
            console_log::init_with_level(log::Level::Info).unwrap();
            console_error_panic_hook::set_once();
        });
        JsMissionPlanner {
            planner: Planner::new(map_hash),
            relay: Relay::new(relay_host),
            stream_error: Rc::new(Cell::new(false)),
        }
    }

    // --- theater / camera ---

    #[wasm_bindgen(js_name = mapConfig)]
    pub fn map_config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.planner.theater()).map_err(err_to_js)
    }

    #[wasm_bindgen(js_name = viewCenter)]
    pub fn view_center(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.planner.view_center()).map_err(err_to_js)
    }

    /// `[[south, west], [north, east]]`, the widget's bounds convention.
    #[wasm_bindgen(js_name = maxBounds)]
    pub fn max_bounds(&self) -> Result<JsValue, JsValue> {
        let bounds = self.planner.max_bounds();
        let corners = [
            [bounds.min().y, bounds.min().x],
            [bounds.max().y, bounds.max().x],
        ];
        serde_wasm_bindgen::to_value(&corners).map_err(err_to_js)
    }

    #[wasm_bindgen(js_name = selectMap)]
    pub fn select_map(&mut self, hash: &str) {
        if self.planner.select_theater(hash) {
            self.publish_state();
        }
    }

    #[wasm_bindgen(js_name = gridJump)]
    pub fn grid_jump(&self, code: &str) -> Result<JsValue, JsValue> {
        let (point, zoom) = self.planner.grid_jump(code).map_err(err_to_js)?;
        serde_wasm_bindgen::to_value(&GridJump { point, zoom }).map_err(err_to_js)
    }

    // --- routes ---

    #[wasm_bindgen(js_name = addRoute)]
    pub fn add_route(
        &mut self,
        lat_lngs: JsValue,
        name: Option<String>,
        speed: Option<u32>,
    ) -> Result<u32, JsValue> {
        let vertices: Vec<MapPoint> =
            serde_wasm_bindgen::from_value(lat_lngs).map_err(err_to_js)?;
        let id = self
            .planner
            .add_route(vertices, name, speed)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = replaceRouteVertices)]
    pub fn replace_route_vertices(
        &mut self,
        route: u32,
        lat_lngs: JsValue,
        preserve_leg_speeds: bool,
    ) -> Result<(), JsValue> {
        let vertices: Vec<MapPoint> =
            serde_wasm_bindgen::from_value(lat_lngs).map_err(err_to_js)?;
        self.planner
            .replace_route_vertices(RouteId(route), vertices, preserve_leg_speeds)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = setRouteLegSpeed)]
    pub fn set_route_leg_speed(
        &mut self,
        route: u32,
        leg: usize,
        speed: u32,
    ) -> Result<(), JsValue> {
        self.planner
            .set_route_leg_speed(RouteId(route), leg, speed)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = updateRouteInfo)]
    pub fn update_route_info(
        &mut self,
        route: u32,
        name: Option<String>,
        speed: Option<u32>,
    ) -> Result<(), JsValue> {
        self.planner
            .update_route_info(RouteId(route), name, speed)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    /// Returns the decoration ids owned by the route, for the shell to drop.
    #[wasm_bindgen(js_name = removeRoute)]
    pub fn remove_route(&mut self, route: u32) -> Result<Vec<u32>, JsValue> {
        let released = self
            .planner
            .remove_route(RouteId(route))
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(released)
    }

    #[wasm_bindgen(js_name = routeLegs)]
    pub fn route_legs(&self, route: u32) -> Result<JsValue, JsValue> {
        let legs = self.planner.route_legs(RouteId(route)).map_err(err_to_js)?;
        serde_wasm_bindgen::to_value(&legs).map_err(err_to_js)
    }

    // --- markers ---

    #[wasm_bindgen(js_name = addMarker)]
    pub fn add_marker(&mut self, lat: f64, lng: f64, attrs: JsValue) -> Result<u32, JsValue> {
        let attrs = marker_attrs(attrs)?;
        let id = self
            .planner
            .add_marker(MapPoint::new(lat, lng), attrs)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = updateMarker)]
    pub fn update_marker(&mut self, marker: u32, attrs: JsValue) -> Result<(), JsValue> {
        let attrs = marker_attrs(attrs)?;
        self.planner
            .update_marker(MarkerId(marker), attrs)
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = moveMarker)]
    pub fn move_marker(&mut self, marker: u32, lat: f64, lng: f64) -> Result<(), JsValue> {
        self.planner
            .move_marker(MarkerId(marker), MapPoint::new(lat, lng))
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = removeMarker)]
    pub fn remove_marker(&mut self, marker: u32) -> Result<Vec<u32>, JsValue> {
        let released = self
            .planner
            .remove_marker(MarkerId(marker))
            .map_err(err_to_js)?;
        self.publish_state();
        Ok(released)
    }

    // --- decoration ownership ---

    #[wasm_bindgen(js_name = claimRouteVisual)]
    pub fn claim_route_visual(&mut self, visual: u32, route: u32) {
        self.planner
            .claim_visual(visual, EntityId::Route(RouteId(route)));
    }

    #[wasm_bindgen(js_name = claimMarkerVisual)]
    pub fn claim_marker_visual(&mut self, visual: u32, marker: u32) {
        self.planner
            .claim_visual(visual, EntityId::Marker(MarkerId(marker)));
    }

    // --- persistence ---

    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> String {
        self.planner.export_state()
    }

    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&mut self, raw: &str) -> Result<(), JsValue> {
        self.planner.import_state(raw).map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = clearState)]
    pub fn clear_state(&mut self) -> Result<(), JsValue> {
        self.planner.clear().map_err(err_to_js)?;
        self.publish_state();
        Ok(())
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.planner.is_empty()
    }

    // --- session ---

    #[wasm_bindgen(js_name = canEdit)]
    pub fn can_edit(&self) -> bool {
        self.planner.session.can_edit()
    }

    #[wasm_bindgen(js_name = editStart)]
    pub fn edit_start(&mut self) {
        self.planner.session.edit_start();
    }

    #[wasm_bindgen(js_name = editStop)]
    pub fn edit_stop(&mut self) {
        self.planner.session.edit_stop();
    }

    #[wasm_bindgen(js_name = deleteStart)]
    pub fn delete_start(&mut self) {
        self.planner.session.delete_start();
    }

    #[wasm_bindgen(js_name = deleteStop)]
    pub fn delete_stop(&mut self) {
        self.planner.session.delete_stop();
    }

    #[wasm_bindgen(js_name = setColorsInverted)]
    pub fn set_colors_inverted(&mut self, inverted: bool) {
        self.planner.session.colors_inverted = inverted;
    }

    #[wasm_bindgen(js_name = colorsInverted)]
    pub fn colors_inverted(&self) -> bool {
        self.planner.session.colors_inverted
    }

    #[wasm_bindgen(js_name = setShowBackground)]
    pub fn set_show_background(&mut self, show: bool) {
        self.planner.session.show_background = show;
    }

    #[wasm_bindgen(js_name = showBackground)]
    pub fn show_background(&self) -> bool {
        self.planner.session.show_background
    }

    // --- live streaming ---

    /// Fetch the relay's script hashes. Must succeed before any channel
    /// command is issued.
    #[wasm_bindgen(js_name = initRelay)]
    pub fn init_relay(&mut self) -> Result<(), JsValue> {
        let url = self.relay.hmget_url("scripts", &Scripts::FIELDS);
        let body = sync_get(&url).map_err(err_to_js)?;
        let values = relay::parse_hmget(&body).map_err(err_to_js)?;
        self.relay.scripts = Scripts::from_values(values).map_err(err_to_js)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = channelList)]
    pub fn channel_list(&self) -> Result<Vec<String>, JsValue> {
        let body = sync_get(&self.relay.channel_list_url()).map_err(err_to_js)?;
        let keys = relay::parse_keys(&body).map_err(err_to_js)?;
        Ok(keys
            .iter()
            .map(|key| relay::display_name(key).to_string())
            .collect())
    }

    /// Open a new channel seeded with the current mission and start
    /// publishing to it.
    #[wasm_bindgen(js_name = startStream)]
    pub fn start_stream(
        &mut self,
        name: &str,
        password: &str,
        code: &str,
    ) -> Result<(), JsValue> {
        if name.is_empty() || password.is_empty() || code.is_empty() {
            return Err(JsValue::from_str("name, password and code are required"));
        }
        let state = relay::escape(&self.planner.export_state());
        let url = self.relay.evalsha_url(
            &self.relay.scripts.new_stream,
            &[name, password, code, state.as_str()],
        );
        run_command(&url)?;
        self.planner.session.start_stream(StreamInfo {
            name: name.to_string(),
            password: password.to_string(),
            code: Some(code.to_string()),
        });
        self.stream_error.set(false);
        Ok(())
    }

    #[wasm_bindgen(js_name = stopStream)]
    pub fn stop_stream(&mut self) {
        self.planner.session.stop_stream();
    }

    /// Follow a channel as a spectator. Returns the channel key the shell
    /// should open its subscribe stream on.
    #[wasm_bindgen(js_name = connectStream)]
    pub fn connect_stream(&mut self, channel: &str, password: &str) -> Result<String, JsValue> {
        let url = self
            .relay
            .evalsha_url(&self.relay.scripts.get_channel, &[channel, password]);
        let outcome = run_command(&url)?;
        let key = outcome
            .message
            .ok_or_else(|| JsValue::from_str("relay returned no channel key"))?;
        if let Some(state) = outcome.payload {
            self.planner.apply_remote_update(&state).map_err(err_to_js)?;
        }
        self.planner.session.connect(StreamInfo {
            name: channel.to_string(),
            password: password.to_string(),
            code: None,
        });
        self.stream_error.set(false);
        Ok(key)
    }

    /// Reclaim leadership of an existing channel and resume publishing.
    #[wasm_bindgen(js_name = connectAsLeader)]
    pub fn connect_as_leader(
        &mut self,
        channel: &str,
        password: &str,
        code: &str,
    ) -> Result<(), JsValue> {
        let url = self.relay.evalsha_url(
            &self.relay.scripts.get_reconnect,
            &[channel, password, code],
        );
        let outcome = run_command(&url)?;
        if let Some(state) = outcome.payload {
            self.planner.apply_remote_update(&state).map_err(err_to_js)?;
        }
        self.planner.session.start_stream(StreamInfo {
            name: channel.to_string(),
            password: password.to_string(),
            code: Some(code.to_string()),
        });
        self.stream_error.set(false);
        Ok(())
    }

    #[wasm_bindgen(js_name = disconnect)]
    pub fn disconnect(&mut self) {
        if let Some(info) = self.planner.session.stream_info.clone() {
            let url = self.relay.unsubscribe_url(&info.name);
            wasm_bindgen_futures::spawn_local(async move {
                let _ = fetch_text(url).await;
            });
        }
        self.planner.session.disconnect();
    }

    /// One state string from the shell's subscribe stream. The relay's
    /// subscription handshake is ignored; everything else replaces the
    /// mission wholesale.
    #[wasm_bindgen(js_name = onRemoteUpdate)]
    pub fn on_remote_update(&mut self, state: &str) {
        if !self.planner.session.connected {
            return;
        }
        match self.planner.apply_remote_update(state) {
            Ok(()) => self.stream_error.set(false),
            Err(err) => {
                warn!("dropping bad remote update: {}", err);
                self.stream_error.set(true);
            }
        }
    }

    #[wasm_bindgen(js_name = subscribeUrl)]
    pub fn subscribe_url(&self, channel: &str) -> String {
        self.relay.subscribe_url(channel)
    }

    #[wasm_bindgen(js_name = streamError)]
    pub fn stream_error(&self) -> bool {
        self.stream_error.get()
    }

    #[wasm_bindgen(js_name = isStreaming)]
    pub fn is_streaming(&self) -> bool {
        self.planner.session.streaming
    }

    #[wasm_bindgen(js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.planner.session.connected
    }
}

impl JsMissionPlanner {
    /// Fire-and-forget: push the current state to our channel. Failures only
    /// flip the stream-error flag; they never touch the mission.
    fn publish_state(&self) {
        if !self.planner.session.streaming {
            return;
        }
        let info = match self.planner.session.stream_info.clone() {
            Some(info) => info,
            None => return,
        };
        let code = match info.code {
            Some(code) => code,
            None => return,
        };
        let state = relay::escape(&self.planner.export_state());
        let url = self.relay.evalsha_url(
            &self.relay.scripts.publish_state,
            &[
                info.name.as_str(),
                info.password.as_str(),
                code.as_str(),
                state.as_str(),
            ],
        );
        let stream_error = Rc::clone(&self.stream_error);
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_text(url)
                .await
                .and_then(|body| relay::parse_evalsha(&body));
            match result {
                Ok(outcome) if outcome.is_success() => stream_error.set(false),
                Ok(outcome) => {
                    warn!("publish rejected: {:?}", outcome.message);
                    stream_error.set(true);
                }
                Err(err) => {
                    warn!("publish failed: {}", err);
                    stream_error.set(true);
                }
            }
        });
    }
}

/// Parse one chunk of a subscribe stream: the new state string, or null for
/// the subscription handshake.
#[wasm_bindgen(js_name = parseStreamChunk)]
pub fn parse_stream_chunk(chunk: &str) -> Result<Option<String>, JsValue> {
    relay::parse_subscribe_chunk(chunk).map_err(err_to_js)
}

fn marker_attrs(attrs: JsValue) -> Result<MarkerAttrs, JsValue> {
    if attrs.is_undefined() || attrs.is_null() {
        return Ok(MarkerAttrs::default());
    }
    let input: MarkerAttrsInput = serde_wasm_bindgen::from_value(attrs).map_err(err_to_js)?;
    Ok(input.into())
}

/// Issue a blocking relay command and insist on a SUCCESS reply.
fn run_command(url: &str) -> Result<Outcome, JsValue> {
    let body = sync_get(url).map_err(err_to_js)?;
    let outcome = relay::parse_evalsha(&body).map_err(err_to_js)?;
    if outcome.is_success() {
        Ok(outcome)
    } else {
        Err(JsValue::from_str(
            outcome.message.as_deref().unwrap_or("relay command failed"),
        ))
    }
}

/// The request/response relay commands block the modal that issued them, so
/// a synchronous XHR keeps the shell's control flow simple.
fn sync_get(url: &str) -> Result<String, RelayError> {
    let xhr = web_sys::XmlHttpRequest::new().map_err(js_err)?;
    xhr.open_with_async("GET", url, false).map_err(js_err)?;
    xhr.send().map_err(js_err)?;
    xhr.response_text()
        .map_err(js_err)?
        .ok_or_else(|| RelayError("empty relay response".to_string()))
}

async fn fetch_text(url: String) -> Result<String, RelayError> {
    let window = web_sys::window().ok_or_else(|| RelayError("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(js_err)?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| RelayError("fetch did not return a Response".to_string()))?;
    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    text.as_string()
        .ok_or_else(|| RelayError("empty relay response".to_string()))
}

fn js_err(err: JsValue) -> RelayError {
    RelayError(format!("{:?}", err))
}

fn err_to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
