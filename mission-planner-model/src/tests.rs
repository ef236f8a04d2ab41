use crate::calc::{self, MapPoint};
use crate::codec;
use crate::error::PlanError;
use crate::mission::{MarkerAttrs, MarkerColor, MarkerKind, Mission};
use crate::theater;

fn pt(lat: f64, lng: f64) -> MapPoint {
    MapPoint::new(lat, lng)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn test_distance_symmetry() {
    let a = pt(1.0, 2.0);
    let b = pt(4.0, 6.0);
    assert_close(calc::distance(a, b), 5.0);
    assert_close(calc::distance(b, a), 5.0);
    assert_close(calc::distance(a, a), 0.0);
}

#[test]
fn test_heading_compass_convention() {
    let origin = pt(0.0, 0.0);
    // +lat is north, +lng is east
    assert_close(calc::heading(origin, pt(100.0, 0.0)), 0.0);
    assert_close(calc::heading(origin, pt(0.0, 100.0)), 90.0);
    assert_close(calc::heading(pt(100.0, 0.0), origin), 180.0);
    assert_close(calc::heading(pt(0.0, 100.0), origin), 270.0);
}

#[test]
fn test_invert_heading() {
    assert_close(calc::invert_heading(0.0), 180.0);
    assert_close(calc::invert_heading(90.0), 270.0);
    for heading in [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0] {
        assert_close(calc::invert_heading(calc::invert_heading(heading)), heading);
    }
}

#[test]
fn test_time_seconds() {
    assert_close(
        calc::time_seconds(300.0, 140.056),
        140.056 / (300.0 / 3600.0),
    );
    assert_close(calc::time_seconds(3600.0, 1.0), 1.0);
}

#[test]
fn test_format_time() {
    assert_eq!(calc::format_time(0.0), "0:00");
    assert_eq!(calc::format_time(90.0), "1:30");
    // Rounded to the nearest whole second before splitting
    assert_eq!(calc::format_time(59.6), "1:00");
    assert_eq!(calc::format_time(1680.672), "28:01");
}

#[test]
fn test_pad() {
    assert_eq!(calc::pad(7.9, 3), "007");
    assert_eq!(calc::pad(270.0, 3), "270");
    assert_eq!(calc::pad(0.67, 2), "00");
}

#[test]
fn test_grid_point() {
    let config = theater::resolve("#stalingrad");
    let side = (16384.0 / 37.0 + 10752.0 / 23.0) / 2.0;
    let point = calc::grid_point("0105", config).unwrap();
    assert_close(point.lat, 10752.0 - side);
    assert_close(point.lng, 5.0 * side);
}

#[test]
fn test_grid_point_rejects_bad_codes() {
    let config = theater::resolve("#stalingrad");
    for bad in ["12", "12345", "abcd", "01a5", ""] {
        assert!(matches!(
            calc::grid_point(bad, config),
            Err(PlanError::InvalidGrid(_))
        ));
    }
}

#[test]
fn test_bounds_and_center() {
    let config = theater::resolve("#stalingrad");
    let bounds = calc::max_bounds(config);
    assert_close(bounds.min().x, -5.0);
    assert_close(bounds.min().y, -5.0);
    assert_close(bounds.max().x, 16389.0);
    assert_close(bounds.max().y, 10757.0);
    let center = calc::center(config);
    assert_close(center.lat, 5376.0);
    assert_close(center.lng, 8192.0);
}

#[test]
fn test_registry_lookup_and_fallback() {
    assert_eq!(theater::THEATERS.len(), 7);
    assert_eq!(theater::by_hash("#moscow").unwrap().full_name, "Moscow");
    assert!(theater::by_hash("#atlantis").is_none());
    assert_eq!(theater::resolve("#atlantis").name, "stalingrad");
    assert_eq!(theater::resolve("").name, "stalingrad");
}

#[test]
fn test_add_route_broadcasts_base_speed() {
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)], None, None)
        .unwrap();
    let route = mission.route(id).unwrap();
    assert_eq!(route.name, "New Flight");
    assert_eq!(route.base_speed, 300);
    assert_eq!(route.leg_speeds(), &[300, 300]);
}

#[test]
fn test_add_route_needs_two_vertices() {
    let mut mission = Mission::new();
    assert!(matches!(
        mission.add_route(vec![pt(0.0, 0.0)], None, None),
        Err(PlanError::TooFewVertices(1))
    ));
}

#[test]
fn test_replace_vertices_keeps_or_regenerates_leg_speeds() {
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)], None, None)
        .unwrap();
    mission.set_route_leg_speed(id, 0, 400).unwrap();

    // Same leg count, preservation requested: overrides survive
    mission
        .replace_route_vertices(id, vec![pt(0.0, 0.0), pt(20.0, 0.0), pt(20.0, 20.0)], true)
        .unwrap();
    assert_eq!(mission.route(id).unwrap().leg_speeds(), &[400, 300]);

    // Leg count changed: rebuilt from the base speed
    mission
        .replace_route_vertices(
            id,
            vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 0.0), pt(30.0, 0.0)],
            true,
        )
        .unwrap();
    assert_eq!(mission.route(id).unwrap().leg_speeds(), &[300, 300, 300]);

    // Preservation not requested: rebuilt even though the count matches
    mission.set_route_leg_speed(id, 2, 500).unwrap();
    mission
        .replace_route_vertices(
            id,
            vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, 0.0), pt(30.0, 0.0)],
            false,
        )
        .unwrap();
    assert_eq!(mission.route(id).unwrap().leg_speeds(), &[300, 300, 300]);
}

#[test]
fn test_set_leg_speed_validation() {
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(10.0, 0.0)], None, None)
        .unwrap();
    assert!(matches!(
        mission.set_route_leg_speed(id, 5, 400),
        Err(PlanError::LegOutOfRange { index: 5, legs: 1 })
    ));
    assert!(matches!(
        mission.set_route_leg_speed(id, 0, 10000),
        Err(PlanError::InvalidSpeed(10000))
    ));
    mission.set_route_leg_speed(id, 0, 0).unwrap();
    mission.set_route_leg_speed(id, 0, 9999).unwrap();
    assert_eq!(mission.route(id).unwrap().leg_speeds(), &[9999]);
}

#[test]
fn test_update_route_info() {
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0)], None, None)
        .unwrap();
    mission.set_route_leg_speed(id, 0, 400).unwrap();

    // Renaming alone leaves per-leg overrides in place
    mission
        .update_route_info(id, Some("Red Flight".to_string()), Some(300))
        .unwrap();
    let route = mission.route(id).unwrap();
    assert_eq!(route.name, "Red Flight");
    assert_eq!(route.leg_speeds(), &[400, 300]);

    // A new base speed rebuilds every leg
    mission.update_route_info(id, None, Some(350)).unwrap();
    let route = mission.route(id).unwrap();
    assert_eq!(route.base_speed, 350);
    assert_eq!(route.leg_speeds(), &[350, 350]);
}

#[test]
fn test_stalingrad_leg_scenario() {
    let config = theater::resolve("#stalingrad");
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(100.0, 0.0)], None, None)
        .unwrap();
    let legs = mission.compute_legs(id, config).unwrap();
    assert_eq!(legs.len(), 1);
    let leg = &legs[0];
    assert_close(leg.distance, 1.40056 * 100.0);
    assert_close(leg.heading, 0.0);
    assert_close(leg.inverted_heading, 180.0);
    assert_close(leg.eta_seconds, 1.40056 * 100.0 / (300.0 / 3600.0));
    assert_close(leg.midpoint.lat, 50.0);
    assert_close(leg.midpoint.lng, 0.0);
    assert_eq!(leg.label, "[140.1km|000°/180°|300kph|28:01]");
}

#[test]
fn test_legs_track_mutations() {
    let config = theater::resolve("#stalingrad");
    let mut mission = Mission::new();
    let id = mission
        .add_route(vec![pt(0.0, 0.0), pt(100.0, 0.0)], None, None)
        .unwrap();
    mission
        .replace_route_vertices(id, vec![pt(0.0, 0.0), pt(0.0, 100.0)], false)
        .unwrap();
    let legs = mission.compute_legs(id, config).unwrap();
    assert_close(legs[0].heading, 90.0);
}

#[test]
fn test_marker_operations() {
    let mut mission = Mission::new();
    let id = mission.add_marker(pt(10.0, 20.0), MarkerAttrs::default());
    let marker = mission.marker(id).unwrap();
    assert_eq!(marker.name, "New Marker");
    assert_eq!(marker.kind, MarkerKind::GenericMarker);
    assert_eq!(marker.color, MarkerColor::Black);
    assert_eq!(marker.notes, "");

    mission
        .update_marker(
            id,
            MarkerAttrs {
                name: Some("Bridge".to_string()),
                kind: Some(MarkerKind::Flak),
                color: Some(MarkerColor::Red),
                notes: Some("heavy cover".to_string()),
            },
        )
        .unwrap();
    mission.move_marker(id, pt(11.0, 21.0)).unwrap();
    let marker = mission.marker(id).unwrap();
    assert_eq!(marker.name, "Bridge");
    assert_close(marker.position.lat, 11.0);

    let removed = mission.remove_marker(id).unwrap();
    assert_eq!(removed.kind, MarkerKind::Flak);
    assert!(matches!(
        mission.remove_marker(id),
        Err(PlanError::UnknownMarker(_))
    ));
}

#[test]
fn test_clear_and_is_empty() {
    let mut mission = Mission::new();
    assert!(mission.is_empty());
    mission.add_frontline(vec![pt(0.0, 0.0)], vec![pt(1.0, 1.0)]);
    assert!(!mission.is_empty());
    mission.clear();
    assert!(mission.is_empty());
}

#[test]
fn test_document_field_names() {
    let config = theater::resolve("#stalingrad");
    let mut mission = Mission::new();
    mission
        .add_route(vec![pt(0.0, 0.0), pt(100.0, 0.0)], None, None)
        .unwrap();
    mission.add_marker(pt(10.0, 20.0), MarkerAttrs::default());
    let json = codec::to_json(&codec::serialize(&mission, config));
    assert!(json.contains("\"mapHash\":\"#stalingrad\""));
    assert!(json.contains("\"latLngs\""));
    assert!(json.contains("\"latLng\""));
    assert!(json.contains("\"type\":\"generic-marker\""));
    assert!(json.contains("\"color\":\"black\""));
    // No frontlines: the key is omitted entirely
    assert!(!json.contains("\"frontline\""));
}

#[test]
fn test_import_inverts_latitude_once() {
    let raw = r##"{
        "mapHash": "#stalingrad",
        "routes": [{
            "latLngs": [{"lat": 100.0, "lng": 200.0}, {"lat": 0.0, "lng": 0.0}],
            "name": "Inbound",
            "speed": 300,
            "speeds": [300]
        }],
        "points": []
    }"##;
    let doc = codec::from_json(raw).unwrap();
    let (mission, config) = codec::deserialize(&doc).unwrap();
    let route = &mission.routes()[0];
    assert_close(route.vertices()[0].lat, 10752.0 - 100.0);
    assert_close(route.vertices()[0].lng, 200.0);

    // Exports emit live coordinates untouched, so one more cycle mirrors
    // them back to the original wire values.
    let (mission, _) = codec::deserialize(&codec::serialize(&mission, config)).unwrap();
    assert_close(mission.routes()[0].vertices()[0].lat, 100.0);
    assert_close(mission.routes()[0].vertices()[0].lng, 200.0);
}

#[test]
fn test_round_trip_preserves_attributes() {
    let config = theater::resolve("#kuban");
    let mut mission = Mission::new();
    let id = mission
        .add_route(
            vec![pt(100.0, 200.0), pt(300.0, 400.0), pt(500.0, 600.0)],
            Some("Strike Package".to_string()),
            Some(320),
        )
        .unwrap();
    mission.set_route_leg_speed(id, 1, 280).unwrap();
    mission.add_marker(
        pt(50.0, 60.0),
        MarkerAttrs {
            name: Some("Target".to_string()),
            kind: Some(MarkerKind::Fighter),
            color: Some(MarkerColor::Red),
            notes: Some("expect escorts".to_string()),
        },
    );

    let doc = codec::serialize(&mission, config);
    let (imported, imported_config) = codec::deserialize(&doc).unwrap();
    assert_eq!(imported_config.name, "kuban");

    let route = &imported.routes()[0];
    assert_eq!(route.name, "Strike Package");
    assert_eq!(route.base_speed, 320);
    assert_eq!(route.leg_speeds(), &[320, 280]);
    // Longitudes are untouched; latitudes are mirrored by the import flip
    assert_close(route.vertices()[1].lng, 400.0);
    assert_close(route.vertices()[1].lat, 11343.0 - 300.0);

    let marker = &imported.markers()[0];
    assert_eq!(marker.name, "Target");
    assert_eq!(marker.kind, MarkerKind::Fighter);
    assert_eq!(marker.color, MarkerColor::Red);
    assert_eq!(marker.notes, "expect escorts");
}

#[test]
fn test_unknown_map_hash_falls_back() {
    let doc = codec::from_json(r##"{"mapHash": "#atlantis"}"##).unwrap();
    let (mission, config) = codec::deserialize(&doc).unwrap();
    assert_eq!(config.name, "stalingrad");
    assert!(mission.is_empty());
}

#[test]
fn test_unknown_marker_kind_folds_to_default() {
    let raw = r##"{
        "mapHash": "#stalingrad",
        "points": [{
            "latLng": {"lat": 1.0, "lng": 2.0},
            "name": "Mystery",
            "type": "flying-circus",
            "color": "polka-dot",
            "notes": ""
        }]
    }"##;
    let doc = codec::from_json(raw).unwrap();
    assert_eq!(doc.points[0].kind, MarkerKind::GenericMarker);
    assert_eq!(doc.points[0].color, MarkerColor::Black);
}

#[test]
fn test_missing_document_fields_get_defaults() {
    let raw = r##"{
        "mapHash": "#stalingrad",
        "routes": [{"latLngs": [{"lat": 0.0, "lng": 0.0}, {"lat": 1.0, "lng": 1.0}]}],
        "points": [{"latLng": {"lat": 3.0, "lng": 4.0}}]
    }"##;
    let (mission, _) = codec::deserialize(&codec::from_json(raw).unwrap()).unwrap();
    let route = &mission.routes()[0];
    assert_eq!(route.name, "New Flight");
    assert_eq!(route.base_speed, 300);
    assert_eq!(route.leg_speeds(), &[300]);
    let marker = &mission.markers()[0];
    assert_eq!(marker.name, "New Marker");
    assert_eq!(marker.kind, MarkerKind::GenericMarker);
}

#[test]
fn test_mismatched_leg_speeds_regenerate() {
    let raw = r##"{
        "mapHash": "#stalingrad",
        "routes": [
            {
                "latLngs": [{"lat": 0.0, "lng": 0.0}, {"lat": 1.0, "lng": 0.0}, {"lat": 2.0, "lng": 0.0}],
                "speed": 350,
                "speeds": [400]
            },
            {
                "latLngs": [{"lat": 0.0, "lng": 0.0}, {"lat": 1.0, "lng": 0.0}, {"lat": 2.0, "lng": 0.0}],
                "speed": 350,
                "speeds": [400, 500]
            }
        ]
    }"##;
    let (mission, _) = codec::deserialize(&codec::from_json(raw).unwrap()).unwrap();
    assert_eq!(mission.routes()[0].leg_speeds(), &[350, 350]);
    assert_eq!(mission.routes()[1].leg_speeds(), &[400, 500]);
}

#[test]
fn test_frontline_round_trip() {
    let raw = r##"{
        "mapHash": "#stalingrad",
        "frontline": [[[[10.0, 20.0], [30.0, 40.0]], [[50.0, 60.0]]]]
    }"##;
    let (mission, config) = codec::deserialize(&codec::from_json(raw).unwrap()).unwrap();
    let front = &mission.frontlines()[0];
    assert_close(front.side_a[0].lat, 10752.0 - 10.0);
    assert_close(front.side_a[0].lng, 20.0);
    assert_close(front.side_a[1].lat, 10752.0 - 30.0);
    assert_close(front.side_b[0].lat, 10752.0 - 50.0);

    // Export emits the stored live-space coordinates
    let doc = codec::serialize(&mission, config);
    assert_close(doc.frontline[0].0[0][0], 10742.0);
    assert_close(doc.frontline[0].0[0][1], 20.0);
}

#[test]
fn test_malformed_document_fails_atomically() {
    assert!(matches!(
        codec::from_json("{\"mapHash\": "),
        Err(PlanError::BadDocument(_))
    ));

    // A one-vertex route poisons the whole import
    let raw = r##"{
        "mapHash": "#stalingrad",
        "routes": [{"latLngs": [{"lat": 0.0, "lng": 0.0}]}]
    }"##;
    let doc = codec::from_json(raw).unwrap();
    assert!(matches!(
        codec::deserialize(&doc),
        Err(PlanError::TooFewVertices(1))
    ));
}
