use geojson::{Feature, Geometry};
use mission_planner_model::codec;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        println!("Pass in a plan.json file");
        std::process::exit(1);
    }
    let raw = std::fs::read_to_string(&args[1]).unwrap();
    let doc = codec::from_json(&raw).unwrap();
    let (mission, config) = codec::deserialize(&doc).unwrap();

    // Everything lands in one FeatureCollection, in live map coordinates
    // (x=lng, y=lat), for inspection in any GeoJSON viewer.
    let mut features = Vec::new();
    for route in mission.routes() {
        let coords = route
            .vertices()
            .iter()
            .map(|point| vec![point.lng, point.lat])
            .collect();
        let mut f = Feature::from(Geometry::from(geojson::Value::LineString(coords)));
        f.set_property("kind", "route");
        f.set_property("name", route.name.clone());
        f.set_property("speed", route.base_speed);
        f.set_property("speeds", route.leg_speeds().to_vec());
        let labels: Vec<String> = route
            .legs(config)
            .into_iter()
            .map(|leg| leg.label)
            .collect();
        f.set_property("legs", labels);
        features.push(f);
    }
    for marker in mission.markers() {
        let mut f = Feature::from(Geometry::from(geojson::Value::Point(vec![
            marker.position.lng,
            marker.position.lat,
        ])));
        f.set_property("kind", "marker");
        f.set_property("name", marker.name.clone());
        f.set_property("type", serde_json::to_value(marker.kind).unwrap());
        f.set_property("color", serde_json::to_value(marker.color).unwrap());
        f.set_property("notes", marker.notes.clone());
        features.push(f);
    }
    for front in mission.frontlines() {
        for (side, points) in [("a", &front.side_a), ("b", &front.side_b)] {
            let coords = points.iter().map(|point| vec![point.lng, point.lat]).collect();
            let mut f = Feature::from(Geometry::from(geojson::Value::LineString(coords)));
            f.set_property("kind", "frontline");
            f.set_property("side", side);
            features.push(f);
        }
    }

    println!(
        "{}: {} routes, {} markers, {} frontlines",
        config.full_name,
        mission.routes().len(),
        mission.markers().len(),
        mission.frontlines().len()
    );
    let gj = geojson::GeoJson::from(features.into_iter().collect::<geojson::FeatureCollection>());
    std::fs::write("debug.geojson", serde_json::to_string_pretty(&gj).unwrap()).unwrap();
}
