//! The fixed catalogue of supported theaters. Loaded once, never mutated.

use serde::Serialize;

/// Static description of one theater map: coordinate bounds, grid density,
/// zoom limits, the pixel-to-kilometer scale and the tile source the map
/// widget should use. `lat_min` and `lng_min` are always zero; the camera
/// math relies on that.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TheaterConfig {
    pub name: &'static str,
    pub full_name: &'static str,
    /// URL-fragment identifier, e.g. `#stalingrad`.
    pub hash: &'static str,
    /// Multiplier from raw map-coordinate distance to kilometers.
    pub scale: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lat_grid_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
    pub lng_grid_max: f64,
    /// Zoom level used when jumping to a grid reference.
    pub grid_hop_zoom: u8,
    pub default_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tile_url: &'static str,
}

pub static THEATERS: [TheaterConfig; 7] = [
    TheaterConfig {
        name: "stalingrad",
        full_name: "Stalingrad",
        hash: "#stalingrad",
        scale: 1.40056,
        lat_min: 0.0,
        lat_max: 10752.0,
        lat_grid_max: 23.0,
        lng_min: 0.0,
        lng_max: 16384.0,
        lng_grid_max: 37.0,
        grid_hop_zoom: 5,
        default_zoom: 3,
        min_zoom: 0,
        max_zoom: 6,
        tile_url: "https://tiles.il2missionplanner.link/stalingrad/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "moscow",
        full_name: "Moscow",
        hash: "#moscow",
        scale: 1.46621,
        lat_min: 0.0,
        lat_max: 8192.0,
        lat_grid_max: 29.0,
        lng_min: 0.0,
        lng_max: 8192.0,
        lng_grid_max: 29.0,
        grid_hop_zoom: 5,
        default_zoom: 3,
        min_zoom: 0,
        max_zoom: 5,
        tile_url: "https://tiles.il2missionplanner.link/moscow/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "luki",
        full_name: "Velikie Luki",
        hash: "#luki",
        scale: 0.65306,
        lat_min: 0.0,
        lat_max: 5120.0,
        lat_grid_max: 10.4,
        lng_min: 0.0,
        lng_max: 8192.0,
        lng_grid_max: 17.6,
        grid_hop_zoom: 4,
        default_zoom: 3,
        min_zoom: 0,
        max_zoom: 5,
        tile_url: "https://tiles.il2missionplanner.link/luki/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "kuban",
        full_name: "Kuban",
        hash: "#kuban",
        scale: 2.876397232,
        lat_min: 0.0,
        lat_max: 11343.0,
        lat_grid_max: 29.7,
        lng_min: 0.0,
        lng_max: 16384.0,
        lng_grid_max: 42.5,
        grid_hop_zoom: 6,
        default_zoom: 3,
        min_zoom: 0,
        max_zoom: 6,
        tile_url: "https://tiles.il2missionplanner.link/kuban/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "rheinland",
        full_name: "Rheinland",
        hash: "#rheinland",
        scale: 2.876397232,
        lat_min: 0.0,
        lat_max: 13312.0,
        lat_grid_max: 32.4437,
        lng_min: 0.0,
        lng_max: 16384.0,
        lng_grid_max: 40.1306,
        grid_hop_zoom: 6,
        default_zoom: 4,
        min_zoom: 0,
        max_zoom: 6,
        tile_url: "https://tiles.il2missionplanner.link/rheinland/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "arras",
        full_name: "Arras",
        hash: "#arras",
        scale: 0.7191,
        lat_min: 0.0,
        lat_max: 4096.0,
        lat_grid_max: 11.7973,
        lng_min: 0.0,
        lng_max: 4096.0,
        lng_grid_max: 11.7973,
        grid_hop_zoom: 4,
        default_zoom: 3,
        min_zoom: 0,
        max_zoom: 4,
        tile_url: "https://tiles.il2missionplanner.link/arras/{z}/{x}/{y}.png",
    },
    TheaterConfig {
        name: "prokhorovka",
        full_name: "Prokhorovka",
        hash: "#prokhorovka",
        scale: 0.6491,
        lat_min: 0.0,
        lat_max: 165.0,
        lat_grid_max: 10.6484,
        lng_min: 0.0,
        lng_max: 165.0,
        lng_grid_max: 10.6484,
        grid_hop_zoom: 5,
        default_zoom: 4,
        min_zoom: 0,
        max_zoom: 6,
        tile_url: "https://tiles.il2missionplanner.link/prokhorovka/{z}/{x}/{y}.png",
    },
];

pub fn by_hash(hash: &str) -> Option<&'static TheaterConfig> {
    THEATERS.iter().find(|theater| theater.hash == hash)
}

/// Unknown or empty hashes fall back to the first registered theater rather
/// than failing; shared links with stale hashes should still open.
pub fn resolve(hash: &str) -> &'static TheaterConfig {
    by_hash(hash).unwrap_or(&THEATERS[0])
}
