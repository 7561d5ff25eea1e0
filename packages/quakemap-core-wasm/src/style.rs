// Magnitude/depth to marker style mapping.
use serde::{Deserialize, Serialize};

/// Depth thresholds in km, checked in this order; the first `depth > threshold`
/// picks the colour.
pub const DEPTH_BUCKETS: [(f64, &str); 6] = [
    (90.0, "#FF0000"),
    (70.0, "#FF7F00"),
    (50.0, "#FFFF00"),
    (30.0, "#7FFF00"),
    (10.0, "#00FF00"),
    (-10.0, "#00FF7F"),
];

/// Used when no threshold matches. Same colour as the `> -10` bucket, so
/// depths at or below 10 km are indistinguishable on the map.
pub const SHALLOWEST_COLOR: &str = "#00FF7F";

pub const RADIUS_PER_MAGNITUDE: f64 = 4.0;
pub const FALLBACK_RADIUS: f64 = 1.0;

/// Options for a Leaflet circle marker, serialized with Leaflet's field names.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: String,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

/// Options for a Leaflet polyline.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

pub const PLATE_STYLE: LineStyle = LineStyle {
    color: "orange",
    weight: 2.0,
};

/// `magnitude * 4`, or 1 when the magnitude is missing, zero or NaN.
///
/// Zero counts as "missing" here, so a magnitude 0.0 event gets the unit
/// radius rather than an invisible marker.
pub fn marker_radius(magnitude: Option<f64>) -> f64 {
    match magnitude {
        Some(m) if m != 0.0 && !m.is_nan() => m * RADIUS_PER_MAGNITUDE,
        _ => FALLBACK_RADIUS,
    }
}

pub fn depth_color(depth_km: f64) -> &'static str {
    DEPTH_BUCKETS
        .iter()
        .find(|(threshold, _)| depth_km > *threshold)
        .map(|(_, color)| *color)
        .unwrap_or(SHALLOWEST_COLOR)
}

pub fn marker_style(magnitude: Option<f64>, depth_km: f64) -> MarkerStyle {
    MarkerStyle {
        radius: marker_radius(magnitude),
        fill_color: depth_color(depth_km).to_string(),
        color: "#000".to_string(),
        weight: 1.0,
        opacity: 1.0,
        fill_opacity: 0.8,
    }
}
