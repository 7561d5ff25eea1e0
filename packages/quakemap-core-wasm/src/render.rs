use crate::models::{EarthquakeFeature, PlateBoundaryFeature};
use crate::popup::{Popup, TimeFormat};
use crate::style::{marker_style, LineStyle, MarkerStyle, PLATE_STYLE};

/// A circle marker ready to hand to Leaflet.
#[derive(Clone, Debug, PartialEq)]
pub struct EarthquakeMarker {
    /// `[lat, lng]`, Leaflet order (GeoJSON stores `[lng, lat]`).
    pub lat_lng: [f64; 2],
    pub style: MarkerStyle,
    pub popup: Popup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryLine {
    pub name: Option<String>,
    /// One `[lat, lng]` path per line of the boundary.
    pub paths: Vec<Vec<[f64; 2]>>,
    pub style: LineStyle,
}

pub fn render_earthquake(feature: &EarthquakeFeature, clock: &dyn TimeFormat) -> EarthquakeMarker {
    EarthquakeMarker {
        lat_lng: [feature.latitude(), feature.longitude()],
        style: marker_style(feature.magnitude, feature.depth_km),
        popup: Popup::for_feature(feature, clock),
    }
}

pub fn render_earthquakes(
    features: &[EarthquakeFeature],
    clock: &dyn TimeFormat,
) -> Vec<EarthquakeMarker> {
    features.iter().map(|f| render_earthquake(f, clock)).collect()
}

pub fn render_plate_boundary(feature: &PlateBoundaryFeature) -> BoundaryLine {
    let paths = feature
        .paths
        .0
        .iter()
        .map(|line| line.coords().map(|c| [c.y, c.x]).collect())
        .collect();
    BoundaryLine {
        name: feature.name.clone(),
        paths,
        style: PLATE_STYLE,
    }
}

pub fn render_plate_boundaries(features: &[PlateBoundaryFeature]) -> Vec<BoundaryLine> {
    features.iter().map(render_plate_boundary).collect()
}
