// Typed records for the two GeoJSON feeds. Each feature is validated on its own
// so one malformed record is skipped instead of failing the whole collection.
use geo_types::{coord, Coord, LineString, MultiLineString, Point};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("feature is not a JSON object: {0}")]
    Malformed(String),
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("expected {expected} geometry, found {found}")]
    UnexpectedGeometry { expected: &'static str, found: String },
    #[error("invalid coordinates: {0}")]
    BadCoordinates(String),
    #[error("feature has no time property")]
    MissingTime,
}

// GeoJSON-like feature structure, before validation
#[derive(Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Value>,
}

// Geometry part of a feature
#[derive(Deserialize)]
struct RawGeometry {
    r#type: String,
    coordinates: Value, // Shape depends on the geometry type
}

#[derive(Deserialize, Default)]
struct QuakeProperties {
    #[serde(default)]
    mag: Option<f64>,
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    time: Option<f64>,
}

#[derive(Deserialize)]
pub(crate) struct RawFeatureCollection {
    pub features: Vec<Value>,
}

/// One event from the USGS summary feed.
#[derive(Clone, Debug, PartialEq)]
pub struct EarthquakeFeature {
    /// x = longitude, y = latitude.
    pub location: Point<f64>,
    pub depth_km: f64,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub time_ms: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlateBoundaryFeature {
    pub name: Option<String>,
    pub paths: MultiLineString<f64>,
}

/// Features that survived validation plus how many were dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub features: Vec<T>,
    pub skipped: usize,
}

impl<T> Decoded<T> {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Decoded {
            features: Vec::new(),
            skipped: 0,
        }
    }
}

fn raw_feature(value: Value) -> Result<RawFeature, FeatureError> {
    serde_json::from_value(value).map_err(|e| FeatureError::Malformed(e.to_string()))
}

fn position(value: &Value, min_len: usize) -> Result<Vec<f64>, FeatureError> {
    let items = value
        .as_array()
        .ok_or_else(|| FeatureError::BadCoordinates(format!("position {} is not an array", value)))?;
    if items.len() < min_len {
        return Err(FeatureError::BadCoordinates(format!(
            "position has {} values, need {}",
            items.len(),
            min_len
        )));
    }
    items
        .iter()
        .map(|v| match v.as_f64() {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(FeatureError::BadCoordinates(format!("{} is not a finite number", v))),
        })
        .collect()
}

fn line_string(value: &Value) -> Result<LineString<f64>, FeatureError> {
    let positions = value
        .as_array()
        .ok_or_else(|| FeatureError::BadCoordinates("line is not an array".to_string()))?;
    let coords = positions
        .iter()
        .map(|p| position(p, 2).map(|xy| coord! { x: xy[0], y: xy[1] }))
        .collect::<Result<Vec<Coord<f64>>, _>>()?;
    if coords.len() < 2 {
        return Err(FeatureError::BadCoordinates(format!(
            "line has {} positions, need at least 2",
            coords.len()
        )));
    }
    Ok(LineString::new(coords))
}

impl EarthquakeFeature {
    pub fn from_value(value: Value) -> Result<Self, FeatureError> {
        let raw = raw_feature(value)?;
        let geometry = raw.geometry.ok_or(FeatureError::MissingGeometry)?;
        if geometry.r#type != "Point" {
            return Err(FeatureError::UnexpectedGeometry {
                expected: "Point",
                found: geometry.r#type,
            });
        }
        // Depth is the third coordinate; a point without it cannot be coloured.
        let xyz = position(&geometry.coordinates, 3)?;

        let properties: QuakeProperties = match raw.properties {
            Some(Value::Null) | None => QuakeProperties::default(),
            Some(props) => serde_json::from_value(props)
                .map_err(|e| FeatureError::Malformed(e.to_string()))?,
        };
        let time = properties
            .time
            .filter(|t| t.is_finite())
            .ok_or(FeatureError::MissingTime)?;

        Ok(EarthquakeFeature {
            location: Point::new(xyz[0], xyz[1]),
            depth_km: xyz[2],
            magnitude: properties.mag,
            place: properties.place,
            time_ms: time.round() as i64,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }
}

impl PlateBoundaryFeature {
    pub fn from_value(value: Value) -> Result<Self, FeatureError> {
        let raw = raw_feature(value)?;
        let geometry = raw.geometry.ok_or(FeatureError::MissingGeometry)?;
        let paths = match geometry.r#type.as_str() {
            "LineString" => MultiLineString::new(vec![line_string(&geometry.coordinates)?]),
            "MultiLineString" => {
                let lines = geometry.coordinates.as_array().ok_or_else(|| {
                    FeatureError::BadCoordinates("MultiLineString is not an array".to_string())
                })?;
                MultiLineString::new(lines.iter().map(line_string).collect::<Result<_, _>>()?)
            }
            _ => {
                return Err(FeatureError::UnexpectedGeometry {
                    expected: "LineString or MultiLineString",
                    found: geometry.r#type,
                })
            }
        };
        let name = raw
            .properties
            .as_ref()
            .and_then(|p| p.get("Name").or_else(|| p.get("name")))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(PlateBoundaryFeature { name, paths })
    }
}

/// Validate every feature of a collection, keeping the ones that pass.
pub(crate) fn decode_features<T, F>(collection: RawFeatureCollection, decode: F) -> Decoded<T>
where
    F: Fn(Value) -> Result<T, FeatureError>,
{
    let mut decoded = Decoded {
        features: Vec::with_capacity(collection.features.len()),
        skipped: 0,
    };
    for value in collection.features {
        match decode(value) {
            Ok(feature) => decoded.features.push(feature),
            Err(_) => decoded.skipped += 1,
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quake(coords: Value, props: Value) -> Value {
        json!({
            "type": "Feature",
            "id": "us7000abcd",
            "geometry": { "type": "Point", "coordinates": coords },
            "properties": props
        })
    }

    #[test]
    fn decodes_usgs_point() {
        let feature = EarthquakeFeature::from_value(quake(
            json!([-122.5, 37.8, 8.25]),
            json!({ "mag": 4.1, "place": "10km N of Somewhere", "time": 1700000000000i64, "url": "https://example.org/e" }),
        ))
        .expect("valid feature");
        assert_eq!(feature.longitude(), -122.5);
        assert_eq!(feature.latitude(), 37.8);
        assert_eq!(feature.depth_km, 8.25);
        assert_eq!(feature.magnitude, Some(4.1));
        assert_eq!(feature.place.as_deref(), Some("10km N of Somewhere"));
        assert_eq!(feature.time_ms, 1_700_000_000_000);
    }

    #[test]
    fn null_magnitude_and_place_are_tolerated() {
        let feature = EarthquakeFeature::from_value(quake(
            json!([0.0, 0.0, -1.0]),
            json!({ "mag": null, "place": null, "time": 0 }),
        ))
        .expect("valid feature");
        assert_eq!(feature.magnitude, None);
        assert_eq!(feature.place, None);
    }

    #[test]
    fn point_without_depth_is_rejected() {
        let err = EarthquakeFeature::from_value(quake(json!([1.0, 2.0]), json!({ "time": 0 })))
            .unwrap_err();
        assert!(matches!(err, FeatureError::BadCoordinates(_)));
    }

    #[test]
    fn missing_time_is_rejected() {
        let err = EarthquakeFeature::from_value(quake(json!([1.0, 2.0, 3.0]), json!({ "mag": 2.0 })))
            .unwrap_err();
        assert_eq!(err, FeatureError::MissingTime);
    }

    #[test]
    fn line_geometry_is_not_an_earthquake() {
        let value = json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
            "properties": { "time": 0 }
        });
        assert!(matches!(
            EarthquakeFeature::from_value(value),
            Err(FeatureError::UnexpectedGeometry { expected: "Point", .. })
        ));
    }

    #[test]
    fn decodes_plate_line_and_multiline() {
        let line = PlateBoundaryFeature::from_value(json!({
            "type": "Feature",
            "properties": { "Name": "AF-AN" },
            "geometry": { "type": "LineString", "coordinates": [[-0.4, -54.8], [0.1, -54.5], [1.2, -54.2]] }
        }))
        .expect("line");
        assert_eq!(line.name.as_deref(), Some("AF-AN"));
        assert_eq!(line.paths.0.len(), 1);
        assert_eq!(line.paths.0[0].0.len(), 3);

        let multi = PlateBoundaryFeature::from_value(json!({
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]] }
        }))
        .expect("multiline");
        assert_eq!(multi.name, None);
        assert_eq!(multi.paths.0.len(), 2);
    }

    #[test]
    fn degenerate_line_is_rejected() {
        let err = PlateBoundaryFeature::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": [[0, 0]] }
        }))
        .unwrap_err();
        assert!(matches!(err, FeatureError::BadCoordinates(_)));
    }

    #[test]
    fn bad_features_are_counted_not_fatal() {
        let collection = RawFeatureCollection {
            features: vec![
                quake(json!([1.0, 2.0, 3.0]), json!({ "time": 1 })),
                json!("not a feature"),
                quake(json!([1.0, 2.0]), json!({ "time": 1 })),
            ],
        };
        let decoded = decode_features(collection, EarthquakeFeature::from_value);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.skipped, 2);
    }
}
