// Mount configuration for the map view. Every field falls back to the values
// the page used before it became configurable, so `{}` is a valid config.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONTAINER: &str = "map";
pub const DEFAULT_CENTER: [f64; 2] = [20.0, 0.0];
pub const DEFAULT_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 22;

pub const USGS_ALL_WEEK_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const PB2002_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to parse map config: {0}")]
    Parse(String),
    #[error("container id must not be empty")]
    EmptyContainer,
    #[error("center latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("center longitude {0} is not finite")]
    Longitude(f64),
    #[error("zoom {0} exceeds the maximum of {max}", max = MAX_ZOOM)]
    Zoom(u8),
    #[error("{0} url must not be empty")]
    EmptyUrl(&'static str),
    #[error("base layer list must not be empty")]
    NoBaseLayers,
}

/// One selectable background tile layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayerConfig {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
    pub earthquakes_url: String,
    pub plate_boundaries_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            earthquakes_url: USGS_ALL_WEEK_URL.to_string(),
            plate_boundaries_url: PB2002_BOUNDARIES_URL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// DOM id of the element Leaflet mounts into.
    pub container: String,
    /// `[lat, lng]`, Leaflet order.
    pub center: [f64; 2],
    pub zoom: u8,
    pub feeds: FeedConfig,
    /// The first entry is shown on mount.
    pub base_layers: Vec<BaseLayerConfig>,
    pub collapsed_layer_control: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            container: DEFAULT_CONTAINER.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            feeds: FeedConfig::default(),
            base_layers: default_base_layers(),
            collapsed_layer_control: false,
        }
    }
}

pub fn default_base_layers() -> Vec<BaseLayerConfig> {
    vec![
        BaseLayerConfig {
            name: "Default Map".to_string(),
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
        },
        BaseLayerConfig {
            name: "Street Map".to_string(),
            url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenTopoMap contributors".to_string(),
        },
    ]
}

impl MapConfig {
    pub fn from_json(input_json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig =
            serde_json::from_str(input_json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.trim().is_empty() {
            return Err(ConfigError::EmptyContainer);
        }
        let [lat, lng] = self.center;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Latitude(lat));
        }
        if !lng.is_finite() {
            return Err(ConfigError::Longitude(lng));
        }
        if self.zoom > MAX_ZOOM {
            return Err(ConfigError::Zoom(self.zoom));
        }
        if self.feeds.earthquakes_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl("earthquakes"));
        }
        if self.feeds.plate_boundaries_url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl("plate boundaries"));
        }
        if self.base_layers.is_empty() {
            return Err(ConfigError::NoBaseLayers);
        }
        if self.base_layers.iter().any(|b| b.url_template.trim().is_empty()) {
            return Err(ConfigError::EmptyUrl("base layer"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = MapConfig::from_json("{}").expect("defaults");
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.center, [20.0, 0.0]);
        assert_eq!(config.zoom, 2);
        assert_eq!(config.base_layers.len(), 2);
        assert_eq!(config.base_layers[0].name, "Default Map");
        assert!(!config.collapsed_layer_control);
    }

    #[test]
    fn partial_feed_override_keeps_other_default() {
        let config =
            MapConfig::from_json(r#"{"feeds": {"earthquakesUrl": "http://localhost/q.json"}}"#)
                .expect("config");
        assert_eq!(config.feeds.earthquakes_url, "http://localhost/q.json");
        assert_eq!(config.feeds.plate_boundaries_url, PB2002_BOUNDARIES_URL);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            MapConfig::from_json(r#"{"center": [95.0, 0.0]}"#),
            Err(ConfigError::Latitude(95.0))
        );
        assert_eq!(MapConfig::from_json(r#"{"zoom": 30}"#), Err(ConfigError::Zoom(30)));
        assert_eq!(
            MapConfig::from_json(r#"{"container": " "}"#),
            Err(ConfigError::EmptyContainer)
        );
        assert_eq!(
            MapConfig::from_json(r#"{"baseLayers": []}"#),
            Err(ConfigError::NoBaseLayers)
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            MapConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
