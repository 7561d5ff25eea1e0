// State of one overlay layer, independent of Leaflet. The map view mirrors
// whatever this holds into the matching `L.LayerGroup`.
use serde::Serialize;

use crate::loader::LoadError;

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const TECTONIC_PLATES_OVERLAY: &str = "Tectonic Plates";

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LayerStatus {
    Pending,
    Loaded { count: usize, skipped: usize },
    Failed { reason: String },
}

#[derive(Clone, Debug)]
pub struct OverlayLayer<T> {
    pub name: &'static str,
    pub status: LayerStatus,
    pub items: Vec<T>,
}

impl<T> OverlayLayer<T> {
    pub fn new(name: &'static str) -> Self {
        OverlayLayer {
            name,
            status: LayerStatus::Pending,
            items: Vec::new(),
        }
    }

    /// Record the outcome of a load. A failure leaves the layer registered but
    /// empty.
    pub fn apply(&mut self, result: Result<(Vec<T>, usize), LoadError>) -> &LayerStatus {
        match result {
            Ok((items, skipped)) => {
                self.status = LayerStatus::Loaded {
                    count: items.len(),
                    skipped,
                };
                self.items = items;
            }
            Err(err) => {
                self.items.clear();
                self.status = LayerStatus::Failed {
                    reason: err.to_string(),
                };
            }
        }
        &self.status
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, LayerStatus::Failed { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.status {
            LayerStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// What `load()` resolves to on the JS side.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub earthquakes: LayerStatus,
    pub tectonic_plates: LayerStatus,
}
