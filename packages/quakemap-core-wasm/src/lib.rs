use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Mount configuration
pub mod config;
// Typed GeoJSON records
pub mod models;
// Marker and line styling
pub mod style;
// Popup content
pub mod popup;
// Depth legend
pub mod legend;
// Feature -> marker conversion
pub mod render;
// Per-overlay load state
pub mod overlay;
// Feed fetching and decoding
pub mod loader;
// Leaflet bindings
pub mod leaflet;
// The map object exposed to JS
mod map_view;

pub use map_view::QuakeMap;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macros from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => ($crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("quakemap module initialized");
    });
}

#[wasm_bindgen(js_name = depth_color)]
pub fn depth_color_js(depth_km: f64) -> String {
    style::depth_color(depth_km).to_string()
}

#[wasm_bindgen(js_name = marker_radius)]
pub fn marker_radius_js(magnitude: Option<f64>) -> f64 {
    style::marker_radius(magnitude)
}

/// Full circle-marker options for a magnitude/depth pair.
#[wasm_bindgen(js_name = marker_style)]
pub fn marker_style_js(magnitude: Option<f64>, depth_km: f64) -> Result<JsValue, JsValue> {
    Ok(to_value(&style::marker_style(magnitude, depth_km))?)
}

#[wasm_bindgen]
pub fn legend_html() -> String {
    legend::Legend::depth().html()
}

#[derive(serde::Serialize)]
struct FeedReport {
    count: usize,
    skipped: usize,
}

/// Decode an earthquake feed body and return how many features survived and
/// how many were skipped. Lets a page check a feed without mounting a map.
#[wasm_bindgen]
pub fn inspect_earthquake_feed(body: &str) -> Result<JsValue, JsValue> {
    let decoded = loader::parse_earthquakes("inline", body)?;
    Ok(to_value(&FeedReport {
        count: decoded.len(),
        skipped: decoded.skipped,
    })?)
}
