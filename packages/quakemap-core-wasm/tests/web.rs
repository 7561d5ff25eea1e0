//! Browser tests. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use quakemap_core_wasm::loader::{load_earthquakes, LoadError};
use quakemap_core_wasm::popup::{page_clock, Popup};
use quakemap_core_wasm::{depth_color_js, legend_html, marker_radius_js, marker_style_js};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn exported_style_helpers() {
    assert_eq!(depth_color_js(95.0), "#FF0000");
    assert_eq!(depth_color_js(-15.0), "#00FF7F");
    assert_eq!(marker_radius_js(Some(5.0)), 20.0);
    assert_eq!(marker_radius_js(Some(0.0)), 1.0);
    assert_eq!(marker_radius_js(None), 1.0);
}

#[wasm_bindgen_test]
fn marker_style_is_a_plain_object() {
    let style = marker_style_js(Some(6.5), 75.0).expect("style");
    let fill = js_sys::Reflect::get(&style, &JsValue::from_str("fillColor")).expect("fillColor");
    let radius = js_sys::Reflect::get(&style, &JsValue::from_str("radius")).expect("radius");
    assert_eq!(fill.as_string().as_deref(), Some("#FF7F00"));
    assert_eq!(radius.as_f64(), Some(26.0));
}

#[wasm_bindgen_test]
fn legend_has_six_swatches() {
    assert_eq!(legend_html().matches("<i style=").count(), 6);
}

#[wasm_bindgen_test]
fn locale_time_is_not_empty() {
    let feature = quakemap_core_wasm::models::EarthquakeFeature {
        location: geo_types::Point::new(0.0, 0.0),
        depth_km: 1.0,
        magnitude: Some(2.0),
        place: Some("test".to_string()),
        time_ms: 1_700_000_000_000,
    };
    let popup = Popup::for_feature(&feature, page_clock());
    assert!(!popup.time.is_empty());
    assert!(popup.text().contains("Magnitude: 2"));
}

#[wasm_bindgen_test]
async fn unreachable_feed_resolves_to_an_error() {
    // Port 9 (discard) refuses connections on test machines.
    let result = load_earthquakes("http://127.0.0.1:9/all_week.geojson").await;
    assert!(matches!(result, Err(LoadError::Network { .. })));
}
