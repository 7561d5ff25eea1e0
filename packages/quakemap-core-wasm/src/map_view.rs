// The single map object a page creates. It owns every Leaflet handle (map,
// base layers, overlay groups, controls) and the overlay state the two loaders
// write into.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::join;
use js_sys::{Array, Object, Reflect};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::{ConfigError, MapConfig};
use crate::leaflet::{self, HtmlControl, Layer, LayerGroup, LeafletMap};
use crate::legend::{Legend, LEGEND_CLASS, LEGEND_POSITION};
use crate::loader::{load_earthquakes, load_plate_boundaries, LoadError};
use crate::models::{Decoded, EarthquakeFeature, PlateBoundaryFeature};
use crate::overlay::{
    LayerStatus, LoadSummary, OverlayLayer, EARTHQUAKES_OVERLAY, TECTONIC_PLATES_OVERLAY,
};
use crate::popup::{escape_html, page_clock, TimeFormat};
use crate::render::{render_earthquakes, render_plate_boundaries, BoundaryLine, EarthquakeMarker};
use crate::{console_log, console_warn};

const ERROR_BANNER_POSITION: &str = "topright";
const ERROR_BANNER_CLASS: &str = "info load-error";

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub(crate) struct Overlays {
    pub earthquakes: OverlayLayer<EarthquakeMarker>,
    pub plates: OverlayLayer<BoundaryLine>,
}

impl Overlays {
    pub fn new() -> Self {
        Overlays {
            earthquakes: OverlayLayer::new(EARTHQUAKES_OVERLAY),
            plates: OverlayLayer::new(TECTONIC_PLATES_OVERLAY),
        }
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            earthquakes: self.earthquakes.status.clone(),
            tectonic_plates: self.plates.status.clone(),
        }
    }

    pub fn settle_earthquakes(
        &mut self,
        result: Result<Decoded<EarthquakeFeature>, LoadError>,
        clock: &dyn TimeFormat,
    ) -> &OverlayLayer<EarthquakeMarker> {
        let rendered =
            result.map(|decoded| (render_earthquakes(&decoded.features, clock), decoded.skipped));
        self.earthquakes.apply(rendered);
        &self.earthquakes
    }

    pub fn settle_plates(
        &mut self,
        result: Result<Decoded<PlateBoundaryFeature>, LoadError>,
    ) -> &OverlayLayer<BoundaryLine> {
        let rendered =
            result.map(|decoded| (render_plate_boundaries(&decoded.features), decoded.skipped));
        self.plates.apply(rendered);
        &self.plates
    }
}

/// Leaflet objects owned by one mounted map.
struct MapHandles {
    map: LeafletMap,
    base_layers: Vec<Layer>,
    earthquake_group: LayerGroup,
    plate_group: LayerGroup,
    layer_control: leaflet::Control,
    legend: HtmlControl,
    /// Error banners keyed by overlay name, at most one each.
    banners: RefCell<Vec<(&'static str, HtmlControl)>>,
}

impl MapHandles {
    fn draw_earthquakes(&self, layer: &OverlayLayer<EarthquakeMarker>) -> Result<(), JsValue> {
        self.earthquake_group.clear_layers();
        for marker in &layer.items {
            let lat_lng = Array::of2(&marker.lat_lng[0].into(), &marker.lat_lng[1].into());
            let circle = leaflet::circle_marker(&lat_lng, &leaflet::to_options(&marker.style)?)?;
            circle.bind_popup(&marker.popup.html());
            self.earthquake_group.add_layer(&circle);
        }
        Ok(())
    }

    fn draw_plates(&self, layer: &OverlayLayer<BoundaryLine>) -> Result<(), JsValue> {
        self.plate_group.clear_layers();
        for line in &layer.items {
            let polyline = leaflet::polyline(
                &leaflet::to_options(&line.paths)?,
                &leaflet::to_options(&line.style)?,
            )?;
            if let Some(name) = &line.name {
                polyline.bind_popup(&escape_html(name));
            }
            self.plate_group.add_layer(&polyline);
        }
        Ok(())
    }

    /// Replace any banner this overlay already shows with one for `reason`.
    fn show_failure(&self, overlay: &'static str, reason: &str) -> Result<(), JsValue> {
        self.clear_failure(overlay);
        let html = format!(
            "<strong>{}</strong> unavailable: {}",
            escape_html(overlay),
            escape_html(reason)
        );
        let banner = HtmlControl::new(ERROR_BANNER_POSITION, ERROR_BANNER_CLASS, &html)?;
        banner.add_to(&self.map)?;
        self.banners.borrow_mut().push((overlay, banner));
        Ok(())
    }

    fn clear_failure(&self, overlay: &str) {
        let stale: Vec<HtmlControl> = {
            let mut banners = self.banners.borrow_mut();
            let (stale, kept): (Vec<_>, Vec<_>) =
                banners.drain(..).partition(|(name, _)| *name == overlay);
            *banners = kept;
            stale.into_iter().map(|(_, banner)| banner).collect()
        };
        for banner in stale {
            banner.remove();
        }
    }

    fn remove_all(&self) {
        let banners: Vec<_> = self.banners.borrow_mut().drain(..).collect();
        for (_, banner) in banners {
            banner.remove();
        }
        self.legend.remove();
        self.layer_control.remove();
        self.earthquake_group.clear_layers();
        self.plate_group.clear_layers();
        self.earthquake_group.remove();
        self.plate_group.remove();
        for base in &self.base_layers {
            base.remove();
        }
        self.map.remove();
    }
}

#[wasm_bindgen]
pub struct QuakeMap {
    config: MapConfig,
    handles: Option<Rc<MapHandles>>,
    overlays: Rc<RefCell<Overlays>>,
}

fn config_from_js(config: JsValue) -> Result<MapConfig, JsValue> {
    let config: MapConfig = if config.is_undefined() || config.is_null() {
        MapConfig::default()
    } else {
        from_value(config).map_err(|e| ConfigError::Parse(e.to_string()))?
    };
    config.validate()?;
    Ok(config)
}

#[wasm_bindgen]
impl QuakeMap {
    /// Build the map, both base layers, both (empty) overlays, the layer
    /// control and the legend. Data is not fetched until `load()`.
    pub fn mount(config: JsValue) -> Result<QuakeMap, JsValue> {
        QuakeMap::mount_config(config_from_js(config)?)
    }

    #[wasm_bindgen(js_name = mountJson)]
    pub fn mount_json(config_json: &str) -> Result<QuakeMap, JsValue> {
        QuakeMap::mount_config(MapConfig::from_json(config_json)?)
    }

    /// Fetch both feeds concurrently. Each overlay is drawn as soon as its
    /// own feed settles; a failed feed gets an error banner instead and a
    /// later successful load takes that banner down again. The returned
    /// promise resolves with both statuses and never rejects because of a
    /// fetch failure.
    pub fn load(&self) -> js_sys::Promise {
        let handles = self.handles.as_ref().map(Rc::downgrade);
        let overlays = Rc::clone(&self.overlays);
        let earthquakes_url = self.config.feeds.earthquakes_url.clone();
        let plates_url = self.config.feeds.plate_boundaries_url.clone();

        future_to_promise(async move {
            let handles = match handles {
                Some(handles) => handles,
                None => return Err(JsValue::from_str("map has been disposed")),
            };

            let quakes = {
                let handles = Weak::clone(&handles);
                let overlays = Rc::clone(&overlays);
                async move {
                    let result = load_earthquakes(&earthquakes_url).await;
                    let layer = overlays
                        .borrow_mut()
                        .settle_earthquakes(result, page_clock())
                        .clone();
                    settle_on_map(&handles, &layer, MapHandles::draw_earthquakes);
                }
            };
            let plates = {
                let handles = Weak::clone(&handles);
                let overlays = Rc::clone(&overlays);
                async move {
                    let result = load_plate_boundaries(&plates_url).await;
                    let layer = overlays.borrow_mut().settle_plates(result).clone();
                    settle_on_map(&handles, &layer, MapHandles::draw_plates);
                }
            };
            join(quakes, plates).await;

            let summary = overlays.borrow().summary();
            to_value(&summary).map_err(JsValue::from)
        })
    }

    #[wasm_bindgen(js_name = earthquakeCount)]
    pub fn earthquake_count(&self) -> usize {
        self.overlays.borrow().earthquakes.len()
    }

    #[wasm_bindgen(js_name = plateBoundaryCount)]
    pub fn plate_boundary_count(&self) -> usize {
        self.overlays.borrow().plates.len()
    }

    #[wasm_bindgen(js_name = legendSwatches)]
    pub fn legend_swatches(&self) -> usize {
        Legend::depth().swatch_count()
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        Ok(to_value(&self.overlays.borrow().summary())?)
    }

    /// Tear down every layer and control and the map itself. Loads still in
    /// flight record their status but draw nothing: they only hold a `Weak`
    /// to the Leaflet handles, which this drops.
    pub fn dispose(&mut self) {
        if let Some(handles) = self.handles.take() {
            handles.remove_all();
            console_log!("Map in #{} disposed", self.config.container);
        }
    }
}

impl QuakeMap {
    fn mount_config(config: MapConfig) -> Result<QuakeMap, JsValue> {
        let base_layers: Vec<Layer> = config
            .base_layers
            .iter()
            .map(|base| -> Result<Layer, JsValue> {
                let options = Object::new();
                Reflect::set(&options, &"attribution".into(), &base.attribution.as_str().into())?;
                Ok(leaflet::tile_layer(&base.url_template, &options))
            })
            .collect::<Result<_, _>>()?;

        let earthquake_group = leaflet::layer_group();
        let plate_group = leaflet::layer_group();

        // The first base layer and the earthquake overlay are visible on load.
        let map_options = Object::new();
        let center = Array::of2(&config.center[0].into(), &config.center[1].into());
        Reflect::set(&map_options, &"center".into(), &center)?;
        Reflect::set(&map_options, &"zoom".into(), &JsValue::from(config.zoom))?;
        Reflect::set(
            &map_options,
            &"layers".into(),
            &Array::of2(&base_layers[0], &earthquake_group),
        )?;
        let map = leaflet::create_map(&config.container, &map_options)?;

        let base_maps = leaflet::named_layers(
            config
                .base_layers
                .iter()
                .map(|b| b.name.as_str())
                .zip(base_layers.iter()),
        )?;
        let overlay_maps = leaflet::named_layers([
            (EARTHQUAKES_OVERLAY, &*earthquake_group),
            (TECTONIC_PLATES_OVERLAY, &*plate_group),
        ])?;
        let control_options = Object::new();
        Reflect::set(
            &control_options,
            &"collapsed".into(),
            &JsValue::from_bool(config.collapsed_layer_control),
        )?;
        let layer_control = leaflet::layers_control(&base_maps, &overlay_maps, &control_options);
        layer_control.add_to(&map)?;

        let legend = HtmlControl::new(LEGEND_POSITION, LEGEND_CLASS, &Legend::depth().html())?;
        legend.add_to(&map)?;

        console_log!(
            "Map mounted in #{} with {} base layers",
            config.container,
            base_layers.len()
        );

        Ok(QuakeMap {
            config,
            handles: Some(Rc::new(MapHandles {
                map,
                base_layers,
                earthquake_group,
                plate_group,
                layer_control,
                legend,
                banners: RefCell::new(Vec::new()),
            })),
            overlays: Rc::new(RefCell::new(Overlays::new())),
        })
    }
}

// Mirror a settled overlay onto the map, unless the map was disposed while
// the feed was in flight. Callers must not hold the overlay state borrowed.
fn settle_on_map<T>(
    handles: &Weak<MapHandles>,
    layer: &OverlayLayer<T>,
    draw: fn(&MapHandles, &OverlayLayer<T>) -> Result<(), JsValue>,
) {
    let Some(handles) = handles.upgrade() else {
        console_log!("{} overlay settled after dispose; nothing drawn", layer.name);
        return;
    };
    let outcome = match &layer.status {
        LayerStatus::Failed { reason } => {
            console_warn!("{} overlay left empty: {}", layer.name, reason);
            // Markers from an earlier load must not outlive the failure.
            draw(&handles, layer).and_then(|()| handles.show_failure(layer.name, reason))
        }
        _ => {
            handles.clear_failure(layer.name);
            draw(&handles, layer)
        }
    };
    if let Err(err) = outcome {
        console_warn!("Failed to draw {} overlay: {:?}", layer.name, err);
    }
}
