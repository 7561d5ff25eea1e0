// Bindings to the parts of Leaflet's global `L` the map view uses. Leaflet
// itself is loaded by the page before the wasm module starts.
use js_sys::{Object, Reflect};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = L, js_name = Map)]
    pub type LeafletMap;

    // Throws if the container is missing or already holds a map.
    #[wasm_bindgen(js_namespace = L, js_name = map, catch)]
    pub fn create_map(container: &str, options: &JsValue) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = remove)]
    pub fn remove(this: &LeafletMap) -> LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = Layer)]
    pub type Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    pub fn bind_popup(this: &Layer, content: &str) -> Layer;

    #[wasm_bindgen(method, js_name = remove)]
    pub fn remove(this: &Layer) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = LayerGroup, extends = Layer)]
    pub type LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    pub fn layer_group() -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &LayerGroup, layer: &Layer) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    pub fn clear_layers(this: &LayerGroup) -> LayerGroup;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    // Both throw on coordinates Leaflet cannot project.
    #[wasm_bindgen(js_namespace = L, js_name = circleMarker, catch)]
    pub fn circle_marker(lat_lng: &JsValue, options: &JsValue) -> Result<Layer, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = polyline, catch)]
    pub fn polyline(lat_lngs: &JsValue, options: &JsValue) -> Result<Layer, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = Control)]
    pub type Control;

    #[wasm_bindgen(js_namespace = L, js_name = control)]
    pub fn control(options: &JsValue) -> Control;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = layers)]
    pub fn layers_control(base_layers: &JsValue, overlays: &JsValue, options: &JsValue) -> Control;

    // Throws once the map has been removed: its control corners are gone.
    #[wasm_bindgen(method, js_name = addTo, catch)]
    pub fn add_to(this: &Control, map: &LeafletMap) -> Result<Control, JsValue>;

    #[wasm_bindgen(method, js_name = remove)]
    pub fn remove(this: &Control) -> Control;

    #[wasm_bindgen(js_namespace = ["L", "DomUtil"], js_name = create)]
    pub fn dom_create(tag_name: &str, class_name: &str) -> HtmlElement;
}

/// Serialize a Rust value into a plain JS object (no `Map`s), the shape
/// Leaflet expects for its option bags.
pub fn to_options<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize options: {}", e)))
}

/// `{ name: layer, ... }` in insertion order, as `L.control.layers` takes.
pub fn named_layers<'a, I>(layers: I) -> Result<Object, JsValue>
where
    I: IntoIterator<Item = (&'a str, &'a Layer)>,
{
    let object = Object::new();
    for (name, layer) in layers {
        Reflect::set(&object, &JsValue::from_str(name), layer)?;
    }
    Ok(object)
}

/// A custom control whose content is a fixed block of HTML. The closure backs
/// Leaflet's `onAdd` hook and must live as long as the control.
pub struct HtmlControl {
    pub control: Control,
    pub element: HtmlElement,
    _on_add: Closure<dyn FnMut(JsValue) -> JsValue>,
}

impl HtmlControl {
    pub fn new(position: &str, class_name: &str, html: &str) -> Result<HtmlControl, JsValue> {
        let options = Object::new();
        Reflect::set(&options, &"position".into(), &position.into())?;
        let control = control(&options);

        let element = dom_create("div", class_name);
        element.set_inner_html(html);

        let returned = element.clone();
        let on_add = Closure::wrap(
            Box::new(move |_map: JsValue| -> JsValue { returned.clone().into() })
                as Box<dyn FnMut(JsValue) -> JsValue>,
        );
        Reflect::set(&control, &"onAdd".into(), on_add.as_ref())?;

        Ok(HtmlControl {
            control,
            element,
            _on_add: on_add,
        })
    }

    pub fn add_to(&self, map: &LeafletMap) -> Result<(), JsValue> {
        self.control.add_to(map)?;
        Ok(())
    }

    pub fn remove(&self) {
        self.control.remove();
    }
}
