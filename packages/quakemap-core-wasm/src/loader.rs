// Fetching and decoding of the two feeds. Each load resolves to a typed result;
// nothing here retries, times out or panics.
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::console_log;
use crate::models::{
    decode_features, Decoded, EarthquakeFeature, PlateBoundaryFeature, RawFeatureCollection,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("{url} answered with HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("could not decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl From<LoadError> for JsValue {
    fn from(err: LoadError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn network_error(url: &str, err: JsValue) -> LoadError {
    LoadError::Network {
        url: url.to_string(),
        reason: err
            .as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    }
}

/// GET `url` through `window.fetch` and return the body as text.
pub async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Network {
        url: url.to_string(),
        reason: "no window object available".to_string(),
    })?;

    let response_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| network_error(url, e))?;
    let response: Response = response_value
        .dyn_into()
        .map_err(|e| network_error(url, e))?;

    if !response.ok() {
        return Err(LoadError::Http {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let text_promise = response.text().map_err(|e| network_error(url, e))?;
    let body = JsFuture::from(text_promise)
        .await
        .map_err(|e| network_error(url, e))?;
    body.as_string().ok_or_else(|| LoadError::Decode {
        url: url.to_string(),
        reason: "response body is not text".to_string(),
    })
}

fn parse_collection(url: &str, body: &str) -> Result<RawFeatureCollection, LoadError> {
    serde_json::from_str(body).map_err(|e| LoadError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_earthquakes(url: &str, body: &str) -> Result<Decoded<EarthquakeFeature>, LoadError> {
    let collection = parse_collection(url, body)?;
    Ok(decode_features(collection, EarthquakeFeature::from_value))
}

pub fn parse_plate_boundaries(
    url: &str,
    body: &str,
) -> Result<Decoded<PlateBoundaryFeature>, LoadError> {
    let collection = parse_collection(url, body)?;
    Ok(decode_features(collection, PlateBoundaryFeature::from_value))
}

pub async fn load_earthquakes(url: &str) -> Result<Decoded<EarthquakeFeature>, LoadError> {
    let body = fetch_text(url).await?;
    let decoded = parse_earthquakes(url, &body)?;
    console_log!(
        "Loaded {} earthquakes from {} ({} skipped)",
        decoded.len(),
        url,
        decoded.skipped
    );
    Ok(decoded)
}

pub async fn load_plate_boundaries(url: &str) -> Result<Decoded<PlateBoundaryFeature>, LoadError> {
    let body = fetch_text(url).await?;
    let decoded = parse_plate_boundaries(url, &body)?;
    console_log!(
        "Loaded {} plate boundaries from {} ({} skipped)",
        decoded.len(),
        url,
        decoded.skipped
    );
    Ok(decoded)
}
