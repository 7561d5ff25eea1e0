// Popup text bound to each earthquake marker.
use crate::models::EarthquakeFeature;

/// Turns an epoch-millisecond timestamp into display text.
pub trait TimeFormat {
    fn format_ms(&self, epoch_ms: i64) -> String;
}

/// Browser-local rendering via `Date#toLocaleString`.
#[cfg(target_arch = "wasm32")]
pub struct LocaleTime;

#[cfg(target_arch = "wasm32")]
impl TimeFormat for LocaleTime {
    fn format_ms(&self, epoch_ms: i64) -> String {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(epoch_ms as f64));
        String::from(date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED))
    }
}

/// The formatter popups use on this target.
#[cfg(target_arch = "wasm32")]
pub fn page_clock() -> &'static dyn TimeFormat {
    &LocaleTime
}

#[cfg(not(target_arch = "wasm32"))]
pub fn page_clock() -> &'static dyn TimeFormat {
    &UtcTime
}

/// `YYYY-MM-DD HH:MM:SS UTC`. Used where there is no browser locale.
pub struct UtcTime;

impl TimeFormat for UtcTime {
    fn format_ms(&self, epoch_ms: i64) -> String {
        let secs = epoch_ms.div_euclid(1000);
        let days = secs.div_euclid(86_400);
        let time_of_day = secs.rem_euclid(86_400);
        let (year, month, day) = days_to_ymd(days);
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            year,
            month,
            day,
            time_of_day / 3600,
            (time_of_day % 3600) / 60,
            time_of_day % 60
        )
    }
}

// Howard Hinnant's civil_from_days, valid for negative day counts too.
fn days_to_ymd(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Render a number the way JavaScript's `String(n)` does, so `6.5` stays `6.5`
/// and `75.0` prints as `75`. Like JS, magnitudes at or above `1e21` or below
/// `1e-6` switch to exponent form (`1e+21`, `1.5e-7`).
pub fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    } else {
        format!("{}", n)
    }
}

// A missing feed value prints as `null`, the way a template literal shows it.
fn or_null(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub location: String,
    pub magnitude: String,
    pub depth: String,
    pub time: String,
}

impl Popup {
    pub fn for_feature(feature: &EarthquakeFeature, clock: &dyn TimeFormat) -> Self {
        Popup {
            location: or_null(feature.place.clone()),
            magnitude: or_null(feature.magnitude.map(js_number)),
            depth: js_number(feature.depth_km),
            time: clock.format_ms(feature.time_ms),
        }
    }

    fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("Location", self.location.clone()),
            ("Magnitude", self.magnitude.clone()),
            ("Depth", format!("{} km", self.depth)),
            ("Time", self.time.clone()),
        ]
    }

    pub fn text(&self) -> String {
        self.rows()
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Leaflet popup content. Every value is escaped; `place` comes straight
    /// from the feed.
    pub fn html(&self) -> String {
        self.rows()
            .iter()
            .map(|(label, value)| format!("<b>{}:</b> {}", label, escape_html(value)))
            .collect::<Vec<_>>()
            .join(" <br>\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    fn feature(magnitude: Option<f64>, depth_km: f64, place: &str) -> EarthquakeFeature {
        EarthquakeFeature {
            location: Point::new(142.3, 38.1),
            depth_km,
            magnitude,
            place: Some(place.to_string()),
            time_ms: 1_704_067_200_000,
        }
    }

    #[test]
    fn utc_time_known_instants() {
        assert_eq!(UtcTime.format_ms(0), "1970-01-01 00:00:00 UTC");
        // 2024-01-01 00:00:00 UTC
        assert_eq!(UtcTime.format_ms(1_704_067_200_000), "2024-01-01 00:00:00 UTC");
        // 2024-02-29 12:34:56.789 UTC, leap day
        assert_eq!(UtcTime.format_ms(1_709_210_096_789), "2024-02-29 12:34:56 UTC");
        assert_eq!(UtcTime.format_ms(-1), "1969-12-31 23:59:59 UTC");
    }

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(js_number(6.5), "6.5");
        assert_eq!(js_number(75.0), "75");
        assert_eq!(js_number(-0.0), "0");
        assert_eq!(js_number(10.123), "10.123");
        assert_eq!(js_number(f64::NAN), "NaN");
    }

    #[test]
    fn extreme_numbers_use_exponent_form() {
        assert_eq!(js_number(1e21), "1e+21");
        assert_eq!(js_number(-2.5e22), "-2.5e+22");
        assert_eq!(js_number(1e-7), "1e-7");
        assert_eq!(js_number(1.5e-7), "1.5e-7");
        assert_eq!(js_number(1e20), "100000000000000000000");
        assert_eq!(js_number(0.000001), "0.000001");
    }

    #[test]
    fn popup_has_four_fields() {
        let popup = Popup::for_feature(&feature(Some(6.5), 75.0, "Off the coast"), &UtcTime);
        let text = popup.text();
        assert!(text.contains("Location: Off the coast"));
        assert!(text.contains("Magnitude: 6.5"));
        assert!(text.contains("Depth: 75 km"));
        assert!(text.contains("Time: 2024-01-01 00:00:00 UTC"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn missing_magnitude_prints_null() {
        let popup = Popup::for_feature(&feature(None, 3.0, "x"), &UtcTime);
        assert_eq!(popup.magnitude, "null");
    }

    #[test]
    fn missing_place_prints_null_like_magnitude() {
        let mut quake = feature(None, 3.0, "x");
        quake.place = None;
        let text = Popup::for_feature(&quake, &UtcTime).text();
        assert!(text.starts_with("Location: null\nMagnitude: null\n"));
    }

    #[test]
    fn html_escapes_place() {
        let popup = Popup::for_feature(
            &feature(Some(1.0), 1.0, "<img src=x onerror=alert(1)> & co"),
            &UtcTime,
        );
        let html = popup.html();
        assert!(html.contains("<b>Location:</b> &lt;img src=x onerror=alert(1)&gt; &amp; co"));
        assert!(!html.contains("<img"));
        assert!(html.contains("<b>Magnitude:</b> 1"));
    }
}
