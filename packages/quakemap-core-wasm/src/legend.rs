// Static depth legend shown in the bottom-right corner of the map.
use lazy_static::lazy_static;
use serde::Serialize;

pub const LEGEND_TITLE: &str = "Depth (km)";
pub const LEGEND_POSITION: &str = "bottomright";
pub const LEGEND_CLASS: &str = "info legend";

pub const GRADES: [u32; 6] = [0, 10, 30, 50, 70, 100];
pub const COLORS: [&str; 6] = ["#FEB24C", "#FD8D3C", "#FC4E2A", "#E31A1C", "#BD0026", "#800026"];

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub lower_bound_km: u32,
    pub upper_bound_km: Option<u32>,
    pub color: &'static str,
}

impl LegendEntry {
    /// `10–30`, or `100+` for the open-ended last entry.
    pub fn label(&self) -> String {
        match self.upper_bound_km {
            Some(upper) => format!("{}&ndash;{}", self.lower_bound_km, upper),
            None => format!("{}+", self.lower_bound_km),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
}

lazy_static! {
    static ref DEPTH_LEGEND: Legend = Legend::build();
}

impl Legend {
    fn build() -> Self {
        let entries = GRADES
            .iter()
            .zip(COLORS.iter())
            .enumerate()
            .map(|(i, (&lower, &color))| LegendEntry {
                lower_bound_km: lower,
                upper_bound_km: GRADES.get(i + 1).copied(),
                color,
            })
            .collect();
        Legend {
            title: LEGEND_TITLE,
            entries,
        }
    }

    /// The one legend the map uses. Built on first access and never changes.
    pub fn depth() -> &'static Legend {
        &DEPTH_LEGEND
    }

    pub fn swatch_count(&self) -> usize {
        self.entries.len()
    }

    pub fn html(&self) -> String {
        let mut html = format!("<strong>{}</strong><br>", self.title);
        for entry in &self.entries {
            html.push_str(&format!(
                "<i style=\"background:{}\"></i> {}",
                entry.color,
                entry.label()
            ));
            if entry.upper_bound_km.is_some() {
                html.push_str("<br>");
            }
        }
        html
    }
}
