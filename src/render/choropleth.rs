//! Choropleth figure description
//!
//! The map geometry lives client side; the server only describes which
//! regions to fill and with what value. Output follows the shape of a
//! plotly `choropleth` trace so the dashboard page can hand it straight to
//! the map library.

use serde_json::{json, Value};

use super::color::sequential;
use super::ChartLabels;
use crate::query::MapData;

/// Build the map figure, `None` when there is nothing to draw
///
/// Regions without an ISO code are skipped. The colour domain is the one
/// computed over every region, drawn or not.
pub fn choropleth_figure(map: &MapData, labels: &ChartLabels, size: (u32, u32)) -> Option<Value> {
    let domain = map.domain?;
    let drawn: Vec<_> = map
        .regions
        .iter()
        .filter_map(|r| r.iso_alpha.as_deref().map(|iso| (iso, r)))
        .collect();
    if drawn.is_empty() {
        return None;
    }

    let locations: Vec<&str> = drawn.iter().map(|(iso, _)| *iso).collect();
    let z: Vec<f64> = drawn.iter().map(|(_, r)| r.metric).collect();
    let text: Vec<&str> = drawn.iter().map(|(_, r)| r.country.as_str()).collect();
    let colors: Vec<String> = drawn
        .iter()
        .map(|(_, r)| sequential(&domain, r.metric).hex())
        .collect();
    let hovertemplate = format!(
        "%{{text}}: %{{z:,.{}f}}<extra></extra>",
        labels.precision
    );

    let (width, height) = size;
    Some(json!({
        "data": [{
            "type": "choropleth",
            "locationmode": "ISO-3",
            "locations": locations,
            "z": z,
            "text": text,
            "colorscale": "Plasma",
            "zmin": domain.min,
            "zmax": domain.max,
            "colorbar": { "title": { "text": labels.metric } },
            "hovertemplate": hovertemplate,
        }],
        "layout": {
            "title": { "text": labels.title },
            "geo": { "scope": "africa" },
            "width": width,
            "height": height,
            "margin": { "r": 0, "t": 0, "l": 0, "b": 0 },
        },
        "colors": colors,
    }))
}
