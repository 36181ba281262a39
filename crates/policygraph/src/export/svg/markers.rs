//! Arrowhead markers.

use svg::node::element::{Definitions, Marker, Path};

use policygraph_core::color::Color;

pub(super) const ENABLED: &str = "arrow-enabled";
pub(super) const DISABLED: &str = "arrow-disabled";

/// Creates one arrowhead marker per edge state.
pub(super) fn create_marker_definitions(enabled: &Color, disabled: &Color) -> Definitions {
    Definitions::new()
        .add(arrowhead(ENABLED, enabled))
        .add(arrowhead(DISABLED, disabled))
}

fn arrowhead(id: &str, color: &Color) -> Marker {
    Marker::new()
        .set("id", id)
        .set("viewBox", "0 0 10 10")
        .set("refX", 9)
        .set("refY", 5)
        .set("markerWidth", 6)
        .set("markerHeight", 6)
        .set("orient", "auto")
        .add(
            Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", color),
        )
}

/// Marker reference for the end of an edge.
pub(super) fn marker_url(enabled: bool) -> String {
    format!("url(#{})", if enabled { ENABLED } else { DISABLED })
}
