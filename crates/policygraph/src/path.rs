//! SVG path builders for edges.
//!
//! Each builder returns an [`EdgePath`]: the path data string plus the point
//! where an edge label should be drawn. Builders take [`Anchor`]s so that
//! curves leave a node perpendicular to the side they start on.

use serde::Serialize;

use policygraph_core::geometry::Point;

use crate::{config::GeometryConfig, floating::{Anchor, Anchors, Side}};

/// How an edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathStyle {
    Straight,
    Bezier,
    SmoothStep,
}

/// A built path.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    data: String,
    label: Point,
}

impl EdgePath {
    /// SVG path data, suitable for the `d` attribute.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Where the label of the edge belongs.
    pub fn label(&self) -> Point {
        self.label
    }
}

/// Builds the path for anchors in the given style.
pub fn build_path(style: PathStyle, anchors: &Anchors, config: &GeometryConfig) -> EdgePath {
    match style {
        PathStyle::Straight => straight_path(anchors.source.point, anchors.target.point),
        PathStyle::Bezier => bezier_path(anchors.source, anchors.target, config.bezier_curvature()),
        PathStyle::SmoothStep => smooth_step_path(
            anchors.source,
            anchors.target,
            config.smooth_step_offset(),
            config.smooth_step_radius(),
        ),
    }
}

/// A straight line segment with its label at the midpoint.
pub fn straight_path(source: Point, target: Point) -> EdgePath {
    EdgePath {
        data: format!(
            "M {} {} L {} {}",
            source.x(),
            source.y(),
            target.x(),
            target.y()
        ),
        label: source.midpoint(target),
    }
}

/// A cubic bezier whose control points extend out of each anchor's side.
///
/// The control distance is half the gap along the side's axis when the other
/// end lies ahead of the side. When it lies behind, the curve is pushed out
/// by `curvature * 25 * sqrt(gap)` so it loops around instead of folding back
/// through the node.
pub fn bezier_path(source: Anchor, target: Anchor, curvature: f32) -> EdgePath {
    let source_control = control_point(source, target.point, curvature);
    let target_control = control_point(target, source.point, curvature);

    // Cubic at t = 0.5.
    let label = source
        .point
        .scale(0.125)
        .add_point(source_control.scale(0.375))
        .add_point(target_control.scale(0.375))
        .add_point(target.point.scale(0.125));

    EdgePath {
        data: format!(
            "M {} {} C {} {}, {} {}, {} {}",
            source.point.x(),
            source.point.y(),
            source_control.x(),
            source_control.y(),
            target_control.x(),
            target_control.y(),
            target.point.x(),
            target.point.y()
        ),
        label,
    }
}

fn control_offset(distance: f32, curvature: f32) -> f32 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

fn control_point(anchor: Anchor, other: Point, curvature: f32) -> Point {
    let Anchor { point, side } = anchor;
    match side {
        Side::Left => Point::new(
            point.x() - control_offset(point.x() - other.x(), curvature),
            point.y(),
        ),
        Side::Right => Point::new(
            point.x() + control_offset(other.x() - point.x(), curvature),
            point.y(),
        ),
        Side::Top => Point::new(
            point.x(),
            point.y() - control_offset(point.y() - other.y(), curvature),
        ),
        Side::Bottom => Point::new(
            point.x(),
            point.y() + control_offset(other.y() - point.y(), curvature),
        ),
    }
}

/// An orthogonal path with rounded corners.
///
/// The path leaves each anchor straight out of its side for `offset` before
/// turning, and every corner is rounded with at most `border_radius`.
pub fn smooth_step_path(source: Anchor, target: Anchor, offset: f32, border_radius: f32) -> EdgePath {
    let (points, label) = step_points(source, target, offset);

    let mut data = String::new();
    for (i, &point) in points.iter().enumerate() {
        let segment = if i == 0 {
            format!("M {} {}", point.x(), point.y())
        } else if i + 1 == points.len() {
            format!(" L {} {}", point.x(), point.y())
        } else {
            format!(" {}", bend(points[i - 1], point, points[i + 1], border_radius))
        };
        data.push_str(&segment);
    }

    EdgePath { data, label }
}

/// Direction of travel out of the source gap, along the source side's axis.
fn heading(source: Point, side: Side, target: Point) -> Point {
    if side.is_horizontal() {
        if source.x() < target.x() {
            Point::new(1.0, 0.0)
        } else {
            Point::new(-1.0, 0.0)
        }
    } else if source.y() < target.y() {
        Point::new(0.0, 1.0)
    } else {
        Point::new(0.0, -1.0)
    }
}

/// Corner points of the orthogonal route, including both anchors, and the
/// label position.
fn step_points(source: Anchor, target: Anchor, offset: f32) -> (Vec<Point>, Point) {
    let source_dir = source.side.direction();
    let target_dir = target.side.direction();

    // Facing anchors closer than two gaps meet halfway instead of overshooting.
    let delta = target.point.sub_point(source.point);
    let ahead = source_dir.x() * delta.x() + source_dir.y() * delta.y();
    let offset = if target_dir == source_dir.scale(-1.0) && ahead > 0.0 {
        offset.min(ahead / 2.0)
    } else {
        offset
    };

    let source_gap = source.point.add_point(source_dir.scale(offset));
    let target_gap = target.point.add_point(target_dir.scale(offset));

    let dir = heading(source_gap, source.side, target_gap);
    let horizontal = dir.x() != 0.0;
    let current = if horizontal { dir.x() } else { dir.y() };
    let (source_axis, target_axis) = if horizontal {
        (source_dir.x(), target_dir.x())
    } else {
        (source_dir.y(), target_dir.y())
    };
    let center = source.point.midpoint(target.point);

    let corners: Vec<Point> = if source_axis * target_axis == -1.0 {
        // Opposite sides: two corners through the middle.
        let vertical_split = vec![
            Point::new(center.x(), source_gap.y()),
            Point::new(center.x(), target_gap.y()),
        ];
        let horizontal_split = vec![
            Point::new(source_gap.x(), center.y()),
            Point::new(target_gap.x(), center.y()),
        ];
        match (source_axis == current, horizontal) {
            (true, true) | (false, false) => vertical_split,
            (true, false) | (false, true) => horizontal_split,
        }
    } else {
        // Same or perpendicular sides: one corner.
        let source_target = vec![Point::new(source_gap.x(), target_gap.y())];
        let target_source = vec![Point::new(target_gap.x(), source_gap.y())];
        let source_first = if horizontal {
            source_dir.x() != current
        } else {
            source_dir.y() == current
        };
        if source_first { source_target } else { target_source }
    };

    let mut points = Vec::with_capacity(corners.len() + 4);
    points.push(source.point);
    points.push(source_gap);
    points.extend(corners);
    points.push(target_gap);
    points.push(target.point);
    points.dedup();
    (points, center)
}

/// Path segment for the corner at `b`, entered from `a` and left toward `c`.
fn bend(a: Point, b: Point, c: Point, size: f32) -> String {
    let bend_size = (a.distance(b) / 2.0).min(b.distance(c) / 2.0).min(size);
    let (x, y) = (b.x(), b.y());

    // Collinear: no corner to round.
    if (a.x() == x && x == c.x()) || (a.y() == y && y == c.y()) {
        return format!("L {x} {y}");
    }

    if a.y() == y {
        let x_dir = if a.x() < c.x() { -1.0 } else { 1.0 };
        let y_dir = if a.y() < c.y() { 1.0 } else { -1.0 };
        return format!(
            "L {} {} Q {x} {y} {x} {}",
            x + bend_size * x_dir,
            y,
            y + bend_size * y_dir
        );
    }

    let x_dir = if a.x() < c.x() { 1.0 } else { -1.0 };
    let y_dir = if a.y() < c.y() { -1.0 } else { 1.0 };
    format!(
        "L {} {} Q {x} {y} {} {y}",
        x,
        y + bend_size * y_dir,
        x + bend_size * x_dir
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn anchor(x: f32, y: f32, side: Side) -> Anchor {
        Anchor::new(Point::new(x, y), side)
    }

    #[test]
    fn test_straight_path() {
        let path = straight_path(Point::new(0.0, 0.0), Point::new(10.0, 20.0));
        assert_eq!(path.data(), "M 0 0 L 10 20");
        assert_eq!(path.label(), Point::new(5.0, 10.0));
    }

    #[test]
    fn test_bezier_facing_anchors() {
        let path = bezier_path(anchor(50.0, 0.0, Side::Right), anchor(150.0, 0.0, Side::Left), 0.25);

        assert_eq!(path.data(), "M 50 0 C 100 0, 100 0, 150 0");
        assert_eq!(path.label(), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_bezier_target_behind_source_loops_out() {
        // The target lies to the left of a right-facing source.
        let path = bezier_path(anchor(100.0, 0.0, Side::Right), anchor(0.0, 50.0, Side::Left), 0.25);

        // 0.25 * 25 * sqrt(100) = 62.5
        assert!(path.data().starts_with("M 100 0 C 162.5 0, -62.5 50, 0 50"));
    }

    #[test]
    fn test_bezier_label_is_curve_midpoint() {
        let path = bezier_path(anchor(0.0, 0.0, Side::Bottom), anchor(100.0, 200.0, Side::Top), 0.25);

        // Controls at (0, 100) and (100, 100).
        assert!(approx_eq!(f32, path.label().x(), 50.0, ulps = 4));
        assert!(approx_eq!(f32, path.label().y(), 100.0, ulps = 4));
    }

    #[test]
    fn test_smooth_step_opposite_sides() {
        let path = smooth_step_path(anchor(50.0, 0.0, Side::Right), anchor(250.0, 100.0, Side::Left), 20.0, 5.0);

        assert_eq!(
            path.data(),
            "M 50 0 L 70 0 L 145 0 Q 150 0 150 5 L 150 95 Q 150 100 155 100 L 230 100 L 250 100"
        );
        assert_eq!(path.label(), Point::new(150.0, 50.0));
    }

    #[test]
    fn test_smooth_step_aligned_anchors_is_straight() {
        let path = smooth_step_path(anchor(50.0, 0.0, Side::Right), anchor(150.0, 0.0, Side::Left), 20.0, 5.0);

        assert_eq!(
            path.data(),
            "M 50 0 L 70 0 L 100 0 L 130 0 L 150 0"
        );
    }

    #[test]
    fn test_smooth_step_close_stacked_nodes_do_not_backtrack() {
        let path = smooth_step_path(anchor(90.0, 48.0, Side::Bottom), anchor(90.0, 80.0, Side::Top), 20.0, 5.0);

        assert_eq!(path.data(), "M 90 48 L 90 64 L 90 80");
    }

    #[test]
    fn test_smooth_step_close_offset_nodes_turn_halfway() {
        let path = smooth_step_path(anchor(0.0, 48.0, Side::Bottom), anchor(100.0, 80.0, Side::Top), 20.0, 5.0);

        assert_eq!(
            path.data(),
            "M 0 48 L 0 59 Q 0 64 5 64 L 50 64 L 95 64 Q 100 64 100 69 L 100 80"
        );
    }

    #[test]
    fn test_smooth_step_perpendicular_sides_has_one_corner() {
        let path = smooth_step_path(anchor(0.0, 20.0, Side::Bottom), anchor(100.0, 200.0, Side::Left), 20.0, 5.0);

        // Down out of the source, then right into the target.
        assert_eq!(
            path.data(),
            "M 0 20 L 0 40 L 0 195 Q 0 200 5 200 L 80 200 L 100 200"
        );
    }

    #[test]
    fn test_build_path_dispatch() {
        let anchors = Anchors {
            source: anchor(50.0, 0.0, Side::Right),
            target: anchor(150.0, 0.0, Side::Left),
        };
        let config = GeometryConfig::default();

        assert_eq!(
            build_path(PathStyle::Straight, &anchors, &config).data(),
            "M 50 0 L 150 0"
        );
        assert!(build_path(PathStyle::Bezier, &anchors, &config).data().contains(" C "));
        assert!(build_path(PathStyle::SmoothStep, &anchors, &config).data().starts_with("M 50 0 L 70 0"));
    }
}
