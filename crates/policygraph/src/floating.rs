//! Floating edge anchors.
//!
//! A floating edge is not attached to a fixed handle. Instead each end sits
//! where the line between the two node centers crosses the node's boundary,
//! and the side of the boundary it crosses tells the path builders which
//! way the edge leaves the node.
//!
//! All functions here are total: degenerate input (a zero-sized node,
//! coincident centers, non-finite coordinates) falls back to the node
//! center on the right side instead of producing NaN.

use serde::Serialize;

use policygraph_core::geometry::{Bounds, Point};

/// The side of a node boundary an anchor sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Outward unit normal of the side, with y pointing down.
    pub fn direction(self) -> Point {
        match self {
            Self::Left => Point::new(-1.0, 0.0),
            Self::Right => Point::new(1.0, 0.0),
            Self::Top => Point::new(0.0, -1.0),
            Self::Bottom => Point::new(0.0, 1.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// A point on a node boundary together with the side it lies on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchor {
    pub point: Point,
    pub side: Side,
}

impl Anchor {
    pub fn new(point: Point, side: Side) -> Self {
        Self { point, side }
    }
}

/// Both ends of a floating edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchors {
    pub source: Anchor,
    pub target: Anchor,
}

impl Anchors {
    /// Returns the same edge with its ends exchanged.
    pub fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

/// Projects the ray from the center of `node` toward `toward` onto the
/// node's boundary.
///
/// Whichever of `|dx| / (w/2)` and `|dy| / (h/2)` is larger picks the side,
/// and the anchor is placed on that side's edge. A tie goes to the horizontal axis.
pub fn boundary_anchor(node: Bounds, toward: Point) -> Anchor {
    let center = node.center();
    let delta = toward.sub_point(center);
    if node.is_degenerate() || delta.is_zero() || !delta.is_finite() {
        return fallback(center);
    }

    let half_width = node.width() / 2.0;
    let half_height = node.height() / 2.0;
    let x_ratio = delta.x().abs() / half_width;
    let y_ratio = delta.y().abs() / half_height;

    // The dominant coordinate is placed on the edge directly so the anchor
    // sits exactly on the boundary; only the other axis is scaled.
    let (point, side) = if x_ratio >= y_ratio {
        let (edge, side) = if delta.x() > 0.0 {
            (half_width, Side::Right)
        } else {
            (-half_width, Side::Left)
        };
        let y = delta.y() * (half_width / delta.x().abs());
        (center.add_point(Point::new(edge, y)), side)
    } else {
        let (edge, side) = if delta.y() > 0.0 {
            (half_height, Side::Bottom)
        } else {
            (-half_height, Side::Top)
        };
        let x = delta.x() * (half_height / delta.y().abs());
        (center.add_point(Point::new(x, edge)), side)
    };

    if point.is_finite() {
        Anchor::new(point, side)
    } else {
        fallback(center)
    }
}

/// Computes the anchors of an edge from `source` to `target`.
///
/// # Examples
///
/// ```
/// # use policygraph::floating::{anchor_points, Side};
/// # use policygraph_core::geometry::{Bounds, Point, Size};
/// let a = Bounds::new_from_center(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
/// let b = Bounds::new_from_center(Point::new(200.0, 0.0), Size::new(100.0, 40.0));
///
/// let anchors = anchor_points(a, b);
/// assert_eq!(anchors.source.point, Point::new(50.0, 0.0));
/// assert_eq!(anchors.source.side, Side::Right);
/// assert_eq!(anchors.target.point, Point::new(150.0, 0.0));
/// assert_eq!(anchors.target.side, Side::Left);
/// ```
pub fn anchor_points(source: Bounds, target: Bounds) -> Anchors {
    Anchors {
        source: boundary_anchor(source, target.center()),
        target: boundary_anchor(target, source.center()),
    }
}

/// Shifts both anchors perpendicular to the line between them.
///
/// Positive distances move to the right of the travel direction (y down).
/// Shifting `anchors` and `anchors.reversed()` by the same distance puts
/// the two results on opposite sides of the original line. Coincident
/// anchors are returned unchanged.
pub fn offset_anchors(anchors: Anchors, distance: f32) -> Anchors {
    let Some(direction) = anchors
        .target
        .point
        .sub_point(anchors.source.point)
        .normalize()
    else {
        return anchors;
    };
    let shift = direction.perpendicular().scale(distance);
    if !shift.is_finite() {
        return anchors;
    }

    Anchors {
        source: Anchor::new(anchors.source.point.add_point(shift), anchors.source.side),
        target: Anchor::new(anchors.target.point.add_point(shift), anchors.target.side),
    }
}

fn fallback(center: Point) -> Anchor {
    let point = if center.is_finite() {
        center
    } else {
        Point::default()
    };
    Anchor::new(point, Side::Right)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use policygraph_core::geometry::Size;

    use super::*;

    fn node(x: f32, y: f32, width: f32, height: f32) -> Bounds {
        Bounds::new_from_center(Point::new(x, y), Size::new(width, height))
    }

    #[test]
    fn test_horizontal_neighbours() {
        let anchors = anchor_points(node(0.0, 0.0, 100.0, 40.0), node(200.0, 0.0, 100.0, 40.0));

        assert_eq!(anchors.source, Anchor::new(Point::new(50.0, 0.0), Side::Right));
        assert_eq!(anchors.target, Anchor::new(Point::new(150.0, 0.0), Side::Left));
    }

    #[test]
    fn test_vertical_neighbours() {
        let anchors = anchor_points(node(0.0, 0.0, 100.0, 40.0), node(0.0, 300.0, 100.0, 40.0));

        assert_eq!(anchors.source, Anchor::new(Point::new(0.0, 20.0), Side::Bottom));
        assert_eq!(anchors.target, Anchor::new(Point::new(0.0, 280.0), Side::Top));
    }

    #[test]
    fn test_anchor_is_exactly_on_edge_for_uneven_ratio() {
        let anchors = anchor_points(node(0.0, 0.0, 100.0, 30.0), node(7.0, 70.0, 100.0, 30.0));

        assert_eq!(anchors.source.side, Side::Bottom);
        assert_eq!(anchors.source.point.y(), 15.0);
        assert_eq!(anchors.target.side, Side::Top);
        assert_eq!(anchors.target.point.y(), 55.0);
        assert!(approx_eq!(f32, anchors.source.point.x(), 1.5, epsilon = 1e-4));
    }

    #[test]
    fn test_diagonal_lands_on_dominant_side() {
        // dx/(w/2) = 100/50 = 2, dy/(h/2) = 100/20 = 5, so y dominates.
        let anchor = boundary_anchor(node(0.0, 0.0, 100.0, 40.0), Point::new(100.0, -100.0));

        assert_eq!(anchor.side, Side::Top);
        assert!(approx_eq!(f32, anchor.point.x(), 20.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, anchor.point.y(), -20.0, epsilon = 1e-4));
    }

    #[test]
    fn test_corner_tie_prefers_horizontal() {
        let anchor = boundary_anchor(node(0.0, 0.0, 100.0, 40.0), Point::new(100.0, 40.0));

        assert_eq!(anchor.side, Side::Right);
        assert_eq!(anchor.point, Point::new(50.0, 20.0));
    }

    #[test]
    fn test_coincident_centers_fall_back() {
        let a = node(10.0, 10.0, 100.0, 40.0);
        let anchors = anchor_points(a, a);

        assert_eq!(anchors.source, Anchor::new(Point::new(10.0, 10.0), Side::Right));
        assert_eq!(anchors.target, Anchor::new(Point::new(10.0, 10.0), Side::Right));
    }

    #[test]
    fn test_zero_sized_node_falls_back() {
        let anchors = anchor_points(node(0.0, 0.0, 0.0, 0.0), node(100.0, 0.0, 50.0, 50.0));

        assert_eq!(anchors.source, Anchor::new(Point::new(0.0, 0.0), Side::Right));
        assert_eq!(anchors.target.side, Side::Left);
        assert_eq!(anchors.target.point, Point::new(75.0, 0.0));
    }

    #[test]
    fn test_non_finite_node_does_not_produce_nan() {
        let anchors = anchor_points(node(f32::NAN, 0.0, 10.0, 10.0), node(100.0, 0.0, 10.0, 10.0));

        assert!(anchors.source.point.is_finite());
        assert!(anchors.target.point.is_finite());
    }

    #[test]
    fn test_offset_separates_opposite_arcs() {
        let anchors = anchor_points(node(0.0, 0.0, 100.0, 40.0), node(200.0, 0.0, 100.0, 40.0));

        let forward = offset_anchors(anchors, 6.0);
        let backward = offset_anchors(anchors.reversed(), 6.0);

        assert_eq!(forward.source.point, Point::new(50.0, 6.0));
        assert_eq!(forward.target.point, Point::new(150.0, 6.0));
        assert_eq!(backward.source.point, Point::new(150.0, -6.0));
        assert_eq!(backward.target.point, Point::new(50.0, -6.0));
        assert_eq!(forward.source.side, Side::Right);
    }

    #[test]
    fn test_offset_of_coincident_anchors_is_identity() {
        let anchors = Anchors::default();
        assert_eq!(offset_anchors(anchors, 6.0), anchors);
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use policygraph_core::geometry::Size;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..400.0,
            1.0f32..400.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_center(Point::new(x, y), Size::new(w, h)))
    }

    fn any_bounds_strategy() -> impl Strategy<Value = Bounds> {
        let coordinate = prop_oneof![
            -1000.0f32..1000.0,
            Just(0.0f32),
            Just(f32::NAN),
            Just(f32::INFINITY),
        ];
        (coordinate.clone(), coordinate.clone(), coordinate.clone(), coordinate)
            .prop_map(|(x, y, w, h)| Bounds::new_from_center(Point::new(x, y), Size::new(w, h)))
    }

    fn check_anchor_on_boundary(node: Bounds, other: Bounds) {
        let anchor = boundary_anchor(node, other.center());
        if node.center() == other.center() {
            return;
        }

        let p = anchor.point;
        let eps = 1e-2 * (1.0 + node.width().max(node.height()));
        match anchor.side {
            Side::Left => assert!(approx_eq!(f32, p.x(), node.min_x(), epsilon = eps)),
            Side::Right => assert!(approx_eq!(f32, p.x(), node.max_x(), epsilon = eps)),
            Side::Top => assert!(approx_eq!(f32, p.y(), node.min_y(), epsilon = eps)),
            Side::Bottom => assert!(approx_eq!(f32, p.y(), node.max_y(), epsilon = eps)),
        }
        assert!(p.x() >= node.min_x() - eps && p.x() <= node.max_x() + eps);
        assert!(p.y() >= node.min_y() - eps && p.y() <= node.max_y() + eps);
    }

    fn check_anchors_always_finite(a: Bounds, b: Bounds) {
        let anchors = anchor_points(a, b);
        assert!(anchors.source.point.is_finite());
        assert!(anchors.target.point.is_finite());

        let shifted = offset_anchors(anchors, 6.0);
        assert!(shifted.source.point.is_finite());
        assert!(shifted.target.point.is_finite());
    }

    proptest! {
        #[test]
        fn prop_anchor_on_boundary(node in bounds_strategy(), other in bounds_strategy()) {
            check_anchor_on_boundary(node, other);
        }

        #[test]
        fn prop_anchors_always_finite(a in any_bounds_strategy(), b in any_bounds_strategy()) {
            check_anchors_always_finite(a, b);
        }
    }
}
