//! Geometric primitives for node placement and edge routing.
//!
//! This module provides the small set of geometric types the graph engine
//! needs to describe where nodes sit on the canvas and where edges attach.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate (also used as a 2D vector)
//! - [`Size`] - Width and height of a node
//! - [`Bounds`] - An axis-aligned rectangle defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Coordinates follow the SVG / screen convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! A positive `y` delta therefore points *down* the canvas, which is why an
//! edge leaving a node toward a target below it attaches to the node's
//! bottom side.

/// A 2D point in canvas coordinate space.
///
/// Points double as 2D vectors for the handful of vector operations edge
/// routing needs (difference, scaling, normalization).
///
/// # Examples
///
/// ```
/// # use policygraph_core::geometry::Point;
/// let a = Point::new(10.0, 20.0);
/// let b = Point::new(40.0, 60.0);
///
/// let delta = b.sub_point(a);
/// assert_eq!(delta.hypot(), 50.0);
/// assert_eq!(a.midpoint(b), Point::new(25.0, 40.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// True for the origin.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Returns true if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise sum.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean length of the vector)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        other.sub_point(self).hypot()
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Returns the unit vector pointing in the same direction.
    ///
    /// Returns `None` for the zero vector (or a vector whose length is not
    /// finite), since it has no direction.
    pub fn normalize(self) -> Option<Self> {
        let length = self.hypot();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / length))
    }

    /// Returns the vector rotated by 90 degrees clockwise on screen.
    ///
    /// With y pointing down, `(1, 0)` maps to `(0, 1)`.
    ///
    /// ```
    /// # use policygraph_core::geometry::Point;
    /// assert_eq!(Point::new(1.0, 0.0).perpendicular(), Point::new(0.0, 1.0));
    /// assert_eq!(Point::new(0.0, 1.0).perpendicular(), Point::new(-1.0, 0.0));
    /// ```
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

/// Width and height of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size from width and height
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle with minimum and maximum coordinates.
///
/// Nodes on the canvas are described by their bounds; the edge geometry
/// resolver works from the center and half-extents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Bounds of a node given by its center, the form the anchor math uses.
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Bounds of a node given by its top-left corner, the form renderers
    /// store placements in.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns true if the rectangle has no usable area.
    ///
    /// A rectangle with a zero (or negative) width or height, or any
    /// non-finite coordinate, cannot have a ray projected onto its boundary.
    pub fn is_degenerate(self) -> bool {
        let finite = self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite();
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest bounds covering both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use policygraph_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let b = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = a.merge(&b);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows the bounds outward by `insets`.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }
}

/// Represents spacing around an element with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Insets in CSS order: top, right, bottom, left.
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_accessors() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
        assert!(Point::default().is_zero());
    }

    #[test]
    fn test_point_arithmetic() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);

        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
        assert_eq!(p1.scale(2.0), Point::new(10.0, 16.0));
        assert_eq!(Point::new(-2.5, 3.0).abs(), Point::new(2.5, 3.0));
    }

    #[test]
    fn test_point_distance() {
        let origin = Point::new(0.0, 0.0);
        let p = Point::new(3.0, 4.0);
        assert_eq!(origin.distance(p), 5.0);
        assert_eq!(p.hypot(), 5.0);
    }

    #[test]
    fn test_point_normalize() {
        let unit = Point::new(3.0, 4.0).normalize().unwrap();
        assert_approx_eq!(f32, unit.x(), 0.6);
        assert_approx_eq!(f32, unit.y(), 0.8);

        assert!(Point::default().normalize().is_none());
        assert!(Point::new(f32::INFINITY, 0.0).normalize().is_none());
    }

    #[test]
    fn test_point_perpendicular_is_orthogonal() {
        let v = Point::new(7.0, -2.0);
        let n = v.perpendicular();
        assert_approx_eq!(f32, v.x() * n.x() + v.y() * n.y(), 0.0);
        assert_approx_eq!(f32, v.hypot(), n.hypot());
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_bounds_new_from_center() {
        let center = Point::new(50.0, 60.0);
        let bounds = Bounds::new_from_center(center, Size::new(20.0, 30.0));

        assert_eq!(bounds.min_x(), 40.0);
        assert_eq!(bounds.min_y(), 45.0);
        assert_eq!(bounds.max_x(), 60.0);
        assert_eq!(bounds.max_y(), 75.0);
        assert_eq!(bounds.center(), center);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 30.0);
    }

    #[test]
    fn test_bounds_new_from_top_left() {
        let top_left = Point::new(10.0, 20.0);
        let bounds = Bounds::new_from_top_left(top_left, Size::new(30.0, 40.0));

        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_bounds_is_degenerate() {
        let at_origin = |width, height| Bounds::new_from_center(Point::default(), Size::new(width, height));
        assert!(!at_origin(10.0, 10.0).is_degenerate());
        assert!(at_origin(0.0, 10.0).is_degenerate());
        assert!(at_origin(10.0, 0.0).is_degenerate());
        assert!(at_origin(-4.0, 10.0).is_degenerate());
        assert!(Bounds::new_from_center(Point::new(f32::NAN, 0.0), Size::new(10.0, 10.0)).is_degenerate());
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::new_from_top_left(Point::new(1.0, 2.0), Size::new(4.0, 4.0));
        let b = Bounds::new_from_top_left(Point::new(3.0, 0.0), Size::new(5.0, 4.0));

        let merged = a.merge(&b);
        assert_eq!(merged.min_x(), 1.0);
        assert_eq!(merged.min_y(), 0.0);
        assert_eq!(merged.max_x(), 8.0);
        assert_eq!(merged.max_y(), 6.0);
    }

    #[test]
    fn test_bounds_add_padding() {
        let bounds = Bounds::new_from_top_left(Point::new(2.0, 3.0), Size::new(4.0, 5.0));
        let padded = bounds.add_padding(Insets::new(1.0, 2.0, 3.0, 4.0));

        assert_eq!(padded.min_x(), -2.0);
        assert_eq!(padded.min_y(), 2.0);
        assert_eq!(padded.max_x(), 8.0);
        assert_eq!(padded.max_y(), 11.0);
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (point_strategy(), 1.0f32..500.0, 1.0f32..500.0)
            .prop_map(|(center, w, h)| Bounds::new_from_center(center, Size::new(w, h)))
    }

    /// A normalized non-zero vector has unit length.
    fn check_normalize_has_unit_length(p: Point) -> Result<(), TestCaseError> {
        if let Some(unit) = p.normalize() {
            prop_assert!(approx_eq!(f32, unit.hypot(), 1.0, epsilon = 1e-4));
        } else {
            prop_assert!(p.is_zero());
        }
        Ok(())
    }

    /// Merged bounds contain both inputs.
    fn check_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        for b in [b1, b2] {
            prop_assert!(merged.min_x() <= b.min_x() && merged.min_y() <= b.min_y());
            prop_assert!(merged.max_x() >= b.max_x() && merged.max_y() >= b.max_y());
        }
        Ok(())
    }

    /// Center construction round-trips through `center()`, `width()`, and `height()`.
    fn check_center_roundtrip(b: Bounds) -> Result<(), TestCaseError> {
        let rebuilt = Bounds::new_from_center(b.center(), Size::new(b.width(), b.height()));
        prop_assert!(approx_eq!(f32, rebuilt.min_x(), b.min_x(), epsilon = 1e-3));
        prop_assert!(approx_eq!(f32, rebuilt.min_y(), b.min_y(), epsilon = 1e-3));
        prop_assert!(approx_eq!(f32, rebuilt.max_x(), b.max_x(), epsilon = 1e-3));
        prop_assert!(approx_eq!(f32, rebuilt.max_y(), b.max_y(), epsilon = 1e-3));
        Ok(())
    }

    proptest! {
        #[test]
        fn normalize_has_unit_length(p in point_strategy()) {
            check_normalize_has_unit_length(p)?;
        }

        #[test]
        fn merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn center_roundtrip(b in bounds_strategy()) {
            check_center_roundtrip(b)?;
        }
    }
}
