//! Pairwise geometry of axis-aligned rectangles.
//!
//! Every operation works on a [`Rect`] given by its center and half extents.
//! [`might_intersect`] is a cheap bounding-circle test that never rejects a
//! truly overlapping pair, so it can be used to skip [`aabb_overlap`].

use itertools::Itertools;

#[cfg(test)]
mod tests;

/// An axis-aligned rectangle placed at a center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect
{
    pub cx: f64,
    pub cy: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl Rect
{
    pub fn new(cx: f64, cy: f64, half_width: f64, half_height: f64) -> Self
    {
        Rect {
            cx,
            cy,
            half_width,
            half_height,
        }
    }

    /// Radius of the circle through the four corners
    pub fn circumradius(&self) -> f64
    {
        self.half_width.hypot(self.half_height)
    }

    pub fn min_x(&self) -> f64
    {
        self.cx - self.half_width
    }

    pub fn max_x(&self) -> f64
    {
        self.cx + self.half_width
    }

    pub fn min_y(&self) -> f64
    {
        self.cy - self.half_height
    }

    pub fn max_y(&self) -> f64
    {
        self.cy + self.half_height
    }
}

/// Bounding-circle pre-filter.
///
/// Returns true iff the center distance is strictly less than the sum of the
/// circumradii. Over-inclusive: a `false` result guarantees no overlap.
pub fn might_intersect(r1: &Rect, r2: &Rect) -> bool
{
    let distance = (r1.cx - r2.cx).hypot(r1.cy - r2.cy);

    distance < r1.circumradius() + r2.circumradius()
}

/// Exact overlap test. Rectangles that only touch along an edge do not overlap.
pub fn aabb_overlap(r1: &Rect, r2: &Rect) -> bool
{
    (r1.cx - r2.cx).abs() < r1.half_width + r2.half_width
        && (r1.cy - r2.cy).abs() < r1.half_height + r2.half_height
}

/// Gap between two rectangles measured as `max(dx, dy, 0)`.
///
/// `dx` and `dy` are the per-axis gaps (negative when the projections
/// overlap). When both are positive this under-approximates the Euclidean
/// gap `hypot(dx, dy)`. Path-length bounds are expressed against this
/// measure, so it must stay as is.
pub fn closest_distance(r1: &Rect, r2: &Rect) -> f64
{
    let dx = (r1.cx - r2.cx).abs() - (r1.half_width + r2.half_width);
    let dy = (r1.cy - r2.cy).abs() - (r1.half_height + r2.half_height);

    if dx < 0.0 && dy < 0.0
    {
        return 0.0;
    }

    dx.max(dy).max(0.0)
}

/// Closest pair of points between the boundaries of two rectangles, for display.
///
/// The first point lies on `r1`, the second on `r2`. When the boundaries
/// cross, both points are one crossing point. A rectangle nested inside
/// another is measured from its nearest edge to the enclosing edge.
pub fn closest_points(r1: &Rect, r2: &Rect) -> ([f64; 2], [f64; 2])
{
    let separated = r1.max_x() < r2.min_x() || r2.max_x() < r1.min_x()
        || r1.max_y() < r2.min_y() || r2.max_y() < r1.min_y();

    if separated
    {
        let (x1, x2) = closest_on_axis((r1.min_x(), r1.max_x()), (r2.min_x(), r2.max_x()));
        let (y1, y2) = closest_on_axis((r1.min_y(), r1.max_y()), (r2.min_y(), r2.max_y()));

        return ([x1, y1], [x2, y2]);
    }

    if let Some(point) = boundary_crossing(r1, r2)
    {
        return (point, point);
    }

    if contains(r1, r2)
    {
        nested_gap(r1, r2)
    }
    else
    {
        let (outer, inner) = nested_gap(r2, r1);
        (inner, outer)
    }
}

/// A corner of the intersection box lying on both boundaries.
///
/// Each side of the intersection box is `(value, r1 side, r2 side)`.
fn boundary_crossing(r1: &Rect, r2: &Rect) -> Option<[f64; 2]>
{
    let xs = [
        (r1.min_x().max(r2.min_x()), r1.min_x(), r2.min_x()),
        (r1.max_x().min(r2.max_x()), r1.max_x(), r2.max_x()),
    ];
    let ys = [
        (r1.min_y().max(r2.min_y()), r1.min_y(), r2.min_y()),
        (r1.max_y().min(r2.max_y()), r1.max_y(), r2.max_y()),
    ];

    xs.iter()
        .cartesian_product(ys.iter())
        .find(|(x, y)| (x.0 == x.1 || y.0 == y.1) && (x.0 == x.2 || y.0 == y.2))
        .map(|(x, y)| [x.0, y.0])
}

fn contains(outer: &Rect, inner: &Rect) -> bool
{
    outer.min_x() <= inner.min_x() && inner.max_x() <= outer.max_x()
        && outer.min_y() <= inner.min_y() && inner.max_y() <= outer.max_y()
}

/// `(point on outer, point on inner)` across the narrowest margin
fn nested_gap(outer: &Rect, inner: &Rect) -> ([f64; 2], [f64; 2])
{
    let margins = [
        (inner.min_x() - outer.min_x(), [outer.min_x(), inner.cy], [inner.min_x(), inner.cy]),
        (outer.max_x() - inner.max_x(), [outer.max_x(), inner.cy], [inner.max_x(), inner.cy]),
        (inner.min_y() - outer.min_y(), [inner.cx, outer.min_y()], [inner.cx, inner.min_y()]),
        (outer.max_y() - inner.max_y(), [inner.cx, outer.max_y()], [inner.cx, inner.max_y()]),
    ];

    let mut best = margins[0];
    for margin in margins.iter().skip(1)
    {
        if margin.0 < best.0
        {
            best = *margin;
        }
    }

    (best.1, best.2)
}

fn closest_on_axis(a: (f64, f64), b: (f64, f64)) -> (f64, f64)
{
    if a.1 < b.0
    {
        (a.1, b.0)
    }
    else if b.1 < a.0
    {
        (a.0, b.1)
    }
    else
    {
        let mid = (a.0.max(b.0) + a.1.min(b.1)) / 2.0;
        (mid, mid)
    }
}
