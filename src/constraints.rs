//! Constraint vector of a single candidate layout.
//!
//! Entry 0 counts overlapping rectangle pairs, entries `1..=K` flag the
//! connections whose length falls outside their bounds. Zero means satisfied.

use itertools::Itertools;
use ndarray::{ArrayView2, ArrayViewMut1};
use crate::geometry::{aabb_overlap, might_intersect};
use crate::problem::ProblemInstance;

/// Index of the overlap count in a constraint row
pub const OVERLAP: usize = 0;

/// Count unordered pairs of overlapping rectangles.
///
/// With `prefilter` the bounding-circle test skips pairs that cannot overlap;
/// the count is the same either way.
pub fn overlap_count(candidate: ArrayView2<'_, f64>, problem: &ProblemInstance, prefilter: bool) -> usize
{
    let rects = candidate
        .outer_iter()
        .enumerate()
        .map(|(i, center)| problem.rect(i, [center[0], center[1]]))
        .collect::<Vec<_>>();

    rects
        .iter()
        .tuple_combinations()
        .filter(|(r1, r2)| !prefilter || might_intersect(r1, r2))
        .filter(|(r1, r2)| aabb_overlap(r1, r2))
        .count()
}

/// Write one 0/1 indicator per connection into `out`
pub fn path_violations(lengths: &[f64], problem: &ProblemInstance, mut out: ArrayViewMut1<'_, f64>)
{
    for ((slot, length), connection) in out.iter_mut().zip(lengths).zip(problem.connections())
    {
        *slot = if connection.is_violated(*length) { 1.0 } else { 0.0 };
    }
}

/// Fill a full constraint row of length `1 + K`
pub fn fill_constraints(candidate: ArrayView2<'_, f64>,
                        problem: &ProblemInstance,
                        lengths: &[f64],
                        prefilter: bool,
                        mut row: ArrayViewMut1<'_, f64>)
{
    row[OVERLAP] = overlap_count(candidate, problem, prefilter) as f64;

    path_violations(lengths, problem, row.slice_mut(ndarray::s![1..]));
}
