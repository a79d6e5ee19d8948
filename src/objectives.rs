//! Objective values of a single candidate layout.
//!
//! Both objectives are minimized and reported raw, without weighting.

use ndarray::ArrayView2;
use crate::geometry::closest_distance;
use crate::problem::ProblemInstance;

/// Number of objectives produced per candidate
pub const N_OBJECTIVES: usize = 2;

/// Index of the bounding-box area in an objective row
pub const AREA: usize = 0;

/// Index of the total path length in an objective row
pub const PATH_LENGTH: usize = 1;

/// Axis-aligned box enclosing every rectangle of a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox
{
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox
{
    pub fn width(&self) -> f64
    {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64
    {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64
    {
        self.width() * self.height()
    }
}

/// Enclosing box of the rectangles of `candidate` (one `[x, y]` row per rectangle)
pub fn bounding_box(candidate: ArrayView2<'_, f64>, problem: &ProblemInstance) -> BoundingBox
{
    let mut bbox = BoundingBox {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    for (center, rectangle) in candidate.outer_iter().zip(problem.rectangles())
    {
        bbox.min_x = bbox.min_x.min(center[0] - rectangle.half_width);
        bbox.max_x = bbox.max_x.max(center[0] + rectangle.half_width);
        bbox.min_y = bbox.min_y.min(center[1] - rectangle.half_height);
        bbox.max_y = bbox.max_y.max(center[1] + rectangle.half_height);
    }

    bbox
}

pub fn bounding_box_area(candidate: ArrayView2<'_, f64>, problem: &ProblemInstance) -> f64
{
    bounding_box(candidate, problem).area()
}

/// Closest distance of every connection, in connection order
pub fn path_lengths(candidate: ArrayView2<'_, f64>, problem: &ProblemInstance) -> Vec<f64>
{
    problem
        .connections()
        .iter()
        .map(|connection| {
            let r1 = problem.rect(connection.from, [candidate[[connection.from, 0]], candidate[[connection.from, 1]]]);
            let r2 = problem.rect(connection.to, [candidate[[connection.to, 0]], candidate[[connection.to, 1]]]);

            closest_distance(&r1, &r2)
        })
        .collect()
}
