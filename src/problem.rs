use serde::{Deserialize, Serialize};
use crate::error::{LayoutError, Result};
use crate::geometry::Rect;

/// A building footprint with fixed dimensions.
///
/// Only the half extents are kept, the center varies per candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle
{
    pub name: String,
    pub half_width: f64,
    pub half_height: f64,
}

impl Rectangle
{
    /// Create a rectangle from its full width and height
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self
    {
        Rectangle {
            name: name.into(),
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn width(&self) -> f64
    {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f64
    {
        self.half_height * 2.0
    }

    /// Place the rectangle at the given center
    pub fn at(&self, center: [f64; 2]) -> Rect
    {
        Rect::new(center[0], center[1], self.half_width, self.half_height)
    }
}

/// A path between two rectangles with an allowed length range.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection
{
    pub name: String,
    pub from: usize,
    pub to: usize,
    pub min_length: f64,
    pub max_length: f64,
}

impl Connection
{
    pub fn new(name: impl Into<String>, from: usize, to: usize, min_length: f64, max_length: f64) -> Self
    {
        Connection {
            name: name.into(),
            from,
            to,
            min_length,
            max_length,
        }
    }

    /// True when `length` falls outside `[min_length, max_length]`
    pub fn is_violated(&self, length: f64) -> bool
    {
        length < self.min_length || length > self.max_length
    }
}

/// Search-space box applied to every center coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateBounds
{
    pub lower: f64,
    pub upper: f64,
}

impl CoordinateBounds
{
    pub fn new(lower: f64, upper: f64) -> Result<Self>
    {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper
        {
            return Err(LayoutError::Config(format!(
                "coordinate bounds must be finite with lower < upper, got [{}, {}]", lower, upper
            )));
        }

        Ok(CoordinateBounds { lower, upper })
    }

    pub fn range(&self) -> f64
    {
        self.upper - self.lower
    }

    pub fn clamp(&self, value: f64) -> f64
    {
        value.clamp(self.lower, self.upper)
    }
}

impl Default for CoordinateBounds
{
    fn default() -> Self
    {
        CoordinateBounds {
            lower: -10000.0,
            upper: 10000.0,
        }
    }
}

/// The fixed part of an optimization run: rectangles, connections and bounds.
///
/// Built once before optimization and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance
{
    rectangles: Vec<Rectangle>,
    connections: Vec<Connection>,
    bounds: CoordinateBounds,
}

impl ProblemInstance
{
    /// Validate and build a problem instance with default coordinate bounds.
    ///
    /// Duplicate connections and unconnected rectangles are accepted.
    pub fn new(rectangles: Vec<Rectangle>, connections: Vec<Connection>) -> Result<Self>
    {
        if rectangles.is_empty()
        {
            return Err(LayoutError::Config("at least one rectangle is required".to_string()));
        }

        for rectangle in rectangles.iter()
        {
            let valid = |v: f64| v.is_finite() && v > 0.0;

            if !valid(rectangle.half_width) || !valid(rectangle.half_height)
            {
                return Err(LayoutError::Config(format!(
                    "rectangle '{}' must have positive finite dimensions, got {}x{}",
                    rectangle.name,
                    rectangle.width(),
                    rectangle.height()
                )));
            }
        }

        let n = rectangles.len();
        for connection in connections.iter()
        {
            if connection.from >= n || connection.to >= n
            {
                return Err(LayoutError::Config(format!(
                    "connection '{}' references rectangle index out of range [0, {})", connection.name, n
                )));
            }

            if connection.from == connection.to
            {
                return Err(LayoutError::Config(format!(
                    "connection '{}' connects rectangle {} to itself", connection.name, connection.from
                )));
            }

            if !connection.min_length.is_finite()
                || !connection.max_length.is_finite()
                || connection.min_length < 0.0
                || connection.min_length > connection.max_length
            {
                return Err(LayoutError::Config(format!(
                    "connection '{}' has invalid length bounds [{}, {}]",
                    connection.name, connection.min_length, connection.max_length
                )));
            }
        }

        Ok(ProblemInstance {
            rectangles,
            connections,
            bounds: CoordinateBounds::default(),
        })
    }

    pub fn with_bounds(mut self, bounds: CoordinateBounds) -> Self
    {
        self.bounds = bounds;
        self
    }

    pub fn rectangles(&self) -> &[Rectangle]
    {
        &self.rectangles
    }

    pub fn connections(&self) -> &[Connection]
    {
        &self.connections
    }

    pub fn bounds(&self) -> CoordinateBounds
    {
        self.bounds
    }

    pub fn n_rectangles(&self) -> usize
    {
        self.rectangles.len()
    }

    /// Length of one candidate vector: two coordinates per rectangle
    pub fn n_var(&self) -> usize
    {
        self.rectangles.len() * 2
    }

    /// Overlap count plus one indicator per connection
    pub fn n_constr(&self) -> usize
    {
        1 + self.connections.len()
    }

    /// Rectangle `index` placed at `center`
    pub fn rect(&self, index: usize, center: [f64; 2]) -> Rect
    {
        self.rectangles[index].at(center)
    }
}
