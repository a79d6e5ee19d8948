use ndarray::{ArrayView2, ArrayView3};
use crate::error::{LayoutError, Result};

/// Reshape a flat batch of candidates into `(candidates, rectangles, 2)`.
///
/// The vector holds `x0, y0, x1, y1, ...` for every candidate back to back.
/// Fails if the length is not a multiple of `2 * n_rectangles` or if any
/// coordinate is not finite. No data is copied.
pub fn decode(x: &[f64], n_rectangles: usize) -> Result<ArrayView3<'_, f64>>
{
    if n_rectangles == 0
    {
        return Err(LayoutError::Shape("rectangle count must be positive".to_string()));
    }

    let candidate_len = 2 * n_rectangles;
    if x.len() % candidate_len != 0
    {
        return Err(LayoutError::Shape(format!(
            "vector of length {} is not a multiple of {} (2 x {} rectangles)",
            x.len(), candidate_len, n_rectangles
        )));
    }

    if let Some(position) = x.iter().position(|v| !v.is_finite())
    {
        return Err(LayoutError::Shape(format!(
            "non-finite coordinate {} in candidate {}", x[position], position / candidate_len
        )));
    }

    let batch = x.len() / candidate_len;

    ArrayView3::from_shape((batch, n_rectangles, 2), x)
        .map_err(|e| LayoutError::Shape(e.to_string()))
}

/// Collect the centers of one decoded candidate
pub fn centers(candidate: ArrayView2<'_, f64>) -> Vec<[f64; 2]>
{
    candidate
        .outer_iter()
        .map(|c| [c[0], c[1]])
        .collect()
}
