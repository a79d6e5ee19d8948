use std::path::Path;
use plotters::coord::Shift;
use plotters::prelude::*;
use crate::error::{LayoutError, Result};
use crate::report::Arrangement;

const SIZE: (u32, u32) = (1000, 1000);
const BUILDING_FILL: RGBColor = RGBColor(211, 211, 211);

fn plot_error<E: std::error::Error + Send + Sync>(error: DrawingAreaErrorKind<E>) -> LayoutError
{
    LayoutError::Plot(error.to_string())
}

/// Render one arrangement to an SVG file.
///
/// Shows the enclosing box in red, the buildings numbered from 1, and the
/// paths with their lengths. Both axes share one scale.
pub fn plot_arrangement(arrangement: &Arrangement, path: &Path) -> Result<()>
{
    let root = SVGBackend::new(path, SIZE).into_drawing_area();

    draw_arrangement(&root, arrangement)?;

    root.present().map_err(plot_error)
}

fn draw_arrangement<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, arrangement: &Arrangement) -> Result<()>
    where DB::ErrorType: 'static
{
    root.fill(&WHITE).map_err(plot_error)?;

    let (min_x, min_y, max_x, max_y) = arrangement.bounds();
    let span = (max_x - min_x).max(max_y - min_y) * 1.2;
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(
            format!(
                "Total line length: {:.2} m, Bounding area: {:.2} sq m",
                arrangement.objectives.objective_1, arrangement.objectives.objective_2
            ),
            ("sans-serif", 24),
        )
        .build_cartesian_2d(cx - span / 2.0..cx + span / 2.0, cy - span / 2.0..cy + span / 2.0)
        .map_err(plot_error)?;

    chart
        .draw_series(std::iter::once(Rectangle::new([(min_x, min_y), (max_x, max_y)], RED.stroke_width(2))))
        .map_err(plot_error)?;

    let corners = |location: [f64; 2], dimensions: [f64; 2]| {
        let (hw, hh) = (dimensions[0] / 2.0, dimensions[1] / 2.0);
        [(location[0] - hw, location[1] - hh), (location[0] + hw, location[1] + hh)]
    };

    chart
        .draw_series(arrangement.buildings.iter().map(|b| Rectangle::new(corners(b.location, b.dimensions), BUILDING_FILL.filled())))
        .map_err(plot_error)?;

    chart
        .draw_series(arrangement.buildings.iter().map(|b| Rectangle::new(corners(b.location, b.dimensions), BLACK.stroke_width(1))))
        .map_err(plot_error)?;

    chart
        .draw_series(arrangement.buildings.iter().enumerate().map(|(i, b)| {
            Text::new(format!("{}", i + 1), (b.location[0], b.location[1]), ("sans-serif", 16).into_font())
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(arrangement.paths.iter().map(|p| {
            PathElement::new(vec![(p.start_point[0], p.start_point[1]), (p.end_point[0], p.end_point[1])], &BLUE)
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(arrangement.paths.iter().map(|p| {
            let mid = ((p.start_point[0] + p.end_point[0]) / 2.0, (p.start_point[1] + p.end_point[1]) / 2.0);
            Text::new(format!("{:.2}m", p.length), mid, ("sans-serif", 12).into_font().color(&RED))
        }))
        .map_err(plot_error)?;

    Ok(())
}
