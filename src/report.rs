//! Derived views of optimization results for reporting and plotting.
//!
//! [`OptimizationResults`] is the raw optimizer output (decision vectors,
//! objectives, constraints). [`Arrangement`] turns one decision vector into
//! named buildings and paths with their display geometry.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use markdown_table::MarkdownTable;
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use crate::decoder::{centers, decode};
use crate::error::{LayoutError, Result};
use crate::geometry::closest_points;
use crate::objectives::{AREA, PATH_LENGTH};
use crate::problem::ProblemInstance;
use crate::solution::LayoutSolution;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResults
{
    #[serde(rename = "X")]
    pub x: Vec<Vec<f64>>,
    #[serde(rename = "F")]
    pub f: Vec<Vec<f64>>,
    #[serde(rename = "G")]
    pub g: Vec<Vec<f64>>,
    /// Summed constraint violation per solution
    #[serde(rename = "CV")]
    pub cv: Vec<f64>,
    pub algorithm_name: String,
}

impl OptimizationResults
{
    pub fn from_solutions(algorithm_name: &str, solutions: &[(Vec<f64>, LayoutSolution)]) -> Self
    {
        OptimizationResults {
            x: solutions.iter().map(|(_, s)| s.x.clone()).collect(),
            f: solutions.iter().map(|(f, _)| f.clone()).collect(),
            g: solutions.iter().map(|(_, s)| s.g.clone()).collect(),
            cv: solutions.iter().map(|(_, s)| s.constraint_violation()).collect(),
            algorithm_name: algorithm_name.to_string(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()>
    {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self>
    {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBuilding
{
    pub name: String,
    /// Center
    pub location: [f64; 2],
    pub dimensions: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport
{
    pub name: String,
    /// Euclidean length between the closest boundary points
    pub length: f64,
    pub connected_buildings: [String; 2],
    pub start_point: [f64; 2],
    pub end_point: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementObjectives
{
    /// Total path length
    pub objective_1: f64,
    /// Bounding-box area
    pub objective_2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement
{
    pub arrangement_id: usize,
    pub buildings: Vec<PlacedBuilding>,
    pub paths: Vec<PathReport>,
    pub total_area: f64,
    pub objectives: ArrangementObjectives,
    pub ranking: usize,
}

impl Arrangement
{
    /// `(min_x, min_y, max_x, max_y)` over all buildings
    pub fn bounds(&self) -> (f64, f64, f64, f64)
    {
        self.buildings.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), b| {
                let (hw, hh) = (b.dimensions[0] / 2.0, b.dimensions[1] / 2.0);
                (
                    min_x.min(b.location[0] - hw),
                    min_y.min(b.location[1] - hh),
                    max_x.max(b.location[0] + hw),
                    max_y.max(b.location[1] + hh),
                )
            },
        )
    }
}

/// Build one arrangement per solution, ranked in result order
pub fn build_arrangements(problem: &ProblemInstance, results: &OptimizationResults) -> Result<Vec<Arrangement>>
{
    let mut arrangements = Vec::with_capacity(results.x.len());

    for (i, (x, f)) in results.x.iter().zip(&results.f).enumerate()
    {
        if f.len() <= PATH_LENGTH
        {
            return Err(LayoutError::Shape(format!(
                "solution {} has {} objective values, expected {}", i, f.len(), PATH_LENGTH + 1
            )));
        }

        let decoded = decode(x, problem.n_rectangles())?;
        if decoded.len_of(Axis(0)) != 1
        {
            return Err(LayoutError::Shape(format!(
                "solution {} has {} values, expected {}", i, x.len(), problem.n_var()
            )));
        }

        let centers = centers(decoded.index_axis(Axis(0), 0));

        let buildings = problem
            .rectangles()
            .iter()
            .zip(&centers)
            .map(|(rectangle, center)| PlacedBuilding {
                name: rectangle.name.clone(),
                location: *center,
                dimensions: [rectangle.width(), rectangle.height()],
            })
            .collect();

        let paths = problem
            .connections()
            .iter()
            .map(|connection| {
                let (start_point, end_point) = closest_points(
                    &problem.rect(connection.from, centers[connection.from]),
                    &problem.rect(connection.to, centers[connection.to]),
                );

                PathReport {
                    name: connection.name.clone(),
                    length: (start_point[0] - end_point[0]).hypot(start_point[1] - end_point[1]),
                    connected_buildings: [
                        problem.rectangles()[connection.from].name.clone(),
                        problem.rectangles()[connection.to].name.clone(),
                    ],
                    start_point,
                    end_point,
                }
            })
            .collect();

        arrangements.push(Arrangement {
            arrangement_id: i + 1,
            buildings,
            paths,
            total_area: f[AREA],
            objectives: ArrangementObjectives {
                objective_1: f[PATH_LENGTH],
                objective_2: f[AREA],
            },
            ranking: i + 1,
        });
    }

    Ok(arrangements)
}

pub fn save_arrangements(arrangements: &[Arrangement], path: &Path) -> Result<()>
{
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), arrangements)?;
    Ok(())
}

/// Markdown table with one line per arrangement
pub fn summary_table(arrangements: &[Arrangement]) -> String
{
    let mut table_lines = vec![vec![
        "Arrangement".to_string(),
        "Path length".to_string(),
        "Bounding area".to_string(),
        "Paths".to_string(),
    ]];

    for arrangement in arrangements
    {
        table_lines.push(vec![
            arrangement.arrangement_id.to_string(),
            format!("{:.2}", arrangement.objectives.objective_1),
            format!("{:.2}", arrangement.objectives.objective_2),
            arrangement.paths.len().to_string(),
        ]);
    }

    MarkdownTable::new(table_lines).to_string()
}
