//! JSON configuration of a layout problem and its optimizer settings.
//!
//! ```json
//! {
//!   "buildings": [ { "name": "A", "dimensions": [40.0, 20.0] } ],
//!   "paths": [ { "name": "A-B", "between": ["A", "B"], "min_length": 5.0, "max_length": 50.0 } ],
//!   "optimizer": { "population_size": 200, "generations": 200 }
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{LayoutError, Result};
use crate::problem::{Connection, CoordinateBounds, ProblemInstance, Rectangle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingConfig
{
    pub name: String,
    /// Full width and height
    pub dimensions: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig
{
    pub name: String,
    pub between: [String; 2],
    pub min_length: f64,
    pub max_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings
{
    pub population_size: usize,
    pub generations: usize,
    pub seed: Option<u64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Stop early after this many generations without improvement
    pub stall_generations: Option<usize>,
    /// Evaluation threads, defaults to the number of CPUs
    pub workers: Option<usize>,
}

impl Default for OptimizerSettings
{
    fn default() -> Self
    {
        let bounds = CoordinateBounds::default();

        OptimizerSettings {
            population_size: 200,
            generations: 200,
            seed: None,
            lower_bound: bounds.lower,
            upper_bound: bounds.upper,
            stall_generations: None,
            workers: None,
        }
    }
}

impl OptimizerSettings
{
    pub fn bounds(&self) -> Result<CoordinateBounds>
    {
        CoordinateBounds::new(self.lower_bound, self.upper_bound)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig
{
    pub buildings: Vec<BuildingConfig>,
    #[serde(default)]
    pub paths: Vec<PathConfig>,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

impl LayoutConfig
{
    pub fn from_json(json: &str) -> Result<Self>
    {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve building names to indices and build the problem instance.
    ///
    /// Fails on unknown or duplicate names and on non-positive dimensions
    /// or length bounds.
    pub fn to_problem(&self) -> Result<ProblemInstance>
    {
        let mut indices = HashMap::with_capacity(self.buildings.len());
        let mut rectangles = Vec::with_capacity(self.buildings.len());

        for (index, building) in self.buildings.iter().enumerate()
        {
            if indices.insert(building.name.as_str(), index).is_some()
            {
                return Err(LayoutError::Config(format!("duplicate building name '{}'", building.name)));
            }

            rectangles.push(Rectangle::new(building.name.clone(), building.dimensions[0], building.dimensions[1]));
        }

        let resolve = |path: &PathConfig, name: &str| {
            indices.get(name).copied().ok_or_else(|| LayoutError::Config(format!(
                "path '{}' references unknown building '{}'", path.name, name
            )))
        };

        let mut connections = Vec::with_capacity(self.paths.len());
        for path in self.paths.iter()
        {
            let positive = |v: f64| v.is_finite() && v > 0.0;
            if !positive(path.min_length) || !positive(path.max_length)
            {
                return Err(LayoutError::Config(format!(
                    "path '{}' must have positive length bounds, got [{}, {}]",
                    path.name, path.min_length, path.max_length
                )));
            }

            connections.push(Connection::new(
                path.name.clone(),
                resolve(path, &path.between[0])?,
                resolve(path, &path.between[1])?,
                path.min_length,
                path.max_length,
            ));
        }

        Ok(ProblemInstance::new(rectangles, connections)?.with_bounds(self.optimizer.bounds()?))
    }
}

pub fn load_config(path: &Path) -> Result<LayoutConfig>
{
    let reader = BufReader::new(File::open(path)?);

    Ok(serde_json::from_reader(reader)?)
}
