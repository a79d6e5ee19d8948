use crate::termination::Termination;
use crate::{Result, Solution, SolutionsRuntimeProcessor};

pub mod nsga2;

pub trait Optimizer<S: Solution>
{
    fn name(&self) -> &str;
    fn optimize(&mut self, termination: &mut dyn Termination,
                runtime_solutions_processor: &mut dyn SolutionsRuntimeProcessor<S>) -> Result<()>;
    /// First front of the last ranked population with its objective values
    fn best_solutions(&self) -> Vec<(Vec<f64>, S)>;
}
