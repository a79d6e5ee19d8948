/// Evaluate the termination condition
pub trait Termination
{
    /// Returns true if an optimization process can be stopped.
    ///
    /// `values` holds the objective values of the current population.
    fn can_terminate(&mut self, iter: usize, values: &[Vec<f64>]) -> bool;
}

/// Stops once `iter` reaches the given number of generations.
pub struct MaxGenerations(pub usize);

impl Termination for MaxGenerations
{
    fn can_terminate(&mut self, iter: usize, _values: &[Vec<f64>]) -> bool
    {
        iter >= self.0
    }
}

/// Stops when no objective improved for `terminate_early_count` generations,
/// or after `max_generations`, whichever comes first.
pub struct NoImprovementTermination
{
    best_values: Option<Vec<f64>>,
    no_improvements_count: usize,
    terminate_early_count: usize,
    max_generations: usize,
}

impl NoImprovementTermination
{
    pub fn new(terminate_early_count: usize, max_generations: usize) -> Self
    {
        NoImprovementTermination {
            best_values: None,
            no_improvements_count: 0,
            terminate_early_count,
            max_generations,
        }
    }
}

impl Termination for NoImprovementTermination
{
    fn can_terminate(&mut self, iter: usize, objectives_values: &[Vec<f64>]) -> bool
    {
        if iter >= self.max_generations
        {
            return true;
        }

        let n_obj = objectives_values.iter().map(|values| values.len()).max().unwrap_or(0);
        let best_values = self.best_values.get_or_insert_with(Vec::new);
        if best_values.len() < n_obj
        {
            best_values.resize(n_obj, f64::MAX);
        }

        let mut has_better = false;
        for values in objectives_values.iter()
        {
            for (index, value) in values.iter().enumerate()
            {
                if *value < best_values[index]
                {
                    has_better = true;
                    best_values[index] = *value;
                }
            }
        }

        if has_better
        {
            self.no_improvements_count = 0;
            false
        }
        else
        {
            self.no_improvements_count += 1;
            self.no_improvements_count >= self.terminate_early_count
        }
    }
}
