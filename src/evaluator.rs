//! Batch evaluation of candidate layouts.
//!
//! [`BatchEvaluator`] is the only contract between an optimizer and the
//! layout problem: a flat batch of candidates goes in, a row-aligned
//! objective matrix and constraint matrix come out.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use dyn_clone::DynClone;
use ndarray::{Array2, ArrayView3, ArrayViewMut2, Axis};
use crate::constraints::fill_constraints;
use crate::decoder::decode;
use crate::error::{LayoutError, Result};
use crate::objectives::{bounding_box_area, path_lengths, AREA, N_OBJECTIVES, PATH_LENGTH};
use crate::problem::{CoordinateBounds, ProblemInstance};

/// A vectorized objective/constraint function over a whole population.
pub trait BatchEvaluator: DynClone + Send + Sync
{
    /// Length of one candidate vector
    fn n_var(&self) -> usize;
    fn n_obj(&self) -> usize;
    fn n_constr(&self) -> usize;
    fn bounds(&self) -> CoordinateBounds;

    /// Evaluate `x`, the concatenation of every candidate vector.
    ///
    /// Row `i` of both output matrices belongs to candidate `i`. Any malformed
    /// candidate fails the whole call.
    fn evaluate_batch(&self, x: &[f64]) -> Result<Evaluation>;
}

dyn_clone::clone_trait_object!(BatchEvaluator);

/// Objective matrix `(B, n_obj)` and constraint matrix `(B, n_constr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation
{
    pub objectives: Array2<f64>,
    pub constraints: Array2<f64>,
}

impl Evaluation
{
    pub fn len(&self) -> usize
    {
        self.objectives.nrows()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Sum of the constraint row of candidate `index`
    pub fn constraint_violation(&self, index: usize) -> f64
    {
        self.constraints.row(index).sum()
    }

    pub fn is_feasible(&self, index: usize) -> bool
    {
        self.constraints.row(index).iter().all(|g| *g == 0.0)
    }
}

/// Receives every evaluation produced by a [`LayoutEvaluator`].
pub trait EvaluationObserver: Send + Sync
{
    fn on_evaluation(&self, evaluation: &Evaluation);
}

/// Keeps the constraint matrices of the most recent evaluations.
pub struct ViolationHistory
{
    capacity: usize,
    history: Mutex<VecDeque<Array2<f64>>>,
}

impl ViolationHistory
{
    pub fn new(capacity: usize) -> Self
    {
        ViolationHistory {
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<Array2<f64>>
    {
        match self.history.lock()
        {
            Ok(history) => history.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl EvaluationObserver for ViolationHistory
{
    fn on_evaluation(&self, evaluation: &Evaluation)
    {
        if self.capacity == 0
        {
            return;
        }

        let mut history = match self.history.lock()
        {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };

        if history.len() == self.capacity
        {
            history.pop_front();
        }

        history.push_back(evaluation.constraints.clone());
    }
}

/// Evaluates rectangle layouts for a fixed [`ProblemInstance`].
///
/// Candidates are split into contiguous chunks, one per worker; each worker
/// writes only its own rows of the output matrices.
#[derive(Clone)]
pub struct LayoutEvaluator
{
    problem: Arc<ProblemInstance>,
    workers: usize,
    prefilter: bool,
    observer: Option<Arc<dyn EvaluationObserver>>,
}

impl LayoutEvaluator
{
    pub fn new(problem: Arc<ProblemInstance>) -> Self
    {
        LayoutEvaluator {
            problem,
            workers: num_cpus::get(),
            prefilter: true,
            observer: None,
        }
    }

    /// Number of worker threads; 1 evaluates on the calling thread
    pub fn with_workers(mut self, workers: usize) -> Self
    {
        self.workers = workers.max(1);
        self
    }

    /// Toggle the bounding-circle pre-filter of the overlap count
    pub fn with_prefilter(mut self, prefilter: bool) -> Self
    {
        self.prefilter = prefilter;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn EvaluationObserver>) -> Self
    {
        self.observer = Some(observer);
        self
    }

    pub fn problem(&self) -> &ProblemInstance
    {
        &self.problem
    }

    fn evaluate_chunk(&self,
                      centers: ArrayView3<'_, f64>,
                      mut objectives: ArrayViewMut2<'_, f64>,
                      mut constraints: ArrayViewMut2<'_, f64>)
    {
        for ((candidate, mut f), g) in centers
            .outer_iter()
            .zip(objectives.outer_iter_mut())
            .zip(constraints.outer_iter_mut())
        {
            let lengths = path_lengths(candidate, &self.problem);

            f[AREA] = bounding_box_area(candidate, &self.problem);
            f[PATH_LENGTH] = lengths.iter().sum();

            fill_constraints(candidate, &self.problem, &lengths, self.prefilter, g);
        }
    }
}

impl BatchEvaluator for LayoutEvaluator
{
    fn n_var(&self) -> usize
    {
        self.problem.n_var()
    }

    fn n_obj(&self) -> usize
    {
        N_OBJECTIVES
    }

    fn n_constr(&self) -> usize
    {
        self.problem.n_constr()
    }

    fn bounds(&self) -> CoordinateBounds
    {
        self.problem.bounds()
    }

    fn evaluate_batch(&self, x: &[f64]) -> Result<Evaluation>
    {
        let centers = decode(x, self.problem.n_rectangles())?;
        let batch = centers.len_of(Axis(0));

        let mut objectives = Array2::zeros((batch, N_OBJECTIVES));
        let mut constraints = Array2::zeros((batch, self.problem.n_constr()));

        if self.workers == 1 || batch < 2 * self.workers
        {
            self.evaluate_chunk(centers, objectives.view_mut(), constraints.view_mut());
        }
        else
        {
            let chunk = (batch + self.workers - 1) / self.workers;

            crossbeam::scope(|scope| {
                for ((c, f), g) in centers
                    .axis_chunks_iter(Axis(0), chunk)
                    .zip(objectives.axis_chunks_iter_mut(Axis(0), chunk))
                    .zip(constraints.axis_chunks_iter_mut(Axis(0), chunk))
                {
                    scope.spawn(move |_| self.evaluate_chunk(c, f, g));
                }
            }).map_err(|_| LayoutError::Numeric("evaluation worker panicked".to_string()))?;
        }

        check_finite(&objectives, "objective")?;
        check_finite(&constraints, "constraint")?;

        let evaluation = Evaluation {
            objectives,
            constraints,
        };

        if let Some(observer) = &self.observer
        {
            observer.on_evaluation(&evaluation);
        }

        Ok(evaluation)
    }
}

fn check_finite(values: &Array2<f64>, kind: &str) -> Result<()>
{
    match values.indexed_iter().find(|(_, v)| !v.is_finite())
    {
        None => Ok(()),
        Some(((row, col), v)) => Err(LayoutError::Numeric(format!(
            "{} {} of candidate {} is {}", kind, col, row, v
        ))),
    }
}

#[cfg(test)]
mod tests
{
    use ndarray::array;
    use super::*;
    use crate::problem::{Connection, Rectangle};

    fn problem() -> Arc<ProblemInstance>
    {
        Arc::new(ProblemInstance::new(
            vec![Rectangle::new("a", 4.0, 4.0), Rectangle::new("b", 2.0, 2.0)],
            vec![Connection::new("a-b", 0, 1, 5.0, 9.0)],
        ).unwrap())
    }

    #[test]
    fn parallel_matches_sequential()
    {
        let x = (0..64 * 4)
            .map(|i| ((i * 37) % 23) as f64 - 11.0)
            .collect::<Vec<_>>();

        let sequential = LayoutEvaluator::new(problem()).with_workers(1).evaluate_batch(&x).unwrap();
        let parallel = LayoutEvaluator::new(problem()).with_workers(4).evaluate_batch(&x).unwrap();

        assert_eq!(sequential.len(), 64);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn feasibility_helpers()
    {
        let x = vec![0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let evaluation = LayoutEvaluator::new(problem()).evaluate_batch(&x).unwrap();

        // second candidate overlaps and its gap of 0 is below the minimum of 5
        assert_eq!(evaluation.constraints, array![[0.0, 0.0], [1.0, 1.0]]);
        assert!(evaluation.is_feasible(0));
        assert!(!evaluation.is_feasible(1));
        assert_eq!(evaluation.constraint_violation(1), 2.0);
    }

    #[test]
    fn overflow_is_a_numeric_error()
    {
        let x = vec![-1e308, 0.0, 1e308, 0.0];
        let result = LayoutEvaluator::new(problem()).evaluate_batch(&x);

        assert!(matches!(result, Err(LayoutError::Numeric(_))));
    }

    #[test]
    fn history_keeps_only_recent_evaluations()
    {
        let history = Arc::new(ViolationHistory::new(2));
        let evaluator = LayoutEvaluator::new(problem()).with_observer(history.clone());

        for offset in [10.0, 20.0, 30.0]
        {
            evaluator.evaluate_batch(&[0.0, 0.0, offset, 0.0]).unwrap();
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 2);
        // gaps 17 and 27 both exceed the upper bound of 9
        assert_eq!(snapshot[0], array![[0.0, 1.0]]);
        assert_eq!(snapshot[1], array![[0.0, 1.0]]);
    }
}
