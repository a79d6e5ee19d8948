//! Multi-objective layout optimization of rectangular building footprints.
//!
//! A candidate layout places every rectangle of a [`problem::ProblemInstance`]
//! at a center point. Layouts are scored on two minimized objectives, the
//! area of the enclosing box and the total length of the connecting paths,
//! and constrained by rectangle overlaps and per-path length bounds.
//!
//! [`evaluator::BatchEvaluator`] scores a whole population per call and is
//! all an optimizer needs to know about the problem. The crate ships a
//! constrained NSGA-II ([`optimizers::nsga2::NSGA2Optimizer`]) driving it.

pub mod config;
pub mod constraints;
pub mod decoder;
mod ens_nondominating_sorting;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod objectives;
pub mod optimizers;
pub mod plot;
pub mod problem;
pub mod report;
pub mod solution;
pub mod termination;
#[cfg(test)]
mod tests;

use std::fmt::Debug;
use rand::{Rng, RngCore};

pub use error::{LayoutError, Result};

/// A simple ratio type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio(pub u32, pub u32);

/// Solution represents a candidate solution.
pub trait Solution: Debug + Clone {
    /// Perform a crossover operation with another solution candidate
    fn crossover<R: Rng + ?Sized>(&mut self, rng: &mut R, other: &mut Self);

    /// Mutate a solution candidate
    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R);
}

/// An optimization objective trait
pub trait Objective<S: Solution> {
    /// An objective fitness function.
    ///
    /// Given a solution, it should return its fitness score.
    /// The optimizer always finds a minimum, so if your case requires finding the
    /// maximum instead, simply multiply the value by -1 before returning.
    fn value(&self, sol: &S) -> f64;

    /// A function used for early termination, when applicable.
    ///
    /// When in a particular objective the target value is known,
    /// the optimization process can be made significantly faster
    /// by not having to compute all the iteration steps:
    /// ```ignore
    /// fn good_enough(&self, val: f64) -> bool {
    ///    val <= self.toleration
    /// }
    /// ```
    fn good_enough(&self, _val: f64) -> bool {
        false
    }
}

/// An optimization constraint.
///
/// A solution is feasible when every constraint reports zero violation.
/// Infeasible solutions are ranked by their summed violation.
pub trait Constraint<S: Solution> {
    /// Non-negative violation magnitude, 0 when satisfied
    fn violation(&self, sol: &S) -> f64;
}

/// A trait to implement a set of meta-parameters for the optimization
pub trait Meta<'a, S: Solution> {
    /// Return a population size.
    /// This is used by an optimizer for a pool of solution candidates
    fn population_size(&self) -> usize {
        20
    }

    /// A ratio to determine how often to perform a crossover operation
    fn crossover_odds(&self) -> Ratio;

    /// A ratio to determine how often to perform a mutation operation
    fn mutation_odds(&self) -> Ratio;

    /// Return a random solution
    fn random_solution(&mut self, rng: &mut dyn RngCore) -> S;

    /// Return a list of objectives to use in optimization.
    /// Cannot be empty
    fn objectives(&self) -> &[Box<dyn Objective<S> + 'a>];

    /// Return an optional list of optimization constraints
    fn constraints(&self) -> &[Box<dyn Constraint<S> + 'a>];
}

/// Hooks called by an optimizer while it runs.
pub trait SolutionsRuntimeProcessor<S: Solution> {
    /// Called once per batch of freshly created candidates, before they are ranked
    fn new_candidates(&mut self, candidates: Vec<&mut S>) -> Result<()>;
    /// Called with the surviving population of every generation
    fn iter_solutions(&mut self, candidates: Vec<&mut S>);
    fn iteration_num(&mut self, num: usize);
}
