use std::fmt::{Debug, Formatter};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};
use crate::evaluator::BatchEvaluator;
use crate::problem::CoordinateBounds;
use crate::{Constraint, Meta, Objective, Ratio, Result, Solution, SolutionsRuntimeProcessor};

/// Standard deviation of a mutation step, as a share of the coordinate range
const MUTATION_SCALE: f64 = 0.05;

/// Progress is logged every this many generations
const LOG_EVERY: usize = 10;

/// A candidate layout: `x` holds `[x0, y0, x1, y1, ...]`.
///
/// `f` and `g` are filled by the runtime processor and cleared whenever
/// `x` changes.
#[derive(Clone)]
pub struct LayoutSolution
{
    pub x: Vec<f64>,
    pub f: Vec<f64>,
    pub g: Vec<f64>,
    bounds: CoordinateBounds,
}

impl LayoutSolution
{
    pub fn new(x: Vec<f64>, bounds: CoordinateBounds) -> Self
    {
        LayoutSolution {
            x,
            f: vec![],
            g: vec![],
            bounds,
        }
    }

    pub fn is_evaluated(&self) -> bool
    {
        !self.f.is_empty()
    }

    pub fn constraint_violation(&self) -> f64
    {
        self.g.iter().map(|g| g.max(0.0)).sum()
    }

    fn invalidate(&mut self)
    {
        self.f.clear();
        self.g.clear();
    }
}

impl Debug for LayoutSolution
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("LayoutSolution")
            .field("x", &self.x)
            .field("f", &self.f)
            .field("g", &self.g)
            .finish()
    }
}

impl Solution for LayoutSolution
{
    /// Uniform crossover over rectangles: a center always moves as a pair.
    fn crossover<R: Rng + ?Sized>(&mut self, rng: &mut R, other: &mut Self)
    {
        for (center, other_center) in self.x.chunks_mut(2).zip(other.x.chunks_mut(2))
        {
            if rng.gen_ratio(1, 2)
            {
                center.swap_with_slice(other_center);
            }
        }

        self.invalidate();
        other.invalidate();
    }

    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R)
    {
        let x_len = self.x.len() as u32;
        let normal = match Normal::new(0.0, self.bounds.range() * MUTATION_SCALE)
        {
            Ok(normal) => normal,
            Err(_) => return,
        };

        for x_i in self.x.iter_mut()
        {
            if rng.gen_ratio(1, x_len)
            {
                *x_i = self.bounds.clamp(*x_i + normal.sample(rng));
            }
        }

        self.invalidate();
    }
}

pub struct LayoutObjective
{
    index_f: usize
}

impl Objective<LayoutSolution> for LayoutObjective
{
    fn value(&self, candidate: &LayoutSolution) -> f64
    {
        candidate.f[self.index_f]
    }
}

pub struct LayoutConstraint
{
    index_g: usize
}

impl Constraint<LayoutSolution> for LayoutConstraint
{
    fn violation(&self, candidate: &LayoutSolution) -> f64
    {
        candidate.g[self.index_g].max(0.0)
    }
}

pub struct LayoutOptimizerParams
{
    population_size: usize,
    crossover_odds: Ratio,
    mutation_odds: Ratio,
    evaluator: Box<dyn BatchEvaluator>,
    objectives: Vec<Box<dyn Objective<LayoutSolution>>>,
    constraints: Vec<Box<dyn Constraint<LayoutSolution>>>,
}

impl LayoutOptimizerParams
{
    pub fn new(population_size: usize, crossover_odds: Ratio, mutation_odds: Ratio, evaluator: Box<dyn BatchEvaluator>) -> Self
    {
        let mut objectives: Vec<Box<dyn Objective<LayoutSolution>>> = Vec::new();
        for i in 0..evaluator.n_obj()
        {
            objectives.push(Box::new(LayoutObjective {
                index_f: i
            }));
        }

        let mut constraints: Vec<Box<dyn Constraint<LayoutSolution>>> = Vec::new();
        for i in 0..evaluator.n_constr()
        {
            constraints.push(Box::new(LayoutConstraint {
                index_g: i
            }));
        }

        LayoutOptimizerParams {
            population_size,
            crossover_odds,
            mutation_odds,
            evaluator,
            objectives,
            constraints,
        }
    }
}

impl<'a> Meta<'a, LayoutSolution> for LayoutOptimizerParams
{
    fn population_size(&self) -> usize
    {
        self.population_size
    }

    fn crossover_odds(&self) -> Ratio
    {
        self.crossover_odds
    }

    fn mutation_odds(&self) -> Ratio
    {
        self.mutation_odds
    }

    fn random_solution(&mut self, rng: &mut dyn RngCore) -> LayoutSolution
    {
        let bounds = self.evaluator.bounds();
        let x = (0..self.evaluator.n_var())
            .map(|_| rng.gen_range(bounds.lower..=bounds.upper))
            .collect();

        LayoutSolution::new(x, bounds)
    }

    fn objectives(&self) -> &[Box<dyn Objective<LayoutSolution> + 'a>]
    {
        &self.objectives
    }

    fn constraints(&self) -> &[Box<dyn Constraint<LayoutSolution> + 'a>]
    {
        &self.constraints
    }
}

/// Evaluates every new batch of candidates with one `evaluate_batch` call
/// and reports progress.
pub struct SolutionsRuntimeLayoutProcessor
{
    evaluator: Box<dyn BatchEvaluator>,
    current_iteration_num: usize,
    n_eval: usize,
    batch: Vec<f64>,
}

impl SolutionsRuntimeLayoutProcessor
{
    pub fn new(evaluator: Box<dyn BatchEvaluator>) -> Self
    {
        SolutionsRuntimeLayoutProcessor {
            evaluator,
            current_iteration_num: 0,
            n_eval: 0,
            batch: vec![],
        }
    }

    /// Number of candidates evaluated so far
    pub fn n_eval(&self) -> usize
    {
        self.n_eval
    }
}

impl SolutionsRuntimeProcessor<LayoutSolution> for SolutionsRuntimeLayoutProcessor
{
    fn new_candidates(&mut self, mut candidates: Vec<&mut LayoutSolution>) -> Result<()>
    {
        self.batch.clear();
        for candidate in candidates.iter()
        {
            self.batch.extend_from_slice(&candidate.x);
        }

        let evaluation = self.evaluator.evaluate_batch(&self.batch)?;

        for ((candidate, f), g) in candidates
            .iter_mut()
            .zip(evaluation.objectives.outer_iter())
            .zip(evaluation.constraints.outer_iter())
        {
            candidate.f = f.to_vec();
            candidate.g = g.to_vec();
        }

        self.n_eval += candidates.len();

        Ok(())
    }

    fn iter_solutions(&mut self, candidates: Vec<&mut LayoutSolution>)
    {
        let feasible = candidates
            .iter()
            .filter(|c| c.constraint_violation() == 0.0)
            .count();

        debug!(generation = self.current_iteration_num, feasible, population = candidates.len(), "generation ranked");

        if self.current_iteration_num % LOG_EVERY == 0
        {
            let mut best_fitness = vec![f64::INFINITY; self.evaluator.n_obj()];
            for candidate in candidates.iter()
            {
                for (best, value) in best_fitness.iter_mut().zip(&candidate.f)
                {
                    *best = best.min(*value);
                }
            }

            info!("Generation: {}, Evaluations: {}, Best Fitness: {:?}", self.current_iteration_num, self.n_eval, best_fitness);
        }
    }

    fn iteration_num(&mut self, num: usize)
    {
        self.current_iteration_num = num;
    }
}
