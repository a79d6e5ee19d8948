use itertools::Itertools;
use peeking_take_while::PeekableExt;
use rand::prelude::*;
use rand::rngs::StdRng;

use std::convert::identity;
use tracing::{debug, warn};
use crate::ens_nondominating_sorting::ens_nondominated_sorting;
use crate::error::LayoutError;
use crate::optimizers::Optimizer;
use crate::termination::Termination;
use crate::{Meta, Ratio, Result, Solution, SolutionsRuntimeProcessor};

type SolutionId = u64;

#[derive(Debug, Clone)]
struct Candidate<S: Solution> {
    id: SolutionId,
    sol: S,
    front: usize,
    distance: f64,
}

/// NSGA-II optimizer with constraint domination.
///
/// Feasible candidates always rank before infeasible ones. Feasible
/// candidates are split into Pareto fronts, infeasible ones into fronts of
/// equal total constraint violation, lowest first.
pub struct NSGA2Optimizer<'a, S: Solution> {
    meta: Box<dyn Meta<'a, S> + 'a>,
    last_id: SolutionId,
    best_solutions: Vec<(Vec<f64>, S)>,
    rng: StdRng,
}

impl<'a, S> Optimizer<S> for NSGA2Optimizer<'a, S>
    where
        S: Solution,
{
    fn name(&self) -> &str {
        "NSGA-II"
    }

    /// Run an optimization process until `termination` allows it to stop
    ///
    /// Since an optimization can produce a set of
    /// [Pareto optimal solutions](https://en.wikipedia.org/wiki/Pareto_front),
    /// the result is read back with [`Optimizer::best_solutions`].
    fn optimize(&mut self, termination: &mut dyn Termination, runtime_solutions_processor: &mut dyn SolutionsRuntimeProcessor<S>) -> Result<()> {
        let pop_size = self.meta.population_size();
        if pop_size < 2 {
            return Err(LayoutError::Config(format!("population size must be at least 2, got {}", pop_size)));
        }

        let crossover_odds = self.meta.crossover_odds();
        let mutation_odds = self.meta.mutation_odds();

        // Buffer
        let mut child_pop: Vec<Candidate<S>> = Vec::with_capacity(pop_size);

        // Initial population
        let mut pop = Vec::with_capacity(pop_size * 2);
        for _ in 0..pop_size {
            let id = self.next_id();
            let sol = self.meta.random_solution(&mut self.rng);

            pop.push(Candidate {
                id,
                sol,
                front: 0,
                distance: 0.0,
            });
        }

        runtime_solutions_processor.new_candidates(
            pop
                .iter_mut()
                .map(|candidate| &mut candidate.sol)
                .collect()
        )?;

        let mut parent_pop = self.nondominating_sort(pop);

        for iter in 0.. {
            runtime_solutions_processor.iteration_num(iter);

            // Keep copies of the best candidates in a stash
            self.best_solutions = self.first_front(&parent_pop);

            runtime_solutions_processor.iter_solutions(
                parent_pop.iter_mut()
                    .map(|child| &mut child.sol)
                    .collect()
            );

            // Check if there's a good-enough solution already
            if parent_pop
                .iter()
                .filter(|c| self.is_feasible(&c.sol))
                .map(|c| {
                    self.meta
                        .objectives()
                        .iter()
                        .map(|obj| obj.good_enough(obj.value(&c.sol)))
                        .all(identity)
                })
                .any(identity)
            {
                debug!(generation = iter, "good enough solution found");
                break;
            }

            let values = parent_pop.iter().map(|c| self.values(&c.sol)).collect::<Vec<_>>();
            if termination.can_terminate(iter, &values) {
                break;
            }

            child_pop.clear();

            while child_pop.len() < parent_pop.len() {
                let mut c1 = self.tournament(&parent_pop);
                let mut c2 = self.tournament(&parent_pop);

                if self.odds(crossover_odds) {
                    c1.sol.crossover(&mut self.rng, &mut c2.sol);
                };

                if self.odds(mutation_odds) {
                    c1.sol.mutate(&mut self.rng);
                };

                if self.odds(mutation_odds) {
                    c2.sol.mutate(&mut self.rng);
                };

                c1.id = self.next_id();
                c2.id = self.next_id();

                child_pop.push(c1);
                child_pop.push(c2);
            }

            runtime_solutions_processor.new_candidates(
                child_pop
                    .iter_mut()
                    .map(|child| &mut child.sol)
                    .collect()
            )?;

            parent_pop.append(&mut child_pop);

            // Sort combined population
            let mut sorted = self.nondominating_sort(std::mem::take(&mut parent_pop));
            sorted.truncate(pop_size);

            parent_pop = sorted;
        }

        if self.best_solutions.iter().all(|(_, s)| !self.is_feasible(s)) {
            warn!("no feasible solution found, returning the least violating candidates");
        }

        Ok(())
    }

    fn best_solutions(&self) -> Vec<(Vec<f64>, S)> {
        self.best_solutions.clone()
    }
}

impl<'a, S> NSGA2Optimizer<'a, S>
    where
        S: Solution,
{
    /// Instantiate a new optimizer with a given meta params.
    ///
    /// A `seed` makes the run reproducible.
    pub fn new(meta: impl Meta<'a, S> + 'a, seed: Option<u64>) -> Self {
        let pop_size = meta.population_size();

        NSGA2Optimizer {
            meta: Box::new(meta),
            last_id: 0,
            best_solutions: Vec::with_capacity(pop_size),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    fn next_id(&mut self) -> SolutionId {
        self.last_id += 1;
        self.last_id
    }

    fn odds(&mut self, ratio: Ratio) -> bool {
        self.rng.gen_ratio(ratio.0, ratio.1)
    }

    /// Binary tournament on front, then crowding distance
    fn tournament(&mut self, pop: &[Candidate<S>]) -> Candidate<S> {
        let p1 = &pop[self.rng.gen_range(0..pop.len())];
        let p2 = &pop[self.rng.gen_range(0..pop.len())];

        let winner = if p1.front < p2.front {
            p1
        } else if p2.front < p1.front {
            p2
        } else if p1.distance > p2.distance {
            p1
        } else if p2.distance > p1.distance {
            p2
        } else if self.rng.gen_bool(0.5) {
            p1
        } else {
            p2
        };

        winner.clone()
    }

    fn first_front(&self, pop: &[Candidate<S>]) -> Vec<(Vec<f64>, S)> {
        let mut iter = pop.iter().peekable();

        let best = PeekableExt::peeking_take_while(&mut iter, |c| c.front == 0)
            .map(|c| (self.values(&c.sol), c.sol.clone()))
            .collect::<Vec<_>>();

        debug!(front = best.len(), dominated = iter.count(), "first front extracted");

        best
    }

    fn nondominating_sort(&self, pop: Vec<Candidate<S>>) -> Vec<Candidate<S>> {
        let violations = pop.iter()
            .map(|p| self.violation(&p.sol))
            .collect::<Vec<_>>();

        let (feasible, mut infeasible): (Vec<usize>, Vec<usize>) = (0..pop.len())
            .partition(|&i| violations[i] == 0.0);

        let objs = feasible.iter()
            .map(|&i| self.values(&pop[i].sol))
            .collect::<Vec<_>>();

        let mut fronts = ens_nondominated_sorting(&objs)
            .into_iter()
            .map(|front| front.into_iter().map(|k| feasible[k]).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        infeasible.sort_by(|a, b| violations[*a].total_cmp(&violations[*b]));

        let groups = infeasible.iter().group_by(|&&i| violations[i].to_bits());
        for (_, group) in &groups {
            fronts.push(group.copied().collect());
        }

        let mut slots = pop.into_iter().map(Some).collect::<Vec<_>>();
        let mut sorted: Vec<Candidate<S>> = Vec::with_capacity(slots.len());

        for (fidx, front) in fronts.into_iter().enumerate() {
            let mut members = front
                .into_iter()
                .filter_map(|index| slots[index].take())
                .map(|mut c| {
                    c.front = fidx;
                    c.distance = 0.0;
                    c
                })
                .collect::<Vec<_>>();

            self.crowding_distance(&mut members);

            // Most isolated first, so truncation keeps the spread
            members.sort_by(|a, b| b.distance.total_cmp(&a.distance));

            sorted.extend(members);
        }

        debug_assert!(slots.iter().all(Option::is_none));

        sorted
    }

    #[allow(clippy::needless_range_loop)]
    fn crowding_distance(&self, front: &mut [Candidate<S>]) {
        if front.is_empty() {
            return;
        }

        let last_index = front.len() - 1;

        for obj in self.meta.objectives() {
            // Sort by objective
            front.sort_by(|a, b| obj.value(&a.sol).total_cmp(&obj.value(&b.sol)));

            let min = obj.value(&front[0].sol);
            let max = obj.value(&front[last_index].sol);

            let diff = max - min;

            front[0].distance = f64::MAX;
            front[last_index].distance = f64::MAX;

            if diff != 0. && diff.is_finite()
            {
                for i in 1..last_index {
                    if front[i].distance != f64::MAX {
                        front[i].distance += (obj.value(&front[i + 1].sol)
                            - obj.value(&front[i - 1].sol))
                            / diff;
                    }
                }
            }
        }
    }

    fn values(&self, s: &S) -> Vec<f64> {
        self.meta
            .objectives()
            .iter()
            .map(|obj| obj.value(s))
            .collect()
    }

    fn violation(&self, s: &S) -> f64 {
        self.meta
            .constraints()
            .iter()
            .map(|cons| cons.violation(s).max(0.0))
            .sum()
    }

    fn is_feasible(&self, s: &S) -> bool {
        self.violation(s) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;
    use super::*;
    use crate::{Constraint, Objective};

    #[derive(Debug, Clone)]
    struct Point {
        f: Vec<f64>,
        cv: f64,
    }

    impl Solution for Point {
        fn crossover<R: Rng + ?Sized>(&mut self, _rng: &mut R, _other: &mut Self) {}
        fn mutate<R: Rng + ?Sized>(&mut self, _rng: &mut R) {}
    }

    struct PointObjective(usize);

    impl Objective<Point> for PointObjective {
        fn value(&self, sol: &Point) -> f64 {
            sol.f[self.0]
        }
    }

    /// Any value below 1 is good enough, so a random population stops at once
    struct BelowOne(usize);

    impl Objective<Point> for BelowOne {
        fn value(&self, sol: &Point) -> f64 {
            sol.f[self.0]
        }

        fn good_enough(&self, val: f64) -> bool {
            val < 1.0
        }
    }

    struct CountingProcessor {
        batches: usize,
        last_iteration: usize,
    }

    impl SolutionsRuntimeProcessor<Point> for CountingProcessor {
        fn new_candidates(&mut self, _candidates: Vec<&mut Point>) -> Result<()> {
            self.batches += 1;
            Ok(())
        }

        fn iter_solutions(&mut self, _candidates: Vec<&mut Point>) {}

        fn iteration_num(&mut self, num: usize) {
            self.last_iteration = num;
        }
    }

    struct CountingTermination(usize);

    impl Termination for CountingTermination {
        fn can_terminate(&mut self, _iter: usize, _values: &[Vec<f64>]) -> bool {
            self.0 += 1;
            false
        }
    }

    struct PointViolation;

    impl Constraint<Point> for PointViolation {
        fn violation(&self, sol: &Point) -> f64 {
            sol.cv
        }
    }

    struct PointMeta {
        objectives: Vec<Box<dyn Objective<Point>>>,
        constraints: Vec<Box<dyn Constraint<Point>>>,
    }

    impl<'a> Meta<'a, Point> for PointMeta {
        fn crossover_odds(&self) -> Ratio {
            Ratio(1, 2)
        }

        fn mutation_odds(&self) -> Ratio {
            Ratio(1, 2)
        }

        fn random_solution(&mut self, rng: &mut dyn RngCore) -> Point {
            Point { f: vec![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)], cv: 0.0 }
        }

        fn objectives(&self) -> &[Box<dyn Objective<Point> + 'a>] {
            &self.objectives
        }

        fn constraints(&self) -> &[Box<dyn Constraint<Point> + 'a>] {
            &self.constraints
        }
    }

    fn optimizer() -> NSGA2Optimizer<'static, Point> {
        NSGA2Optimizer::new(PointMeta {
            objectives: vec![Box::new(PointObjective(0)), Box::new(PointObjective(1))],
            constraints: vec![Box::new(PointViolation)],
        }, Some(1))
    }

    fn candidate(id: SolutionId, f: [f64; 2], cv: f64) -> Candidate<Point> {
        Candidate { id, sol: Point { f: f.to_vec(), cv }, front: 0, distance: 0.0 }
    }

    #[test]
    fn feasible_candidates_rank_first() {
        let pop = vec![
            candidate(1, [0.0, 0.0], 2.0),
            candidate(2, [9.0, 9.0], 0.0),
            candidate(3, [0.0, 0.0], 1.0),
            candidate(4, [1.0, 5.0], 0.0),
            candidate(5, [5.0, 1.0], 0.0),
        ];

        let sorted = optimizer().nondominating_sort(pop);
        let order = sorted.iter().map(|c| (c.id, c.front)).collect::<Vec<_>>();

        assert!(order[..2].iter().all(|o| o.1 == 0 && (o.0 == 4 || o.0 == 5)));
        assert_eq!(order[2], (2, 1));
        assert_eq!(order[3], (3, 2));
        assert_eq!(order[4], (1, 3));
    }

    #[test]
    fn equal_violations_share_a_front() {
        let pop = vec![
            candidate(1, [0.0, 0.0], 1.0),
            candidate(2, [3.0, 3.0], 1.0),
        ];

        let sorted = optimizer().nondominating_sort(pop);

        assert!(sorted.iter().all(|c| c.front == 0));
    }

    #[test]
    fn boundary_points_get_maximal_distance() {
        let pop = vec![
            candidate(1, [0.0, 4.0], 0.0),
            candidate(2, [1.0, 2.0], 0.0),
            candidate(3, [4.0, 0.0], 0.0),
        ];

        let sorted = optimizer().nondominating_sort(pop);

        assert_eq!(sorted[2].id, 2);
        assert_eq!(sorted[0].distance, f64::MAX);
        assert_eq!(sorted[1].distance, f64::MAX);
        assert!((sorted[2].distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn good_enough_objectives_stop_the_run() {
        let mut optimizer = NSGA2Optimizer::new(PointMeta {
            objectives: vec![Box::new(BelowOne(0)), Box::new(BelowOne(1))],
            constraints: vec![Box::new(PointViolation)],
        }, Some(9));
        let mut processor = CountingProcessor { batches: 0, last_iteration: usize::MAX };
        let mut termination = CountingTermination(0);

        optimizer.optimize(&mut termination, &mut processor).unwrap();

        assert_eq!(processor.batches, 1);
        assert_eq!(processor.last_iteration, 0);
        assert_eq!(termination.0, 0);
        assert!(!optimizer.best_solutions().is_empty());
    }
}
