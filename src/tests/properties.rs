use std::sync::Arc;
use proptest::collection::vec;
use proptest::prelude::*;
use crate::evaluator::{BatchEvaluator, LayoutEvaluator};
use crate::geometry::{aabb_overlap, closest_distance, closest_points, might_intersect, Rect};
use crate::problem::{Connection, ProblemInstance, Rectangle};

fn rect() -> impl Strategy<Value = Rect>
{
    (-50.0..50.0f64, -50.0..50.0f64, 0.1..10.0f64, 0.1..10.0f64)
        .prop_map(|(cx, cy, hw, hh)| Rect::new(cx, cy, hw, hh))
}

fn euclidean_gap(r1: &Rect, r2: &Rect) -> f64
{
    let (p1, p2) = closest_points(r1, r2);

    (p1[0] - p2[0]).hypot(p1[1] - p2[1])
}

/// Random instance with 2..8 rectangles, a chain of connections and a batch of candidates
fn instance() -> impl Strategy<Value = (ProblemInstance, Vec<f64>)>
{
    (2usize..8, 1usize..6)
        .prop_flat_map(|(n, batch)| {
            (
                vec((0.2..8.0f64, 0.2..8.0f64), n),
                vec(-20.0..20.0f64, 2 * n * batch),
            )
        })
        .prop_map(|(dimensions, x)| {
            let rectangles = dimensions
                .iter()
                .enumerate()
                .map(|(i, (w, h))| Rectangle::new(format!("r{}", i), *w, *h))
                .collect::<Vec<_>>();

            let connections = (1..rectangles.len())
                .map(|i| Connection::new(format!("p{}", i), i - 1, i, 1.0, 6.0))
                .collect();

            (ProblemInstance::new(rectangles, connections).unwrap(), x)
        })
}

proptest! {
    #[test]
    fn prefilter_never_hides_an_overlap(r1 in rect(), r2 in rect())
    {
        if !might_intersect(&r1, &r2)
        {
            prop_assert!(!aabb_overlap(&r1, &r2));
        }
    }

    #[test]
    fn closest_distance_under_approximates_the_gap(r1 in rect(), r2 in rect())
    {
        let distance = closest_distance(&r1, &r2);

        prop_assert!(distance >= 0.0);
        prop_assert!(distance <= euclidean_gap(&r1, &r2) + 1e-9);

        if aabb_overlap(&r1, &r2)
        {
            prop_assert_eq!(distance, 0.0);
        }
    }

    #[test]
    fn overlap_count_ignores_the_prefilter((problem, x) in instance())
    {
        let problem = Arc::new(problem);
        let with = LayoutEvaluator::new(problem.clone()).with_prefilter(true).evaluate_batch(&x).unwrap();
        let without = LayoutEvaluator::new(problem).with_prefilter(false).evaluate_batch(&x).unwrap();

        prop_assert_eq!(with, without);
    }

    #[test]
    fn evaluation_is_idempotent_and_finite((problem, x) in instance())
    {
        let evaluator = LayoutEvaluator::new(Arc::new(problem));
        let first = evaluator.evaluate_batch(&x).unwrap();
        let second = evaluator.evaluate_batch(&x).unwrap();

        prop_assert!(first.objectives.iter().all(|v| v.is_finite() && *v >= 0.0));
        prop_assert!(first.constraints.iter().all(|v| *v >= 0.0));
        prop_assert_eq!(first.constraints.ncols(), evaluator.n_constr());
        prop_assert_eq!(first, second);
    }
}
