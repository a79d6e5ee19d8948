use std::cmp::Ordering;

/// True when `p1` is no worse than `p2` in every objective.
///
/// Identical points count as dominating so that duplicates fall into
/// later fronts.
fn dominates(p1: &[f64], p2: &[f64]) -> bool {
    let mut dominated = false;
    let mut equal = true;
    for (a, b) in p1.iter().zip(p2) {
        match a.total_cmp(b) {
            Ordering::Less => {
                dominated = true;
                equal = false;
            },
            Ordering::Greater => {
                return false;
            },
            Ordering::Equal => (),
        }
    }
    dominated || equal
}

/// Efficient non-dominated sorting (ENS-SS) of minimized objective vectors.
///
/// Returns indices into `pop` grouped by front, best front first.
pub fn ens_nondominated_sorting(pop: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut indices = (0..pop.len()).collect::<Vec<usize>>();
    indices.sort_by(|&a, &b| {
        pop[a]
            .iter()
            .zip(&pop[b])
            .map(|(x, y)| x.total_cmp(y))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let mut fronts: Vec<Vec<usize>> = vec![];
    for &n in indices.iter() {
        let mut k = 0;
        while k < fronts.len() {
            let contain_dominating_n = fronts[k]
                .iter()
                .rev()
                .any(|i| dominates(&pop[*i], &pop[n]));

            if !contain_dominating_n {
                fronts[k].push(n);
                break;
            }

            k += 1;
        }

        if k == fronts.len() {
            fronts.push(vec![n]);
        }
    }

    fronts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_fronts() {
        let pop = vec![
            vec![1.0, 5.0],
            vec![3.0, 3.0],
            vec![5.0, 1.0],
            vec![4.0, 4.0],
            vec![6.0, 6.0],
        ];

        let mut fronts = ens_nondominated_sorting(&pop);
        fronts.iter_mut().for_each(|f| f.sort());

        assert_eq!(fronts, vec![vec![0, 1, 2], vec![3], vec![4]]);
    }

    #[test]
    fn duplicates_go_to_next_front() {
        let pop = vec![vec![2.0, 2.0], vec![2.0, 2.0]];

        assert_eq!(ens_nondominated_sorting(&pop).len(), 2);
    }

    #[test]
    fn empty_population_has_no_fronts() {
        assert!(ens_nondominated_sorting(&[]).is_empty());
    }
}
