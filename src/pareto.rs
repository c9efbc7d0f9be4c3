//! Pareto dominance, nondominated sorting and crowding distance.

use std::cmp::Ordering;

/// True when `a` is no worse than `b` in every objective. Equal vectors
/// count as dominating, which keeps duplicates in the same front.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (a_i, b_i) in a.iter().zip(b) {
        match a_i.partial_cmp(b_i) {
            Some(Ordering::Less) => strictly_better = true,
            Some(Ordering::Greater) => return false,
            Some(Ordering::Equal) => {}
            None => return false,
        }
    }
    strictly_better || a == b
}

/// Efficient nondominated sorting: indices of `objectives` grouped into
/// fronts, best front first.
///
/// Points are pre-sorted lexicographically, so a point can only be dominated
/// by points already placed; each point lands in the first existing front
/// that contains no dominator, scanned from the back where dominators
/// cluster.
pub fn nondominated_fronts(objectives: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..objectives.len()).collect();
    order.sort_by(|&a, &b| lexicographic(&objectives[a], &objectives[b]));

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    for n in order {
        let slot = fronts.iter().position(|front| {
            !front
                .iter()
                .rev()
                .any(|&i| dominates(&objectives[i], &objectives[n]))
        });
        match slot {
            Some(k) => fronts[k].push(n),
            None => fronts.push(vec![n]),
        }
    }

    fronts
}

fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    for (a_i, b_i) in a.iter().zip(b) {
        match a_i.partial_cmp(b_i) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

/// Crowding distances for the members of one front, in front order.
/// Boundary members get infinite distance so selection keeps the extremes.
pub fn crowding_distances(objectives: &[Vec<f64>], front: &[usize]) -> Vec<f64> {
    let mut distances = vec![0.0; front.len()];
    if front.len() <= 2 {
        distances.iter_mut().for_each(|d| *d = f64::INFINITY);
        return distances;
    }

    let n_obj = objectives[front[0]].len();
    let mut positions: Vec<usize> = (0..front.len()).collect();

    for obj in 0..n_obj {
        positions.sort_by(|&a, &b| {
            objectives[front[a]][obj]
                .partial_cmp(&objectives[front[b]][obj])
                .unwrap_or(Ordering::Equal)
        });

        let min = objectives[front[positions[0]]][obj];
        let max = objectives[front[positions[positions.len() - 1]]][obj];
        let range = max - min;

        distances[positions[0]] = f64::INFINITY;
        distances[positions[positions.len() - 1]] = f64::INFINITY;

        if range > 0.0 {
            for w in positions.windows(3) {
                let span = objectives[front[w[2]]][obj] - objectives[front[w[0]]][obj];
                distances[w[1]] += span / range;
            }
        }
    }

    distances
}
