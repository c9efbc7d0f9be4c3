//! Dominated hypervolume and least-contributor selection for minimization.

/// Hypervolume dominated by `points` with respect to `reference`.
/// Points not strictly better than the reference in every objective
/// contribute nothing.
pub fn hypervolume(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let inside: Vec<&Vec<f64>> = points
        .iter()
        .filter(|p| p.iter().zip(reference).all(|(v, r)| v < r))
        .collect();

    match reference.len() {
        0 => 0.0,
        1 => inside
            .iter()
            .map(|p| reference[0] - p[0])
            .fold(0.0, f64::max),
        2 => planar(&inside, reference),
        _ => sliced(&inside, reference),
    }
}

/// Two-objective sweep: with points sorted by the first objective, each one
/// adds the rectangle between its own second objective and the best seen so
/// far.
fn planar(points: &[&Vec<f64>], reference: &[f64]) -> f64 {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let mut volume = 0.0;
    let mut best_f2 = reference[1];
    for p in sorted {
        if p[1] < best_f2 {
            volume += (reference[0] - p[0]) * (best_f2 - p[1]);
            best_f2 = p[1];
        }
    }
    volume
}

/// Hypervolume by slicing the last objective: each slab between consecutive
/// coordinates contributes its thickness times the projected hypervolume of
/// the points reaching into it.
fn sliced(points: &[&Vec<f64>], reference: &[f64]) -> f64 {
    let d = reference.len();
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a[d - 1].total_cmp(&b[d - 1]));

    let mut volume = 0.0;
    for i in 0..sorted.len() {
        let slab_end = if i + 1 < sorted.len() {
            sorted[i + 1][d - 1]
        } else {
            reference[d - 1]
        };
        let thickness = slab_end - sorted[i][d - 1];
        if thickness <= 0.0 {
            continue;
        }

        let projected: Vec<Vec<f64>> = sorted[..=i].iter().map(|p| p[..d - 1].to_vec()).collect();
        volume += thickness * hypervolume(&projected, &reference[..d - 1]);
    }
    volume
}

/// Componentwise worst of the point set, offset by one in every objective.
/// The default reference policy when no fixed reference is configured.
pub fn default_reference(points: &[Vec<f64>]) -> Vec<f64> {
    let d = points.first().map_or(0, Vec::len);
    (0..d)
        .map(|i| points.iter().map(|p| p[i]).fold(f64::NEG_INFINITY, f64::max) + 1.0)
        .collect()
}

/// Index of the point whose removal costs the least hypervolume. Ties
/// resolve to the earliest index.
pub fn least_contributor(points: &[Vec<f64>], fixed_reference: Option<&[f64]>) -> usize {
    if points.len() <= 1 {
        return 0;
    }

    let reference = match fixed_reference {
        Some(r) => r.to_vec(),
        None => default_reference(points),
    };
    let total = hypervolume(points, &reference);

    let mut least = 0;
    let mut least_contribution = f64::INFINITY;
    for i in 0..points.len() {
        let mut rest = points.to_vec();
        rest.remove(i);
        let contribution = total - hypervolume(&rest, &reference);
        if contribution < least_contribution {
            least_contribution = contribution;
            least = i;
        }
    }
    least
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_point_rectangle() {
        let hv = hypervolume(&[vec![1.0, 1.0]], &[3.0, 3.0]);
        assert_relative_eq!(hv, 4.0);
    }

    #[test]
    fn overlapping_points_union() {
        let points = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        let hv = hypervolume(&points, &[3.0, 3.0]);
        // Two 2x1 rectangles sharing a 1x1 corner.
        assert_relative_eq!(hv, 3.0);
    }

    #[test]
    fn dominated_point_adds_nothing() {
        let base = vec![vec![1.0, 1.0]];
        let with_dominated = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        assert_relative_eq!(
            hypervolume(&base, &[4.0, 4.0]),
            hypervolume(&with_dominated, &[4.0, 4.0])
        );
    }

    #[test]
    fn three_objectives_box_union() {
        let points = vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]];
        let hv = hypervolume(&points, &[2.0, 2.0, 2.0]);
        // 2x2x1 slab plus the 1x1x1 exclusive part of the second box.
        assert_relative_eq!(hv, 5.0);
    }

    #[test]
    fn least_contributor_is_the_crowded_point() {
        let points = vec![
            vec![0.0, 3.0],
            vec![1.0, 1.1],
            vec![1.1, 1.0],
            vec![3.0, 0.0],
        ];
        let dropped = least_contributor(&points, Some(&[4.0, 4.0]));
        assert!(dropped == 1 || dropped == 2);
    }
}
