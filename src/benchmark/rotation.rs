use ndarray::Array2;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

/// Draws a random orthogonal matrix by Gram-Schmidt orthonormalization of a
/// Gaussian matrix. Rows are orthonormal, so the matrix acts as a rotation
/// (possibly composed with a reflection) on decision vectors.
pub fn random_rotation(n: usize, rng: &mut dyn RngCore) -> Array2<f64> {
    loop {
        let mut m = Array2::zeros((n, n));
        for v in m.iter_mut() {
            *v = rng.sample(StandardNormal);
        }
        if let Some(q) = orthonormalize(m) {
            return q;
        }
        // A numerically dependent draw is vanishingly rare; redraw.
    }
}

fn orthonormalize(mut q: Array2<f64>) -> Option<Array2<f64>> {
    let n = q.nrows();
    for i in 0..n {
        for j in 0..i {
            let proj = q.row(i).dot(&q.row(j));
            let row_j = q.row(j).to_owned();
            q.row_mut(i).zip_mut_with(&row_j, |a, b| *a -= proj * b);
        }
        let norm = q.row(i).dot(&q.row(i)).sqrt();
        if norm < 1e-12 {
            return None;
        }
        q.row_mut(i).mapv_inplace(|v| v / norm);
    }
    Some(q)
}
