//! Gaussian Process surrogate for Bayesian optimization.
//!
//! An RBF-kernel GP fit via `nalgebra`'s Cholesky factorization (`fit(x, y)`
//! / `predict(x*)`). The kernel matrix itself is built over `ndarray`
//! storage to match the Search Space's `x`/`y` layout; the factorization
//! and triangular solves are `nalgebra`'s.

use hpsearch_types::{numeric_failure, HpResult};
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2};

/// RBF kernel Gaussian process with a fixed observation-noise jitter.
pub struct GaussianProcess {
    length_scale: f64,
    signal_variance: f64,
    jitter: f64,
    x_train: Array2<f64>,
    cholesky: Option<Cholesky<f64, Dyn>>,
    alpha: DVector<f64>,
}

impl GaussianProcess {
    pub fn new(length_scale: f64) -> Self {
        Self {
            length_scale: length_scale.max(1e-6),
            signal_variance: 1.0,
            jitter: 1e-6,
            x_train: Array2::zeros((0, 0)),
            cholesky: None,
            alpha: DVector::zeros(0),
        }
    }

    fn kernel(&self, a: &[f64], b: &[f64]) -> f64 {
        let sq: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        self.signal_variance * (-0.5 * sq / (self.length_scale * self.length_scale)).exp()
    }

    /// Fits the GP via Cholesky factorization of `K + jitter*I`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> HpResult<()> {
        let n = x.nrows();
        let mut k = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                k[(i, j)] = self.kernel(x.row(i).as_slice().unwrap(), x.row(j).as_slice().unwrap());
            }
            k[(i, i)] += self.jitter;
        }
        let cholesky = Cholesky::new(k).ok_or_else(|| {
            numeric_failure!("cholesky factorization failed: matrix is not positive definite")
        })?;
        let y_vec = DVector::from_iterator(n, y.iter().cloned());
        let alpha = cholesky.solve(&y_vec);

        self.x_train = x.clone();
        self.cholesky = Some(cholesky);
        self.alpha = alpha;
        Ok(())
    }

    /// Posterior `(mu, sigma)` at a single point.
    pub fn predict(&self, x_star: &[f64]) -> (f64, f64) {
        let n = self.x_train.nrows();
        let Some(cholesky) = &self.cholesky else {
            return (0.0, self.signal_variance.sqrt());
        };
        let k_star: Vec<f64> = (0..n)
            .map(|i| self.kernel(self.x_train.row(i).as_slice().unwrap(), x_star))
            .collect();
        let k_star_vec = DVector::from_vec(k_star);
        let mu = k_star_vec.dot(&self.alpha);

        let solved = cholesky.solve(&k_star_vec);
        let k_ss = self.kernel(x_star, x_star);
        let var = (k_ss - k_star_vec.dot(&solved)).max(0.0);
        (mu, var.sqrt())
    }
}
