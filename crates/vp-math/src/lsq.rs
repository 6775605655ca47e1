//! Linear least-squares regression.
//!
//! Solves `y = A β + ε` via SVD, where `A` is the design matrix built from
//! user-supplied basis functions.  The Longstaff-Schwartz pricer regresses
//! discounted continuation values on basis functions of the spot to decide
//! early exercise.

use nalgebra::{DMatrix, DVector};
use vp_core::{
    errors::{Error, Result},
    Real,
};

/// Result of a linear least-squares regression.
#[derive(Debug, Clone)]
pub struct LinearLeastSquaresRegression {
    coefficients: Vec<Real>,
}

impl LinearLeastSquaresRegression {
    /// Fit the model using the given data and basis functions.
    ///
    /// * `x` — independent variable observations (length *n*).
    /// * `y` — dependent variable observations (length *n*).
    /// * `basis` — a slice of basis functions φⱼ(x), j = 0, …, m−1.
    ///
    /// Builds the *n × m* design matrix `A[i][j] = φⱼ(xᵢ)` and solves via SVD,
    /// thresholding small singular values.
    pub fn new<F>(x: &[Real], y: &[Real], basis: &[F]) -> Result<Self>
    where
        F: Fn(Real) -> Real,
    {
        let n = x.len();
        let m = basis.len();
        if n != y.len() {
            return Err(Error::InvalidParameter(
                "regression: x and y must have the same length".into(),
            ));
        }
        if n < m {
            return Err(Error::InvalidParameter(
                "regression: more basis functions than data points".into(),
            ));
        }

        let a = DMatrix::from_fn(n, m, |i, j| basis[j](x[i]));
        let y_vec = DVector::from_column_slice(y);

        let threshold = n.max(m) as Real * f64::EPSILON;
        let svd = a.svd(true, true);
        let beta = svd
            .solve(&y_vec, threshold)
            .map_err(|e| Error::Convergence(format!("regression SVD solve failed: {e}")))?;

        let coefficients: Vec<Real> = beta.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::Convergence(
                "regression produced non-finite coefficients".into(),
            ));
        }
        Ok(Self { coefficients })
    }

    /// Fitted coefficients β, one per basis function.
    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    /// Evaluate the fitted model at `x` with the original basis functions.
    pub fn predict<F>(&self, x: Real, basis: &[F]) -> Real
    where
        F: Fn(Real) -> Real,
    {
        self.coefficients
            .iter()
            .zip(basis.iter())
            .map(|(c, phi)| c * phi(x))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Basis = Box<dyn Fn(Real) -> Real>;

    #[test]
    fn linear_fit() {
        // y = 2 + 3x
        let x: Vec<Real> = (0..20).map(|i| i as Real).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 2.0 + 3.0 * xi).collect();
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x)];

        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        let c = reg.coefficients();
        assert!((c[0] - 2.0).abs() < 1e-10, "intercept = {}", c[0]);
        assert!((c[1] - 3.0).abs() < 1e-10, "slope = {}", c[1]);
        assert!((reg.predict(10.0, &basis) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn quadratic_fit() {
        // y = 1 - 2x + 0.5x²
        let x: Vec<Real> = (0..30).map(|i| -5.0 + i as Real * 0.5).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 1.0 - 2.0 * xi + 0.5 * xi * xi).collect();
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x), Box::new(|x| x * x)];

        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        let c = reg.coefficients();
        assert!((c[0] - 1.0).abs() < 1e-8, "c0 = {}", c[0]);
        assert!((c[1] + 2.0).abs() < 1e-8, "c1 = {}", c[1]);
        assert!((c[2] - 0.5).abs() < 1e-8, "c2 = {}", c[2]);
    }

    #[test]
    fn noisy_linear_fit() {
        // y ≈ 1 + 2x with small noise
        let x: Vec<Real> = (0..100).map(|i| i as Real * 0.1).collect();
        let noise = [
            0.01, -0.02, 0.015, -0.005, 0.03, -0.01, 0.02, -0.03, 0.005, 0.01,
        ];
        let y: Vec<Real> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 1.0 + 2.0 * xi + noise[i % noise.len()])
            .collect();
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x)];

        let reg = LinearLeastSquaresRegression::new(&x, &y, &basis).unwrap();
        let c = reg.coefficients();
        assert!((c[0] - 1.0).abs() < 0.1, "intercept = {}", c[0]);
        assert!((c[1] - 2.0).abs() < 0.01, "slope = {}", c[1]);
    }

    #[test]
    fn too_few_observations() {
        let x = [1.0];
        let y = [2.0];
        let basis: Vec<Basis> = vec![Box::new(|_| 1.0), Box::new(|x| x)];
        assert!(LinearLeastSquaresRegression::new(&x, &y, &basis).is_err());
    }
}
