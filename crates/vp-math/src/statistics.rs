//! Incremental statistics accumulator.
//!
//! Each Monte Carlo worker accumulates into its own `Statistics`; the partial
//! accumulators are merged in worker order afterwards.  The merged moments
//! are plain sums, so the final mean and error estimate do not depend on how
//! paths were distributed over workers.

use vp_core::Real;

/// Incremental statistics accumulator.
///
/// Accumulates samples and computes mean, variance, standard deviation, and
/// the standard error of the sample mean.
#[derive(Debug, Clone)]
pub struct Statistics {
    count: usize,
    sum_x: Real,
    sum_x2: Real,
    min: Real,
    max: Real,
}

// A derived Default would zero-initialize min/max instead of the ±∞
// sentinels the add comparisons start from.
impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            sum_x: 0.0,
            sum_x2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a single sample.
    pub fn add(&mut self, x: Real) {
        self.count += 1;
        self.sum_x += x;
        self.sum_x2 += x * x;
        if x < self.min {
            self.min = x;
        }
        if x > self.max {
            self.max = x;
        }
    }

    /// Absorb another accumulator's samples.
    pub fn merge(&mut self, other: &Statistics) {
        self.count += other.count;
        self.sum_x += other.sum_x;
        self.sum_x2 += other.sum_x2;
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Sample mean.  Returns `None` if no samples have been added.
    pub fn mean(&self) -> Option<Real> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum_x / self.count as Real)
        }
    }

    /// Sample variance (unbiased, Bessel-corrected).  Returns `None` for
    /// fewer than 2 samples.
    pub fn variance(&self) -> Option<Real> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as Real;
        let m = self.sum_x / n;
        let s2 = (self.sum_x2 / n - m * m).max(0.0);
        Some(s2 * n / (n - 1.0))
    }

    /// Sample standard deviation.  Returns `None` for fewer than 2 samples.
    pub fn std_dev(&self) -> Option<Real> {
        self.variance().map(|v| v.sqrt())
    }

    /// Standard error of the sample mean, `σ/√n`.  Returns `None` for fewer
    /// than 2 samples.
    pub fn error_estimate(&self) -> Option<Real> {
        self.std_dev().map(|s| s / (self.count as Real).sqrt())
    }

    /// Minimum sample value.  Returns `None` if no samples have been added.
    pub fn minimum(&self) -> Option<Real> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Maximum sample value.  Returns `None` if no samples have been added.
    pub fn maximum(&self) -> Option<Real> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basic_statistics() {
        let mut s = Statistics::new();
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            s.add(x);
        }
        assert_eq!(s.samples(), 5);
        assert_relative_eq!(s.mean().unwrap(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(s.variance().unwrap(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(s.std_dev().unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            s.error_estimate().unwrap(),
            (2.5_f64 / 5.0).sqrt(),
            epsilon = 1e-12
        );
        assert_eq!(s.minimum().unwrap(), 1.0);
        assert_eq!(s.maximum().unwrap(), 5.0);
    }

    #[test]
    fn default_starts_from_extreme_sentinels() {
        let mut s = Statistics::default();
        s.add(5.0);
        assert_eq!(s.minimum(), Some(5.0));
        assert_eq!(s.maximum(), Some(5.0));
        s.add(-3.0);
        assert_eq!(s.minimum(), Some(-3.0));
        assert_eq!(s.maximum(), Some(5.0));
    }

    #[test]
    fn empty_statistics() {
        let s = Statistics::new();
        assert!(s.mean().is_none());
        assert!(s.variance().is_none());
        assert!(s.error_estimate().is_none());
    }

    #[test]
    fn merge_matches_sequential() {
        let data: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();

        let mut sequential = Statistics::new();
        for &x in &data {
            sequential.add(x);
        }

        let mut left = Statistics::new();
        let mut right = Statistics::new();
        for &x in &data[..37] {
            left.add(x);
        }
        for &x in &data[37..] {
            right.add(x);
        }
        let mut merged = left.clone();
        merged.merge(&right);

        assert_eq!(merged.samples(), sequential.samples());
        assert_relative_eq!(merged.mean().unwrap(), sequential.mean().unwrap(), epsilon = 1e-12);
        assert_relative_eq!(
            merged.variance().unwrap(),
            sequential.variance().unwrap(),
            epsilon = 1e-12
        );
        assert_eq!(merged.minimum(), sequential.minimum());
        assert_eq!(merged.maximum(), sequential.maximum());
    }
}
