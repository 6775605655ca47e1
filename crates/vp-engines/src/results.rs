//! Pricing results.

use std::collections::HashMap;
use vp_core::Real;

/// The output of a pricing run.
///
/// `npv` is always present; `error_estimate` only where the method produces
/// one (the Monte Carlo standard error).  `method` names the engine that
/// produced the value; the dispatcher stamps it on every successful result.
/// Method-specific diagnostics (Greeks, exercise-date snapping, bias flags)
/// go into `additional`.
#[derive(Debug, Clone, Default)]
pub struct PricingResult {
    /// Net present value.
    pub npv: Real,
    /// Statistical error estimate, where the method produces one.
    pub error_estimate: Option<Real>,
    /// Name of the method that produced this result.
    pub method: &'static str,
    /// Named diagnostics keyed by a short identifier (e.g. `"delta"`).
    pub additional: HashMap<String, Real>,
}

impl PricingResult {
    /// A result with only an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            error_estimate: None,
            method: "",
            additional: HashMap::new(),
        }
    }

    /// Attach an error estimate.
    pub fn with_error_estimate(mut self, err: Real) -> Self {
        self.error_estimate = Some(err);
        self
    }

    /// Attach a named diagnostic.
    pub fn with_result(mut self, key: &str, value: Real) -> Self {
        self.additional.insert(key.to_string(), value);
        self
    }

    /// Look up a named diagnostic.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrip() {
        let result = PricingResult::from_npv(7.64)
            .with_error_estimate(0.01)
            .with_result("delta", -0.45);
        assert_eq!(result.npv, 7.64);
        assert_eq!(result.error_estimate, Some(0.01));
        assert_eq!(result.result("delta"), Some(-0.45));
        assert_eq!(result.result("vega"), None);
    }
}
