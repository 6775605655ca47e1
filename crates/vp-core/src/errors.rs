//! Error types for vanillapricer.
//!
//! A single `thiserror`-derived enum covers every failure an engine or market
//! object can report.  Pricing functions return these as values; numerical
//! inner loops never panic in library code, they surface arithmetic faults
//! (NaN propagation and the like) as [`Error::Convergence`].

use thiserror::Error;

/// The top-level error type used throughout vanillapricer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The engine cannot handle the contract's exercise style
    /// (e.g. a closed-form engine asked to price American exercise).
    #[error("unsupported exercise: {0}")]
    UnsupportedExercise(String),

    /// The engine cannot handle the stochastic process variant
    /// (e.g. a CRR lattice asked to price Heston dynamics).
    #[error("unsupported process: {0}")]
    UnsupportedProcess(String),

    /// A constructor or query was given an invalid parameter
    /// (negative volatility, non-increasing exercise dates, strike ≤ 0,
    /// a query outside a curve's domain, …).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A finite-difference scheme's stability bound was violated; solving
    /// would diverge rather than approximate the PDE solution.
    #[error("grid instability: {0}")]
    GridInstability(String),

    /// A numerical procedure (integration, regression, time stepping) failed
    /// to converge within its tolerance, or produced non-finite values.
    #[error("failed to converge: {0}")]
    Convergence(String),

    /// The computation was cancelled cooperatively before completion.
    #[error("cancelled")]
    Cancelled,
}

/// Shorthand `Result` type used throughout vanillapricer.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate a precondition, returning [`Error::InvalidParameter`] on failure.
///
/// # Example
/// ```
/// use vp_core::ensure;
/// fn positive(x: f64) -> vp_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidParameter(
                format!($($msg)*)
            ));
        }
    };
}

/// Return [`Error::Convergence`] immediately.
///
/// # Example
/// ```
/// use vp_core::fail;
/// fn always_err() -> vp_core::Result<()> {
///     fail!("iteration budget exhausted");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Convergence(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = Error::UnsupportedExercise("American exercise has no closed form".into());
        assert!(e.to_string().contains("unsupported exercise"));
        assert_eq!(Error::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn ensure_macro_passes_and_fails() {
        fn check(x: f64) -> Result<f64> {
            ensure!(x >= 0.0, "x must be non-negative, got {x}");
            Ok(x.sqrt())
        }
        assert!(check(4.0).is_ok());
        assert!(matches!(check(-1.0), Err(Error::InvalidParameter(_))));
    }
}
