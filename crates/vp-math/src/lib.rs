//! # vp-math
//!
//! Numerical building blocks for the pricing engines: the standard normal
//! distribution and its inverse, adaptive quadrature, Mersenne Twister based
//! random number generation with deterministic substream seeding, an
//! incremental statistics accumulator with a merge operation, and linear
//! least-squares regression for Longstaff-Schwartz continuation values.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Standard normal pdf, cdf, and inverse cdf.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// Linear least-squares regression.
pub mod lsq;

/// Random number generators and substream seeding.
pub mod rng;

/// Incremental, mergeable statistics accumulator.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use integrals::{Integrator, SimpsonIntegral};
pub use lsq::LinearLeastSquaresRegression;
pub use rng::{substream_seed, InverseCumulativeNormalRng, MersenneTwisterUniformRng};
pub use statistics::Statistics;
