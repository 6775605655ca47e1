//! # vp-termstructures
//!
//! Market data structures: yield curves (risk-free and dividend), Black
//! volatility structures, and the [`MarketTermStructure`] snapshot that
//! bundles them under a single evaluation date.
//!
//! All queries are fallible: a curve refuses to extrapolate past its last
//! pillar and reports [`vp_core::Error::InvalidParameter`] instead of
//! silently flattening the tail.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// The market snapshot consumed by pricing engines.
pub mod market;

/// Black volatility term structures.
pub mod vol_surface;

/// Yield (interest-rate and dividend) term structures.
pub mod yield_curve;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use market::MarketTermStructure;
pub use vol_surface::{BlackConstantVol, BlackVarianceCurve, BlackVolTermStructure};
pub use yield_curve::{FlatForward, YieldTermStructure, ZeroCurve};
