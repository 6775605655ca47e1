//! # vp-core
//!
//! Core types, the error taxonomy, and the cooperative cancellation token
//! shared across all other crates in the workspace.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Cooperative cancellation for long-running solvers.
pub mod cancellation;

/// Error types and the `ensure!` / `fail!` convenience macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use cancellation::CancellationToken;
pub use errors::{Error, Result};
