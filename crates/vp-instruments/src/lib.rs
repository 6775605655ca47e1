//! # vp-instruments
//!
//! The contract side of the library: plain-vanilla payoffs, exercise styles,
//! and the [`VanillaOption`] that combines them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Exercise styles.
pub mod exercise;

/// The vanilla option contract.
pub mod option;

/// Option payoffs.
pub mod payoff;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use exercise::Exercise;
pub use option::VanillaOption;
pub use payoff::{OptionType, VanillaPayoff};
