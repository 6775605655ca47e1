//! # vp-processes
//!
//! Stochastic process models for the underlying asset.  A [`Process`] is a
//! tagged enum rather than a trait-object hierarchy: engines match on the
//! variant they support and reject the rest, so a new variant is a compile
//! error in every engine until its dispatch arm is written.
//!
//! Process parameters are the model's own (spot, variance dynamics);
//! the rate and volatility curves live in the market snapshot so that a
//! process never disagrees with the market it is priced against.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Black-Scholes-Merton process.
pub mod bsm;

/// Heston stochastic volatility process.
pub mod heston;

pub use bsm::BsmProcess;
pub use heston::HestonProcess;

use vp_core::Real;

/// The stochastic model driving the underlying asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Process {
    /// Geometric Brownian motion with deterministic rates and volatility.
    BlackScholesMerton(BsmProcess),
    /// Square-root stochastic variance (Heston).
    Heston(HestonProcess),
}

impl Process {
    /// The spot price of the underlying, common to every variant.
    pub fn spot(&self) -> Real {
        match self {
            Process::BlackScholesMerton(p) => p.spot(),
            Process::Heston(p) => p.spot(),
        }
    }

    /// Short human-readable model name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Process::BlackScholesMerton(_) => "Black-Scholes-Merton",
            Process::Heston(_) => "Heston",
        }
    }
}
