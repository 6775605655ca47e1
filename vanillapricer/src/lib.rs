//! # vanillapricer
//!
//! A multi-method pricing library for vanilla equity options: closed-form
//! and semi-analytic formulas, a binomial lattice, finite-difference PDE
//! solvers, and parallel Monte Carlo with Longstaff-Schwartz early exercise.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `vp-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use vanillapricer::engines::{price, Engine};
//! use vanillapricer::instruments::{OptionType, VanillaOption};
//! use vanillapricer::processes::{BsmProcess, Process};
//! use vanillapricer::termstructures::{BlackConstantVol, FlatForward, MarketTermStructure};
//! use vanillapricer::time::{Actual365Fixed, Date};
//!
//! let today = Date::from_ymd(2014, 3, 7).unwrap();
//! let market = MarketTermStructure::new(
//!     today,
//!     Arc::new(Actual365Fixed),
//!     Arc::new(FlatForward::new(today, 0.001)),
//!     Arc::new(FlatForward::new(today, 0.0163)),
//!     Arc::new(BlackConstantVol::new(today, 0.20).unwrap()),
//! )
//! .unwrap();
//!
//! let expiry = Date::from_ymd(2015, 1, 21).unwrap();
//! let option = VanillaOption::european(OptionType::Call, 130.0, expiry).unwrap();
//! let process = Process::BlackScholesMerton(BsmProcess::new(127.62).unwrap());
//!
//! let result = price(&Engine::analytic(), &option, &process, &market).unwrap();
//! assert!((result.npv - 7.6365).abs() < 1e-3);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, errors, and cancellation.
pub use vp_core as core;

/// Dates, day counters, and calendars.
pub use vp_time as time;

/// Mathematical utilities: distributions, quadrature, regression, RNG,
/// statistics.
pub use vp_math as math;

/// Yield curves, volatility structures, and the market snapshot.
pub use vp_termstructures as termstructures;

/// Stochastic process definitions.
pub use vp_processes as processes;

/// Payoffs, exercise schedules, and the vanilla option contract.
pub use vp_instruments as instruments;

/// Pricing engines and the dispatch entry point.
pub use vp_engines as engines;
