//! Pricing engines for vanilla options.
//!
//! Four methods behind one entry point:
//!
//! * [`analytic`] — Black-Scholes-Merton closed form and the semi-analytic
//!   Heston characteristic-function integral; European exercise only.
//! * [`binomial`] — Cox-Ross-Rubinstein lattice for all exercise styles
//!   under Black-Scholes-Merton dynamics.
//! * [`fdm`] — finite-difference PDE solvers, one-factor for
//!   Black-Scholes-Merton and operator-split two-factor for Heston.
//! * [`montecarlo`] — parallel path simulation with Longstaff-Schwartz for
//!   early exercise.
//!
//! [`price`] dispatches an [`Engine`] selection; unsupported combinations
//! come back as typed errors, never as silent substitutions.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic;
pub mod binomial;
pub mod dispatch;
pub mod fdm;
mod fdm_heston;
pub mod montecarlo;
pub mod results;
mod schedule;

pub use analytic::{black_scholes_merton, heston_price, BsmGreeks, HestonIntegration};
pub use binomial::BinomialConfig;
pub use dispatch::{price, price_cancellable, Engine};
pub use fdm::{FdConfig, FdScheme, TridiagonalOperator};
pub use montecarlo::McConfig;
pub use results::PricingResult;
