//! Engine selection and the single pricing entry point.
//!
//! A pricing request is four values: an engine, a contract, a process, and a
//! market snapshot.  [`price`] routes the request to the selected method and
//! returns either a [`PricingResult`] or an error naming exactly what the
//! combination cannot do — nothing is approximated silently and nothing is
//! rerouted to another engine behind the caller's back.

use tracing::debug_span;
use vp_core::{
    errors::{Error, Result},
    CancellationToken,
};
use vp_instruments::{Exercise, VanillaOption};
use vp_processes::Process;
use vp_termstructures::MarketTermStructure;

use crate::analytic::{self, HestonIntegration};
use crate::binomial::{self, BinomialConfig};
use crate::fdm::{self, FdConfig, FdScheme};
use crate::montecarlo::{self, McConfig};
use crate::results::PricingResult;

/// The pricing method and its configuration.
#[derive(Debug, Clone, Copy)]
pub enum Engine {
    /// Closed-form Black-Scholes-Merton, semi-analytic Heston.
    /// European exercise only.
    Analytic(HestonIntegration),
    /// Cox-Ross-Rubinstein lattice.  Black-Scholes-Merton dynamics only.
    Binomial(BinomialConfig),
    /// Finite-difference PDE solver, one- or two-factor.
    FiniteDifference(FdConfig),
    /// Path simulation, Longstaff-Schwartz for early exercise.
    MonteCarlo(McConfig),
}

impl Engine {
    /// The analytic engine with default integration settings.
    pub fn analytic() -> Self {
        Engine::Analytic(HestonIntegration::default())
    }

    /// The binomial engine with the default step count.
    pub fn binomial() -> Self {
        Engine::Binomial(BinomialConfig::default())
    }

    /// The finite-difference engine with the default grid.
    pub fn finite_difference() -> Self {
        Engine::FiniteDifference(FdConfig::default())
    }

    /// The Monte Carlo engine with the default simulation settings.
    pub fn monte_carlo() -> Self {
        Engine::MonteCarlo(McConfig::default())
    }

    fn name(&self) -> &'static str {
        match self {
            Engine::Analytic(_) => "analytic",
            Engine::Binomial(_) => "binomial",
            Engine::FiniteDifference(_) => "finite-difference",
            Engine::MonteCarlo(_) => "monte-carlo",
        }
    }

    /// Check up front whether this engine can price the given combination,
    /// without running it.  The same checks fire inside `price`, so calling
    /// this first is optional; it exists so a caller can validate a
    /// configuration before committing to a long computation.
    pub fn supports(&self, contract: &VanillaOption, process: &Process) -> Result<()> {
        match (self, contract.exercise(), process) {
            (Engine::Analytic(_), Exercise::European { .. }, _) => Ok(()),
            (Engine::Analytic(_), other, _) => Err(Error::UnsupportedExercise(format!(
                "analytic engine has no closed form for {} exercise",
                other.name()
            ))),
            (Engine::Binomial(_), _, Process::Heston(_)) => {
                Err(Error::UnsupportedProcess(format!(
                    "binomial lattice requires a single deterministic volatility; \
                     {} dynamics have none",
                    process.name()
                )))
            }
            (Engine::FiniteDifference(config), _, Process::Heston(_))
                if config.scheme == FdScheme::Explicit =>
            {
                Err(Error::InvalidParameter(
                    "the two-factor solver is operator-split; the explicit scheme is not \
                     available"
                        .to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Price a contract, checking cancellation against the given token.
///
/// Long-running engines poll the token between layers or path batches and
/// return [`Error::Cancelled`](vp_core::Error::Cancelled) without a partial
/// result once it trips.
pub fn price_cancellable(
    engine: &Engine,
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
    token: &CancellationToken,
) -> Result<PricingResult> {
    let span = debug_span!(
        "price",
        engine = engine.name(),
        process = process.name(),
        exercise = contract.exercise().name()
    );
    let _guard = span.enter();

    let mut result = match engine {
        Engine::Analytic(integration) => analytic::price(contract, process, market, *integration),
        Engine::Binomial(config) => binomial::price(contract, process, market, *config, token),
        Engine::FiniteDifference(config) => fdm::price(contract, process, market, *config, token),
        Engine::MonteCarlo(config) => montecarlo::price(contract, process, market, *config, token),
    }?;
    result.method = engine.name();
    Ok(result)
}

/// Price a contract with a fresh, never-cancelled token.
pub fn price(
    engine: &Engine,
    contract: &VanillaOption,
    process: &Process,
    market: &MarketTermStructure,
) -> Result<PricingResult> {
    price_cancellable(engine, contract, process, market, &CancellationToken::new())
}
