//! The vanilla option contract.

use crate::exercise::Exercise;
use crate::payoff::{OptionType, VanillaPayoff};
use vp_core::{errors::Result, Real};
use vp_time::Date;

/// A plain-vanilla option: a payoff plus an exercise style.
#[derive(Debug, Clone, PartialEq)]
pub struct VanillaOption {
    payoff: VanillaPayoff,
    exercise: Exercise,
}

impl VanillaOption {
    /// Combine a payoff and an exercise style into a contract.
    pub fn new(payoff: VanillaPayoff, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience constructor for a European option.
    pub fn european(option_type: OptionType, strike: Real, expiry: Date) -> Result<Self> {
        Ok(Self::new(
            VanillaPayoff::new(option_type, strike)?,
            Exercise::european(expiry),
        ))
    }

    /// Convenience constructor for an American option.
    pub fn american(option_type: OptionType, strike: Real, expiry: Date) -> Result<Self> {
        Ok(Self::new(
            VanillaPayoff::new(option_type, strike)?,
            Exercise::american(expiry),
        ))
    }

    /// The payoff.
    pub fn payoff(&self) -> &VanillaPayoff {
        &self.payoff
    }

    /// The exercise style.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The strike.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The expiry (the last possible exercise date).
    pub fn expiry(&self) -> Date {
        self.exercise.last_date()
    }
}
