//! Option payoffs.

use vp_core::{ensure, errors::Result, Real};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// The right to buy at the strike.
    Call,
    /// The right to sell at the strike.
    Put,
}

impl OptionType {
    /// `+1` for a call, `-1` for a put; the φ in `max(φ·(S − K), 0)`.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// A plain-vanilla payoff: `max(φ·(S − K), 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanillaPayoff {
    option_type: OptionType,
    strike: Real,
}

impl VanillaPayoff {
    /// Create a payoff.  The strike must be positive and finite.
    pub fn new(option_type: OptionType, strike: Real) -> Result<Self> {
        ensure!(
            strike.is_finite() && strike > 0.0,
            "strike must be positive, got {strike}"
        );
        Ok(Self {
            option_type,
            strike,
        })
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// The strike.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// The intrinsic value at spot `s`.
    pub fn value(&self, s: Real) -> Real {
        (self.option_type.sign() * (s - self.strike)).max(0.0)
    }
}
