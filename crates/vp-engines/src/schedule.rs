//! Mapping exercise dates onto a uniform time grid.
//!
//! The lattice and PDE engines both walk a uniform grid of `steps + 1`
//! layers over [0, maturity] and need to know at which layers early exercise
//! is allowed.  Bermudan dates rarely land exactly on a layer; they are
//! snapped to the nearest one deterministically (ties round up), and the
//! largest snap distance is surfaced so callers can see the bias bound —
//! at most Δt/2 in time, which translates to O(Δt) in price.

use vp_core::{errors::Result, Real, Size};
use vp_instruments::Exercise;
use vp_termstructures::MarketTermStructure;

/// Which layers of a uniform time grid allow exercise.
pub(crate) struct ExerciseSchedule {
    /// `exercisable[i]` — early exercise allowed at layer `i` (0..=steps).
    /// The terminal layer is always the payoff regardless of this flag.
    pub exercisable: Vec<bool>,
    /// Largest |snapped time − exercise time| over all Bermudan dates.
    pub max_snap: Option<Real>,
}

impl ExerciseSchedule {
    pub fn build(
        exercise: &Exercise,
        market: &MarketTermStructure,
        maturity: Real,
        steps: Size,
    ) -> Result<Self> {
        let dt = maturity / steps as Real;
        let mut exercisable = vec![false; steps + 1];
        let mut max_snap: Option<Real> = None;

        match exercise {
            Exercise::European { .. } => {}
            Exercise::American { .. } => {
                for flag in exercisable.iter_mut() {
                    *flag = true;
                }
            }
            Exercise::Bermudan { dates } => {
                for &date in dates {
                    let t = market.time_to(date)?;
                    let layer = ((t / dt).round() as Size).min(steps);
                    let snap = (layer as Real * dt - t).abs();
                    max_snap = Some(max_snap.map_or(snap, |m: Real| m.max(snap)));
                    exercisable[layer] = true;
                }
            }
        }
        Ok(Self {
            exercisable,
            max_snap,
        })
    }
}
