//! Random number generators.
//!
//! Monte Carlo workers each own an independent MT19937-64 generator.  Worker
//! seeds are derived from the master seed with a SplitMix64 mix so that the
//! result of a run depends only on the master seed and the worker count,
//! never on thread scheduling.

use rand_mt::Mt19937GenRand64;
use vp_core::Real;

/// Derive a deterministic substream seed from a master seed and a stream
/// index.
///
/// SplitMix64 finalizer (Steele, Lea & Flood).  Distinct `(master, index)`
/// pairs produce well-separated seeds even for adjacent indices.
pub fn substream_seed(master: u64, index: u64) -> u64 {
    let mut z = master
        .wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A uniform pseudo-random number generator based on the Mersenne Twister
/// MT19937-64 algorithm.
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Generate the next uniform deviate in `[0, 1)`.
    pub fn next_real(&mut self) -> Real {
        let u: u64 = self.rng.next_u64();
        u as f64 / (u64::MAX as f64 + 1.0)
    }
}

/// An inverse-cumulative normal random number generator.
///
/// Wraps a uniform RNG and transforms its output through the inverse CDF of
/// the standard normal distribution.
pub struct InverseCumulativeNormalRng {
    inner: MersenneTwisterUniformRng,
}

impl InverseCumulativeNormalRng {
    /// Create a new generator backed by a Mersenne Twister with the given
    /// seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: MersenneTwisterUniformRng::new(seed),
        }
    }

    /// Generate the next standard-normal deviate.
    pub fn next_real(&mut self) -> Real {
        // Avoid exact 0 which would produce -∞
        let u = loop {
            let u = self.inner.next_real();
            if u > 0.0 {
                break u;
            }
        };
        crate::distributions::normal_cdf_inverse(u)
    }
}
