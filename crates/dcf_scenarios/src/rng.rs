//! Seeded random number generation for scenario draws.
//!
//! Every scenario owns its own generator, seeded from the run's base seed
//! and the scenario id through [`scenario_seed`]. Scenario *i* therefore
//! draws the same values whether it is generated alone, sequentially or on
//! any rayon worker.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// SplitMix64 finaliser.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one scenario: `splitmix64(base_seed ^ scenario_id)`.
#[inline]
pub fn scenario_seed(base_seed: u64, scenario_id: u64) -> u64 {
    splitmix64(base_seed ^ scenario_id)
}

/// Seeded generator for one scenario.
///
/// # Examples
///
/// ```rust
/// use dcf_scenarios::rng::ScenarioRng;
///
/// let mut a = ScenarioRng::for_scenario(42, 7);
/// let mut b = ScenarioRng::for_scenario(42, 7);
/// assert_eq!(a.gen_normal(), b.gen_normal());
/// assert_eq!(a.seed(), b.seed());
/// ```
pub struct ScenarioRng {
    inner: StdRng,
    seed: u64,
}

impl ScenarioRng {
    /// Generator initialised with `seed` directly.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generator for `scenario_id` under `base_seed`.
    #[inline]
    pub fn for_scenario(base_seed: u64, scenario_id: u64) -> Self {
        Self::from_seed(scenario_seed(base_seed, scenario_id))
    }

    /// Seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Standard normal variate.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splitmix64_reference_values() {
        // First outputs of the reference SplitMix64 stream seeded with 0
        assert_eq!(splitmix64(0), 0xE220_A839_7B1D_CDAF);
        assert_eq!(
            splitmix64(0x9E37_79B9_7F4A_7C15),
            0x6E78_9E6A_A1B9_65F4
        );
    }

    #[test]
    fn test_distinct_scenarios_get_distinct_seeds() {
        let seeds: std::collections::HashSet<u64> =
            (0..1_000).map(|id| scenario_seed(42, id)).collect();
        assert_eq!(seeds.len(), 1_000);
    }

    #[test]
    fn test_same_scenario_same_stream() {
        let mut a = ScenarioRng::for_scenario(7, 99);
        let mut b = ScenarioRng::for_scenario(7, 99);
        for _ in 0..16 {
            assert_eq!(a.gen_normal(), b.gen_normal());
        }
    }
}
