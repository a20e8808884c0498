//! Seeded randomness for human behavior simulation
//!
//! Every stochastic decision in the engine (jitter, error rolls, pauses,
//! breaks) draws from a [`Humanizer`], so a fixed seed reproduces a whole
//! session exactly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Mouse button contact time, seconds
const CLICK_HOLD_RANGE: (f64, f64) = (0.05, 0.15);

/// Seedable random source with human-timing helpers
#[derive(Debug, Clone)]
pub struct Humanizer {
    rng: StdRng,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer {
    /// Create a humanizer seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a reproducible humanizer
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derive an independent child stream from this one
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.gen())
    }

    /// Uniform sample from `[0, 1)`
    pub fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Bernoulli trial with success probability `probability`
    pub fn chance(&mut self, probability: f64) -> bool {
        self.roll() < probability
    }

    /// Uniform sample from `[low, high]`; a degenerate range returns `low`
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !low.is_finite() || !high.is_finite() || high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Symmetric sample from `[-amount, amount]`
    pub fn spread(&mut self, amount: f64) -> f64 {
        let amount = amount.abs();
        self.uniform(-amount, amount)
    }

    /// Scale `value` by a random factor in `[1 - variance, 1 + variance]`
    pub fn vary(&mut self, value: f64, variance: f64) -> f64 {
        value * self.uniform(1.0 - variance, 1.0 + variance)
    }

    /// Uniform integer from the inclusive range `[low, high]`
    pub fn int_between(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Uniform count from the inclusive range `[low, high]`
    pub fn count_between(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Pick a random element, `None` when empty
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Button hold duration in seconds
    pub fn tap_duration(&mut self) -> f64 {
        self.uniform(CLICK_HOLD_RANGE.0, CLICK_HOLD_RANGE.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_streams_repeat() {
        let mut a = Humanizer::seeded(7);
        let mut b = Humanizer::seeded(7);

        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_uniform_bounds() {
        let mut humanizer = Humanizer::seeded(1);

        for _ in 0..500 {
            let v = humanizer.uniform(0.3, 0.8);
            assert!((0.3..=0.8).contains(&v));
        }
        assert_eq!(humanizer.uniform(2.0, 2.0), 2.0);
        assert_eq!(humanizer.uniform(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_pick_and_counts() {
        let mut humanizer = Humanizer::seeded(2);
        let empty: [u8; 0] = [];

        assert!(humanizer.pick(&empty).is_none());
        assert_eq!(humanizer.pick(&["only"]), Some(&"only"));
        assert_eq!(humanizer.count_between(4, 2), 4);
        assert_eq!(humanizer.int_between(-3, -3), -3);
        for _ in 0..200 {
            assert!((1..=3).contains(&humanizer.count_between(1, 3)));
        }
    }

    #[test]
    fn test_forks_diverge_but_repeat() {
        let mut a = Humanizer::seeded(11);
        let mut b = Humanizer::seeded(11);
        let mut child_a = a.fork();
        let mut child_b = b.fork();

        assert_eq!(child_a.roll(), child_b.roll());
        assert_ne!(a.roll(), child_a.roll());
    }

    #[test]
    fn test_tap_duration_range() {
        let mut humanizer = Humanizer::seeded(3);

        let holds: Vec<f64> = (0..200).map(|_| humanizer.tap_duration()).collect();
        assert!(holds.iter().all(|d| (0.05..=0.15).contains(d)));
    }

    #[test]
    fn test_chance_extremes() {
        let mut humanizer = Humanizer::seeded(4);

        for _ in 0..100 {
            assert!(!humanizer.chance(0.0));
            assert!(humanizer.chance(1.0));
        }
    }

    #[test]
    fn test_vary_spreads_both_ways() {
        let mut humanizer = Humanizer::seeded(5);
        let mut min_seen = f64::MAX;
        let mut max_seen = f64::MIN;

        for _ in 0..1000 {
            let v = humanizer.vary(1.0, 0.3);
            min_seen = min_seen.min(v);
            max_seen = max_seen.max(v);
        }

        assert!(min_seen < 1.0 && min_seen >= 0.7);
        assert!(max_seen > 1.0 && max_seen <= 1.3);
    }
}
