//! Fatigue model
//!
//! A time-decaying tiredness level in `[base_level, 1.0]`. Activity pushes it
//! up at `accumulation_rate` per minute, rest pulls it back at
//! `recovery_rate` per minute. Consumers read the derived multipliers rather
//! than the raw level.
//!
//! The session-level variant additionally models a "second wind": a short,
//! randomly triggered period during which fatigue penalties are suppressed.

use std::time::Duration;

use super::humanize::Humanizer;
use crate::clock::duration_from_secs;

/// Intensity above which an update counts as activity rather than rest
const ACTIVITY_THRESHOLD: f64 = 0.1;

/// Second wind can only start above this level...
const SECOND_WIND_MIN_LEVEL: f64 = 0.7;
/// ...and during low-intensity updates
const SECOND_WIND_MAX_INTENSITY: f64 = 0.3;
const SECOND_WIND_CHANCE: f64 = 0.1;
/// Multiplier pinned on delay/error while second wind is active
const SECOND_WIND_FACTOR: f64 = 0.7;

/// Fatigue state for one device or for the whole session
#[derive(Debug, Clone)]
pub struct FatigueState {
    /// Floor the level never recovers below
    base_level: f64,
    /// Current level (base_level..=1.0)
    current_level: f64,
    /// Level gained per minute of activity at intensity 1.0
    pub accumulation_rate: f64,
    /// Level lost per minute of rest
    pub recovery_rate: f64,
    last_update: Duration,
    activity_intensity: f64,

    second_wind_enabled: bool,
    second_wind_active: bool,
    second_wind_start: Duration,
    second_wind_duration: Duration,

    delay_factor: f64,
    error_factor: f64,
}

impl Default for FatigueState {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl FatigueState {
    /// Create a fatigue model with the given accumulation rate per minute
    pub fn new(accumulation_rate: f64) -> Self {
        Self {
            base_level: 0.0,
            current_level: 0.0,
            accumulation_rate: accumulation_rate.max(0.0),
            recovery_rate: 0.05,
            last_update: Duration::ZERO,
            activity_intensity: 1.0,
            second_wind_enabled: false,
            second_wind_active: false,
            second_wind_start: Duration::ZERO,
            second_wind_duration: Duration::ZERO,
            delay_factor: 1.0,
            error_factor: 1.0,
        }
    }

    /// Set the resting floor (also raises the current level to it)
    pub fn with_base_level(mut self, base_level: f64) -> Self {
        self.base_level = base_level.clamp(0.0, 1.0);
        self.current_level = self.current_level.max(self.base_level);
        self
    }

    pub fn with_recovery_rate(mut self, recovery_rate: f64) -> Self {
        self.recovery_rate = recovery_rate.max(0.0);
        self
    }

    /// Start at a given level, clamped to `[base_level, 1.0]`
    pub fn with_level(mut self, level: f64) -> Self {
        self.current_level = level.clamp(self.base_level, 1.0);
        self.refresh_factors();
        self
    }

    /// Enable the session-level second wind behavior
    pub fn with_second_wind(mut self) -> Self {
        self.second_wind_enabled = true;
        self
    }

    /// Advance the model to `now` with the given activity intensity
    ///
    /// Returns the new level.
    pub fn update(&mut self, intensity: f64, now: Duration, humanizer: &mut Humanizer) -> f64 {
        let intensity = intensity.max(0.0);
        let elapsed_minutes = now.saturating_sub(self.last_update).as_secs_f64() / 60.0;
        self.activity_intensity = intensity;

        if self.second_wind_active
            && now.saturating_sub(self.second_wind_start) > self.second_wind_duration
        {
            self.second_wind_active = false;
            log::debug!("Second wind has expired");
        }

        if intensity > ACTIVITY_THRESHOLD {
            let increase = elapsed_minutes * self.accumulation_rate * intensity;
            self.current_level = (self.current_level + increase).min(1.0);
        } else {
            let decrease = elapsed_minutes * self.recovery_rate;
            self.current_level = (self.current_level - decrease).max(self.base_level);
        }

        self.refresh_factors();

        if self.second_wind_enabled
            && !self.second_wind_active
            && self.current_level > SECOND_WIND_MIN_LEVEL
            && intensity < SECOND_WIND_MAX_INTENSITY
            && humanizer.chance(SECOND_WIND_CHANCE)
        {
            self.trigger_second_wind(now, humanizer);
        }

        self.last_update = now;
        self.current_level
    }

    fn trigger_second_wind(&mut self, now: Duration, humanizer: &mut Humanizer) {
        let minutes = humanizer.uniform(2.0, 5.0) * (1.0 - self.current_level * 0.3);
        self.second_wind_active = true;
        self.second_wind_start = now;
        self.second_wind_duration = duration_from_secs(minutes * 60.0);

        self.current_level = (self.current_level - 0.2).max(0.5).max(self.base_level);
        self.refresh_factors();

        log::debug!("Second wind triggered! Duration: {:.1} minutes", minutes);
    }

    fn refresh_factors(&mut self) {
        if self.second_wind_active {
            self.delay_factor = SECOND_WIND_FACTOR;
            self.error_factor = SECOND_WIND_FACTOR;
        } else {
            self.delay_factor = 1.0 + self.current_level * 0.5;
            self.error_factor = 1.0 + self.current_level;
        }
    }

    /// Restore the base level and clear second wind; `now` becomes the new reference time
    pub fn reset(&mut self, now: Duration) {
        self.current_level = self.base_level;
        self.last_update = now;
        self.second_wind_active = false;
        self.delay_factor = 1.0;
        self.error_factor = 1.0;
    }

    /// Measure the next update from `now` without touching the level
    pub fn anchor(&mut self, now: Duration) {
        self.last_update = now;
    }

    /// Pick up where `previous` left off when this model replaces it
    ///
    /// The level (clamped to this model's floor), reference time, last
    /// intensity and any active second wind carry over; rates stay this model's own.
    pub fn continue_from(&mut self, previous: &FatigueState) {
        self.current_level = previous.current_level.clamp(self.base_level, 1.0);
        self.last_update = previous.last_update;
        self.activity_intensity = previous.activity_intensity;
        self.second_wind_active = self.second_wind_enabled && previous.second_wind_active;
        self.second_wind_start = previous.second_wind_start;
        self.second_wind_duration = previous.second_wind_duration;
        self.refresh_factors();
    }

    pub fn current_level(&self) -> f64 {
        self.current_level
    }

    pub fn base_level(&self) -> f64 {
        self.base_level
    }

    /// Intensity passed to the last update
    pub fn activity_intensity(&self) -> f64 {
        self.activity_intensity
    }

    pub fn is_second_wind_active(&self) -> bool {
        self.second_wind_active
    }

    /// Multiplier applied to every timing delay (1.0 when rested)
    pub fn delay_factor(&self) -> f64 {
        self.delay_factor
    }

    /// Session-level error multiplier
    pub fn error_factor(&self) -> f64 {
        self.error_factor
    }

    /// Keyboard error multiplier, roughly 1.0 to 3.0 and noisy
    pub fn typing_error_factor(&self, humanizer: &mut Humanizer) -> f64 {
        let base = 1.0 + self.current_level * 2.0;
        let variation = humanizer.uniform(0.8, 1.2);
        let intensity = 1.0 + self.activity_intensity * 0.3;

        base * variation * intensity
    }

    /// Pointer tremor multiplier, zero when rested
    pub fn tremor_factor(&self, humanizer: &mut Humanizer) -> f64 {
        let base = self.current_level * 1.5;
        let variation = humanizer.uniform(0.7, 1.3);
        let intensity = 1.0 + self.activity_intensity * 0.5;

        base * variation * intensity
    }

    /// Speed multiplier (0.5..=1.0, lower is slower)
    pub fn speed_factor(&self) -> f64 {
        (1.0 - self.current_level * 0.5).max(0.5)
    }

    /// Accuracy multiplier (0.5..=1.0)
    pub fn accuracy_factor(&self) -> f64 {
        (1.0 - self.current_level * 0.5).max(0.5)
    }

    /// Rhythm consistency multiplier (0.5..=1.0)
    pub fn consistency_factor(&self) -> f64 {
        self.accuracy_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minutes(m: f64) -> Duration {
        Duration::from_secs_f64(m * 60.0)
    }

    #[test]
    fn test_accumulate_then_recover() {
        let mut humanizer = Humanizer::seeded(1);
        let mut fatigue = FatigueState::new(0.01);

        let level = fatigue.update(1.0, minutes(60.0), &mut humanizer);
        assert!((level - 0.6).abs() < 1e-9);

        let level = fatigue.update(0.0, minutes(120.0), &mut humanizer);
        assert_eq!(level, 0.0);
    }

    #[test]
    fn test_level_capped_at_one() {
        let mut humanizer = Humanizer::seeded(2);
        let mut fatigue = FatigueState::new(0.5);

        let level = fatigue.update(2.0, minutes(30.0), &mut humanizer);
        assert_eq!(level, 1.0);
    }

    #[test]
    fn test_recovery_floors_at_base_level() {
        let mut humanizer = Humanizer::seeded(3);
        let mut fatigue = FatigueState::new(0.01).with_base_level(0.3).with_level(0.9);

        let level = fatigue.update(0.0, minutes(500.0), &mut humanizer);
        assert_eq!(level, 0.3);
    }

    #[test]
    fn test_replacement_continues_level_and_clock() {
        let mut humanizer = Humanizer::seeded(9);
        let mut outgoing = FatigueState::new(0.01);
        outgoing.update(1.0, minutes(30.0), &mut humanizer);

        let mut incoming = FatigueState::new(0.02).with_base_level(0.1);
        incoming.continue_from(&outgoing);
        assert!((incoming.current_level() - 0.3).abs() < 1e-9);
        assert!((incoming.delay_factor() - 1.15).abs() < 1e-9);

        // Only the ten minutes after the swap count, at the new rate
        let level = incoming.update(1.0, minutes(40.0), &mut humanizer);
        assert!((level - 0.5).abs() < 1e-9);

        let mut rested = FatigueState::new(0.02).with_base_level(0.4);
        rested.continue_from(&FatigueState::new(0.01));
        assert_eq!(rested.current_level(), 0.4);
    }

    #[test]
    fn test_anchor_skips_time_before_it() {
        let mut humanizer = Humanizer::seeded(10);
        let mut fatigue = FatigueState::new(0.01);
        fatigue.anchor(minutes(300.0));

        let level = fatigue.update(1.0, minutes(310.0), &mut humanizer);
        assert!((level - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_neutral_factors() {
        let mut humanizer = Humanizer::seeded(4);
        let mut fatigue = FatigueState::new(0.02).with_second_wind();
        fatigue.update(1.0, minutes(40.0), &mut humanizer);
        assert!(fatigue.delay_factor() > 1.0);

        fatigue.reset(minutes(40.0));

        assert_eq!(fatigue.delay_factor(), 1.0);
        assert_eq!(fatigue.error_factor(), 1.0);
        assert_eq!(fatigue.current_level(), 0.0);
        assert!(!fatigue.is_second_wind_active());
    }

    #[test]
    fn test_derived_factors() {
        let fatigue = FatigueState::new(0.01).with_level(0.6);

        assert!((fatigue.delay_factor() - 1.3).abs() < 1e-9);
        assert!((fatigue.error_factor() - 1.6).abs() < 1e-9);
        assert!((fatigue.speed_factor() - 0.7).abs() < 1e-9);
        assert!((fatigue.accuracy_factor() - 0.7).abs() < 1e-9);
        assert_eq!(fatigue.consistency_factor(), fatigue.accuracy_factor());
    }

    #[test]
    fn test_tremor_zero_when_rested() {
        let mut humanizer = Humanizer::seeded(5);
        let fatigue = FatigueState::new(0.01);

        assert_eq!(fatigue.tremor_factor(&mut humanizer), 0.0);
        let err = fatigue.typing_error_factor(&mut humanizer);
        assert!((0.8 * 1.3..=1.2 * 1.3).contains(&err));
    }

    #[test]
    fn test_second_wind_cycle() {
        let mut humanizer = Humanizer::seeded(6);
        let mut fatigue = FatigueState::new(0.01).with_level(0.9).with_second_wind();

        // Same timestamp: no recovery, only the Bernoulli trial varies.
        let mut triggered = false;
        for _ in 0..500 {
            fatigue.update(0.0, Duration::ZERO, &mut humanizer);
            if fatigue.is_second_wind_active() {
                triggered = true;
                break;
            }
        }
        assert!(triggered);
        assert!((fatigue.current_level() - 0.7).abs() < 1e-9);
        assert_eq!(fatigue.delay_factor(), 0.7);
        assert_eq!(fatigue.error_factor(), 0.7);

        // Second wind lasts at most five minutes.
        fatigue.update(1.0, minutes(6.0), &mut humanizer);
        assert!(!fatigue.is_second_wind_active());
        let level = fatigue.current_level();
        assert!((fatigue.delay_factor() - (1.0 + level * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_no_second_wind_without_flag() {
        let mut humanizer = Humanizer::seeded(7);
        let mut fatigue = FatigueState::new(0.01).with_level(0.95);

        for _ in 0..500 {
            fatigue.update(0.0, Duration::ZERO, &mut humanizer);
        }
        assert!(!fatigue.is_second_wind_active());
    }

    proptest! {
        #[test]
        fn prop_activity_never_decreases(steps in proptest::collection::vec((0.3f64..3.0, 0.0f64..30.0), 1..40)) {
            let mut humanizer = Humanizer::seeded(8);
            let mut fatigue = FatigueState::new(0.02).with_second_wind();
            let mut now = 0.0;
            let mut previous = fatigue.current_level();

            for (intensity, step) in steps {
                now += step;
                let level = fatigue.update(intensity, minutes(now), &mut humanizer);
                prop_assert!(level >= previous);
                prop_assert!(level <= 1.0);
                previous = level;
            }
        }

        #[test]
        fn prop_rest_never_increases(start in 0.0f64..1.0, steps in proptest::collection::vec((0.0f64..0.1, 0.0f64..30.0), 1..40)) {
            let mut humanizer = Humanizer::seeded(9);
            let mut fatigue = FatigueState::new(0.02).with_base_level(0.1).with_level(start);
            let mut now = 0.0;
            let mut previous = fatigue.current_level();

            for (intensity, step) in steps {
                now += step;
                let level = fatigue.update(intensity, minutes(now), &mut humanizer);
                prop_assert!(level <= previous);
                prop_assert!(level >= 0.1);
                previous = level;
            }
        }
    }
}
