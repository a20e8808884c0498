//! Session-level pacing profiles
//!
//! A session profile sets the pace between actions, how often and how long
//! the operator stops to think, which device profiles to use, and the
//! session fatigue and break state.

use serde::{Deserialize, Serialize};

use crate::stealth::{ActionPersonality, BreakSchedule, FatigueState};

/// Named session profiles
pub const SESSION_PROFILES: [&str; 5] = ["human", "fast", "precise", "erratic", "tired"];

/// Session fatigue recovers this much per minute of rest
const SESSION_RECOVERY_RATE: f64 = 0.05;

/// Raw pacing rates before personality is applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRates {
    /// Multiplier on every inter-action delay
    pub delay_factor: f64,
    pub delay_variability: f64,
    /// Chance of a thinking pause before an action
    pub think_probability: f64,
    pub think_duration_factor: f64,
    /// Session fatigue gained per active minute
    pub fatigue_rate: f64,
}

impl Default for SessionRates {
    fn default() -> Self {
        Self {
            delay_factor: 1.0,
            delay_variability: 1.0,
            think_probability: 0.1,
            think_duration_factor: 1.0,
            fatigue_rate: 0.005,
        }
    }
}

impl SessionRates {
    fn clamped(self) -> Self {
        Self {
            delay_factor: self.delay_factor.clamp(0.1, 5.0),
            delay_variability: self.delay_variability.clamp(0.1, 5.0),
            think_probability: self.think_probability.clamp(0.0, 0.5),
            think_duration_factor: self.think_duration_factor.clamp(0.1, 5.0),
            fatigue_rate: self.fatigue_rate.clamp(0.0, 0.1),
        }
    }
}

/// Pacing, device profile names, and session fatigue/break state
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub name: String,
    pub rates: SessionRates,
    pub mouse_profile: String,
    pub keyboard_profile: String,
    personality: ActionPersonality,
    pub fatigue: FatigueState,
    pub breaks: BreakSchedule,
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self::preset("human")
    }
}

impl SessionProfile {
    /// Build a profile with `human` devices; personality is folded in once
    pub fn new(name: impl Into<String>, rates: SessionRates, personality: ActionPersonality) -> Self {
        let rates = rates.clamped();
        let fatigue = FatigueState::new(rates.fatigue_rate)
            .with_recovery_rate(SESSION_RECOVERY_RATE)
            .with_second_wind();

        let mut profile = Self {
            name: name.into(),
            rates,
            mouse_profile: "human".to_string(),
            keyboard_profile: "human".to_string(),
            personality,
            fatigue,
            breaks: BreakSchedule::default(),
        };
        profile.apply_personality();
        profile
    }

    fn apply_personality(&mut self) {
        let traits = *self.personality.traits();
        self.rates.delay_factor *= 0.5 + traits.patience;
        self.rates.delay_variability *= 0.5 + (1.0 - traits.consistency);
        self.rates.think_probability *= 0.5 + traits.thoroughness;
        self.rates.think_duration_factor *= 0.5 + traits.patience;
        self.breaks.probability_factor = traits.break_frequency;
    }

    /// Look up a named profile, falling back to `human`
    pub fn preset(name: &str) -> Self {
        let (rates, devices, personality) = match name {
            "human" => ((1.0, 1.0, 0.1, 1.0, 0.005), ("human", "human"), "balanced"),
            "fast" => ((0.5, 0.7, 0.05, 0.5, 0.008), ("fast", "fast"), "efficient"),
            "precise" => ((1.2, 0.5, 0.15, 0.7, 0.004), ("precise", "precise"), "careful"),
            "erratic" => ((0.8, 2.0, 0.2, 1.5, 0.007), ("erratic", "erratic"), "impatient"),
            "tired" => ((1.5, 1.8, 0.15, 2.0, 0.01), ("smooth", "slow"), "balanced"),
            other => {
                log::warn!("Unknown session profile: {}, using 'human'", other);
                return Self::preset("human");
            }
        };

        let (delay_factor, delay_variability, think_probability, think_duration_factor, fatigue_rate) = rates;
        let rates = SessionRates {
            delay_factor,
            delay_variability,
            think_probability,
            think_duration_factor,
            fatigue_rate,
        };

        let mut profile = Self::new(name, rates, ActionPersonality::preset(personality))
            .with_devices(devices.0, devices.1);
        if name == "tired" {
            profile.fatigue = profile.fatigue.with_base_level(0.5);
        }
        profile
    }

    /// Use the named mouse and keyboard profiles
    pub fn with_devices(mut self, mouse: impl Into<String>, keyboard: impl Into<String>) -> Self {
        self.mouse_profile = mouse.into();
        self.keyboard_profile = keyboard.into();
        self
    }

    /// Replace the break schedule, keeping the personality's break frequency
    pub fn with_breaks(mut self, breaks: BreakSchedule) -> Self {
        self.breaks = breaks.with_probability_factor(self.personality.traits().break_frequency);
        self
    }

    pub fn personality(&self) -> &ActionPersonality {
        &self.personality
    }
}
