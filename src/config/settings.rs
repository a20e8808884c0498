//! Engine settings
//!
//! Everything configurable is accepted here as plain structured data at
//! construction time: which named profiles to use, optional multipliers on
//! top of them, the random seed and the break cadence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::input::mouse::MOVEMENT_PROFILES;
use crate::input::keyboard::TYPING_PROFILES;
use crate::input::{InputDriver, MovementOverrides, MovementProfile, TypingOverrides, TypingProfile};
use crate::session::{ActionOrchestrator, SessionProfile, SESSION_PROFILES};
use crate::stealth::{BreakSchedule, BreakTier, Humanizer, TierTiming};

/// Settings failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown {domain} profile: {name}")]
    UnknownPreset { domain: &'static str, name: String },
    #[error("Invalid {tier} break range: {reason}")]
    InvalidBreakRange { tier: BreakTier, reason: String },
}

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Session pacing profile name
    pub session_profile: String,
    /// Mouse profile name; the session profile's choice when `None`
    pub mouse_profile: Option<String>,
    /// Keyboard profile name; the session profile's choice when `None`
    pub keyboard_profile: Option<String>,
    /// Fixed seed for reproducible runs; OS entropy when `None`
    pub seed: Option<u64>,
    pub mouse_overrides: MovementOverrides,
    pub keyboard_overrides: TypingOverrides,
    pub breaks: BreakSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_profile: "human".to_string(),
            mouse_profile: None,
            keyboard_profile: None,
            seed: None,
            mouse_overrides: MovementOverrides::default(),
            keyboard_overrides: TypingOverrides::default(),
            breaks: BreakSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings; unknown profile names are kept and fall back later
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse and reject unknown profile names or malformed break ranges
    pub fn from_json_strict(json: &str) -> Result<Self, ConfigError> {
        let settings = Self::from_json(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check profile names and break ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_preset("session", &self.session_profile, &SESSION_PROFILES)?;
        if let Some(name) = &self.mouse_profile {
            check_preset("mouse", name, &MOVEMENT_PROFILES)?;
        }
        if let Some(name) = &self.keyboard_profile {
            check_preset("keyboard", name, &TYPING_PROFILES)?;
        }
        self.breaks.validate()
    }

    /// Create settings for long repetitive farming runs
    pub fn farming_preset() -> Self {
        Self {
            session_profile: "fast".to_string(),
            mouse_profile: Some("gamer".to_string()),
            breaks: BreakSettings {
                micro: TierTiming {
                    interval: (8.0, 20.0),
                    duration: (5.0, 20.0),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create settings for slow, deliberate play
    pub fn careful_preset() -> Self {
        Self {
            session_profile: "precise".to_string(),
            mouse_profile: Some("smooth".to_string()),
            keyboard_profile: Some("slow".to_string()),
            mouse_overrides: MovementOverrides {
                speed: Some(0.8),
                overshoot: Some(0.5),
                ..Default::default()
            },
            keyboard_overrides: TypingOverrides {
                error_rate: Some(0.5),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Resolve the session profile, device names and break cadence
    pub fn session(&self) -> SessionProfile {
        let mut profile = SessionProfile::preset(&self.session_profile).with_breaks(self.breaks.schedule());
        if let Some(mouse) = &self.mouse_profile {
            profile.mouse_profile = mouse.clone();
        }
        if let Some(keyboard) = &self.keyboard_profile {
            profile.keyboard_profile = keyboard.clone();
        }
        profile
    }

    /// Resolve the mouse profile with overrides applied
    pub fn mouse(&self, session: &SessionProfile) -> MovementProfile {
        let mut profile = MovementProfile::preset(&session.mouse_profile);
        profile.apply_overrides(&self.mouse_overrides);
        profile
    }

    /// Resolve the keyboard profile with overrides applied
    pub fn keyboard(&self, session: &SessionProfile) -> TypingProfile {
        let mut profile = TypingProfile::preset(&session.keyboard_profile);
        profile.apply_overrides(&self.keyboard_overrides);
        profile
    }

    pub fn humanizer(&self) -> Humanizer {
        match self.seed {
            Some(seed) => Humanizer::seeded(seed),
            None => Humanizer::new(),
        }
    }

    /// Build a ready orchestrator around `driver`
    pub fn build<D: InputDriver>(&self, driver: D, clock: Arc<dyn Clock>) -> ActionOrchestrator<D> {
        let session = self.session();
        let mouse = self.mouse(&session);
        let keyboard = self.keyboard(&session);

        ActionOrchestrator::new(driver, session, self.humanizer(), clock).with_device_profiles(mouse, keyboard)
    }
}

fn check_preset(domain: &'static str, name: &str, known: &[&str]) -> Result<(), ConfigError> {
    if known.contains(&name) {
        Ok(())
    } else {
        Err(ConfigError::UnknownPreset {
            domain,
            name: name.to_string(),
        })
    }
}

/// Break cadence per tier (intervals in minutes, durations in seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakSettings {
    pub micro: TierTiming,
    pub short: TierTiming,
    pub long: TierTiming,
}

impl Default for BreakSettings {
    fn default() -> Self {
        Self {
            micro: TierTiming::for_tier(BreakTier::Micro),
            short: TierTiming::for_tier(BreakTier::Short),
            long: TierTiming::for_tier(BreakTier::Long),
        }
    }
}

impl BreakSettings {
    pub fn schedule(&self) -> BreakSchedule {
        let mut schedule = BreakSchedule::default();
        schedule.micro = self.micro;
        schedule.short = self.short;
        schedule.long = self.long;
        schedule
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (tier, timing) in [
            (BreakTier::Micro, self.micro),
            (BreakTier::Short, self.short),
            (BreakTier::Long, self.long),
        ] {
            for (what, (lo, hi)) in [("interval", timing.interval), ("duration", timing.duration)] {
                if !(lo.is_finite() && hi.is_finite() && lo >= 0.0 && lo <= hi) {
                    return Err(ConfigError::InvalidBreakRange {
                        tier,
                        reason: format!("{} ({}, {}) must be ordered and non-negative", what, lo, hi),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input::RecordingDriver;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.session_profile, "human");
        assert!(settings.seed.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "session_profile": "tired",
            "seed": 42,
            "mouse_overrides": {"speed": 1.5},
            "breaks": {"micro": {"interval": [1.0, 2.0], "duration": [3.0, 4.0]}}
        }"#;
        let settings = Settings::from_json_strict(json).unwrap();

        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.mouse_overrides.speed, Some(1.5));
        assert_eq!(settings.breaks.micro.interval, (1.0, 2.0));
        assert_eq!(settings.breaks.long, TierTiming::for_tier(BreakTier::Long));

        let session = settings.session();
        assert_eq!(session.mouse_profile, "smooth");
        assert_eq!(session.breaks.micro.duration, (3.0, 4.0));
    }

    #[test]
    fn test_strict_rejects_unknown_preset() {
        let err = Settings::from_json_strict(r#"{"keyboard_profile": "hunt-and-peck"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset { domain: "keyboard", .. }));

        // Lenient parsing keeps the name; resolution falls back to human
        let settings = Settings::from_json(r#"{"keyboard_profile": "hunt-and-peck"}"#).unwrap();
        let session = settings.session();
        assert_eq!(settings.keyboard(&session).name, "human");
    }

    #[test]
    fn test_strict_rejects_inverted_break_range() {
        let json = r#"{"breaks": {"short": {"interval": [40.0, 20.0], "duration": [30.0, 120.0]}}}"#;
        let err = Settings::from_json_strict(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBreakRange { tier: BreakTier::Short, .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Settings::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_presets_validate_and_round_trip() {
        for settings in [Settings::farming_preset(), Settings::careful_preset()] {
            assert!(settings.validate().is_ok());
            let json = settings.to_json().unwrap();
            assert_eq!(Settings::from_json(&json).unwrap(), settings);
        }
    }

    #[test]
    fn test_careful_overrides_applied() {
        let settings = Settings::careful_preset();
        let session = settings.session();
        let plain = MovementProfile::preset("smooth");
        let mouse = settings.mouse(&session);

        assert_eq!(mouse.name, "smooth");
        assert!(mouse.params.speed_factor < plain.params.speed_factor);
    }

    #[test]
    fn test_seeded_builds_are_reproducible() {
        let settings = Settings {
            seed: Some(7),
            ..Settings::careful_preset()
        };

        let run = || {
            let clock = Arc::new(ManualClock::new());
            let mut orchestrator = settings.build(RecordingDriver::new(), clock);
            assert!(orchestrator.move_to(250, 120, None));
            assert!(orchestrator.type_text("bank", true, None));
            orchestrator.into_driver().events().to_vec()
        };

        assert_eq!(run(), run());
    }
}
