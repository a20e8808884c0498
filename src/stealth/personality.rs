//! Personality profiles
//!
//! A personality is an immutable bundle of traits that shapes how strongly
//! fatigue and context affect behavior. There is one family per domain
//! (pointer, typing, action sequencing), each with five named presets.
//! Traits are clamped on construction and derived composites are computed
//! once.

use serde::{Deserialize, Serialize};

/// Pointer personality preset names
pub const MOUSE_PRESETS: [&str; 5] = ["casual", "precise", "gamer", "erratic", "relaxed"];
/// Typing personality preset names
pub const TYPING_PRESETS: [&str; 5] = ["casual", "precise", "fast", "careful", "sloppy"];
/// Action-sequencing personality preset names
pub const ACTION_PRESETS: [&str; 5] = ["balanced", "efficient", "careful", "impatient", "adaptive"];

/// Raw pointer traits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseTraits {
    /// Base accuracy (0.1 to 1.0)
    pub accuracy: f64,
    /// Preferred movement speed (0.1 to 1.0)
    pub speed_preference: f64,
    /// Tendency to jittery movement (0.0 to 1.0)
    pub jitter_tendency: f64,
    /// Tendency to overshoot targets (0.0 to 1.0)
    pub overshoot_tendency: f64,
    /// Tendency to cut corners (0.0 to 1.0)
    pub corner_cutting: f64,
    /// Preference for acceleration over constant speed (0.0 to 1.0)
    pub acceleration_preference: f64,
    /// Base reaction time in seconds (0.05 to 0.5)
    pub reaction_time: f64,
}

impl Default for MouseTraits {
    fn default() -> Self {
        Self {
            accuracy: 0.8,
            speed_preference: 0.8,
            jitter_tendency: 0.5,
            overshoot_tendency: 0.5,
            corner_cutting: 0.5,
            acceleration_preference: 0.5,
            reaction_time: 0.2,
        }
    }
}

impl MouseTraits {
    fn clamped(self) -> Self {
        Self {
            accuracy: self.accuracy.clamp(0.1, 1.0),
            speed_preference: self.speed_preference.clamp(0.1, 1.0),
            jitter_tendency: self.jitter_tendency.clamp(0.0, 1.0),
            overshoot_tendency: self.overshoot_tendency.clamp(0.0, 1.0),
            corner_cutting: self.corner_cutting.clamp(0.0, 1.0),
            acceleration_preference: self.acceleration_preference.clamp(0.0, 1.0),
            reaction_time: self.reaction_time.clamp(0.05, 0.5),
        }
    }
}

/// Pointer personality
#[derive(Debug, Clone, PartialEq)]
pub struct MousePersonality {
    name: String,
    traits: MouseTraits,
    consistency: f64,
    smoothness: f64,
    patience: f64,
}

impl Default for MousePersonality {
    fn default() -> Self {
        Self::new("default", MouseTraits::default())
    }
}

impl MousePersonality {
    pub fn new(name: impl Into<String>, traits: MouseTraits) -> Self {
        let traits = traits.clamped();
        Self {
            name: name.into(),
            consistency: 1.0 - traits.jitter_tendency * 0.5,
            smoothness: 1.0 - traits.jitter_tendency * 0.7,
            patience: 1.0 - traits.speed_preference * 0.5,
            traits,
        }
    }

    /// Look up a named preset, falling back to `casual`
    pub fn preset(name: &str) -> Self {
        let traits = match name {
            "casual" => MouseTraits {
                accuracy: 0.7,
                speed_preference: 0.6,
                jitter_tendency: 0.4,
                overshoot_tendency: 0.5,
                corner_cutting: 0.6,
                acceleration_preference: 0.5,
                reaction_time: 0.25,
            },
            "precise" => MouseTraits {
                accuracy: 0.95,
                speed_preference: 0.5,
                jitter_tendency: 0.1,
                overshoot_tendency: 0.1,
                corner_cutting: 0.2,
                acceleration_preference: 0.3,
                reaction_time: 0.15,
            },
            "gamer" => MouseTraits {
                accuracy: 0.85,
                speed_preference: 0.9,
                jitter_tendency: 0.3,
                overshoot_tendency: 0.4,
                corner_cutting: 0.7,
                acceleration_preference: 0.8,
                reaction_time: 0.1,
            },
            "erratic" => MouseTraits {
                accuracy: 0.6,
                speed_preference: 0.7,
                jitter_tendency: 0.8,
                overshoot_tendency: 0.7,
                corner_cutting: 0.8,
                acceleration_preference: 0.6,
                reaction_time: 0.3,
            },
            "relaxed" => MouseTraits {
                accuracy: 0.75,
                speed_preference: 0.4,
                jitter_tendency: 0.2,
                overshoot_tendency: 0.3,
                corner_cutting: 0.4,
                acceleration_preference: 0.3,
                reaction_time: 0.3,
            },
            other => {
                log::warn!("Unknown mouse personality: {}, using 'casual'", other);
                return Self::preset("casual");
            }
        };
        Self::new(name, traits)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn traits(&self) -> &MouseTraits {
        &self.traits
    }

    /// `1 - jitter * 0.5`
    pub fn consistency(&self) -> f64 {
        self.consistency
    }

    /// `1 - jitter * 0.7`
    pub fn smoothness(&self) -> f64 {
        self.smoothness
    }

    /// `1 - speed_preference * 0.5`
    pub fn patience(&self) -> f64 {
        self.patience
    }
}

/// Raw typing traits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingTraits {
    /// Base accuracy (0.5 to 1.0, higher = fewer errors)
    pub accuracy: f64,
    /// Base speed (0.5 to 2.0)
    pub speed: f64,
    /// Rhythm consistency (0.1 to 1.0)
    pub consistency: f64,
    /// Tendency to hesitate on complex words (0.0 to 1.0)
    pub hesitation: f64,
    /// Thoroughness in correcting errors (0.0 to 1.0)
    pub correction_thoroughness: f64,
    pub capitalization_accuracy: f64,
    pub punctuation_accuracy: f64,
}

impl Default for TypingTraits {
    fn default() -> Self {
        Self {
            accuracy: 0.95,
            speed: 1.0,
            consistency: 0.8,
            hesitation: 0.5,
            correction_thoroughness: 0.9,
            capitalization_accuracy: 0.95,
            punctuation_accuracy: 0.9,
        }
    }
}

impl TypingTraits {
    fn clamped(self) -> Self {
        Self {
            accuracy: self.accuracy.clamp(0.5, 1.0),
            speed: self.speed.clamp(0.5, 2.0),
            consistency: self.consistency.clamp(0.1, 1.0),
            hesitation: self.hesitation.clamp(0.0, 1.0),
            correction_thoroughness: self.correction_thoroughness.clamp(0.0, 1.0),
            capitalization_accuracy: self.capitalization_accuracy.clamp(0.5, 1.0),
            punctuation_accuracy: self.punctuation_accuracy.clamp(0.5, 1.0),
        }
    }
}

/// Typing personality
#[derive(Debug, Clone, PartialEq)]
pub struct TypingPersonality {
    name: String,
    traits: TypingTraits,
    patience: f64,
    attention_to_detail: f64,
}

impl Default for TypingPersonality {
    fn default() -> Self {
        Self::new("default", TypingTraits::default())
    }
}

impl TypingPersonality {
    pub fn new(name: impl Into<String>, traits: TypingTraits) -> Self {
        let traits = traits.clamped();
        Self {
            name: name.into(),
            patience: 1.0 - traits.speed * 0.4,
            attention_to_detail: (traits.accuracy + traits.correction_thoroughness) / 2.0,
            traits,
        }
    }

    /// Look up a named preset, falling back to `casual`
    pub fn preset(name: &str) -> Self {
        let traits = match name {
            "casual" => TypingTraits {
                accuracy: 0.92,
                speed: 1.0,
                consistency: 0.7,
                hesitation: 0.5,
                correction_thoroughness: 0.8,
                capitalization_accuracy: 0.9,
                punctuation_accuracy: 0.85,
            },
            "precise" => TypingTraits {
                accuracy: 0.98,
                speed: 0.9,
                consistency: 0.9,
                hesitation: 0.3,
                correction_thoroughness: 0.95,
                capitalization_accuracy: 0.98,
                punctuation_accuracy: 0.98,
            },
            "fast" => TypingTraits {
                accuracy: 0.9,
                speed: 1.5,
                consistency: 0.6,
                hesitation: 0.2,
                correction_thoroughness: 0.7,
                capitalization_accuracy: 0.9,
                punctuation_accuracy: 0.85,
            },
            "careful" => TypingTraits {
                accuracy: 0.95,
                speed: 0.8,
                consistency: 0.85,
                hesitation: 0.6,
                correction_thoroughness: 0.95,
                capitalization_accuracy: 0.95,
                punctuation_accuracy: 0.95,
            },
            "sloppy" => TypingTraits {
                accuracy: 0.85,
                speed: 1.2,
                consistency: 0.5,
                hesitation: 0.3,
                correction_thoroughness: 0.6,
                capitalization_accuracy: 0.8,
                punctuation_accuracy: 0.7,
            },
            other => {
                log::warn!("Unknown typing personality: {}, using 'casual'", other);
                return Self::preset("casual");
            }
        };
        Self::new(name, traits)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn traits(&self) -> &TypingTraits {
        &self.traits
    }

    /// `1 - speed * 0.4`
    pub fn patience(&self) -> f64 {
        self.patience
    }

    /// Mean of accuracy and correction thoroughness
    pub fn attention_to_detail(&self) -> f64 {
        self.attention_to_detail
    }
}

/// Raw action-sequencing traits, all in `[0.1, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionTraits {
    pub patience: f64,
    pub thoroughness: f64,
    pub consistency: f64,
    pub multitasking: f64,
    pub risk_taking: f64,
    pub adaptability: f64,
    /// Higher = more frequent breaks
    pub break_frequency: f64,
}

impl Default for ActionTraits {
    fn default() -> Self {
        Self {
            patience: 0.5,
            thoroughness: 0.7,
            consistency: 0.6,
            multitasking: 0.5,
            risk_taking: 0.5,
            adaptability: 0.6,
            break_frequency: 0.5,
        }
    }
}

impl ActionTraits {
    fn clamped(self) -> Self {
        Self {
            patience: self.patience.clamp(0.1, 1.0),
            thoroughness: self.thoroughness.clamp(0.1, 1.0),
            consistency: self.consistency.clamp(0.1, 1.0),
            multitasking: self.multitasking.clamp(0.1, 1.0),
            risk_taking: self.risk_taking.clamp(0.1, 1.0),
            adaptability: self.adaptability.clamp(0.1, 1.0),
            break_frequency: self.break_frequency.clamp(0.1, 1.0),
        }
    }
}

/// Action-sequencing personality
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPersonality {
    name: String,
    traits: ActionTraits,
    attention_span: f64,
    error_recovery: f64,
}

impl Default for ActionPersonality {
    fn default() -> Self {
        Self::new("default", ActionTraits::default())
    }
}

impl ActionPersonality {
    pub fn new(name: impl Into<String>, traits: ActionTraits) -> Self {
        let traits = traits.clamped();
        Self {
            name: name.into(),
            attention_span: (traits.patience + traits.thoroughness) / 2.0,
            error_recovery: (traits.adaptability + traits.thoroughness) / 2.0,
            traits,
        }
    }

    /// Look up a named preset, falling back to `balanced`
    pub fn preset(name: &str) -> Self {
        let traits = match name {
            "balanced" => ActionTraits {
                patience: 0.6,
                thoroughness: 0.6,
                consistency: 0.6,
                multitasking: 0.5,
                risk_taking: 0.5,
                adaptability: 0.6,
                break_frequency: 0.5,
            },
            "efficient" => ActionTraits {
                patience: 0.4,
                thoroughness: 0.7,
                consistency: 0.8,
                multitasking: 0.7,
                risk_taking: 0.6,
                adaptability: 0.5,
                break_frequency: 0.4,
            },
            "careful" => ActionTraits {
                patience: 0.8,
                thoroughness: 0.9,
                consistency: 0.7,
                multitasking: 0.3,
                risk_taking: 0.2,
                adaptability: 0.5,
                break_frequency: 0.6,
            },
            "impatient" => ActionTraits {
                patience: 0.3,
                thoroughness: 0.4,
                consistency: 0.5,
                multitasking: 0.6,
                risk_taking: 0.7,
                adaptability: 0.7,
                break_frequency: 0.3,
            },
            "adaptive" => ActionTraits {
                patience: 0.5,
                thoroughness: 0.6,
                consistency: 0.5,
                multitasking: 0.7,
                risk_taking: 0.6,
                adaptability: 0.9,
                break_frequency: 0.5,
            },
            other => {
                log::warn!("Unknown action personality: {}, using 'balanced'", other);
                return Self::preset("balanced");
            }
        };
        Self::new(name, traits)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn traits(&self) -> &ActionTraits {
        &self.traits
    }

    /// Mean of patience and thoroughness
    pub fn attention_span(&self) -> f64 {
        self.attention_span
    }

    /// Mean of adaptability and thoroughness
    pub fn error_recovery(&self) -> f64 {
        self.error_recovery
    }
}
