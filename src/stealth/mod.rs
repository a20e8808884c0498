//! Human behavior models
//!
//! This module holds the state that makes simulated input look human:
//! - Fatigue that builds with activity and recovers with rest
//! - Personality presets shaping every derived multiplier
//! - A tiered break schedule for long sessions
//! - A seeded random source shared by all of the above

pub mod breaks;
pub mod fatigue;
pub mod humanize;
pub mod personality;

pub use breaks::{BreakDecision, BreakSchedule, BreakTier, TierTiming};
pub use fatigue::FatigueState;
pub use humanize::Humanizer;
pub use personality::{
    ActionPersonality, ActionTraits, MousePersonality, MouseTraits, TypingPersonality,
    TypingTraits,
};
