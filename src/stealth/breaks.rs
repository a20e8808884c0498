//! Break scheduling for long sessions
//!
//! Three nested tiers of rest: micro, short and long. Each tier has an
//! interval range (minutes between breaks) and a duration range (seconds of
//! rest). Fatigue and session length shrink the effective interval.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::humanize::Humanizer;

/// Break tier, from finest to coarsest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakTier {
    Micro,
    Short,
    Long,
}

impl BreakTier {
    /// Probability ceiling once the interval threshold is passed
    fn probability_cap(self) -> f64 {
        match self {
            BreakTier::Micro => 0.3,
            BreakTier::Short => 0.5,
            BreakTier::Long => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BreakTier::Micro => "micro",
            BreakTier::Short => "short",
            BreakTier::Long => "long",
        }
    }
}

impl fmt::Display for BreakTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a positive break check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakDecision {
    pub tier: BreakTier,
    /// Rest length in seconds
    pub duration: f64,
}

/// Interval and duration ranges for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTiming {
    /// Minutes between breaks of this tier `(min, max)`
    pub interval: (f64, f64),
    /// Seconds of rest `(min, max)`
    pub duration: (f64, f64),
}

impl TierTiming {
    /// Default timing for a tier
    pub fn for_tier(tier: BreakTier) -> Self {
        match tier {
            BreakTier::Micro => Self {
                interval: (5.0, 15.0),
                duration: (5.0, 15.0),
            },
            BreakTier::Short => Self {
                interval: (20.0, 40.0),
                duration: (30.0, 120.0),
            },
            BreakTier::Long => Self {
                interval: (60.0, 120.0),
                duration: (300.0, 900.0),
            },
        }
    }
}

/// Break cadence state
#[derive(Debug, Clone)]
pub struct BreakSchedule {
    pub micro: TierTiming,
    pub short: TierTiming,
    pub long: TierTiming,
    /// Global scale on every break probability
    pub probability_factor: f64,
    last_micro: Duration,
    last_short: Duration,
    last_long: Duration,
    session_start: Duration,
}

impl Default for BreakSchedule {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl BreakSchedule {
    /// Schedule with default tier timings, all timers starting at `now`
    pub fn new(now: Duration) -> Self {
        Self {
            micro: TierTiming::for_tier(BreakTier::Micro),
            short: TierTiming::for_tier(BreakTier::Short),
            long: TierTiming::for_tier(BreakTier::Long),
            probability_factor: 1.0,
            last_micro: now,
            last_short: now,
            last_long: now,
            session_start: now,
        }
    }

    pub fn with_probability_factor(mut self, factor: f64) -> Self {
        self.probability_factor = factor.max(0.0);
        self
    }

    pub fn timing(&self, tier: BreakTier) -> &TierTiming {
        match tier {
            BreakTier::Micro => &self.micro,
            BreakTier::Short => &self.short,
            BreakTier::Long => &self.long,
        }
    }

    fn last_break(&self, tier: BreakTier) -> Duration {
        match tier {
            BreakTier::Micro => self.last_micro,
            BreakTier::Short => self.last_short,
            BreakTier::Long => self.last_long,
        }
    }

    /// Decide whether to break now
    ///
    /// Tiers are checked long, short, micro; the first one whose Bernoulli
    /// trial succeeds wins, so at most one tier is returned.
    pub fn should_take_break(
        &self,
        fatigue_level: f64,
        now: Duration,
        humanizer: &mut Humanizer,
    ) -> Option<BreakDecision> {
        let session_hours = now.saturating_sub(self.session_start).as_secs_f64() / 3600.0;
        let fatigue_factor = 1.0 + fatigue_level.clamp(0.0, 1.0);
        let session_factor = 1.0 + (session_hours / 4.0).min(1.0);
        let shrink = fatigue_factor * session_factor;

        for tier in [BreakTier::Long, BreakTier::Short, BreakTier::Micro] {
            let timing = self.timing(tier);
            let elapsed_min = now.saturating_sub(self.last_break(tier)).as_secs_f64() / 60.0;
            let threshold = timing.interval.0 / shrink;

            if elapsed_min <= threshold {
                continue;
            }

            let span = (timing.interval.1 - timing.interval.0).max(f64::EPSILON);
            let probability =
                ((elapsed_min - threshold) / span).min(tier.probability_cap()) * self.probability_factor;

            if humanizer.chance(probability) {
                let duration = humanizer.uniform(timing.duration.0, timing.duration.1);
                return Some(BreakDecision { tier, duration });
            }
        }

        None
    }

    /// Record a break; coarser tiers also reset every finer tier
    pub fn record_break(&mut self, tier: BreakTier, now: Duration) {
        self.last_micro = now;
        if matches!(tier, BreakTier::Short | BreakTier::Long) {
            self.last_short = now;
        }
        if tier == BreakTier::Long {
            self.last_long = now;
        }
    }

    /// Keep the break timers and session clock of the schedule this one replaces
    pub fn continue_from(&mut self, previous: &BreakSchedule) {
        self.last_micro = previous.last_micro;
        self.last_short = previous.last_short;
        self.last_long = previous.last_long;
        self.session_start = previous.session_start;
    }

    /// Restart every timer, including the session clock
    pub fn reset(&mut self, now: Duration) {
        self.last_micro = now;
        self.last_short = now;
        self.last_long = now;
        self.session_start = now;
    }

    /// Minutes since the session started
    pub fn session_minutes(&self, now: Duration) -> f64 {
        now.saturating_sub(self.session_start).as_secs_f64() / 60.0
    }
}
