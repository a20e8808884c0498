//! Humanized keystrokes
//!
//! [`TypingEngine`] types text one character at a time with per-key rhythm,
//! hesitation on complex words, pauses after punctuation, and simulated
//! typos that are corrected immediately, later, or never.
//!
//! Every character of the input is accounted for: with correction enabled,
//! the text a field would show after replaying the emitted key-downs equals
//! the input, except where a typo was deliberately left uncorrected.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::driver::{InputDriver, InputError};
use super::layout::{KeyCategory, QwertyLayout};
use crate::clock::{CancelFlag, Clock};
use crate::stealth::{FatigueState, Humanizer, TypingPersonality};

/// Named keyboard profiles
pub const TYPING_PROFILES: [&str; 6] = ["human", "fast", "precise", "erratic", "slow", "casual"];

const BACKSPACE: &str = "backspace";
const HISTORY_SIZE: usize = 100;
const ACTIVITY_DECAY_SECS: f64 = 10.0;
/// Activity is refreshed every this many characters while typing
const ACTIVITY_STRIDE: usize = 10;
/// Ceiling on the per-character error probability
const MAX_ERROR_RATE: f64 = 0.2;
const FALLBACK_TYPO_KEYS: &str = "abcdefghijklmnopqrstuvwxyz0123456789 ";

const KEY_INTENSITY: f64 = 1.0;
const HOTKEY_INTENSITY: f64 = 1.5;

/// What is being typed; scales timing and error behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingContext {
    Username,
    Password,
    Chat,
    Command,
    Search,
    #[default]
    General,
}

impl TypingContext {
    pub fn as_str(self) -> &'static str {
        match self {
            TypingContext::Username => "username",
            TypingContext::Password => "password",
            TypingContext::Chat => "chat",
            TypingContext::Command => "command",
            TypingContext::Search => "search",
            TypingContext::General => "general",
        }
    }

    fn delay_factor(self) -> f64 {
        match self {
            TypingContext::Password => 1.2,
            TypingContext::Command => 1.1,
            TypingContext::Chat => 0.9,
            _ => 1.0,
        }
    }

    fn hold_factor(self) -> f64 {
        match self {
            TypingContext::Command => 1.1,
            _ => 1.0,
        }
    }

    fn error_factor(self) -> f64 {
        match self {
            TypingContext::Password => 0.7,
            TypingContext::Command => 0.8,
            TypingContext::Chat => 1.2,
            _ => 1.0,
        }
    }

    /// Adjustments to the (immediate, delayed) correction probabilities
    fn correction_bias(self) -> (f64, f64) {
        match self {
            TypingContext::Password | TypingContext::Command => (0.1, -0.05),
            TypingContext::Chat => (-0.1, -0.05),
            _ => (0.0, 0.0),
        }
    }
}

/// Typo kind and correction policy probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypoModel {
    pub adjacent_key: f64,
    pub double_key: f64,
    pub skip_key: f64,
    pub swap_key: f64,
    pub immediate_correction: f64,
    pub delayed_correction: f64,
    pub no_correction: f64,
    /// Most characters typed past a typo before a delayed correction
    pub max_correction_delay: usize,
    /// Seconds before the first backspace of a correction
    pub backspace_pause: f64,
    /// Seconds after a correction is retyped
    pub correction_pause: f64,
}

impl Default for TypoModel {
    fn default() -> Self {
        Self {
            adjacent_key: 0.6,
            double_key: 0.2,
            skip_key: 0.1,
            swap_key: 0.1,
            immediate_correction: 0.7,
            delayed_correction: 0.25,
            no_correction: 0.05,
            max_correction_delay: 5,
            backspace_pause: 0.2,
            correction_pause: 0.3,
        }
    }
}

/// Pauses between words, clauses and sentences (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingRhythm {
    pub consistency: f64,
    pub word_pause: f64,
    pub sentence_pause: f64,
    pub punctuation_pause: f64,
}

impl Default for TypingRhythm {
    fn default() -> Self {
        Self {
            consistency: 0.8,
            word_pause: 0.2,
            sentence_pause: 0.5,
            punctuation_pause: 0.3,
        }
    }
}

/// Optional multipliers applied on top of a named profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingOverrides {
    pub speed: Option<f64>,
    pub error_rate: Option<f64>,
    pub hold_time: Option<f64>,
}

/// Raw profile rates before personality is applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingRates {
    pub speed: f64,
    pub variability: f64,
    pub error_rate: f64,
    /// Seconds
    pub hold_time: f64,
    pub hold_variability: f64,
}

impl TypingRates {
    pub const fn new(speed: f64, variability: f64, error_rate: f64, hold_time: f64, hold_variability: f64) -> Self {
        Self {
            speed,
            variability,
            error_rate,
            hold_time,
            hold_variability,
        }
    }
}

/// Keyboard configuration: rates, personality and fatigue
#[derive(Debug, Clone)]
pub struct TypingProfile {
    pub name: String,
    pub typing_speed: f64,
    pub typing_variability: f64,
    /// Base per-character typo probability
    pub error_rate: f64,
    /// Base key hold in seconds
    pub key_hold_time: f64,
    pub key_hold_variability: f64,
    pub rhythm: TypingRhythm,
    pub typos: TypoModel,
    personality: TypingPersonality,
    pub fatigue: FatigueState,
}

impl Default for TypingProfile {
    fn default() -> Self {
        Self::preset("human")
    }
}

impl TypingProfile {
    /// Build a profile; personality is folded into the rates once
    pub fn new(
        name: impl Into<String>,
        rates: TypingRates,
        personality: TypingPersonality,
        fatigue: FatigueState,
    ) -> Self {
        let traits = *personality.traits();
        Self {
            name: name.into(),
            typing_speed: rates.speed.clamp(0.1, 5.0) * traits.speed,
            typing_variability: rates.variability.clamp(0.1, 5.0) * (1.0 - traits.consistency) * 2.0,
            error_rate: rates.error_rate.clamp(0.0, 0.1) * (1.0 - traits.accuracy) * 2.0,
            key_hold_time: rates.hold_time.clamp(0.01, 0.2),
            key_hold_variability: rates.hold_variability.clamp(0.1, 5.0),
            rhythm: TypingRhythm {
                consistency: traits.consistency,
                ..TypingRhythm::default()
            },
            typos: TypoModel::default(),
            personality,
            fatigue,
        }
    }

    /// Look up a named profile, falling back to `human`
    pub fn preset(name: &str) -> Self {
        let (rates, personality, fatigue_rate) = match name {
            "human" => (TypingRates::new(1.0, 1.0, 0.03, 0.05, 1.0), "casual", 0.01),
            "fast" => (TypingRates::new(2.0, 0.7, 0.05, 0.03, 0.7), "fast", 0.015),
            "precise" => (TypingRates::new(0.9, 0.5, 0.01, 0.05, 0.5), "precise", 0.008),
            "erratic" => (TypingRates::new(1.2, 2.0, 0.08, 0.04, 2.0), "sloppy", 0.012),
            "slow" => (TypingRates::new(0.5, 1.5, 0.02, 0.08, 1.2), "careful", 0.005),
            "casual" => (TypingRates::new(1.1, 1.2, 0.04, 0.05, 1.0), "casual", 0.01),
            other => {
                log::warn!("Unknown typing profile: {}, using 'human'", other);
                return Self::preset("human");
            }
        };

        Self::new(
            name,
            rates,
            TypingPersonality::preset(personality),
            FatigueState::new(fatigue_rate),
        )
    }

    /// Multiply selected rates and re-clamp
    pub fn apply_overrides(&mut self, overrides: &TypingOverrides) {
        if let Some(f) = overrides.speed {
            self.typing_speed = (self.typing_speed * f).clamp(0.1, 10.0);
        }
        if let Some(f) = overrides.error_rate {
            self.error_rate = (self.error_rate * f).clamp(0.0, 0.1);
        }
        if let Some(f) = overrides.hold_time {
            self.key_hold_time = (self.key_hold_time * f).clamp(0.01, 0.2);
        }
    }

    pub fn personality(&self) -> &TypingPersonality {
        &self.personality
    }

    /// Replace the personality without refolding the rates
    pub fn with_personality(mut self, personality: TypingPersonality) -> Self {
        self.personality = personality;
        self
    }

    /// Per-character typo probability under current fatigue, capped at 0.2
    pub fn current_error_rate(&self, humanizer: &mut Humanizer) -> f64 {
        self.error_rate_in(TypingContext::General, humanizer)
    }

    /// Typo probability for `context`; the cap applies after the context multiplier
    pub fn error_rate_in(&self, context: TypingContext, humanizer: &mut Humanizer) -> f64 {
        let rate = self.error_rate * self.fatigue.typing_error_factor(humanizer) * context.error_factor();
        rate.min(MAX_ERROR_RATE)
    }

    pub fn current_speed(&self) -> f64 {
        self.typing_speed * self.fatigue.speed_factor()
    }

    pub fn current_consistency(&self) -> f64 {
        self.rhythm.consistency * self.fatigue.consistency_factor()
    }
}

/// How a typo gets fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    Immediate,
    Delayed,
    None,
}

/// A decided typo at one position
#[derive(Debug, Clone, PartialEq, Eq)]
enum Typo {
    /// Intended character dropped
    Skip,
    /// `typed` was emitted in place of `intended`
    Wrong { typed: Vec<char>, intended: Vec<char> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEvent {
    Down,
    Up,
}

/// Snapshot of typing state for telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingStatistics {
    pub fatigue_level: f64,
    pub activity_level: f64,
    pub error_rate: f64,
    pub typing_speed: f64,
    pub consistency: f64,
    pub personality: String,
    pub context: TypingContext,
    pub avg_key_interval: Option<f64>,
    pub min_key_interval: Option<f64>,
    pub max_key_interval: Option<f64>,
    pub avg_hold_time: Option<f64>,
    pub min_hold_time: Option<f64>,
    pub max_hold_time: Option<f64>,
    pub error_count: usize,
}

/// Keystroke engine
pub struct TypingEngine {
    profile: TypingProfile,
    layout: QwertyLayout,
    humanizer: Humanizer,
    clock: Arc<dyn Clock>,
    cancel: CancelFlag,
    context: TypingContext,
    last_key: Option<String>,
    held: Vec<String>,
    history: VecDeque<(String, KeyEvent, Duration)>,
    error_count: usize,
    activity_level: f64,
    last_activity: Duration,
}

impl TypingEngine {
    pub fn new(mut profile: TypingProfile, humanizer: Humanizer, clock: Arc<dyn Clock>) -> Self {
        let last_activity = clock.now();
        profile.fatigue.anchor(last_activity);
        Self {
            profile,
            layout: QwertyLayout::new(),
            humanizer,
            clock,
            cancel: CancelFlag::new(),
            context: TypingContext::General,
            last_key: None,
            held: Vec::new(),
            history: VecDeque::with_capacity(HISTORY_SIZE),
            error_count: 0,
            activity_level: 0.0,
            last_activity,
        }
    }

    /// Share a cancellation flag with the caller
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn profile(&self) -> &TypingProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut TypingProfile {
        &mut self.profile
    }

    /// Swap the profile; fatigue carries over from the outgoing one
    pub fn set_profile(&mut self, mut profile: TypingProfile) {
        profile.fatigue.continue_from(&self.profile.fatigue);
        log::debug!(
            "Keyboard profile set: {} (speed={:.2}, error_rate={:.3}, personality={})",
            profile.name,
            profile.typing_speed,
            profile.error_rate,
            profile.personality().name()
        );
        self.profile = profile;
    }

    pub fn context(&self) -> TypingContext {
        self.context
    }

    pub fn set_context(&mut self, context: TypingContext) {
        self.context = context;
        log::debug!("Typing context set to: {}", context.as_str());
    }

    pub fn fatigue_level(&self) -> f64 {
        self.profile.fatigue.current_level()
    }

    pub fn activity_level(&self) -> f64 {
        self.activity_level
    }

    /// Typos made since the last `type_text` started
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    fn update_activity(&mut self, intensity: f64) {
        let now = self.clock.now();
        let elapsed = now.saturating_sub(self.last_activity).as_secs_f64();
        let decay = (1.0 - elapsed / ACTIVITY_DECAY_SECS).max(0.0);

        self.activity_level = (self.activity_level * decay + intensity * 0.2).min(1.0);
        self.profile
            .fatigue
            .update(self.activity_level, now, &mut self.humanizer);
        self.last_activity = now;
    }

    fn record(&mut self, key: &str, event: KeyEvent) {
        if self.history.len() == HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back((key.to_string(), event, self.clock.now()));
    }

    /// Seconds to wait before pressing `key`
    fn key_delay(&mut self, key: &str) -> f64 {
        let mut delay = 0.1 / self.profile.current_speed();
        let finger = self.layout.finger(key);

        if let Some(last) = self.last_key.as_deref() {
            if key == last {
                delay *= 0.7;
            }
            let last_finger = self.layout.finger(last);
            match (finger.hand(), last_finger.hand()) {
                (Some(a), Some(b)) if a != b => delay *= 0.9,
                _ if finger == last_finger && key != last => delay *= 1.3,
                _ => {}
            }
        }

        delay *= self.context.delay_factor();
        delay *= KeyCategory::of(key).timing_weight() * finger.timing_weight();

        let spread = 1.0 - self.profile.current_consistency();
        self.humanizer.vary(delay, spread)
    }

    /// Seconds to hold `key` down
    fn hold_time(&mut self, key: &str) -> f64 {
        let hold = self.profile.key_hold_time
            * KeyCategory::of(key).hold_weight()
            * self.context.hold_factor()
            * (1.0 + self.fatigue_level() * 0.5);
        self.humanizer.vary(hold, 0.3 * self.profile.key_hold_variability)
    }

    fn key_down<D: InputDriver + ?Sized>(&mut self, driver: &mut D, key: &str) -> Result<(), InputError> {
        driver.key_down(key)?;
        self.held.push(key.to_string());
        self.record(key, KeyEvent::Down);
        Ok(())
    }

    fn key_up<D: InputDriver + ?Sized>(&mut self, driver: &mut D, key: &str) -> Result<(), InputError> {
        driver.key_up(key)?;
        if let Some(pos) = self.held.iter().rposition(|k| k == key) {
            self.held.remove(pos);
        }
        self.record(key, KeyEvent::Up);
        Ok(())
    }

    /// Release everything still logically down, newest first
    fn release_held<D: InputDriver + ?Sized>(&mut self, driver: &mut D) {
        while let Some(key) = self.held.pop() {
            match driver.key_up(&key) {
                Ok(()) => self.record(&key, KeyEvent::Up),
                Err(e) => log::warn!("Failed to release key '{}': {}", key, e),
            }
        }
    }

    fn stroke<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        key: &str,
        hold: Option<f64>,
    ) -> Result<(), InputError> {
        let delay = self.key_delay(key);
        self.clock.sleep_secs(delay);

        let hold = hold.unwrap_or_else(|| self.hold_time(key));
        self.key_down(driver, key)?;
        self.clock.sleep_secs(hold);
        self.key_up(driver, key)?;

        self.last_key = Some(key.to_string());
        Ok(())
    }

    /// Press and release a single key
    ///
    /// `hold` overrides the computed hold time in seconds.
    pub fn press_key<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        key: &str,
        hold: Option<f64>,
    ) -> Result<(), InputError> {
        self.update_activity(KEY_INTENSITY);
        let result = self.stroke(driver, key, hold);
        if result.is_err() {
            self.release_held(driver);
        }
        result
    }

    /// Press a `+`-joined combination such as `ctrl+shift+s`
    pub fn press_hotkey<D: InputDriver + ?Sized>(&mut self, driver: &mut D, keys: &str) -> Result<(), InputError> {
        let keys: Vec<&str> = keys.split('+').map(str::trim).filter(|k| !k.is_empty()).collect();
        let Some((last, modifiers)) = keys.split_last() else {
            return Err(InputError::InvalidAction("empty hotkey".to_string()));
        };

        self.update_activity(HOTKEY_INTENSITY);
        let result = self.hotkey_strokes(driver, modifiers, last);
        if result.is_err() {
            self.release_held(driver);
        }
        result
    }

    fn hotkey_strokes<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        modifiers: &[&str],
        last: &str,
    ) -> Result<(), InputError> {
        for &key in modifiers {
            let delay = self.key_delay(key) * 0.7;
            self.clock.sleep_secs(delay);
            self.key_down(driver, key)?;
            let gap = self.humanizer.uniform(0.03, 0.08);
            self.clock.sleep_secs(gap);
        }

        self.stroke(driver, last, None)?;

        for &key in modifiers.iter().rev() {
            let gap = self.humanizer.uniform(0.02, 0.05);
            self.clock.sleep_secs(gap);
            self.key_up(driver, key)?;
        }

        self.last_key = Some(last.to_string());
        Ok(())
    }

    /// Type `text`
    ///
    /// With `error_correction` off no typos are simulated and the key-downs
    /// match the text exactly. `context` replaces the current context.
    pub fn type_text<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        text: &str,
        error_correction: bool,
        context: Option<TypingContext>,
    ) -> Result<(), InputError> {
        if let Some(context) = context {
            self.set_context(context);
        }
        self.error_count = 0;

        let chars: Vec<char> = text.chars().collect();
        let result = self.type_chars(driver, &chars, error_correction);
        if result.is_err() {
            self.release_held(driver);
        }
        result
    }

    fn type_chars<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        chars: &[char],
        error_correction: bool,
    ) -> Result<(), InputError> {
        let mut i = 0;
        while i < chars.len() {
            if self.cancel.is_cancelled() {
                return Err(InputError::Cancelled);
            }
            if i % ACTIVITY_STRIDE == 0 {
                self.update_activity(KEY_INTENSITY);
            }

            if self.should_hesitate(chars, i) {
                let pause = self.hesitation_duration();
                self.clock.sleep_secs(pause);
            }

            if error_correction && self.should_make_error() {
                self.error_count += 1;
                match self.choose_typo(chars, i) {
                    Typo::Skip => {
                        i += 1;
                    }
                    Typo::Wrong { typed, intended } => {
                        i = self.emit_typo(driver, chars, i, &typed, &intended)?;
                    }
                }
                continue;
            }

            let c = chars[i];
            self.stroke_char(driver, c)?;

            if let Some(pause) = self.pause_after(c) {
                self.clock.sleep_secs(pause);
            }
            i += 1;
        }

        Ok(())
    }

    fn stroke_char<D: InputDriver + ?Sized>(&mut self, driver: &mut D, c: char) -> Result<(), InputError> {
        let mut buf = [0u8; 4];
        let key: &str = c.encode_utf8(&mut buf);
        self.stroke(driver, key, None)
    }

    fn stroke_chars<D: InputDriver + ?Sized>(&mut self, driver: &mut D, chars: &[char]) -> Result<(), InputError> {
        for &c in chars {
            if self.cancel.is_cancelled() {
                return Err(InputError::Cancelled);
            }
            self.stroke_char(driver, c)?;
        }
        Ok(())
    }

    fn backspaces<D: InputDriver + ?Sized>(&mut self, driver: &mut D, count: usize) -> Result<(), InputError> {
        for _ in 0..count {
            self.stroke(driver, BACKSPACE, None)?;
        }
        Ok(())
    }

    /// Emit a typo and its correction; returns the next input index
    fn emit_typo<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        chars: &[char],
        i: usize,
        typed: &[char],
        intended: &[char],
    ) -> Result<usize, InputError> {
        self.stroke_chars(driver, typed)?;
        let next = i + intended.len();

        match self.choose_correction() {
            Correction::Immediate => {
                self.clock.sleep_secs(self.profile.typos.backspace_pause);
                self.backspaces(driver, typed.len())?;
                self.stroke_chars(driver, intended)?;
                self.clock.sleep_secs(self.profile.typos.correction_pause);
                Ok(next)
            }
            Correction::Delayed => {
                let max_delay = self.profile.typos.max_correction_delay.max(1);
                let ahead = self
                    .humanizer
                    .count_between(1, max_delay)
                    .min(chars.len() - next);
                let carried = &chars[next..next + ahead];

                self.stroke_chars(driver, carried)?;
                self.clock.sleep_secs(self.profile.typos.backspace_pause);
                self.backspaces(driver, ahead + typed.len())?;
                self.stroke_chars(driver, intended)?;
                self.stroke_chars(driver, carried)?;
                self.clock.sleep_secs(self.profile.typos.correction_pause);
                Ok(next + ahead)
            }
            Correction::None => Ok(next),
        }
    }

    fn should_make_error(&mut self) -> bool {
        let rate = self.profile.error_rate_in(self.context, &mut self.humanizer);
        self.humanizer.chance(rate)
    }

    fn choose_typo(&mut self, chars: &[char], i: usize) -> Typo {
        let model = self.profile.typos;
        let intended = chars[i];
        let roll = self.humanizer.roll();

        if roll < model.adjacent_key {
            let near = self.layout.adjacent(intended);
            if let Some(&wrong) = self.humanizer.pick(near) {
                return Typo::Wrong {
                    typed: vec![wrong],
                    intended: vec![intended],
                };
            }
        } else if roll < model.adjacent_key + model.double_key {
            return Typo::Wrong {
                typed: vec![intended, intended],
                intended: vec![intended],
            };
        } else if roll < model.adjacent_key + model.double_key + model.skip_key {
            return Typo::Skip;
        } else if i + 1 < chars.len() && self.humanizer.chance(model.swap_key) {
            return Typo::Wrong {
                typed: vec![chars[i + 1], intended],
                intended: vec![intended, chars[i + 1]],
            };
        }

        let fallback: Vec<char> = FALLBACK_TYPO_KEYS.chars().collect();
        let wrong = self.humanizer.pick(&fallback).copied().unwrap_or('x');
        Typo::Wrong {
            typed: vec![wrong],
            intended: vec![intended],
        }
    }

    fn choose_correction(&mut self) -> Correction {
        let model = self.profile.typos;
        let (immediate_bias, delayed_bias) = self.context.correction_bias();
        let thoroughness = self.profile.personality().traits().correction_thoroughness;
        let immediate = (model.immediate_correction + immediate_bias) * thoroughness;
        let delayed = (model.delayed_correction + delayed_bias) * thoroughness;

        let roll = self.humanizer.roll();
        if roll < immediate {
            Correction::Immediate
        } else if roll < immediate + delayed {
            Correction::Delayed
        } else {
            Correction::None
        }
    }

    fn should_hesitate(&mut self, chars: &[char], i: usize) -> bool {
        let start = chars[..i].iter().rposition(|&c| c == ' ').map_or(0, |p| p + 1);
        let end = chars[i..].iter().position(|&c| c == ' ').map_or(chars.len(), |p| i + p);
        let word = &chars[start..end];

        let mut probability = self.profile.personality().traits().hesitation * 0.5;
        if is_complex_word(word) {
            probability *= 2.0;
        }
        probability *= 1.0 + self.fatigue_level();
        if i < 3 {
            probability *= 1.5;
        }

        self.humanizer.chance(probability)
    }

    fn hesitation_duration(&mut self) -> f64 {
        let hesitation = self.profile.personality().traits().hesitation;
        self.humanizer.uniform(0.3, 0.8) * (1.0 + self.fatigue_level() * 0.5) * (1.0 + hesitation * 0.5)
    }

    /// Pause owed after typing `c`, if any
    fn pause_after(&mut self, c: char) -> Option<f64> {
        let rhythm = self.profile.rhythm;
        let base = match c {
            '.' | '!' | '?' => rhythm.sentence_pause,
            ',' | ';' | ':' => rhythm.punctuation_pause,
            c if c.is_whitespace() && self.humanizer.chance(0.1) => rhythm.word_pause,
            _ => return None,
        };
        let fatigue = 1.0 + self.fatigue_level() * 0.3;
        Some(base * self.humanizer.uniform(0.8, 1.2) * fatigue)
    }

    pub fn statistics(&mut self) -> TypingStatistics {
        let downs: Vec<Duration> = self
            .history
            .iter()
            .filter(|(_, event, _)| *event == KeyEvent::Down)
            .map(|&(_, _, t)| t)
            .collect();
        let intervals: Vec<f64> = downs
            .windows(2)
            .map(|w| w[1].saturating_sub(w[0]).as_secs_f64())
            .collect();
        let holds: Vec<f64> = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .filter(|((k1, a, _), (k2, b, _))| *a == KeyEvent::Down && *b == KeyEvent::Up && k1 == k2)
            .map(|((_, _, t1), (_, _, t2))| t2.saturating_sub(*t1).as_secs_f64())
            .collect();

        let (avg_key_interval, min_key_interval, max_key_interval) = summarize(&intervals);
        let (avg_hold_time, min_hold_time, max_hold_time) = summarize(&holds);

        TypingStatistics {
            fatigue_level: self.fatigue_level(),
            activity_level: self.activity_level,
            error_rate: self.profile.current_error_rate(&mut self.humanizer),
            typing_speed: self.profile.current_speed(),
            consistency: self.profile.current_consistency(),
            personality: self.profile.personality().name().to_string(),
            context: self.context,
            avg_key_interval,
            min_key_interval,
            max_key_interval,
            avg_hold_time,
            min_hold_time,
            max_hold_time,
            error_count: self.error_count,
        }
    }

    pub fn reset_fatigue(&mut self) {
        self.profile.fatigue.reset(self.clock.now());
        log::info!("Reset keyboard fatigue to base level");
    }
}

/// Long, internally capitalized, alphanumeric, or symbol-heavy words
fn is_complex_word(word: &[char]) -> bool {
    if word.len() > 8 {
        return true;
    }
    if word.iter().skip(1).any(|c| c.is_uppercase()) {
        return true;
    }
    if word.iter().any(|c| c.is_ascii_digit()) && word.iter().any(|c| c.is_alphabetic()) {
        return true;
    }
    word.iter().filter(|c| c.is_ascii_punctuation()).count() > 1
}

fn summarize(values: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None, None);
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (Some(avg), Some(min), Some(max))
}
