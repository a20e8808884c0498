//! Action orchestration
//!
//! [`ActionOrchestrator`] is the single entry point for callers. Each
//! [`Action`] goes through the same pipeline: session fatigue update, break
//! check, inter-action delay with an optional thinking pause, then dispatch
//! to the mouse or keyboard engine. Errors stop here: `perform` logs them
//! and reports `false` so a long-running automation loop keeps going.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::profile::SessionProfile;
use super::task::{TaskLedger, TaskType};
use crate::clock::{sleep_cancellable, CancelFlag, Clock};
use crate::input::{
    ClickOptions, HumanizedMouse, InputDriver, InputError, MoveTiming, MovementProfile,
    MovementStatistics, TypingContext, TypingEngine, TypingProfile, TypingStatistics,
};
use crate::stealth::{BreakTier, Humanizer};
use crate::{Action, CustomAction, MouseButton};

/// Tasks with more actions than this start getting faster
const LEARNING_THRESHOLD: usize = 5;
const MIN_LEARNING_FACTOR: f64 = 0.7;
/// Early actions in a task are more likely to be preceded by thinking
const EARLY_TASK_ACTIONS: usize = 3;
/// Longest duration a single action may request (one day)
const MAX_ACTION_SECS: f64 = 86_400.0;

/// Where the orchestrator is in its action cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Executing,
    OnBreak,
}

/// Snapshot of the whole session for telemetry
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatistics {
    /// Seconds since the session started
    pub session_duration: f64,
    pub state: SessionState,
    /// Actions in the current sequence
    pub action_count: usize,
    pub failed_actions: usize,
    pub fatigue_level: f64,
    pub activity_level: f64,
    pub second_wind_active: bool,
    pub personality: String,
    pub current_task: TaskType,
    pub task_action_count: usize,
    pub mouse: MovementStatistics,
    pub keyboard: TypingStatistics,
    pub task_durations: BTreeMap<String, f64>,
    pub task_action_counts: BTreeMap<String, f64>,
}

/// Accept a caller-supplied duration in `[0, MAX_ACTION_SECS]`
fn checked_secs(what: &str, secs: f64) -> Result<f64, InputError> {
    if (0.0..=MAX_ACTION_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(InputError::InvalidAction(format!("{} {} out of range", what, secs)))
    }
}

/// Seconds of rest for a break requested without a duration
fn manual_break_range(tier: BreakTier) -> (f64, f64) {
    match tier {
        BreakTier::Micro => (5.0, 15.0),
        BreakTier::Short => (30.0, 120.0),
        BreakTier::Long => (300.0, 900.0),
    }
}

/// Paces and dispatches actions against one input driver
pub struct ActionOrchestrator<D: InputDriver> {
    driver: D,
    mouse: HumanizedMouse,
    keyboard: TypingEngine,
    profile: SessionProfile,
    humanizer: Humanizer,
    clock: Arc<dyn Clock>,
    cancel: CancelFlag,
    state: SessionState,

    session_start: Duration,
    sequence_start: Option<Duration>,
    last_action: Option<Duration>,
    action_count: usize,
    failed_actions: usize,

    task_type: TaskType,
    task_start: Duration,
    task_action_count: usize,
    tasks: TaskLedger,
}

impl<D: InputDriver> ActionOrchestrator<D> {
    /// Create an orchestrator and start a session
    ///
    /// Device profiles are resolved from the names in `profile`; the mouse
    /// and keyboard draw from streams forked off `humanizer`.
    pub fn new(driver: D, profile: SessionProfile, mut humanizer: Humanizer, clock: Arc<dyn Clock>) -> Self {
        let cancel = CancelFlag::new();
        let mouse = HumanizedMouse::new(
            MovementProfile::preset(&profile.mouse_profile),
            humanizer.fork(),
            clock.clone(),
        )
        .with_cancel_flag(cancel.clone());
        let keyboard = TypingEngine::new(
            TypingProfile::preset(&profile.keyboard_profile),
            humanizer.fork(),
            clock.clone(),
        )
        .with_cancel_flag(cancel.clone());

        let now = clock.now();
        let mut orchestrator = Self {
            driver,
            mouse,
            keyboard,
            profile,
            humanizer,
            clock,
            cancel,
            state: SessionState::Idle,
            session_start: now,
            sequence_start: None,
            last_action: None,
            action_count: 0,
            failed_actions: 0,
            task_type: TaskType::General,
            task_start: now,
            task_action_count: 0,
            tasks: TaskLedger::new(),
        };
        orchestrator.start_session();
        orchestrator
    }

    /// Replace the device profiles resolved from the session profile
    pub fn with_device_profiles(mut self, mouse: MovementProfile, keyboard: TypingProfile) -> Self {
        self.mouse.set_profile(mouse);
        self.keyboard.set_profile(keyboard);
        self
    }

    /// Flag shared with both engines; raising it aborts the current action
    ///
    /// The flag stays raised until the caller resets it.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn mouse(&self) -> &HumanizedMouse {
        &self.mouse
    }

    pub fn keyboard(&self) -> &TypingEngine {
        &self.keyboard
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut SessionProfile {
        &mut self.profile
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn failed_actions(&self) -> usize {
        self.failed_actions
    }

    pub fn tasks(&self) -> &TaskLedger {
        &self.tasks
    }

    /// Restart the session clock, break timers and session fatigue
    pub fn start_session(&mut self) {
        let now = self.clock.now();
        self.session_start = now;
        self.profile.breaks.reset(now);
        self.profile.fatigue.reset(now);
        self.state = SessionState::Idle;
        log::info!("Started new session with '{}' profile", self.profile.name);
    }

    /// Flush task statistics and close any open sequence
    pub fn end_session(&mut self) -> SessionStatistics {
        if self.task_action_count > 0 {
            self.record_task_stats();
            self.task_action_count = 0;
        }
        let stats = self.session_statistics();
        self.end_sequence();
        log::info!(
            "Ended session after {:.1}s ({} failed actions)",
            stats.session_duration,
            stats.failed_actions
        );
        stats
    }

    /// Swap the session profile and the device profiles it names
    ///
    /// Fatigue levels and break timers carry over; only an explicit fatigue
    /// reset or a new session clears them.
    pub fn set_profile(&mut self, mut profile: SessionProfile) {
        profile.fatigue.continue_from(&self.profile.fatigue);
        profile.breaks.continue_from(&self.profile.breaks);
        self.mouse.set_profile(MovementProfile::preset(&profile.mouse_profile));
        self.keyboard.set_profile(TypingProfile::preset(&profile.keyboard_profile));
        log::debug!(
            "Session profile set: delay_factor={:.2}, variability={:.2}, think_prob={:.3}, fatigue_rate={:.4}, personality={}",
            profile.rates.delay_factor,
            profile.rates.delay_variability,
            profile.rates.think_probability,
            profile.rates.fatigue_rate,
            profile.personality().name()
        );
        self.profile = profile;
    }

    /// Switch task context; the outgoing task's run is folded into its stats
    pub fn set_task_type(&mut self, task: TaskType) {
        if self.task_type != task && self.task_action_count > 0 {
            self.record_task_stats();
        }
        self.task_type = task;
        self.task_start = self.clock.now();
        self.task_action_count = 0;
        log::debug!("Task type set to: {}", task);
    }

    fn record_task_stats(&mut self) {
        if self.task_action_count == 0 {
            return;
        }
        let duration = self.clock.now().saturating_sub(self.task_start).as_secs_f64();
        self.tasks.record(self.task_type, duration, self.task_action_count);
    }

    pub fn start_sequence(&mut self) {
        let now = self.clock.now();
        self.sequence_start = Some(now);
        self.last_action = Some(now);
        self.action_count = 0;
        log::debug!("Starting new action sequence");
    }

    pub fn end_sequence(&mut self) {
        if let Some(start) = self.sequence_start {
            let elapsed = self.clock.now().saturating_sub(start).as_secs_f64();
            log::debug!("Ending action sequence: {} actions in {:.2}s", self.action_count, elapsed);
        }
        self.sequence_start = None;
        self.last_action = None;
        self.action_count = 0;
    }

    /// Run one action; failures are logged and reported as `false`
    pub fn perform(&mut self, action: Action) -> bool {
        let name = action.name();
        let result = self.try_perform(action);
        self.state = SessionState::Idle;

        match result {
            Ok(true) => true,
            Ok(false) => {
                log::warn!("Action '{}' reported failure", name);
                self.failed_actions += 1;
                false
            }
            Err(e) => {
                log::error!("Error executing '{}' action: {}", name, e);
                self.failed_actions += 1;
                false
            }
        }
    }

    /// Run one action and surface its error
    pub fn try_perform(&mut self, action: Action) -> Result<bool, InputError> {
        if self.sequence_start.is_none() {
            self.start_sequence();
        }
        self.state = SessionState::Executing;

        let now = self.clock.now();
        self.profile
            .fatigue
            .update(action.intensity(), now, &mut self.humanizer);

        let fatigue = self.profile.fatigue.current_level();
        if let Some(decision) = self
            .profile
            .breaks
            .should_take_break(fatigue, now, &mut self.humanizer)
        {
            self.rest(decision.tier, decision.duration)?;
        }

        let delay = self.action_delay(&action);
        if self.action_count > 0 && self.should_think() {
            let thinking = self.thinking_duration();
            log::debug!("Adding thinking pause: {:.2}s", thinking);
            self.pause(thinking)?;
        }
        self.pause(delay)?;

        let ok = self.dispatch(action)?;

        self.last_action = Some(self.clock.now());
        self.action_count += 1;
        self.task_action_count += 1;
        Ok(ok)
    }

    fn dispatch(&mut self, action: Action) -> Result<bool, InputError> {
        let driver = &mut self.driver;
        match action {
            Action::Move { x, y, duration } => {
                let duration = duration.map(|d| checked_secs("move duration", d)).transpose()?;
                self.mouse.move_to(driver, x, y, MoveTiming::with_duration(duration))?;
            }
            Action::Click {
                x,
                y,
                button,
                clicks,
                interval,
                duration,
            } => {
                if clicks == 0 {
                    return Err(InputError::InvalidAction("click count must be positive".to_string()));
                }
                let target = x.zip(y);
                let options = ClickOptions {
                    button,
                    clicks,
                    interval: interval.map(|d| checked_secs("click interval", d)).transpose()?,
                    move_duration: duration.map(|d| checked_secs("move duration", d)).transpose()?,
                };
                self.mouse.click(driver, target, options)?;
            }
            Action::Drag { x, y, button, duration } => {
                let duration = duration.map(|d| checked_secs("drag duration", d)).transpose()?;
                self.mouse.drag_to(driver, x, y, button, duration)?;
            }
            Action::KeyPress { key, hold_time } => {
                let hold_time = hold_time.map(|d| checked_secs("key hold time", d)).transpose()?;
                self.keyboard.press_key(driver, &key, hold_time)?;
            }
            Action::Hotkey { keys } => {
                self.keyboard.press_hotkey(driver, &keys)?;
            }
            Action::TypeText {
                text,
                error_correction,
                context,
            } => {
                self.keyboard.type_text(driver, &text, error_correction, context)?;
            }
            Action::Wait { duration } => {
                self.pause(checked_secs("wait duration", duration)?)?;
            }
            Action::Think { duration } => {
                let duration = match duration {
                    Some(d) => checked_secs("think duration", d)?,
                    None => self.thinking_duration(),
                };
                self.pause(duration)?;
            }
            Action::Break { tier, duration } => {
                let duration = match duration {
                    Some(d) => checked_secs("break duration", d)?,
                    None => {
                        let (lo, hi) = manual_break_range(tier);
                        self.humanizer.uniform(lo, hi)
                    }
                };
                self.rest(tier, duration)?;
            }
            Action::Custom(mut f) => return Ok(f.call()),
        }
        Ok(true)
    }

    /// Take a break: record it, sleep, then let session fatigue recover
    fn rest(&mut self, tier: BreakTier, duration: f64) -> Result<(), InputError> {
        log::info!("Taking a {} break for {:.1} seconds", tier, duration);
        self.state = SessionState::OnBreak;
        self.profile.breaks.record_break(tier, self.clock.now());

        self.pause(duration)?;

        let now = self.clock.now();
        self.profile.fatigue.update(0.0, now, &mut self.humanizer);
        self.state = SessionState::Executing;
        Ok(())
    }

    fn pause(&self, secs: f64) -> Result<(), InputError> {
        if sleep_cancellable(self.clock.as_ref(), secs, &self.cancel) {
            Ok(())
        } else {
            Err(InputError::Cancelled)
        }
    }

    /// Seconds to wait before `action`
    fn action_delay(&mut self, action: &Action) -> f64 {
        let base = match action {
            Action::Move { .. } => 0.1,
            Action::Click { .. } => 0.2,
            Action::Drag { .. } => 0.3,
            Action::KeyPress { .. } => 0.15,
            Action::Hotkey { .. } => 0.25,
            Action::TypeText { .. } => 0.3,
            _ => 0.2,
        };

        let mut delay = base * self.profile.rates.delay_factor * self.profile.fatigue.delay_factor();

        if matches!(action, Action::Click { .. }) {
            match self.task_type {
                TaskType::Combat => delay *= 0.8,
                TaskType::Banking => delay *= 1.2,
                _ => {}
            }
        }

        let variability = self
            .humanizer
            .vary(1.0, 0.3 * self.profile.rates.delay_variability);

        if self.task_action_count > LEARNING_THRESHOLD {
            delay *= (1.0 - self.task_action_count as f64 / 100.0).max(MIN_LEARNING_FACTOR);
        }

        delay * variability
    }

    fn should_think(&mut self) -> bool {
        let mut probability = self.profile.rates.think_probability;

        if self.task_type.is_item_management() {
            probability *= 1.3;
        } else if self.task_type == TaskType::Combat {
            probability *= 0.7;
        }

        probability *= 1.0 + self.profile.fatigue.current_level() * 0.5;

        if self.task_action_count < EARLY_TASK_ACTIONS {
            probability *= 1.5;
        }

        self.humanizer.chance(probability)
    }

    fn thinking_duration(&mut self) -> f64 {
        let task_factor = match self.task_type {
            TaskType::Banking | TaskType::Inventory => 1.3,
            TaskType::Dialogue => 1.5,
            TaskType::Combat => 0.7,
            _ => 1.0,
        };
        let patience = 0.7 + self.profile.personality().traits().patience * 0.6;

        self.humanizer.uniform(0.5, 2.0)
            * self.profile.rates.think_duration_factor
            * self.profile.fatigue.delay_factor()
            * task_factor
            * patience
    }

    /// Run `actions` in order, stopping at the first failure
    pub fn execute_sequence(&mut self, actions: Vec<Action>, task: Option<TaskType>) -> bool {
        if let Some(task) = task {
            self.set_task_type(task);
        }
        self.start_sequence();

        let mut success = true;
        for action in actions {
            if !self.perform(action) {
                success = false;
                break;
            }
        }

        self.end_sequence();
        success
    }

    pub fn move_to(&mut self, x: i32, y: i32, duration: Option<f64>) -> bool {
        self.perform(Action::Move { x, y, duration })
    }

    /// Click at `target`, or in place when `None`
    pub fn click(&mut self, target: Option<(i32, i32)>, button: MouseButton, clicks: u32) -> bool {
        let (x, y) = target.unzip();
        self.perform(Action::Click {
            x,
            y,
            button,
            clicks,
            interval: None,
            duration: None,
        })
    }

    pub fn drag_to(&mut self, x: i32, y: i32, button: MouseButton, duration: Option<f64>) -> bool {
        self.perform(Action::Drag { x, y, button, duration })
    }

    pub fn press_key(&mut self, key: &str, hold_time: Option<f64>) -> bool {
        self.perform(Action::KeyPress {
            key: key.to_string(),
            hold_time,
        })
    }

    pub fn press_hotkey(&mut self, keys: &str) -> bool {
        self.perform(Action::Hotkey { keys: keys.to_string() })
    }

    pub fn type_text(&mut self, text: &str, error_correction: bool, context: Option<TypingContext>) -> bool {
        self.perform(Action::TypeText {
            text: text.to_string(),
            error_correction,
            context,
        })
    }

    pub fn wait(&mut self, duration: f64) -> bool {
        self.perform(Action::Wait { duration })
    }

    /// Thinking pause; duration is drawn from the profile when `None`
    pub fn think(&mut self, duration: Option<f64>) -> bool {
        self.perform(Action::Think { duration })
    }

    /// Explicit break; micro 5-15 s, short 30-120 s, long 300-900 s by default
    pub fn take_break(&mut self, duration: Option<f64>, tier: BreakTier) -> bool {
        self.perform(Action::Break { tier, duration })
    }

    pub fn custom_action(&mut self, f: impl FnMut() -> bool + Send + 'static) -> bool {
        self.perform(Action::Custom(CustomAction::new(f)))
    }

    pub fn session_statistics(&mut self) -> SessionStatistics {
        let now = self.clock.now();
        SessionStatistics {
            session_duration: now.saturating_sub(self.session_start).as_secs_f64(),
            state: self.state,
            action_count: self.action_count,
            failed_actions: self.failed_actions,
            fatigue_level: self.profile.fatigue.current_level(),
            activity_level: self.profile.fatigue.activity_intensity(),
            second_wind_active: self.profile.fatigue.is_second_wind_active(),
            personality: self.profile.personality().name().to_string(),
            current_task: self.task_type,
            task_action_count: self.task_action_count,
            mouse: self.mouse.statistics(),
            keyboard: self.keyboard.statistics(),
            task_durations: self.tasks.durations(),
            task_action_counts: self.tasks.action_counts(),
        }
    }

    /// Reset session, mouse and keyboard fatigue to their base levels
    pub fn reset_fatigue(&mut self) {
        self.profile.fatigue.reset(self.clock.now());
        self.mouse.reset_fatigue();
        self.keyboard.reset_fatigue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input::{DeviceEvent, RecordingDriver};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orchestrator(seed: u64) -> (ActionOrchestrator<RecordingDriver>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let orchestrator = ActionOrchestrator::new(
            RecordingDriver::new(),
            SessionProfile::preset("human"),
            Humanizer::seeded(seed),
            clock.clone(),
        );
        (orchestrator, clock)
    }

    #[test]
    fn test_move_reaches_target() {
        let (mut o, clock) = orchestrator(1);

        assert!(o.move_to(400, 300, Some(0.5)));

        let (x, y) = o.driver().current_position();
        assert!((x - 400).abs() <= 10 && (y - 300).abs() <= 10);
        assert!(clock.now_secs() >= 0.5);
        assert_eq!(o.action_count(), 1);
        assert_eq!(o.state(), SessionState::Idle);
    }

    #[test]
    fn test_driver_failure_downgrades_to_false() {
        let (mut o, _clock) = orchestrator(2);
        o.driver_mut().fail_moves_after(0);

        assert!(!o.move_to(200, 200, None));
        assert_eq!(o.failed_actions(), 1);
        assert_eq!(o.action_count(), 0);
        assert_eq!(o.state(), SessionState::Idle);

        o.driver_mut().clear_failures();
        assert!(o.move_to(200, 200, None));
    }

    #[test]
    fn test_drag_failure_releases_button() {
        let (mut o, _clock) = orchestrator(3);
        o.driver_mut().fail_moves_after(3);

        assert!(!o.drag_to(500, 500, MouseButton::Left, Some(0.4)));
        assert!(o.driver().held_buttons().is_empty());
        assert_eq!(
            o.driver().events().last(),
            Some(&DeviceEvent::ButtonUp(MouseButton::Left))
        );
    }

    #[test]
    fn test_type_text_without_correction_round_trips() {
        let (mut o, _clock) = orchestrator(4);
        let text = "deposit all, then logout.";

        assert!(o.type_text(text, false, Some(TypingContext::Chat)));

        assert_eq!(o.driver().key_downs().concat(), text);
        assert_eq!(o.keyboard().context(), TypingContext::Chat);
    }

    #[test]
    fn test_sequence_stops_at_first_failure() {
        let (mut o, _clock) = orchestrator(5);
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();

        let actions = vec![
            Action::custom(|| true),
            Action::custom(|| false),
            Action::custom(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ];

        assert!(!o.execute_sequence(actions, Some(TaskType::Skilling)));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(o.failed_actions(), 1);
        assert_eq!(o.task_type(), TaskType::Skilling);
        // end_sequence clears the sequence counter
        assert_eq!(o.action_count(), 0);
    }

    #[test]
    fn test_full_sequence_succeeds() {
        let (mut o, _clock) = orchestrator(6);
        let actions = vec![
            Action::Move { x: 100, y: 100, duration: Some(0.3) },
            Action::Click { x: None, y: None, button: MouseButton::Left, clicks: 2, interval: None, duration: None },
            Action::Hotkey { keys: "ctrl+a".into() },
            Action::KeyPress { key: "enter".into(), hold_time: Some(0.05) },
            Action::Wait { duration: 0.5 },
            Action::Think { duration: Some(1.0) },
        ];

        assert!(o.execute_sequence(actions, None));

        let downs = o
            .driver()
            .events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::ButtonDown(_)))
            .count();
        assert_eq!(downs, 2);
        assert!(o.driver().held_keys().is_empty());
        assert_eq!(o.failed_actions(), 0);
    }

    #[test]
    fn test_task_switch_records_stats() {
        let (mut o, _clock) = orchestrator(7);
        o.set_task_type(TaskType::Banking);
        assert!(o.wait(2.0));
        assert!(o.wait(2.0));

        o.set_task_type(TaskType::Combat);

        let banking = o.tasks().get(TaskType::Banking).unwrap();
        assert_eq!(banking.avg_action_count, 2.0);
        assert!(banking.avg_duration >= 4.0);

        let stats = o.session_statistics();
        assert!(stats.task_durations.contains_key("banking"));
        assert_eq!(stats.current_task, TaskType::Combat);
        assert_eq!(stats.task_action_count, 0);
    }

    #[test]
    fn test_switch_without_actions_records_nothing() {
        let (mut o, _clock) = orchestrator(8);
        o.set_task_type(TaskType::Dialogue);
        o.set_task_type(TaskType::Trading);
        assert!(o.tasks().get(TaskType::Dialogue).is_none());
    }

    #[test]
    fn test_learning_discount() {
        let (mut fresh, _c1) = orchestrator(9);
        let (mut practiced, _c2) = orchestrator(9);
        practiced.task_action_count = 50;

        let action = Action::Wait { duration: 0.0 };
        let fresh_delay = fresh.action_delay(&action);
        let practiced_delay = practiced.action_delay(&action);

        assert!((practiced_delay / fresh_delay - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_combat_clicks_are_quicker() {
        let (mut general, _c1) = orchestrator(10);
        let (mut combat, _c2) = orchestrator(10);
        combat.task_type = TaskType::Combat;

        let click = || Action::Click { x: None, y: None, button: MouseButton::Left, clicks: 1, interval: None, duration: None };
        let ratio = combat.action_delay(&click()) / general.action_delay(&click());

        assert!((ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_thinking_duration_scales_with_task() {
        let (mut general, _c1) = orchestrator(11);
        let (mut dialogue, _c2) = orchestrator(11);
        dialogue.task_type = TaskType::Dialogue;

        let ratio = dialogue.thinking_duration() / general.thinking_duration();
        assert!((ratio - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_scheduled_break_runs_before_action() {
        let (mut o, clock) = orchestrator(12);
        o.profile_mut().breaks.probability_factor = 10.0;
        clock.advance_minutes(600.0);
        let before = clock.now_secs();

        assert!(o.wait(0.0));

        let long_min = o.profile().breaks.timing(BreakTier::Long).duration.0;
        assert!(clock.now_secs() - before >= long_min);
        assert_eq!(o.state(), SessionState::Idle);
    }

    #[test]
    fn test_explicit_break_uses_tier_defaults() {
        let (mut o, clock) = orchestrator(13);

        assert!(o.take_break(None, BreakTier::Short));

        let elapsed = clock.now_secs();
        assert!(elapsed >= 30.0);
    }

    #[test]
    fn test_cancel_cuts_break_short() {
        let (mut o, clock) = orchestrator(14);
        o.cancel_flag().cancel();

        assert!(!o.take_break(Some(600.0), BreakTier::Long));
        assert!(clock.now_secs() < 1.0);
        assert_eq!(o.failed_actions(), 1);
    }

    #[test]
    fn test_invalid_actions_fail() {
        let (mut o, _clock) = orchestrator(15);
        assert!(!o.wait(-1.0));
        assert!(!o.click(None, MouseButton::Left, 0));
        assert!(!o.press_hotkey(""));
        assert_eq!(o.failed_actions(), 3);
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        let (mut o, clock) = orchestrator(24);

        assert!(!o.wait(1e30));
        assert!(!o.think(Some(f64::MAX)));
        assert!(!o.take_break(Some(1e30), BreakTier::Micro));
        assert!(!o.press_key("a", Some(1e30)));
        assert!(!o.move_to(300, 200, Some(f64::INFINITY)));
        assert_eq!(o.failed_actions(), 5);
        assert!(o.driver().held_keys().is_empty());
        assert!(clock.now_secs() < 60.0);

        // A long but representable wait still runs on virtual time
        assert!(o.wait(7200.0));
        assert!(clock.now_secs() >= 7200.0);
    }

    #[test]
    fn test_reset_fatigue_restores_delay_factor() {
        let (mut o, clock) = orchestrator(16);
        clock.advance_minutes(90.0);
        assert!(o.wait(0.0));
        assert!(o.profile().fatigue.current_level() > 0.0);

        o.reset_fatigue();

        assert_eq!(o.profile().fatigue.delay_factor(), 1.0);
        assert_eq!(o.profile().fatigue.current_level(), 0.0);
        assert_eq!(o.mouse().fatigue_level(), 0.0);
        assert_eq!(o.keyboard().fatigue_level(), 0.0);
    }

    #[test]
    fn test_statistics_serialize() {
        let (mut o, _clock) = orchestrator(17);
        assert!(o.press_key("a", None));

        let stats = o.end_session();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["personality"], "balanced");
        assert_eq!(json["current_task"], "general");
        assert!(json["keyboard"]["avg_hold_time"].is_number());
        assert!(json["mouse"].is_object());
    }

    #[test]
    fn test_profile_switch_updates_devices() {
        let (mut o, _clock) = orchestrator(18);
        o.set_profile(SessionProfile::preset("tired"));

        assert_eq!(o.mouse().profile().name, "smooth");
        assert_eq!(o.keyboard().profile().name, "slow");
        assert_eq!(o.profile().personality().name(), "balanced");
    }

    #[test]
    fn test_late_profile_switch_keeps_fatigue_and_timers() {
        let (mut o, clock) = orchestrator(25);
        clock.advance_minutes(300.0);
        assert!(o.take_break(Some(0.0), BreakTier::Long));
        o.reset_fatigue();
        let before = clock.now_secs();

        o.set_profile(SessionProfile::preset("fast"));
        assert!(o.wait(0.0));
        assert!(o.press_key("a", None));

        assert!(o.profile().fatigue.current_level() < 0.05);
        assert!(o.keyboard().fatigue_level() < 0.05);
        assert!(o.mouse().fatigue_level() < 0.05);
        assert!(clock.now_secs() - before < 30.0);

        let stats = o.session_statistics();
        assert!(stats.session_duration >= 300.0 * 60.0);
    }
}
