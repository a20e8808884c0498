//! Humanized pointer movement
//!
//! [`TrajectoryGenerator`] turns a start/end pair into timed pixel steps:
//! momentum-aware control points, corner cutting, Bezier sampling with
//! jitter and tremor, a two-phase acceleration profile, optional overshoot
//! and idle drift. [`HumanizedMouse`] executes those steps on an
//! [`InputDriver`] and layers click and drag on top.

use std::collections::VecDeque;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::bezier::{self, Point, SampleNoise};
use super::driver::{InputDriver, InputError};
use crate::clock::{CancelFlag, Clock};
use crate::stealth::{FatigueState, Humanizer, MousePersonality};
use crate::MouseButton;

/// Named movement profiles
pub const MOVEMENT_PROFILES: [&str; 6] = ["human", "fast", "precise", "erratic", "smooth", "gamer"];

/// Targets closer than this (pixels) get a drift instead of a full move
const DRIFT_RADIUS: f64 = 5.0;
/// Seconds per step at speed factor 1.0
const BASE_STEP_DELAY: f64 = 0.005;
/// Overshoot correction leg length relative to the main leg
const CORRECTION_SHARE: f64 = 0.3;
const HISTORY_SIZE: usize = 100;
/// Seconds for the activity level to decay to zero
const ACTIVITY_DECAY_SECS: f64 = 10.0;

const MOVE_INTENSITY: f64 = 1.0;
const CLICK_INTENSITY: f64 = 1.5;
const DRAG_INTENSITY: f64 = 2.0;

/// Scalar movement parameters, before personality is folded in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    /// Higher = faster (0.1 to 5.0)
    pub speed_factor: f64,
    /// Higher = more jitter (0.0 to 5.0)
    pub jitter_factor: f64,
    /// Higher = more overshooting (0.0 to 5.0)
    pub overshoot_factor: f64,
    /// Exponent of the acceleration ramps (0.1 to 5.0)
    pub acceleration_factor: f64,
    /// Samples per curve (10 to 200)
    pub smoothness: usize,
    pub corner_cutting: f64,
    pub momentum_factor: f64,
    /// How quickly speed follows the target speed (0.0 to 1.0)
    pub friction_factor: f64,
    pub tremor_base: f64,
    pub drift_factor: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            speed_factor: 1.0,
            jitter_factor: 1.0,
            overshoot_factor: 1.0,
            acceleration_factor: 1.0,
            smoothness: 50,
            corner_cutting: 0.5,
            momentum_factor: 0.5,
            friction_factor: 0.5,
            tremor_base: 0.0,
            drift_factor: 0.2,
        }
    }
}

impl MovementParams {
    fn clamped(self) -> Self {
        Self {
            speed_factor: self.speed_factor.clamp(0.1, 5.0),
            jitter_factor: self.jitter_factor.clamp(0.0, 5.0),
            overshoot_factor: self.overshoot_factor.clamp(0.0, 5.0),
            acceleration_factor: self.acceleration_factor.clamp(0.1, 5.0),
            smoothness: self.smoothness.clamp(10, 200),
            corner_cutting: self.corner_cutting.clamp(0.0, 1.0),
            momentum_factor: self.momentum_factor.clamp(0.0, 1.0),
            friction_factor: self.friction_factor.clamp(0.0, 1.0),
            tremor_base: self.tremor_base.clamp(0.0, 1.0),
            drift_factor: self.drift_factor.clamp(0.0, 1.0),
        }
    }
}

/// Optional multipliers applied on top of a named profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementOverrides {
    pub speed: Option<f64>,
    pub jitter: Option<f64>,
    pub overshoot: Option<f64>,
    pub drift: Option<f64>,
}

/// Movement configuration: parameters, personality and fatigue
#[derive(Debug, Clone)]
pub struct MovementProfile {
    pub name: String,
    pub params: MovementParams,
    personality: MousePersonality,
    pub fatigue: FatigueState,
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self::preset("human")
    }
}

impl MovementProfile {
    /// Build a profile; personality traits are folded into `params` once
    pub fn new(
        name: impl Into<String>,
        params: MovementParams,
        personality: MousePersonality,
        fatigue: FatigueState,
    ) -> Self {
        let mut profile = Self {
            name: name.into(),
            params: params.clamped(),
            personality,
            fatigue,
        };
        profile.apply_personality();
        profile
    }

    fn apply_personality(&mut self) {
        let traits = *self.personality.traits();
        let p = &mut self.params;

        p.speed_factor *= 0.5 + traits.speed_preference;
        p.jitter_factor *= traits.jitter_tendency;
        p.overshoot_factor *= traits.overshoot_tendency;
        p.acceleration_factor *= 0.5 + traits.acceleration_preference;
        p.smoothness = (p.smoothness as f64 * (0.5 + self.personality.smoothness() * 0.5)) as usize;
        p.corner_cutting *= traits.corner_cutting;
        p.tremor_base *= traits.jitter_tendency;
    }

    /// Look up a named profile, falling back to `human`
    pub fn preset(name: &str) -> Self {
        let (params, personality, accumulation_rate) = match name {
            "human" => (
                MovementParams {
                    speed_factor: 1.0,
                    jitter_factor: 1.0,
                    overshoot_factor: 1.0,
                    acceleration_factor: 1.0,
                    smoothness: 50,
                    corner_cutting: 0.5,
                    momentum_factor: 0.5,
                    friction_factor: 0.5,
                    tremor_base: 0.2,
                    drift_factor: 0.2,
                },
                "casual",
                0.01,
            ),
            "fast" => (
                MovementParams {
                    speed_factor: 2.0,
                    jitter_factor: 0.7,
                    overshoot_factor: 1.2,
                    acceleration_factor: 1.5,
                    smoothness: 30,
                    corner_cutting: 0.7,
                    momentum_factor: 0.7,
                    friction_factor: 0.3,
                    tremor_base: 0.3,
                    drift_factor: 0.1,
                },
                "gamer",
                0.02,
            ),
            "precise" => (
                MovementParams {
                    speed_factor: 0.8,
                    jitter_factor: 0.3,
                    overshoot_factor: 0.2,
                    acceleration_factor: 0.7,
                    smoothness: 80,
                    corner_cutting: 0.2,
                    momentum_factor: 0.3,
                    friction_factor: 0.7,
                    tremor_base: 0.1,
                    drift_factor: 0.1,
                },
                "precise",
                0.005,
            ),
            "erratic" => (
                MovementParams {
                    speed_factor: 1.5,
                    jitter_factor: 2.5,
                    overshoot_factor: 2.0,
                    acceleration_factor: 2.0,
                    smoothness: 40,
                    corner_cutting: 0.8,
                    momentum_factor: 0.8,
                    friction_factor: 0.4,
                    tremor_base: 0.5,
                    drift_factor: 0.4,
                },
                "erratic",
                0.015,
            ),
            "smooth" => (
                MovementParams {
                    speed_factor: 0.9,
                    jitter_factor: 0.2,
                    overshoot_factor: 0.1,
                    acceleration_factor: 0.5,
                    smoothness: 100,
                    corner_cutting: 0.3,
                    momentum_factor: 0.4,
                    friction_factor: 0.6,
                    tremor_base: 0.1,
                    drift_factor: 0.1,
                },
                "relaxed",
                0.008,
            ),
            "gamer" => (
                MovementParams {
                    speed_factor: 1.8,
                    jitter_factor: 0.5,
                    overshoot_factor: 0.8,
                    acceleration_factor: 1.2,
                    smoothness: 40,
                    corner_cutting: 0.6,
                    momentum_factor: 0.6,
                    friction_factor: 0.4,
                    tremor_base: 0.2,
                    drift_factor: 0.1,
                },
                "gamer",
                0.012,
            ),
            other => {
                log::warn!("Unknown movement profile: {}, using 'human'", other);
                return Self::preset("human");
            }
        };

        Self::new(
            name,
            params,
            MousePersonality::preset(personality),
            FatigueState::new(accumulation_rate),
        )
    }

    /// Multiply selected parameters and re-clamp
    pub fn apply_overrides(&mut self, overrides: &MovementOverrides) {
        let p = &mut self.params;
        if let Some(f) = overrides.speed {
            p.speed_factor *= f;
        }
        if let Some(f) = overrides.jitter {
            p.jitter_factor *= f;
        }
        if let Some(f) = overrides.overshoot {
            p.overshoot_factor *= f;
        }
        if let Some(f) = overrides.drift {
            p.drift_factor *= f;
        }
        self.params = self.params.clamped();
    }

    pub fn personality(&self) -> &MousePersonality {
        &self.personality
    }

    /// Tremor amplitude: base tremor grown by fatigue
    pub fn current_tremor(&self, humanizer: &mut Humanizer) -> f64 {
        let tremor = self.params.tremor_base;
        tremor + self.fatigue.tremor_factor(humanizer) * tremor
    }

    pub fn current_speed_factor(&self) -> f64 {
        self.params.speed_factor * self.fatigue.speed_factor()
    }

    pub fn current_accuracy(&self) -> f64 {
        self.personality.traits().accuracy * self.fatigue.accuracy_factor()
    }
}

/// One emitted pointer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub x: i32,
    pub y: i32,
    /// Seconds to wait after moving to this point
    pub delay: f64,
}

/// Requested timing of a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTiming {
    /// Total seconds; derived from speed and distance when `None`
    pub duration: Option<f64>,
    pub start_speed: f64,
    pub end_speed: f64,
}

impl Default for MoveTiming {
    fn default() -> Self {
        Self {
            duration: None,
            start_speed: 0.8,
            end_speed: 0.7,
        }
    }
}

impl MoveTiming {
    pub fn with_duration(duration: Option<f64>) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Slower ramps used while a button is held
    pub fn drag(duration: Option<f64>) -> Self {
        Self {
            duration,
            start_speed: 0.6,
            end_speed: 0.5,
        }
    }
}

/// Plans a trajectory from a profile and the current pointer velocity
pub struct TrajectoryGenerator<'a> {
    profile: &'a MovementProfile,
    humanizer: &'a mut Humanizer,
    velocity: (f64, f64),
}

impl<'a> TrajectoryGenerator<'a> {
    pub fn new(profile: &'a MovementProfile, humanizer: &'a mut Humanizer) -> Self {
        Self {
            profile,
            humanizer,
            velocity: (0.0, 0.0),
        }
    }

    /// Current pointer velocity in pixels per second, used for momentum
    pub fn with_velocity(mut self, velocity: (f64, f64)) -> Self {
        self.velocity = velocity;
        self
    }

    /// Plan a full move, including overshoot or idle drift
    ///
    /// With an explicit duration the delays sum to it exactly.
    pub fn plan(&mut self, start: (i32, i32), end: (i32, i32), timing: MoveTiming) -> Vec<TimedPoint> {
        let distance = distance(to_point(start), to_point(end));

        if distance < DRIFT_RADIUS {
            return self.drift(end, timing.duration).into_iter().collect();
        }

        if self.should_overshoot(distance) {
            let overshoot = self.overshoot_point(start, end);
            let total = 1.0 + CORRECTION_SHARE;
            let mut points = self.plan_leg(
                start,
                overshoot,
                timing.duration.map(|d| d / total),
                timing.start_speed,
                1.0,
            );
            points.extend(self.plan_leg(
                overshoot,
                end,
                timing.duration.map(|d| d * CORRECTION_SHARE / total),
                0.5,
                timing.end_speed,
            ));
            points
        } else {
            self.plan_leg(start, end, timing.duration, timing.start_speed, timing.end_speed)
        }
    }

    fn plan_leg(
        &mut self,
        start: (i32, i32),
        end: (i32, i32),
        duration: Option<f64>,
        start_speed: f64,
        end_speed: f64,
    ) -> Vec<TimedPoint> {
        let params = self.profile.params;
        let control = self.control_points(to_point(start), to_point(end));
        let control = bezier::cut_corners(&control, params.corner_cutting);
        let noise = SampleNoise {
            jitter_factor: params.jitter_factor,
            tremor: self.profile.current_tremor(self.humanizer),
        };
        let points = bezier::sample(&control, params.smoothness, noise, self.humanizer);
        let mut timed = self.apply_acceleration(&points, start_speed, end_speed);

        if let Some(duration) = duration {
            let total: f64 = timed.iter().map(|p| p.delay).sum();
            if total > 0.0 {
                let scale = duration / total;
                for point in &mut timed {
                    point.delay *= scale;
                }
            }
        }

        timed
    }

    /// Start, optional momentum point, a deviated midpoint, end
    fn momentum_points(&mut self, start: Point, end: Point) -> Vec<Point> {
        let distance = distance(start, end);
        if distance == 0.0 {
            return vec![start, end];
        }
        let dir = ((end.0 - start.0) / distance, (end.1 - start.1) / distance);

        let (vx, vy) = self.velocity;
        let speed = vx.hypot(vy);
        let mut momentum = self.profile.params.momentum_factor;
        let mut v_norm = (0.0, 0.0);
        if speed > 0.0 {
            v_norm = (vx / speed, vy / speed);
            let alignment = dir.0 * v_norm.0 + dir.1 * v_norm.1;
            momentum *= 0.5 + alignment * 0.5;
        }

        let mut points = vec![start];

        if momentum > 0.1 && speed > 10.0 {
            let reach = (distance * 0.5).min(speed * 0.2);
            points.push((start.0 + v_norm.0 * reach, start.1 + v_norm.1 * reach));
        }

        let deviation = distance * 0.2 * self.profile.params.jitter_factor;
        points.push((
            start.0 + dir.0 * distance * 0.5 + self.humanizer.spread(deviation),
            start.1 + dir.1 * distance * 0.5 + self.humanizer.spread(deviation),
        ));
        points.push(end);
        points
    }

    /// Control points: momentum points if they are enough, otherwise
    /// evenly spaced interior points deviated off the straight line
    pub fn control_points(&mut self, start: Point, end: Point) -> Vec<Point> {
        let with_momentum = self.momentum_points(start, end);

        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let distance = dx.hypot(dy);
        let angle = dy.atan2(dx);
        let accuracy = self.profile.current_accuracy();

        let base = ((distance / 300.0) as usize + 3).clamp(3, 5);
        let count = ((base as f64 * (1.0 + (1.0 - accuracy))) as usize).max(3);

        if with_momentum.len() >= count {
            return with_momentum;
        }

        let max_deviation = (distance
            * 0.4
            * self.profile.params.jitter_factor
            * (1.0 + (1.0 - accuracy)))
            .min(100.0);
        let perp = angle + FRAC_PI_2;

        let mut points = Vec::with_capacity(count);
        points.push(start);
        for i in 1..count - 1 {
            let t = i as f64 / (count - 1) as f64;
            let off = self.humanizer.spread(max_deviation);
            let along = self.humanizer.uniform(-0.1, 0.1) * distance;
            points.push((
                start.0 + t * dx + off * perp.cos() + along * angle.cos(),
                start.1 + t * dy + off * perp.sin() + along * angle.sin(),
            ));
        }
        points.push(end);
        points
    }

    /// Attach delays following a two-phase speed profile
    fn apply_acceleration(&mut self, points: &[(i32, i32)], start_speed: f64, end_speed: f64) -> Vec<TimedPoint> {
        let Some(&(x0, y0)) = points.first() else {
            return Vec::new();
        };
        let mut timed = Vec::with_capacity(points.len());
        timed.push(TimedPoint { x: x0, y: y0, delay: 0.0 });

        let n = points.len();
        if n < 2 {
            return timed;
        }

        let base_delay = BASE_STEP_DELAY / self.profile.current_speed_factor();
        let distances: Vec<f64> = points
            .windows(2)
            .map(|w| distance(to_point(w[0]), to_point(w[1])))
            .collect();
        let average = distances.iter().sum::<f64>() / (n - 1) as f64;
        let accel = self.profile.params.acceleration_factor;
        let friction = self.profile.params.friction_factor;

        let mut speed = start_speed;
        for (i, &(x, y)) in points.iter().enumerate().skip(1) {
            let t = if n > 2 {
                (i - 1) as f64 / (n - 2) as f64
            } else {
                0.5
            };
            let target = if t < 0.5 {
                start_speed + (1.0 - start_speed) * (t * 2.0).powf(accel)
            } else {
                1.0 + (end_speed - 1.0) * ((t - 0.5) * 2.0).powf(accel)
            };
            speed += (target - speed) * friction;

            let distance_factor = if average > 0.0 {
                distances[i - 1] / average
            } else {
                1.0
            };
            let delay = base_delay * distance_factor / speed.max(0.05) * self.humanizer.uniform(0.9, 1.1);
            timed.push(TimedPoint { x, y, delay });
        }

        timed
    }

    fn should_overshoot(&mut self, distance: f64) -> bool {
        let probability = (distance / 500.0).min(0.3)
            * self.profile.params.overshoot_factor
            * (1.0 + self.profile.fatigue.current_level() * 0.5);
        self.humanizer.chance(probability)
    }

    fn overshoot_point(&mut self, start: (i32, i32), end: (i32, i32)) -> (i32, i32) {
        let (dx, dy) = ((end.0 - start.0) as f64, (end.1 - start.1) as f64);
        let distance = dx.hypot(dy);
        let dir = if distance > 0.0 {
            (dx / distance, dy / distance)
        } else {
            (0.0, 0.0)
        };

        let accuracy = self.profile.current_accuracy();
        let fatigue = self.profile.fatigue.current_level();
        let spill = (1.0 - accuracy) * (1.0 + fatigue);
        let past = distance * self.humanizer.uniform(0.05, 0.15) * (1.0 + spill);
        let side = self.humanizer.uniform(-0.1, 0.1) * distance;

        (
            (end.0 as f64 + dir.0 * past - dir.1 * side).round() as i32,
            (end.1 as f64 + dir.1 * past + dir.0 * side).round() as i32,
        )
    }

    /// Single repositioning step near `at`
    ///
    /// Without drift the step lands on `at`, and is only emitted when a
    /// duration has to be spent.
    fn drift(&mut self, at: (i32, i32), duration: Option<f64>) -> Option<TimedPoint> {
        let drift = self.profile.params.drift_factor;
        if drift <= 0.0 {
            return duration.map(|delay| TimedPoint { x: at.0, y: at.1, delay });
        }
        let amount = drift * (1.0 + self.profile.fatigue.current_level());
        Some(TimedPoint {
            x: (at.0 as f64 + self.humanizer.spread(amount)).round() as i32,
            y: (at.1 as f64 + self.humanizer.spread(amount)).round() as i32,
            delay: duration.unwrap_or(0.0),
        })
    }
}

fn to_point((x, y): (i32, i32)) -> Point {
    (x as f64, y as f64)
}

fn distance(a: Point, b: Point) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// Click parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOptions {
    pub button: MouseButton,
    pub clicks: u32,
    /// Seconds between clicks; drawn from fatigue when `None`
    pub interval: Option<f64>,
    pub move_duration: Option<f64>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            clicks: 1,
            interval: None,
            move_duration: None,
        }
    }
}

/// Snapshot of pointer state for telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementStatistics {
    pub fatigue_level: f64,
    pub activity_level: f64,
    pub tremor_factor: f64,
    pub speed_factor: f64,
    pub accuracy: f64,
    pub personality: String,
    pub avg_velocity: Option<f64>,
    pub max_velocity: Option<f64>,
    pub current_velocity: Option<f64>,
}

/// Pointer engine executing planned trajectories on a driver
pub struct HumanizedMouse {
    profile: MovementProfile,
    humanizer: Humanizer,
    clock: Arc<dyn Clock>,
    cancel: CancelFlag,
    velocity: (f64, f64),
    activity_level: f64,
    last_activity: Duration,
    history: VecDeque<(i32, i32, Duration)>,
}

impl HumanizedMouse {
    pub fn new(mut profile: MovementProfile, humanizer: Humanizer, clock: Arc<dyn Clock>) -> Self {
        let last_activity = clock.now();
        profile.fatigue.anchor(last_activity);
        Self {
            profile,
            humanizer,
            clock,
            cancel: CancelFlag::new(),
            velocity: (0.0, 0.0),
            activity_level: 0.0,
            last_activity,
            history: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }

    /// Share a cancellation flag with the caller
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn profile(&self) -> &MovementProfile {
        &self.profile
    }

    /// Swap the profile; fatigue carries over from the outgoing one
    pub fn set_profile(&mut self, mut profile: MovementProfile) {
        profile.fatigue.continue_from(&self.profile.fatigue);
        log::debug!(
            "Mouse profile set: {} (speed={:.2}, jitter={:.2}, overshoot={:.2}, smoothness={}, personality={})",
            profile.name,
            profile.params.speed_factor,
            profile.params.jitter_factor,
            profile.params.overshoot_factor,
            profile.params.smoothness,
            profile.personality().name()
        );
        self.profile = profile;
    }

    pub fn fatigue_level(&self) -> f64 {
        self.profile.fatigue.current_level()
    }

    pub fn activity_level(&self) -> f64 {
        self.activity_level
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

    fn record(&mut self, x: i32, y: i32) {
        if self.history.len() == HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back((x, y, self.clock.now()));
    }

    fn latest_velocity(&self) -> (f64, f64) {
        let n = self.history.len();
        if n < 2 {
            return (0.0, 0.0);
        }
        let (x1, y1, t1) = self.history[n - 2];
        let (x2, y2, t2) = self.history[n - 1];
        let dt = t2.saturating_sub(t1).as_secs_f64();
        if dt > 0.0 {
            ((x2 - x1) as f64 / dt, (y2 - y1) as f64 / dt)
        } else {
            (0.0, 0.0)
        }
    }

    /// Plan a move from the driver's current position without executing it
    pub fn plan_move<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        x: i32,
        y: i32,
        timing: MoveTiming,
    ) -> Result<Vec<TimedPoint>, InputError> {
        let start = driver.position()?;
        Ok(TrajectoryGenerator::new(&self.profile, &mut self.humanizer)
            .with_velocity(self.velocity)
            .plan(start, (x, y), timing))
    }

    /// Move the pointer to `(x, y)`
    pub fn move_to<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        x: i32,
        y: i32,
        timing: MoveTiming,
    ) -> Result<(), InputError> {
        self.update_activity(MOVE_INTENSITY);
        let steps = self.plan_move(driver, x, y, timing)?;

        for step in steps {
            if self.cancel.is_cancelled() {
                return Err(InputError::Cancelled);
            }
            driver.move_pointer_to(step.x, step.y)?;
            self.record(step.x, step.y);
            self.clock.sleep_secs(step.delay);
        }

        self.velocity = self.latest_velocity();
        Ok(())
    }

    /// Move to the target (or stay) and click
    pub fn click<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        target: Option<(i32, i32)>,
        options: ClickOptions,
    ) -> Result<(), InputError> {
        self.update_activity(CLICK_INTENSITY);

        let (x, y) = match target {
            Some(point) => point,
            None => driver.position()?,
        };
        self.move_to(driver, x, y, MoveTiming::with_duration(options.move_duration))?;

        let fatigue = self.fatigue_level();
        let interval = options
            .interval
            .unwrap_or_else(|| self.humanizer.uniform(0.05, 0.15) * (1.0 + fatigue));

        for i in 0..options.clicks {
            if self.cancel.is_cancelled() {
                return Err(InputError::Cancelled);
            }

            let tremor = self.profile.fatigue.tremor_factor(&mut self.humanizer);
            let jitter = (self.profile.params.jitter_factor.clamp(1.0, 3.0) * (1.0 + tremor)) as i32;
            let jx = x + self.humanizer.int_between(-jitter, jitter);
            let jy = y + self.humanizer.int_between(-jitter, jitter);
            driver.move_pointer_to(jx, jy)?;
            self.record(jx, jy);

            driver.press_button(options.button)?;
            self.clock.sleep_secs(self.humanizer.tap_duration());
            driver.release_button(options.button)?;

            if i + 1 < options.clicks {
                let variability = 0.1 + self.fatigue_level() * 0.2;
                let pause = self.humanizer.vary(interval, variability);
                self.clock.sleep_secs(pause);
            }
        }

        Ok(())
    }

    /// Press `button`, move to `(x, y)`, release
    ///
    /// The button is released even when the move fails.
    pub fn drag_to<D: InputDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        x: i32,
        y: i32,
        button: MouseButton,
        duration: Option<f64>,
    ) -> Result<(), InputError> {
        self.update_activity(DRAG_INTENSITY);

        driver.press_button(button)?;
        let moved = self.move_to(driver, x, y, MoveTiming::drag(duration));

        if let Err(e) = driver.release_button(button) {
            log::error!("Failed to release {} button after drag: {}", button, e);
            return Err(moved.err().unwrap_or(InputError::Driver(e)));
        }

        moved
    }

    pub fn statistics(&mut self) -> MovementStatistics {
        let velocities: Vec<f64> = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .filter_map(|(&(x1, y1, t1), &(x2, y2, t2))| {
                let dt = t2.saturating_sub(t1).as_secs_f64();
                (dt > 0.0).then(|| ((x2 - x1) as f64).hypot((y2 - y1) as f64) / dt)
            })
            .collect();

        let (avg, max, current) = if velocities.is_empty() {
            (None, None, None)
        } else {
            (
                Some(velocities.iter().sum::<f64>() / velocities.len() as f64),
                Some(velocities.iter().cloned().fold(0.0, f64::max)),
                Some(self.velocity.0.hypot(self.velocity.1)),
            )
        };

        MovementStatistics {
            fatigue_level: self.fatigue_level(),
            activity_level: self.activity_level,
            tremor_factor: self.profile.current_tremor(&mut self.humanizer),
            speed_factor: self.profile.current_speed_factor(),
            accuracy: self.profile.current_accuracy(),
            personality: self.profile.personality().name().to_string(),
            avg_velocity: avg,
            max_velocity: max,
            current_velocity: current,
        }
    }

    pub fn reset_fatigue(&mut self) {
        self.profile.fatigue.reset(self.clock.now());
        log::info!("Reset mouse fatigue to base level");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::input::driver::{DeviceEvent, DriverError, RecordingDriver};
    use proptest::prelude::*;

    fn mouse(profile: &str, seed: u64) -> (HumanizedMouse, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let mouse = HumanizedMouse::new(
            MovementProfile::preset(profile),
            Humanizer::seeded(seed),
            clock.clone(),
        );
        (mouse, clock)
    }

    #[test]
    fn test_presets_fold_personality() {
        let profile = MovementProfile::preset("human");
        // casual: speed_pref 0.6, jitter 0.4
        assert!((profile.params.speed_factor - 1.1).abs() < 1e-9);
        assert!((profile.params.jitter_factor - 0.4).abs() < 1e-9);
        assert!((profile.params.tremor_base - 0.08).abs() < 1e-9);
        assert_eq!(profile.personality().name(), "casual");

        for name in MOVEMENT_PROFILES {
            let p = MovementProfile::preset(name);
            assert_eq!(p.name, name);
            assert!(p.params.smoothness >= 5);
        }
    }

    #[test]
    fn test_unknown_profile_falls_back() {
        assert_eq!(MovementProfile::preset("teleport").name, "human");
    }

    #[test]
    fn test_overrides_scale_and_clamp() {
        let mut profile = MovementProfile::preset("fast");
        profile.apply_overrides(&MovementOverrides {
            speed: Some(100.0),
            jitter: Some(0.0),
            ..Default::default()
        });
        assert_eq!(profile.params.speed_factor, 5.0);
        assert_eq!(profile.params.jitter_factor, 0.0);
    }

    #[test]
    fn test_explicit_duration_sums_exactly() {
        for seed in 0..40 {
            let profile = MovementProfile::preset("erratic");
            let mut humanizer = Humanizer::seeded(seed);
            let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
                (10, 10),
                (900, 640),
                MoveTiming::with_duration(Some(0.75)),
            );
            let total: f64 = points.iter().map(|p| p.delay).sum();

            assert!((total - 0.75).abs() < 1e-9, "seed {}: {}", seed, total);
        }
    }

    #[test]
    fn test_straight_move_reaches_target() {
        let profile = MovementProfile::preset("human");
        let bound = profile.params.jitter_factor + profile.params.tremor_base + 1.0;

        for seed in 0..20 {
            let mut humanizer = Humanizer::seeded(seed);
            let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
                (0, 0),
                (100, 0),
                MoveTiming::with_duration(Some(1.0)),
            );
            let last = points[points.len() - 1];
            assert!((last.x - 100).abs() as f64 <= bound, "seed {}: {:?}", seed, last);
            assert!(last.y.abs() as f64 <= bound);

            let advance: i32 = points.windows(2).map(|w| w[1].x - w[0].x).sum();
            assert!(advance > 0);
        }
    }

    #[test]
    fn test_move_without_overshoot_never_backtracks() {
        let mut profile = MovementProfile::preset("human");
        profile.params.overshoot_factor = 0.0;

        for seed in 0..20 {
            let mut humanizer = Humanizer::seeded(seed);
            let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
                (0, 0),
                (100, 0),
                MoveTiming::with_duration(Some(1.0)),
            );

            // Only per-sample noise and rounding can step backwards
            assert!(points.windows(2).all(|w| w[1].x - w[0].x >= -2));
        }
    }

    #[test]
    fn test_short_move_drifts_once() {
        let profile = MovementProfile::preset("human");
        let mut humanizer = Humanizer::seeded(3);
        let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
            (50, 50),
            (52, 51),
            MoveTiming::default(),
        );

        assert_eq!(points.len(), 1);
        assert!((points[0].x - 52).abs() <= 1);
        assert!((points[0].y - 51).abs() <= 1);
    }

    #[test]
    fn test_zero_length_move_without_drift_is_noop() {
        let mut profile = MovementProfile::preset("human");
        profile.params.drift_factor = 0.0;
        let mut humanizer = Humanizer::seeded(3);
        let points =
            TrajectoryGenerator::new(&profile, &mut humanizer).plan((5, 5), (5, 5), MoveTiming::default());

        assert!(points.is_empty());
    }

    #[test]
    fn test_zero_length_move_without_drift_spends_duration() {
        let mut profile = MovementProfile::preset("human");
        profile.params.drift_factor = 0.0;
        let mut humanizer = Humanizer::seeded(3);
        let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
            (5, 5),
            (7, 5),
            MoveTiming::with_duration(Some(0.4)),
        );

        assert_eq!(points.len(), 1);
        assert_eq!((points[0].x, points[0].y), (7, 5));
        assert!((points[0].delay - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_momentum_point_follows_velocity() {
        let mut profile = MovementProfile::preset("human");
        profile.params.momentum_factor = 1.0;
        let mut humanizer = Humanizer::seeded(9);
        let points = TrajectoryGenerator::new(&profile, &mut humanizer)
            .with_velocity((500.0, 0.0))
            .momentum_points((0.0, 0.0), (400.0, 0.0));

        // start, momentum, midpoint, end
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], (100.0, 0.0));
    }

    #[test]
    fn test_control_point_count_grows_when_inaccurate() {
        let mut profile = MovementProfile::preset("precise");
        let mut humanizer = Humanizer::seeded(1);
        let accurate = TrajectoryGenerator::new(&profile, &mut humanizer)
            .control_points((0.0, 0.0), (1200.0, 0.0))
            .len();

        profile.fatigue = FatigueState::new(0.01).with_level(1.0);
        let tired = TrajectoryGenerator::new(&profile, &mut humanizer)
            .control_points((0.0, 0.0), (1200.0, 0.0))
            .len();

        assert!(tired >= accurate);
        assert!(accurate >= 3);
    }

    #[test]
    fn test_move_to_executes_every_step() {
        let (mut mouse, clock) = mouse("precise", 11);
        let mut driver = RecordingDriver::at(0, 0);

        mouse
            .move_to(&mut driver, 300, 200, MoveTiming::with_duration(Some(0.5)))
            .unwrap();

        assert!(driver.moves().len() >= 10);
        assert!((clock.now_secs() - 0.5).abs() < 1e-6);
        assert!(mouse.statistics().avg_velocity.is_some());
    }

    #[test]
    fn test_click_presses_and_releases() {
        let (mut mouse, _clock) = mouse("human", 4);
        let mut driver = RecordingDriver::at(0, 0);

        mouse
            .click(
                &mut driver,
                Some((200, 120)),
                ClickOptions {
                    clicks: 2,
                    ..Default::default()
                },
            )
            .unwrap();

        let downs = driver
            .events()
            .iter()
            .filter(|e| matches!(e, DeviceEvent::ButtonDown(MouseButton::Left)))
            .count();
        assert_eq!(downs, 2);
        assert!(driver.held_buttons().is_empty());
    }

    #[test]
    fn test_drag_releases_button_on_failure() {
        let (mut mouse, _clock) = mouse("human", 5);
        let mut driver = RecordingDriver::at(0, 0);
        driver.fail_moves_after(3);

        let result = mouse.drag_to(&mut driver, 500, 500, MouseButton::Left, None);

        assert!(matches!(result, Err(InputError::Driver(DriverError::Device(_)))));
        assert!(driver.held_buttons().is_empty());
        assert_eq!(driver.events().last(), Some(&DeviceEvent::ButtonUp(MouseButton::Left)));
    }

    #[test]
    fn test_cancel_stops_move() {
        let (mouse, _clock) = mouse("human", 6);
        let cancel = CancelFlag::new();
        let mut mouse = mouse.with_cancel_flag(cancel.clone());
        let mut driver = RecordingDriver::at(0, 0);
        cancel.cancel();

        let result = mouse.move_to(&mut driver, 400, 400, MoveTiming::default());

        assert!(matches!(result, Err(InputError::Cancelled)));
        assert!(driver.moves().is_empty());
    }

    #[test]
    fn test_activity_fatigues_and_resets() {
        let (mut mouse, clock) = mouse("fast", 8);
        let mut driver = RecordingDriver::at(0, 0);

        for i in 0..30 {
            clock.advance_minutes(1.0);
            mouse
                .move_to(&mut driver, (i % 2) * 600, 300, MoveTiming::default())
                .unwrap();
        }
        assert!(mouse.fatigue_level() > 0.0);

        mouse.reset_fatigue();
        assert_eq!(mouse.fatigue_level(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_duration_respected(
            sx in 0i32..1920, sy in 0i32..1080,
            ex in 0i32..1920, ey in 0i32..1080,
            duration in 0.05f64..3.0,
            seed in any::<u64>(),
        ) {
            let profile = MovementProfile::preset("human");
            let mut humanizer = Humanizer::seeded(seed);
            let points = TrajectoryGenerator::new(&profile, &mut humanizer).plan(
                (sx, sy),
                (ex, ey),
                MoveTiming::with_duration(Some(duration)),
            );
            let total: f64 = points.iter().map(|p| p.delay).sum();
            let far = ((ex - sx) as f64).hypot((ey - sy) as f64) >= DRIFT_RADIUS;

            if far {
                prop_assert!((total - duration).abs() < 1e-9);
            }
        }
    }
}
