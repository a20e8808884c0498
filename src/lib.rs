//! Humanize Engine - human-like pointer and keystroke simulation
//!
//! This library turns abstract input intents ("move here", "type this",
//! "press that") into timed streams of device events with plausible
//! trajectories, typing rhythm, typos and corrections, fatigue and breaks.
//!
//! ## Layout
//!
//! - [`stealth`]: fatigue, personality, break cadence and seeded randomness
//! - [`input`]: the device seam plus the mouse and keyboard engines
//! - [`session`]: the orchestrator that paces whole action sequences
//! - [`config`]: serde-driven settings accepted at construction
//!
//! All time flows through [`clock::Clock`] and all randomness through
//! [`stealth::Humanizer`], so a [`clock::ManualClock`] and a fixed seed make
//! a session fully reproducible.

pub mod clock;
pub mod config;
pub mod input;
pub mod session;
pub mod stealth;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::TypingContext;
use crate::stealth::BreakTier;

pub use crate::clock::{CancelFlag, Clock, ManualClock, SystemClock};
pub use crate::config::Settings;
pub use crate::input::{InputDriver, InputError, RecordingDriver};
pub use crate::session::{ActionOrchestrator, SessionProfile, TaskType};

/// Pointer button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied step run inside a sequence
pub struct CustomAction(Box<dyn FnMut() -> bool + Send>);

impl CustomAction {
    pub fn new(f: impl FnMut() -> bool + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn call(&mut self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomAction(..)")
    }
}

fn default_clicks() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// One abstract step for the orchestrator
///
/// Durations are in seconds. Scripts can load these from JSON, tagged by
/// `type`; `custom` steps exist only in code.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        x: i32,
        y: i32,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// Click at `(x, y)`, or where the pointer is when either is missing
    Click {
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default)]
        button: MouseButton,
        #[serde(default = "default_clicks")]
        clicks: u32,
        #[serde(default)]
        interval: Option<f64>,
        #[serde(default)]
        duration: Option<f64>,
    },
    Drag {
        x: i32,
        y: i32,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        duration: Option<f64>,
    },
    KeyPress {
        key: String,
        #[serde(default)]
        hold_time: Option<f64>,
    },
    /// `+`-joined combination such as `ctrl+shift+s`
    Hotkey { keys: String },
    TypeText {
        text: String,
        #[serde(default = "default_true")]
        error_correction: bool,
        #[serde(default)]
        context: Option<TypingContext>,
    },
    Wait { duration: f64 },
    Think {
        #[serde(default)]
        duration: Option<f64>,
    },
    Break {
        #[serde(default = "default_break_tier")]
        tier: BreakTier,
        #[serde(default)]
        duration: Option<f64>,
    },
    #[serde(skip)]
    Custom(CustomAction),
}

fn default_break_tier() -> BreakTier {
    BreakTier::Micro
}

impl Action {
    /// Snake-case tag, as used in scripts and logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Click { .. } => "click",
            Action::Drag { .. } => "drag",
            Action::KeyPress { .. } => "key_press",
            Action::Hotkey { .. } => "hotkey",
            Action::TypeText { .. } => "type_text",
            Action::Wait { .. } => "wait",
            Action::Think { .. } => "think",
            Action::Break { .. } => "break",
            Action::Custom(_) => "custom",
        }
    }

    /// Session fatigue intensity of this action
    pub fn intensity(&self) -> f64 {
        match self {
            Action::Drag { .. } => 1.5,
            Action::TypeText { .. } => 1.2,
            _ => 1.0,
        }
    }

    pub fn custom(f: impl FnMut() -> bool + Send + 'static) -> Self {
        Action::Custom(CustomAction::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_script_parses() {
        let json = r#"[
            {"type": "move", "x": 10, "y": 20},
            {"type": "click", "button": "right", "clicks": 2},
            {"type": "type_text", "text": "hi", "context": "chat"},
            {"type": "hotkey", "keys": "ctrl+s"},
            {"type": "break", "tier": "short"}
        ]"#;
        let actions: Vec<Action> = serde_json::from_str(json).unwrap();

        assert_eq!(actions.len(), 5);
        assert!(matches!(actions[0], Action::Move { x: 10, y: 20, duration: None }));
        assert!(matches!(
            actions[1],
            Action::Click { x: None, button: MouseButton::Right, clicks: 2, .. }
        ));
        assert!(matches!(
            &actions[2],
            Action::TypeText { error_correction: true, context: Some(TypingContext::Chat), .. }
        ));
        assert!(matches!(actions[4], Action::Break { tier: BreakTier::Short, duration: None }));
    }

    #[test]
    fn test_custom_is_code_only() {
        assert!(serde_json::from_str::<Action>(r#"{"type": "custom"}"#).is_err());

        let mut action = Action::custom(|| true);
        assert_eq!(action.name(), "custom");
        if let Action::Custom(f) = &mut action {
            assert!(f.call());
        }
    }

    #[test]
    fn test_intensity() {
        let drag = Action::Drag { x: 0, y: 0, button: MouseButton::Left, duration: None };
        let wait = Action::Wait { duration: 1.0 };
        assert_eq!(drag.intensity(), 1.5);
        assert_eq!(wait.intensity(), 1.0);
        assert_eq!(MouseButton::Middle.to_string(), "middle");
    }
}
