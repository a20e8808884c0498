//! Device driver seam
//!
//! The engine never touches a real device. Everything it emits goes through
//! [`InputDriver`], whose primitives are assumed synchronous and
//! near-instantaneous compared to the delays the engine inserts.

use std::collections::HashSet;

use crate::MouseButton;

/// Failure reported by a device primitive
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error("Device call failed: {0}")]
    Device(String),
    #[error("Input device unavailable")]
    Unavailable,
}

/// Failure of a pointer or keyboard operation
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
    #[error("Action cancelled")]
    Cancelled,
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// Low-level pointer and keystroke primitives
///
/// `key` is an opaque token: a single character or a named key such as
/// `enter`, `backspace` or `shift`.
pub trait InputDriver {
    fn position(&mut self) -> Result<(i32, i32), DriverError>;
    fn move_pointer_to(&mut self, x: i32, y: i32) -> Result<(), DriverError>;
    fn press_button(&mut self, button: MouseButton) -> Result<(), DriverError>;
    fn release_button(&mut self, button: MouseButton) -> Result<(), DriverError>;
    fn key_down(&mut self, key: &str) -> Result<(), DriverError>;
    fn key_up(&mut self, key: &str) -> Result<(), DriverError>;
}

impl<D: InputDriver + ?Sized> InputDriver for Box<D> {
    fn position(&mut self) -> Result<(i32, i32), DriverError> {
        (**self).position()
    }

    fn move_pointer_to(&mut self, x: i32, y: i32) -> Result<(), DriverError> {
        (**self).move_pointer_to(x, y)
    }

    fn press_button(&mut self, button: MouseButton) -> Result<(), DriverError> {
        (**self).press_button(button)
    }

    fn release_button(&mut self, button: MouseButton) -> Result<(), DriverError> {
        (**self).release_button(button)
    }

    fn key_down(&mut self, key: &str) -> Result<(), DriverError> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: &str) -> Result<(), DriverError> {
        (**self).key_up(key)
    }
}

/// A primitive call as seen by [`RecordingDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    MoveTo { x: i32, y: i32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    KeyDown(String),
    KeyUp(String),
}

/// In-memory driver that records every call
///
/// Used by the CLI dry run and by tests. Failures can be injected per key,
/// per button press, or after a number of pointer moves.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    events: Vec<DeviceEvent>,
    position: (i32, i32),
    held_keys: HashSet<String>,
    held_buttons: HashSet<MouseButton>,
    failing_keys: HashSet<String>,
    fail_moves_after: Option<usize>,
    fail_button_press: bool,
    moves: usize,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the pointer at `(x, y)`
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: (x, y),
            ..Self::default()
        }
    }

    /// Make `key_down(key)` fail
    pub fn fail_key_down(&mut self, key: &str) {
        self.failing_keys.insert(key.to_string());
    }

    /// Let `count` pointer moves succeed, then fail every further move
    pub fn fail_moves_after(&mut self, count: usize) {
        self.fail_moves_after = Some(count);
    }

    /// Make every `press_button` call fail
    pub fn fail_button_press(&mut self) {
        self.fail_button_press = true;
    }

    /// Remove every injected failure
    pub fn clear_failures(&mut self) {
        self.failing_keys.clear();
        self.fail_moves_after = None;
        self.fail_button_press = false;
    }

    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn current_position(&self) -> (i32, i32) {
        self.position
    }

    /// Keys pressed and not yet released
    pub fn held_keys(&self) -> &HashSet<String> {
        &self.held_keys
    }

    /// Buttons pressed and not yet released
    pub fn held_buttons(&self) -> &HashSet<MouseButton> {
        &self.held_buttons
    }

    /// Every `key_down` token, in order
    pub fn key_downs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DeviceEvent::KeyDown(k) => Some(k.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every pointer position emitted, in order
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                DeviceEvent::MoveTo { x, y } => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    /// Text as a text field would show it after replaying every key-down
    ///
    /// `backspace` deletes the last character, `space` and `enter` insert
    /// whitespace, other named keys are ignored.
    pub fn read_back(&self) -> String {
        let mut text = String::new();
        for key in self.key_downs() {
            match key {
                "backspace" => {
                    text.pop();
                }
                "space" => text.push(' '),
                "enter" => text.push('\n'),
                "tab" => text.push('\t'),
                k if k.chars().count() == 1 => text.push_str(k),
                _ => {}
            }
        }
        text
    }
}

impl InputDriver for RecordingDriver {
    fn position(&mut self) -> Result<(i32, i32), DriverError> {
        Ok(self.position)
    }

    fn move_pointer_to(&mut self, x: i32, y: i32) -> Result<(), DriverError> {
        if let Some(limit) = self.fail_moves_after {
            if self.moves >= limit {
                return Err(DriverError::Device(format!("move to ({}, {}) rejected", x, y)));
            }
        }
        self.moves += 1;
        self.position = (x, y);
        self.events.push(DeviceEvent::MoveTo { x, y });
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> Result<(), DriverError> {
        if self.fail_button_press {
            return Err(DriverError::Device(format!("{} button stuck", button)));
        }
        self.held_buttons.insert(button);
        self.events.push(DeviceEvent::ButtonDown(button));
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> Result<(), DriverError> {
        self.held_buttons.remove(&button);
        self.events.push(DeviceEvent::ButtonUp(button));
        Ok(())
    }

    fn key_down(&mut self, key: &str) -> Result<(), DriverError> {
        if self.failing_keys.contains(key) {
            return Err(DriverError::Device(format!("key '{}' rejected", key)));
        }
        self.held_keys.insert(key.to_string());
        self.events.push(DeviceEvent::KeyDown(key.to_string()));
        Ok(())
    }

    fn key_up(&mut self, key: &str) -> Result<(), DriverError> {
        self.held_keys.remove(key);
        self.events.push(DeviceEvent::KeyUp(key.to_string()));
        Ok(())
    }
}
