//! Humanized pointer and keyboard input
//!
//! Devices are reached only through [`InputDriver`]. The mouse and keyboard
//! engines turn high-level requests into timed primitive calls.

pub mod bezier;
pub mod driver;
pub mod keyboard;
pub mod layout;
pub mod mouse;

pub use driver::{DeviceEvent, DriverError, InputDriver, InputError, RecordingDriver};
pub use keyboard::{
    TypingContext, TypingEngine, TypingOverrides, TypingProfile, TypingRates, TypingRhythm,
    TypingStatistics, TypoModel,
};
pub use layout::{Finger, Hand, KeyCategory, QwertyLayout};
pub use mouse::{
    ClickOptions, HumanizedMouse, MoveTiming, MovementOverrides, MovementParams, MovementProfile,
    MovementStatistics, TimedPoint, TrajectoryGenerator,
};
