//! Session pacing and orchestration
//!
//! Ties the device engines to session-level fatigue, breaks and task
//! context.

pub mod orchestrator;
pub mod profile;
pub mod task;

pub use orchestrator::{ActionOrchestrator, SessionState, SessionStatistics};
pub use profile::{SessionProfile, SessionRates, SESSION_PROFILES};
pub use task::{TaskLedger, TaskStats, TaskType};
