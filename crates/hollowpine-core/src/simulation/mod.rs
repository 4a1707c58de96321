//! Timed systems - the virtual clock, flashlight battery and session events

pub mod events;
pub mod flashlight;
pub mod scheduler;

pub use events::SimEvent;
pub use flashlight::{DrainOutcome, Flashlight, FlashlightMode, MAX_BATTERY};
pub use scheduler::{Fired, Scheduler, TimerId, TimerKind};
