//! Controller subsystem for gamepad input handling
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► PadCollector ──► InputSample snapshots
//!             (gilrs poll)     (bounded channel)
//! ```
//!
//! The collector keeps the full raw pad state and emits a complete snapshot
//! whenever any input changes. Raw values go out untouched; deadzone
//! filtering belongs to the translation core downstream.

pub mod collector;

pub use collector::{CollectorError, CollectorHandle, CollectorSettings, PadCollector};
