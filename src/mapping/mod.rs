//! Translation core: turns controller state snapshots into EventServer
//! button events.
//!
//! ```text
//! InputSample ──► ChangeDetector ──► translate ──► finalize ──► ButtonEvent
//!                  (deadzone on        (0..2 per      (defaults
//!                   stick axes)         change)        + clamp)
//! ```
//!
//! The engine drives this pipeline from its dispatch loop and hands every
//! finalized event to the EventServer client in generation order.

pub mod deadzone;
pub mod detector;
pub mod engine;
pub mod normalizer;
pub mod translator;

pub use detector::{Change, ChangeDetector};
pub use engine::{BridgeEngine, BridgeError};

use std::collections::HashMap;
use std::time::Duration;

/// One controller state snapshot: input key to raw signed value.
pub type InputSample = HashMap<String, i32>;

/// Button map namespace for gamepad events on the receiver.
pub const BUTTON_MAP: &str = "XG";

/// A not-yet-finalized outbound event produced by the translator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialEvent {
    pub button: &'static str,
    pub amount: Option<i64>,
    pub down: Option<bool>,
    pub axis: bool,
}

impl PartialEvent {
    fn digital(button: &'static str) -> Self {
        Self {
            button,
            amount: None,
            down: None,
            axis: false,
        }
    }

    fn trigger(button: &'static str, amount: i64) -> Self {
        Self {
            button,
            amount: Some(amount),
            down: None,
            axis: false,
        }
    }

    fn axis_active(button: &'static str, amount: i64) -> Self {
        Self {
            button,
            amount: Some(amount),
            down: None,
            axis: true,
        }
    }

    /// Explicit release of the opposite direction; `down` is pinned so the
    /// normalizer's default cannot turn it back into a press.
    fn axis_release(button: &'static str) -> Self {
        Self {
            button,
            amount: Some(0),
            down: Some(false),
            axis: true,
        }
    }
}

/// A finalized button state event in the EventServer vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonEvent {
    pub map: &'static str,
    pub button: &'static str,
    pub down: bool,
    pub amount: Option<u16>,
    pub axis: bool,
}

/// Settings for the dispatch engine.
#[derive(Clone, Debug)]
pub struct BridgeSettings {
    pub deadzone_percent: u8,
    pub ping_interval: Duration,
    pub stats_interval: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            deadzone_percent: 30,
            ping_interval: Duration::from_secs(55),
            stats_interval: Duration::from_secs(1),
        }
    }
}

/// Runs one snapshot through the full translation pipeline.
///
/// Events come back in generation order: changed keys in sample iteration
/// order, and within one key the translator's descriptor order.
pub fn process_sample(detector: &mut ChangeDetector, sample: &InputSample) -> Vec<ButtonEvent> {
    let mut events = Vec::new();
    for change in detector.process(sample) {
        let pressed = change.value != 0;
        for partial in translator::translate(&change.key, change.value) {
            events.push(normalizer::finalize(partial, pressed));
        }
    }
    events
}
