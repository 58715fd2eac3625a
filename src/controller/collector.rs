//! Pad event collection: gilrs events in, full-state snapshots out.

use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use statum::{machine, state};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::mapping::InputSample;

/// Every input key the collector reports, in the protocol's vocabulary.
const INPUT_KEYS: [&str; 20] = [
    "a", "b", "x", "y", "white", "black", "start", "back", "las", "ras", "up", "down", "left",
    "right", "ltrigger", "rtrigger", "lasX", "lasY", "rasX", "rasY",
];

/// Collector settings.
#[derive(Clone, Debug)]
pub struct CollectorSettings {
    pub poll_interval_us: u64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            poll_interval_us: 500,
        }
    }
}

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),

    #[error("No gamepad connected")]
    NoGamepad,
}

/// Define collector states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum CollectionState {
    Initializing,
    Collecting,
}

#[machine]
pub struct PadCollector<S: CollectionState> {
    // Gilrs context
    gilrs: Gilrs,

    // Gamepad selected at startup; events from others are dropped
    active_gamepad: Option<GamepadId>,

    // Collector settings
    settings: CollectorSettings,

    // Channel for sending snapshots to the engine
    snapshot_sender: mpsc::Sender<InputSample>,

    // Current raw state of every reported input key
    state: HashMap<String, i32>,
}

impl PadCollector<Initializing> {
    pub fn create(
        settings: Option<CollectorSettings>,
        snapshot_sender: mpsc::Sender<InputSample>,
    ) -> Result<Self, CollectorError> {
        let settings = settings.unwrap_or_default();

        info!("Initializing gamepad backend");
        let gilrs =
            Gilrs::new().map_err(|e| CollectorError::InitializationError(e.to_string()))?;

        // Every key starts at rest so the first snapshot carries a complete,
        // all-zero state.
        let state = INPUT_KEYS.iter().map(|key| (key.to_string(), 0)).collect();

        Ok(Self::new(gilrs, None, settings, snapshot_sender, state))
    }

    /// Selects the active gamepad and transitions to the Collecting state.
    pub fn initialize(mut self) -> Result<PadCollector<Collecting>, CollectorError> {
        let gamepads: Vec<(GamepadId, String)> = self
            .gilrs
            .gamepads()
            .map(|(id, pad)| (id, pad.name().to_string()))
            .collect();

        if gamepads.is_empty() {
            return Err(CollectorError::NoGamepad);
        }

        for (id, name) in &gamepads {
            info!("Found gamepad [{}]: {}", id, name);
        }
        let (id, name) = &gamepads[0];
        self.active_gamepad = Some(*id);
        info!("Selected gamepad: {} ({})", name, id);

        Ok(self.transition())
    }
}

impl PadCollector<Collecting> {
    /// Poll loop; runs for the rest of the session.
    pub async fn run_collection_loop(mut self) {
        info!("Starting pad collection loop");

        let mut snapshot_count = 0usize;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(30);

        loop {
            snapshot_count += self.collect_pending_events();

            let now = Local::now();
            if now - last_log_time > log_interval {
                debug!(
                    "Collector stats: {} snapshots in the last {} seconds",
                    snapshot_count,
                    log_interval.num_seconds()
                );
                snapshot_count = 0;
                last_log_time = now;
            }

            tokio::time::sleep(Duration::from_micros(self.settings.poll_interval_us)).await;
        }
    }

    /// Drains pending gilrs events; emits one snapshot per accepted event.
    fn collect_pending_events(&mut self) -> usize {
        let mut emitted = 0;
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if self.active_gamepad.is_some_and(|active| active != id) {
                trace!("Skipping event from inactive gamepad {:?}", id);
                continue;
            }
            if self.apply_event(event) {
                self.emit_snapshot();
                emitted += 1;
            }
        }
        emitted
    }

    /// Updates the raw state for one gilrs event. Returns whether the state
    /// actually changed.
    fn apply_event(&mut self, event: EventType) -> bool {
        match event {
            EventType::ButtonPressed(button, _) => self.set_button(button, 1),
            EventType::ButtonReleased(button, _) => self.set_button(button, 0),
            EventType::ButtonChanged(button, value, _) => match button {
                Button::LeftTrigger2 => self.set_key("ltrigger", scale_trigger(value)),
                Button::RightTrigger2 => self.set_key("rtrigger", scale_trigger(value)),
                _ => false,
            },
            EventType::AxisChanged(axis, value, _) => match axis {
                Axis::LeftStickX => self.set_key("lasX", scale_axis(value)),
                // gilrs reports up as positive; the button map wants down positive
                Axis::LeftStickY => self.set_key("lasY", scale_axis(-value)),
                Axis::RightStickX => self.set_key("rasX", scale_axis(value)),
                Axis::RightStickY => self.set_key("rasY", scale_axis(-value)),
                // some backends report the triggers as Z axes
                Axis::LeftZ => self.set_key("ltrigger", scale_trigger(value)),
                Axis::RightZ => self.set_key("rtrigger", scale_trigger(value)),
                Axis::DPadX => {
                    let left = self.set_key("left", (value < -0.5) as i32);
                    let right = self.set_key("right", (value > 0.5) as i32);
                    left || right
                }
                Axis::DPadY => {
                    let up = self.set_key("up", (value > 0.5) as i32);
                    let down = self.set_key("down", (value < -0.5) as i32);
                    up || down
                }
                _ => {
                    trace!("Ignoring unsupported axis {:?}", axis);
                    false
                }
            },
            EventType::Connected => {
                info!("Gamepad connected");
                false
            }
            EventType::Disconnected => {
                warn!("Gamepad disconnected");
                false
            }
            _ => false,
        }
    }

    fn set_button(&mut self, button: Button, value: i32) -> bool {
        let Some(key) = map_button(button) else {
            trace!("Ignoring unmapped button {:?}", button);
            return false;
        };
        self.set_key(key, value)
    }

    fn set_key(&mut self, key: &str, value: i32) -> bool {
        match self.state.get_mut(key) {
            Some(slot) if *slot != value => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    fn emit_snapshot(&mut self) {
        // Bounded channel: report drops instead of queuing without limit
        if let Err(e) = self.snapshot_sender.try_send(self.state.clone()) {
            warn!("Dropping snapshot, channel full or closed: {}", e);
        }
    }
}

/// Public handle for the collector task.
pub struct CollectorHandle {
    snapshot_sender: mpsc::Sender<InputSample>,
}

impl CollectorHandle {
    /// Creates the collector, selects a gamepad, and spawns the poll loop.
    /// Failing to find any gamepad is fatal here, before anything is spawned.
    pub fn spawn(
        settings: Option<CollectorSettings>,
        snapshot_sender: mpsc::Sender<InputSample>,
    ) -> Result<Self, CollectorError> {
        let sender_clone = snapshot_sender.clone();

        let collector = PadCollector::create(settings, snapshot_sender)?;
        let collecting = collector.initialize()?;

        tokio::spawn(async move {
            collecting.run_collection_loop().await;
        });

        Ok(Self {
            snapshot_sender: sender_clone,
        })
    }

    /// Get a sender for injecting snapshots alongside the collector's.
    pub fn snapshot_sender(&self) -> mpsc::Sender<InputSample> {
        self.snapshot_sender.clone()
    }
}

/// gilrs button to protocol input key. The white/black pair sits where the
/// bumpers sit on later pads.
fn map_button(button: Button) -> Option<&'static str> {
    match button {
        Button::South => Some("a"),
        Button::East => Some("b"),
        Button::West => Some("x"),
        Button::North => Some("y"),
        Button::LeftTrigger => Some("white"),
        Button::RightTrigger => Some("black"),
        Button::Start => Some("start"),
        Button::Select => Some("back"),
        Button::LeftThumb => Some("las"),
        Button::RightThumb => Some("ras"),
        Button::DPadUp => Some("up"),
        Button::DPadDown => Some("down"),
        Button::DPadLeft => Some("left"),
        Button::DPadRight => Some("right"),
        _ => None,
    }
}

/// -1.0..1.0 stick deflection to a signed 16-bit raw value.
fn scale_axis(value: f32) -> i32 {
    (value.clamp(-1.0, 1.0) * 32767.0).round() as i32
}

/// 0.0..1.0 trigger pull to raw 0..255.
fn scale_trigger(value: f32) -> i32 {
    (value.clamp(0.0, 1.0) * 255.0).round() as i32
}
