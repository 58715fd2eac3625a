//! Dispatch engine with statum state machine for the bridge session.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──► Active ──► Deactivating ──► Deactivated
//!     (create)     (select     (leave loop)     (BYE sent)
//!                   loop)
//! ```
//!
//! # Architecture
//!
//! ```text
//! InputSample ──► [detect ► translate ► finalize] ──► EventClient
//!      ▲                                                  │
//! snapshot channel            ping / stats timers ────────┘
//!                             (arms of the same select loop)
//! ```
//!
//! Everything runs in one task: a snapshot is processed to completion
//! before the next select round, so two snapshots never interleave and the
//! timers only fire between snapshots, never during one.

use statum::{machine, state};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::eventserver::EventClient;
use crate::mapping::{process_sample, BridgeSettings, ChangeDetector, InputSample};

/// Engine errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Snapshot channel closed: {0}")]
    ChannelClosed(String),
}

/// States for the bridge session lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum BridgeEngineState {
    Initializing, // channels and client wired up
    Active,       // dispatching snapshots
    Deactivating, // loop left, sends stopped
    Deactivated,  // BYE sent
}

/// Bridge engine with compile-time state safety via statum
///
/// Owns the change detector cache for the session; the cache is created
/// with the engine and dies with it.
#[machine]
pub struct BridgeEngine<S: BridgeEngineState> {
    snapshot_receiver: mpsc::Receiver<InputSample>,
    client: EventClient,
    detector: ChangeDetector,
    settings: BridgeSettings,
    events_sent: u64,
}

impl BridgeEngine<Initializing> {
    pub fn create(
        snapshot_receiver: mpsc::Receiver<InputSample>,
        client: EventClient,
        settings: BridgeSettings,
    ) -> Self {
        info!("Initializing bridge engine with {:?}", settings);
        let detector = ChangeDetector::new(settings.deadzone_percent);
        Self::new(snapshot_receiver, client, detector, settings, 0)
    }

    pub fn activate(self) -> BridgeEngine<Active> {
        info!("Activating bridge engine");
        self.transition()
    }
}

impl BridgeEngine<Active> {
    /// Processes one snapshot to completion, forwarding every resulting
    /// event in generation order. A failed send is logged and skipped; one
    /// dropped button event must not end the session.
    async fn dispatch_snapshot(&mut self, sample: InputSample) {
        for event in process_sample(&mut self.detector, &sample) {
            debug!("Sending {:?}", event);
            match self.client.send_button_state(&event).await {
                Ok(_) => self.events_sent += 1,
                Err(e) => warn!("Failed to send button state: {}", e),
            }
        }
    }

    /// Main dispatch loop. Runs until cancelled; a closed snapshot channel
    /// means the collector died and is an error.
    pub async fn run_until_shutdown(
        mut self,
        cancel: CancellationToken,
    ) -> Result<BridgeEngine<Deactivating>, BridgeError> {
        info!("Entering dispatch loop");

        // First tick one full period out: the handshake just proved the
        // connection, and a stats report at t=0 would always be empty.
        let mut ping_timer = interval_at(
            Instant::now() + self.settings.ping_interval,
            self.settings.ping_interval,
        );
        let mut stats_timer = interval_at(
            Instant::now() + self.settings.stats_interval,
            self.settings.stats_interval,
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }

                snapshot = self.snapshot_receiver.recv() => {
                    match snapshot {
                        Some(sample) => self.dispatch_snapshot(sample).await,
                        None => {
                            return Err(BridgeError::ChannelClosed(
                                "pad collector hung up".to_string(),
                            ));
                        }
                    }
                }

                _ = ping_timer.tick() => {
                    if let Err(e) = self.client.ping().await {
                        warn!("Keep-alive ping failed: {}", e);
                    }
                }

                _ = stats_timer.tick() => {
                    if self.events_sent > 0 {
                        debug!("{} updates sent in the last second", self.events_sent);
                        self.events_sent = 0;
                    }
                }
            }
        }

        Ok(self.transition())
    }
}

impl BridgeEngine<Deactivating> {
    /// Announces the end of the session, best-effort. The timers died with
    /// the dispatch loop; nothing sends after this.
    pub async fn shutdown(mut self) -> BridgeEngine<Deactivated> {
        if let Err(e) = self.client.bye().await {
            warn!("Failed to send BYE: {}", e);
        }
        info!("Bridge engine shut down");
        self.transition()
    }
}

impl BridgeEngine<Deactivated> {}
