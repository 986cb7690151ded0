//! External liveness condition and operator step gating.
//!
//! There is no cooperative cancellation token; procedures poll the liveness
//! flag at every outer iteration and after every blocking call. The flag is
//! flipped from the dataflow event loop when a stop event arrives.

use crate::types::StepSignal;
use eyre::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const POLL_SLICE: Duration = Duration::from_millis(50);

/// Process-wide external stop condition.
#[derive(Clone, Default)]
pub struct Liveness {
    stopped: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Sleep for `duration`, waking early on shutdown. Returns whether the
    /// system is still live afterwards.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if !self.is_live() {
                return false;
            }
            let slice = remaining.min(POLL_SLICE);
            thread::sleep(slice);
            remaining -= slice;
        }
        self.is_live()
    }

    /// Block until shutdown is requested. Used by hold-position modes.
    pub fn park(&self) {
        while self.is_live() {
            thread::sleep(POLL_SLICE);
        }
    }
}

/// Receives discrete step/run signals from the operator UI and blocks the
/// control thread between steps when single-step mode is active.
pub struct RemoteControl {
    signals: Mutex<Receiver<StepSignal>>,
    autonomous: AtomicBool,
    liveness: Liveness,
}

impl RemoteControl {
    /// Returns the control handle plus the sender the event loop feeds.
    pub fn new(liveness: Liveness, autonomous: bool) -> (Sender<StepSignal>, Self) {
        let (tx, rx) = mpsc::channel();
        let control = Self {
            signals: Mutex::new(rx),
            autonomous: AtomicBool::new(autonomous),
            liveness,
        };
        (tx, control)
    }

    pub fn set_autonomous(&self, autonomous: bool) {
        self.autonomous.store(autonomous, Ordering::SeqCst);
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous.load(Ordering::SeqCst)
    }

    /// Block until the operator advances one step or switches to continuous
    /// running. Passes straight through in autonomous mode and on shutdown.
    pub fn wait_for_next_step(&self, label: &str) -> Result<()> {
        if self.is_autonomous() || !self.liveness.is_live() {
            return Ok(());
        }

        info!("Waiting for operator: {}", label);
        let receiver = self
            .signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            match receiver.recv_timeout(POLL_SLICE) {
                Ok(StepSignal::Next) => {
                    debug!("Step signal received: {}", label);
                    return Ok(());
                }
                Ok(StepSignal::RunContinuously) => {
                    info!("Switching to continuous run");
                    self.set_autonomous(true);
                    return Ok(());
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.liveness.is_live() {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Signal source is gone; do not deadlock the arm.
                    debug!("Step signal source disconnected, continuing");
                    self.set_autonomous(true);
                    return Ok(());
                }
            }
        }
    }
}
