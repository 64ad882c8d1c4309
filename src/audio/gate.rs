//! Pause/resume control over microphone capture.
//!
//! The dialogue controller pauses capture while a reply is playing so the
//! speaker output is never transcribed as a new command.  [`MicGate`] is
//! consulted by the cpal input callback (frames are dropped while paused)
//! and by the transcriber thread (a pause discards any half-collected
//! utterance).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

// ---------------------------------------------------------------------------
// CaptureGate
// ---------------------------------------------------------------------------

/// Pause/resume seam used by the dialogue controller.
///
/// Both calls are idempotent.  `resume` is valid without a preceding
/// `pause`.
pub trait CaptureGate: Send + Sync {
    fn pause(&self);
    fn resume(&self);
}

/// RAII guard returned by [`pause_capture`]; resumes capture on drop.
///
/// Dropping happens on every exit path — normal return, `?`, panic
/// unwinding, or the owning future being cancelled.
#[must_use = "capture resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    gate: &'a dyn CaptureGate,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.gate.resume();
    }
}

/// Pause `gate` until the returned guard goes out of scope.
pub fn pause_capture(gate: &dyn CaptureGate) -> PauseGuard<'_> {
    gate.pause();
    PauseGuard { gate }
}

// ---------------------------------------------------------------------------
// MicGate
// ---------------------------------------------------------------------------

/// Lock-free [`CaptureGate`] shared by the capture callback, the
/// transcriber and the dialogue controller.
#[derive(Debug, Default)]
pub struct MicGate {
    paused: AtomicBool,
    /// Bumped on every pause; lets readers detect a pause they slept through.
    epoch: AtomicU64,
    /// Signalled on resume for threads parked in [`MicGate::wait_open`].
    reopened: Condvar,
    lock: Mutex<()>,
}

impl MicGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// `true` while capture is allowed.
    pub fn is_open(&self) -> bool {
        !self.paused.load(Ordering::Acquire)
    }

    /// Number of pauses so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Block the calling thread until capture is allowed.
    pub fn wait_open(&self) {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !self.is_open() {
            guard = self
                .reopened
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// [`wait_open`](Self::wait_open) with a deadline; `false` if the gate
    /// was still closed when `timeout` ran out.
    pub fn wait_open_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (_guard, _) = self
            .reopened
            .wait_timeout_while(guard, timeout, |_| !self.is_open())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_open()
    }
}

impl CaptureGate for MicGate {
    fn pause(&self) {
        if !self.paused.swap(true, Ordering::AcqRel) {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            log::debug!("capture: paused");
        }
    }

    fn resume(&self) {
        if self.paused.swap(false, Ordering::AcqRel) {
            // Taking the lock orders this wake-up after any waiter's check.
            drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
            self.reopened.notify_all();
            log::debug!("capture: resumed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
