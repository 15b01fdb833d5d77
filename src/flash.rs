//! Flashlight transmission scheduler.
//!
//! Reuses the compiled event sequence to drive a binary on/off signal. The
//! scheduler decides *when* to flip the signal; the hardware itself sits
//! behind the [`FlashSink`] capability trait.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::{coding::timing::TimedEvent, error::MorseError};

/// Fixed per-step buffer to absorb torch driver latency.
const HARDWARE_BUFFER_MS: u64 = 10;

/// The hardware side of a transmission. Implementations turn the actual
/// light on and off; the scheduler never touches hardware directly.
pub trait FlashSink: Send + 'static {
    /// Whether flash hardware is present at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Permission gate, checked once before the first signal change.
    fn ensure_permission(&mut self) -> Result<(), MorseError> {
        Ok(())
    }

    fn set_on(&mut self, on: bool) -> Result<(), MorseError>;
}

/// Caller hooks for one transmission. Invoked from the scheduler's timer
/// thread; keep them to trivial state updates.
#[derive(Default)]
pub struct TransmitCallbacks {
    pub on_complete: Option<Box<dyn FnOnce() + Send>>,
    pub on_error: Option<Box<dyn FnOnce(MorseError) + Send>>,
}

struct Shared {
    active: AtomicBool,
    cancelled: Mutex<bool>,
    signal: Condvar,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }

    /// Sleep for `duration`, waking early on cancellation. Returns true if
    /// the transmission was cancelled.
    fn wait_cancellable(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.cancelled.lock();
        while !*cancelled {
            if self.signal.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Schedules one flash transmission at a time. Concurrent transmissions
/// are rejected, not queued.
pub struct Transmitter {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Transmitter {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                cancelled: Mutex::new(false),
                signal: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn is_transmitting(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Walk `events` on a timer thread, flipping `sink` on for dits and
    /// dahs and off for gaps. An empty sequence completes immediately.
    pub fn transmit<S: FlashSink>(
        &self,
        events: Vec<TimedEvent>,
        mut sink: S,
        mut callbacks: TransmitCallbacks,
    ) -> Result<(), MorseError> {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return Err(MorseError::AlreadyTransmitting);
        }

        if events.is_empty() {
            self.shared.active.store(false, Ordering::SeqCst);
            if let Some(on_complete) = callbacks.on_complete.take() {
                on_complete();
            }
            return Ok(());
        }

        if !sink.is_available() {
            self.shared.active.store(false, Ordering::SeqCst);
            return Err(MorseError::DeviceUnsupported(
                "no flash hardware present".into(),
            ));
        }
        if let Err(err) = sink.ensure_permission() {
            self.shared.active.store(false, Ordering::SeqCst);
            return Err(err);
        }

        // Reap the worker of a previously finished transmission.
        let mut worker = self.worker.lock();
        if let Some(old) = worker.take() {
            let _ = old.join();
        }

        *self.shared.cancelled.lock() = false;
        let shared = Arc::clone(&self.shared);
        *worker = Some(thread::spawn(move || {
            run_schedule(shared, events, sink, callbacks)
        }));
        Ok(())
    }

    /// Cancel any pending steps and force the signal off. Blocks until the
    /// timer thread has fully shut down, so no signal change or callback
    /// can fire after this returns. Idempotent.
    pub fn stop(&self) {
        {
            let mut cancelled = self.shared.cancelled.lock();
            *cancelled = true;
            self.shared.signal.notify_all();
        }

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            // A callback invoking stop() must not join its own thread.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }

    /// Lifecycle hook for callers losing foreground execution.
    pub fn release_resources(&self) {
        self.stop();
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn run_schedule<S: FlashSink>(
    shared: Arc<Shared>,
    events: Vec<TimedEvent>,
    mut sink: S,
    mut callbacks: TransmitCallbacks,
) {
    let mut failure = None;

    for event in &events {
        if shared.is_cancelled() {
            break;
        }
        if let Err(err) = sink.set_on(event.kind.is_signal_on()) {
            failure = Some(MorseError::TransmissionFailed(err.to_string()));
            break;
        }
        if shared.wait_cancellable(Duration::from_millis(
            event.duration_ms + HARDWARE_BUFFER_MS,
        )) {
            break;
        }
    }

    let _ = sink.set_on(false);
    let cancelled = shared.is_cancelled();
    shared.active.store(false, Ordering::SeqCst);

    match failure {
        Some(err) => {
            tracing::warn!(%err, "flash transmission aborted");
            if let Some(on_error) = callbacks.on_error.take() {
                on_error(err);
            }
        }
        None if !cancelled => {
            if let Some(on_complete) = callbacks.on_complete.take() {
                on_complete();
            }
        }
        None => {}
    }
}
