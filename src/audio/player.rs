//! Live playback transport.
//!
//! The engine is a pull-based sample source: the output stream callback
//! drains it through [`PlaybackEngine::fill_interleaved`], while transport
//! methods (`pause`, `resume`, `seek`, `stop`) take the same state lock and
//! therefore land between callback pulls. No state changes mid-pull, which
//! is what keeps pause and stop race-free.

use parking_lot::Mutex;

use crate::{
    coding::timing::{TimedEvent, TimingConfig},
    error::MorseError,
    SAMPLE_RATE,
};

use super::tone::Tone;

/// Slowest supported playback speed multiplier.
pub const MIN_SPEED: f64 = 0.5;
/// Fastest supported playback speed multiplier.
pub const MAX_SPEED: f64 = 2.0;

/// Progress callback cadence in samples, roughly 16 ms (~60 Hz).
const PROGRESS_INTERVAL_SAMPLES: usize = SAMPLE_RATE as usize * 16 / 1000;

/// Number of output samples covering `duration_ms` at the given speed.
pub(crate) fn samples_for(duration_ms: u64, speed: f64) -> usize {
    (duration_ms as f64 / speed * SAMPLE_RATE as f64 / 1000.0).round() as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Playing,
    Paused,
}

type ProgressFn = Box<dyn FnMut(f64) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

/// Caller hooks for one playback session. Both are invoked from inside the
/// engine's fill callback; keep them to trivial state updates.
#[derive(Default)]
pub struct SessionCallbacks {
    pub on_progress: Option<ProgressFn>,
    pub on_complete: Option<CompleteFn>,
}

struct Session {
    events: Vec<TimedEvent>,
    speed: f64,
    total_ms: f64,
    /// Event about to play (or playing). `events.len()` means complete.
    index: usize,
    /// Samples already emitted for the current event.
    samples_into_event: usize,
    /// Milliseconds of fully completed events, speed-adjusted.
    elapsed_ms: f64,
    tone: Tone,
    samples_since_report: usize,
}

impl Session {
    fn adjusted_ms(&self, index: usize) -> f64 {
        self.events[index].duration_ms as f64 / self.speed
    }

    fn progress(&self) -> f64 {
        let in_event_ms = if self.index < self.events.len() {
            let played = self.samples_into_event as f64 * 1000.0 / SAMPLE_RATE as f64;
            played.min(self.adjusted_ms(self.index))
        } else {
            0.0
        };

        ((self.elapsed_ms + in_event_ms) / self.total_ms).clamp(0.0, 1.0)
    }
}

/// Pull the next mono sample, or `None` once the sequence is complete.
fn next_sample(session: &mut Session) -> Option<f32> {
    loop {
        if session.index >= session.events.len() {
            return None;
        }

        let event = session.events[session.index];
        let event_samples = samples_for(event.duration_ms, session.speed);
        if session.samples_into_event >= event_samples {
            session.elapsed_ms += session.adjusted_ms(session.index);
            session.index += 1;
            session.samples_into_event = 0;
            session.tone.reset();
            continue;
        }

        session.samples_into_event += 1;
        session.samples_since_report += 1;
        return Some(if event.kind.is_signal_on() {
            session.tone.next().unwrap_or(0.0)
        } else {
            0.0
        });
    }
}

struct EngineState {
    transport: Transport,
    session: Option<Session>,
    callbacks: SessionCallbacks,
}

/// Drives one compiled event sequence at a time. One engine instance owns
/// the tone output; concurrent `start` calls are rejected, not queued.
pub struct PlaybackEngine {
    config: TimingConfig,
    state: Mutex<EngineState>,
}

impl PlaybackEngine {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            state: Mutex::new(EngineState {
                transport: Transport::Stopped,
                session: None,
                callbacks: SessionCallbacks::default(),
            }),
        }
    }

    /// Begin playback of `events`. Only valid while stopped.
    pub fn start(
        &self,
        events: Vec<TimedEvent>,
        speed: f64,
        callbacks: SessionCallbacks,
    ) -> Result<(), MorseError> {
        if events.is_empty() {
            return Err(MorseError::InvalidInput("event sequence is empty".into()));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(MorseError::InvalidInput(format!(
                "speed {speed} is outside [{MIN_SPEED}, {MAX_SPEED}]"
            )));
        }

        let mut state = self.state.lock();
        if state.transport != Transport::Stopped {
            return Err(MorseError::AlreadyPlaying);
        }

        let total_ms = events.iter().map(|e| e.duration_ms).sum::<u64>() as f64 / speed;
        state.session = Some(Session {
            events,
            speed,
            total_ms,
            index: 0,
            samples_into_event: 0,
            elapsed_ms: 0.0,
            tone: Tone::new(self.config.frequency),
            samples_since_report: 0,
        });
        state.callbacks = callbacks;
        state.transport = Transport::Playing;
        Ok(())
    }

    /// Halt emission, keeping the current event index and elapsed time.
    pub fn pause(&self) -> Result<(), MorseError> {
        let mut state = self.state.lock();
        if state.transport != Transport::Playing {
            return Err(MorseError::InvalidInput(
                "pause is only valid while playing".into(),
            ));
        }
        state.transport = Transport::Paused;
        Ok(())
    }

    /// Resume emission at the paused event, restarting it from its
    /// beginning. Sub-event positions are not tracked.
    pub fn resume(&self) -> Result<(), MorseError> {
        let mut state = self.state.lock();
        if state.transport != Transport::Paused {
            return Err(MorseError::InvalidInput(
                "resume is only valid while paused".into(),
            ));
        }
        if let Some(session) = state.session.as_mut() {
            session.samples_into_event = 0;
            session.tone.reset();
        }
        state.transport = Transport::Playing;
        Ok(())
    }

    /// Reposition to `position` (a fraction of total duration). The new
    /// event index is the first whose cumulative adjusted duration reaches
    /// or exceeds the target. Valid from any non-stopped state.
    pub fn seek(&self, position: f64) -> Result<(), MorseError> {
        if !(0.0..=1.0).contains(&position) {
            return Err(MorseError::InvalidInput(format!(
                "seek position {position} is outside [0, 1]"
            )));
        }

        let mut state = self.state.lock();
        if state.transport == Transport::Stopped {
            return Err(MorseError::InvalidInput("no active session".into()));
        }
        let Some(session) = state.session.as_mut() else {
            return Err(MorseError::InvalidInput("no active session".into()));
        };

        let target_ms = position * session.total_ms;
        let mut before_ms = 0.0;
        let mut index = session.events.len();
        for i in 0..session.events.len() {
            if before_ms + session.adjusted_ms(i) >= target_ms {
                index = i;
                break;
            }
            before_ms += session.adjusted_ms(i);
        }

        session.index = index;
        session.elapsed_ms = before_ms;
        session.samples_into_event = 0;
        session.tone.reset();
        Ok(())
    }

    /// Tear down the current session. Safe to call in any state, any
    /// number of times. No callback fires after this returns.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.session = None;
        state.callbacks = SessionCallbacks::default();
        state.transport = Transport::Stopped;
    }

    /// Lifecycle hook for callers losing foreground execution.
    pub fn release_resources(&self) {
        self.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().transport == Transport::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().transport == Transport::Paused
    }

    pub fn transport(&self) -> Transport {
        self.state.lock().transport
    }

    /// Fraction of the session played so far. Zero when no session exists.
    pub fn progress(&self) -> f64 {
        self.state
            .lock()
            .session
            .as_ref()
            .map_or(0.0, Session::progress)
    }

    /// Index of the event about to play. Zero when no session exists.
    pub fn current_event_index(&self) -> usize {
        self.state.lock().session.as_ref().map_or(0, |s| s.index)
    }

    /// Speed-adjusted total duration of the current session.
    pub fn total_duration_ms(&self) -> f64 {
        self.state
            .lock()
            .session
            .as_ref()
            .map_or(0.0, |s| s.total_ms)
    }

    /// Fill an interleaved output buffer. Emits silence while paused or
    /// stopped without advancing; drives completion and progress callbacks
    /// while playing. This is the engine's single suspension point.
    pub fn fill_interleaved(&self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut state = self.state.lock();
        let mut finished = false;

        for frame in out.chunks_mut(channels) {
            let playing = state.transport == Transport::Playing && !finished;
            let sample = if playing {
                match state.session.as_mut().map(next_sample) {
                    Some(Some(sample)) => sample,
                    Some(None) => {
                        finished = true;
                        0.0
                    }
                    None => 0.0,
                }
            } else {
                0.0
            };

            for slot in frame.iter_mut() {
                *slot = sample;
            }
        }

        if finished {
            if let Some(on_progress) = state.callbacks.on_progress.as_mut() {
                on_progress(1.0);
            }
            if let Some(on_complete) = state.callbacks.on_complete.take() {
                on_complete();
            }
            state.session = None;
            state.callbacks = SessionCallbacks::default();
            state.transport = Transport::Stopped;
            return;
        }

        if state.transport == Transport::Playing {
            let due = state
                .session
                .as_ref()
                .is_some_and(|s| s.samples_since_report >= PROGRESS_INTERVAL_SAMPLES);
            if due {
                let progress = state.session.as_ref().map_or(0.0, Session::progress);
                if let Some(session) = state.session.as_mut() {
                    session.samples_since_report = 0;
                }
                if let Some(on_progress) = state.callbacks.on_progress.as_mut() {
                    on_progress(progress);
                }
            }
        }
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use parking_lot::Mutex;

    use crate::coding::timing::EventKind;

    use super::*;

    fn event(kind: EventKind, duration_ms: u64) -> TimedEvent {
        TimedEvent { kind, duration_ms }
    }

    fn short_sequence() -> Vec<TimedEvent> {
        vec![
            event(EventKind::Dit, 10),
            event(EventKind::SymbolGap, 10),
            event(EventKind::Dah, 30),
        ]
    }

    #[test]
    fn test_start_rejects_invalid_input() {
        let engine = PlaybackEngine::default();
        assert!(matches!(
            engine.start(Vec::new(), 1.0, SessionCallbacks::default()),
            Err(MorseError::InvalidInput(_))
        ));
        for speed in [0.3, 2.5] {
            assert!(matches!(
                engine.start(short_sequence(), speed, SessionCallbacks::default()),
                Err(MorseError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_start_rejects_concurrent_session() {
        let engine = PlaybackEngine::default();
        engine
            .start(short_sequence(), 1.0, SessionCallbacks::default())
            .unwrap();
        assert!(matches!(
            engine.start(short_sequence(), 1.0, SessionCallbacks::default()),
            Err(MorseError::AlreadyPlaying)
        ));
    }

    #[test]
    fn test_pause_and_resume_transitions() {
        let engine = PlaybackEngine::default();
        assert!(engine.pause().is_err());

        engine
            .start(short_sequence(), 1.0, SessionCallbacks::default())
            .unwrap();
        assert!(engine.is_playing());

        engine.pause().unwrap();
        assert!(engine.is_paused());
        assert!(!engine.is_playing());

        // Paused pulls emit silence and do not advance progress.
        let before = engine.progress();
        let mut buf = vec![1.0_f32; 256];
        engine.fill_interleaved(&mut buf, 1);
        assert!(buf.iter().all(|s| *s == 0.0));
        assert_eq!(engine.progress(), before);

        engine.resume().unwrap();
        assert!(engine.is_playing());
    }

    #[test]
    fn test_resume_restarts_paused_event_from_its_beginning() {
        let engine = PlaybackEngine::default();
        // A single 30 ms dah is 1323 samples; drain only part of it.
        engine
            .start(
                vec![event(EventKind::Dah, 30)],
                1.0,
                SessionCallbacks::default(),
            )
            .unwrap();

        let mut before = vec![0.0_f32; 300];
        engine.fill_interleaved(&mut before, 1);
        assert!(engine.progress() > 0.0);

        engine.pause().unwrap();
        assert_eq!(engine.current_event_index(), 0);

        engine.resume().unwrap();
        // Sub-event positions are not tracked: the event starts over, so
        // progress falls back to the event's start boundary and the first
        // post-resume samples repeat the tone's opening phase.
        assert_eq!(engine.progress(), 0.0);
        let mut after = vec![0.0_f32; 300];
        engine.fill_interleaved(&mut after, 1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_seek_while_paused_stays_paused() {
        let engine = PlaybackEngine::default();
        let events = vec![
            event(EventKind::Dit, 100),
            event(EventKind::SymbolGap, 100),
            event(EventKind::Dah, 300),
        ];
        engine.start(events, 1.0, SessionCallbacks::default()).unwrap();
        engine.pause().unwrap();

        engine.seek(0.5).unwrap();
        assert_eq!(engine.current_event_index(), 2);
        assert!(engine.is_paused());

        // Still paused: pulls emit silence and the position holds.
        let mut buf = vec![1.0_f32; 256];
        engine.fill_interleaved(&mut buf, 1);
        assert!(buf.iter().all(|s| *s == 0.0));
        assert_eq!(engine.current_event_index(), 2);
        assert!(engine.is_paused());
    }

    #[test]
    fn test_progress_grows_monotonically_to_completion() {
        let engine = PlaybackEngine::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(AtomicBool::new(false));

        let callbacks = SessionCallbacks {
            on_progress: Some(Box::new({
                let seen = seen.clone();
                move |p| seen.lock().push(p)
            })),
            on_complete: Some(Box::new({
                let completed = completed.clone();
                move || completed.store(true, Ordering::SeqCst)
            })),
        };
        engine.start(short_sequence(), 1.0, callbacks).unwrap();

        // 50 ms of audio at 44.1 kHz is 2205 samples; drain in small pulls.
        let mut buf = vec![0.0_f32; 512];
        for _ in 0..8 {
            engine.fill_interleaved(&mut buf, 1);
        }

        assert!(completed.load(Ordering::SeqCst));
        assert!(!engine.is_playing());
        assert_eq!(engine.progress(), 0.0);

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn test_signal_events_produce_tone_and_gaps_silence() {
        let engine = PlaybackEngine::default();
        engine
            .start(
                vec![event(EventKind::Dit, 10), event(EventKind::LetterGap, 30)],
                1.0,
                SessionCallbacks::default(),
            )
            .unwrap();

        // One dit is 441 samples; grab the full event plus some gap.
        let mut buf = vec![0.0_f32; 600];
        engine.fill_interleaved(&mut buf, 1);
        assert!(buf[..441].iter().any(|s| s.abs() > 0.01));
        assert!(buf[441..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_seek_targets_cumulative_duration() {
        let engine = PlaybackEngine::default();
        // Total 500 ms: cumulative bounds at 100, 200 and 500.
        let events = vec![
            event(EventKind::Dit, 100),
            event(EventKind::SymbolGap, 100),
            event(EventKind::Dah, 300),
        ];
        engine.start(events, 1.0, SessionCallbacks::default()).unwrap();

        engine.seek(0.5).unwrap();
        assert_eq!(engine.current_event_index(), 2);

        engine.seek(0.0).unwrap();
        assert_eq!(engine.current_event_index(), 0);

        engine.seek(1.0).unwrap();
        assert_eq!(engine.current_event_index(), 2);

        assert!(matches!(
            engine.seek(1.5),
            Err(MorseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_seek_requires_active_session() {
        let engine = PlaybackEngine::default();
        assert!(matches!(
            engine.seek(0.5),
            Err(MorseError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_release_resources_is_idempotent() {
        let engine = PlaybackEngine::default();
        engine
            .start(short_sequence(), 1.0, SessionCallbacks::default())
            .unwrap();
        engine.pause().unwrap();

        engine.release_resources();
        engine.release_resources();

        assert!(!engine.is_playing());
        assert!(!engine.is_paused());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.current_event_index(), 0);
    }

    #[test]
    fn test_speed_scales_total_duration() {
        let engine = PlaybackEngine::default();
        engine
            .start(short_sequence(), 2.0, SessionCallbacks::default())
            .unwrap();
        // 50 ms of events at double speed.
        assert_eq!(engine.total_duration_ms(), 25.0);
    }
}
