//! Text to Morse conversion with live tone playback, WAV export and
//! flashlight transmission scheduling.

pub mod audio;
pub mod coding;
pub mod error;
pub mod flash;

pub use audio::player::{PlaybackEngine, SessionCallbacks, Transport};
pub use audio::synth::{generate_audio_file, render_samples};
pub use coding::morse::{text_to_morse, validate_text, Validation};
pub use coding::timing::{morse_to_timing, EventKind, TimedEvent, TimingConfig};
pub use error::MorseError;
pub use flash::{FlashSink, TransmitCallbacks, Transmitter};

/// Sample rate used for both live playback and WAV generation.
pub const SAMPLE_RATE: u32 = 44100;
