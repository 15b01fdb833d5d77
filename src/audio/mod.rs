//! Audio utilities.
//! Tone generation, the live playback transport and WAV synthesis.

use cpal::{BufferSize, SampleRate, StreamConfig};

pub mod player;
pub mod synth;
pub mod tone;

/// Output stream config pinned to the engine's sample rate.
///
/// Playback samples are synthesized at [`crate::SAMPLE_RATE`]; letting the
/// device run at its own default rate would stretch every event duration by
/// the rate ratio and detune the tone. Devices that refuse the rate fail
/// stream creation, which callers surface as `AudioPlaybackFailed`.
pub fn output_stream_config(channels: u16) -> StreamConfig {
    StreamConfig {
        channels,
        sample_rate: SampleRate(crate::SAMPLE_RATE),
        buffer_size: BufferSize::Default,
    }
}
