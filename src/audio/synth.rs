//! Offline synthesis of an event sequence into a PCM WAV artifact.

use std::path::{Path, PathBuf};

use chrono::Local;
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{
    coding::timing::{TimedEvent, TimingConfig},
    error::MorseError,
    SAMPLE_RATE,
};

use super::{
    player::{samples_for, MAX_SPEED, MIN_SPEED},
    tone::Tone,
};

/// Render an event sequence into mono 16-bit samples.
///
/// The buffer is sized up front from the speed-adjusted total duration;
/// per-event sample counts are truncated at the buffer boundary so rounding
/// can never overflow it.
pub fn render_samples(
    events: &[TimedEvent],
    speed: f64,
    config: &TimingConfig,
) -> Result<Vec<i16>, MorseError> {
    if events.is_empty() {
        return Err(MorseError::InvalidInput("event sequence is empty".into()));
    }
    if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(MorseError::InvalidInput(format!(
            "speed {speed} is outside [{MIN_SPEED}, {MAX_SPEED}]"
        )));
    }

    let total_ms = events.iter().map(|e| e.duration_ms).sum::<u64>() as f64 / speed;
    let total_samples = (total_ms * SAMPLE_RATE as f64 / 1000.0).round() as usize;
    let mut samples = vec![0_i16; total_samples];

    let mut cursor = 0;
    for event in events {
        let count = samples_for(event.duration_ms, speed).min(total_samples - cursor);
        if event.kind.is_signal_on() {
            let tone = Tone::new(config.frequency);
            for (slot, sample) in samples[cursor..cursor + count].iter_mut().zip(tone) {
                *slot = (sample * i16::MAX as f32) as i16;
            }
        }
        cursor += count;
    }

    Ok(samples)
}

/// Synthesize `events` and write them as a canonical mono 16-bit 44.1 kHz
/// WAV file under `dir`, named `morse_<date>_<time>.wav`. Returns the path
/// of the written file.
pub fn generate_audio_file(
    events: &[TimedEvent],
    speed: f64,
    config: &TimingConfig,
    dir: &Path,
) -> Result<PathBuf, MorseError> {
    let samples = render_samples(events, speed, config)?;

    let name = format!("morse_{}.wav", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(name);
    write_wav(&path, &samples).map_err(classify_write_error)?;

    tracing::info!(path = %path.display(), samples = samples.len(), "wrote morse wav");
    Ok(path)
}

fn write_wav(path: &Path, samples: &[i16]) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Storage-exhaustion failures get their own kind so callers can surface
/// a "free up space" hint; everything else is a generic generation failure.
fn classify_write_error(err: hound::Error) -> MorseError {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if ["storage", "space", "disk full"].iter().any(|k| lower.contains(k)) {
        MorseError::StorageFull(message)
    } else {
        MorseError::GenerationFailed(message)
    }
}
