use std::f32::consts::PI;

use crate::SAMPLE_RATE;

/// Peak amplitude of generated tones, as a fraction of full scale.
/// Kept well under 1.0 to avoid clipping on consumer output chains.
pub const TONE_AMPLITUDE: f32 = 0.3;

/// An endless sine wave sampled at [`SAMPLE_RATE`].
/// Callers gate the length externally, one event at a time.
#[derive(Clone, Copy, Debug)]
pub struct Tone {
    i: usize,
    frequency: f32,
    sample_rate: f32,
    amplitude: f32,
}

impl Tone {
    pub fn new(frequency: f32) -> Self {
        Self {
            i: 0,
            frequency,
            sample_rate: SAMPLE_RATE as f32,
            amplitude: TONE_AMPLITUDE,
        }
    }

    /// Restart the wave from phase zero.
    pub fn reset(&mut self) {
        self.i = 0;
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        self.i += 1;
        Some(self.amplitude * (self.i as f32 * self.frequency * 2.0 * PI / self.sample_rate).sin())
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_tone_stays_within_amplitude() {
        let tone = Tone::new(600.0);
        for sample in tone.take(4410) {
            assert!(sample.abs() <= TONE_AMPLITUDE + f32::EPSILON);
        }
    }

    #[test]
    fn test_tone_resets_to_phase_zero() {
        let mut tone = Tone::new(600.0);
        let first: Vec<f32> = (&mut tone).take(16).collect();
        tone.reset();
        let again: Vec<f32> = tone.take(16).collect();
        for (a, b) in first.iter().zip(&again) {
            assert_relative_eq!(*a, *b);
        }
    }
}
