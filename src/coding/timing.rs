//! Compiles a Morse symbol string into an ordered sequence of timed events.

/// Default base time unit in milliseconds.
pub const DEFAULT_TIME_UNIT_MS: u64 = 120;
/// Default tone frequency in hertz.
pub const DEFAULT_FREQUENCY_HZ: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The smallest unit of time in Morse code.
    Dit,
    /// Three times the length of a dit.
    Dah,
    /// Silence between the dits and dahs of one letter.
    SymbolGap,
    /// Silence between letters.
    LetterGap,
    /// Silence between words.
    WordGap,
}

impl EventKind {
    /// Duration in base time units.
    pub fn units(self) -> u64 {
        match self {
            Self::Dit | Self::SymbolGap => 1,
            Self::Dah | Self::LetterGap => 3,
            Self::WordGap => 7,
        }
    }

    /// True if this event emits tone or light, false for silence.
    pub fn is_signal_on(self) -> bool {
        matches!(self, Self::Dit | Self::Dah)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub kind: EventKind,
    pub duration_ms: u64,
}

impl TimedEvent {
    fn new(kind: EventKind, time_unit: u64) -> Self {
        Self {
            kind,
            duration_ms: kind.units() * time_unit,
        }
    }
}

/// Base unit and tone frequency for one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub time_unit_ms: u64,
    pub frequency: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
            frequency: DEFAULT_FREQUENCY_HZ,
        }
    }
}

/// Compile a Morse symbol string into timed events.
///
/// The input contract is exactly the output of
/// [`text_to_morse`](crate::coding::morse::text_to_morse): single spaces
/// between letters and `" / "` between words. Exactly one gap event is
/// emitted between any two signal events, sized by the widest applicable
/// rule. Stray leading or trailing separators compile to leading or
/// trailing gap events, which play as silence.
pub fn morse_to_timing(morse: &str, time_unit: u64) -> Vec<TimedEvent> {
    if morse.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = morse.chars().collect();
    let mut events = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();

        match c {
            '.' | '-' => {
                let kind = if c == '.' { EventKind::Dit } else { EventKind::Dah };
                events.push(TimedEvent::new(kind, time_unit));
                // Another dit or dah follows within the same letter.
                if matches!(next, Some(n) if n != ' ' && n != '/') {
                    events.push(TimedEvent::new(EventKind::SymbolGap, time_unit));
                }
            }
            // Spaces around a '/' are part of the word separator rendering;
            // the '/' itself carries the gap.
            ' ' => {
                if prev != Some('/') && next != Some('/') {
                    events.push(TimedEvent::new(EventKind::LetterGap, time_unit));
                }
            }
            '/' => events.push(TimedEvent::new(EventKind::WordGap, time_unit)),
            _ => {}
        }
    }

    events
}
