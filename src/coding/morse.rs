//! Maps text to Morse symbol strings.
//!
//! The output alphabet is `.` (dit), `-` (dah), a single space between the
//! letters of a word and `" / "` between words.

/// Result of checking a text against the supported character table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    /// Distinct unsupported characters, first-seen order, space excluded.
    pub unsupported_chars: Vec<char>,
}

/// Convert text to its Morse rendering.
///
/// Characters without a table entry are silently dropped. Empty or
/// whitespace-only input yields an empty string.
pub fn text_to_morse(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter_map(|c| code_for(c.to_ascii_uppercase()))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Report every distinct unsupported character in `text`, case-insensitively,
/// preserving first-seen order. Does not mutate or normalize the input.
pub fn validate_text(text: &str) -> Validation {
    let mut unsupported: Vec<char> = Vec::new();
    let mut seen_keys: Vec<char> = Vec::new();
    for c in text.chars() {
        if c == ' ' {
            continue;
        }

        // Case-insensitive dedup on a pre-folded key, one char per entry.
        let key = c.to_lowercase().next().unwrap_or(c);
        if code_for(c.to_ascii_uppercase()).is_none() && !seen_keys.contains(&key) {
            seen_keys.push(key);
            unsupported.push(c);
        }
    }

    Validation {
        is_valid: unsupported.is_empty(),
        unsupported_chars: unsupported,
    }
}

fn code_for(c: char) -> Option<&'static str> {
    MORSE_TABLE
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, code)| *code)
}

/// Standard international Morse patterns for A-Z, 0-9 and punctuation.
const MORSE_TABLE: [(char, &str); 56] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
    ('¿', "..-.-"),
    ('¡', "--...-"),
];
