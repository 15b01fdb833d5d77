//! Text to Morse symbol strings, symbol strings to timed events.

pub mod morse;
pub mod timing;
