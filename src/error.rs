//! Error types for colour parsing.
//!
//! Everything else in the crate degrades gracefully (clamping, NaN,
//! pass-through), so hex parsing is the only fallible operation.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Input was empty (or only `#` / whitespace)
    Empty,
    /// Digit count other than 3 or 6
    InvalidLength(usize),
    /// Contains a non-hex character; carries the offending input
    InvalidHex(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Empty => write!(f, "empty color string"),
            ColorError::InvalidLength(n) => {
                write!(f, "invalid hex length {n} (expected 3 or 6 digits)")
            }
            ColorError::InvalidHex(s) => write!(f, "invalid hex digits in '{s}'"),
        }
    }
}

impl std::error::Error for ColorError {}
