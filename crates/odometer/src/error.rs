#![forbid(unsafe_code)]

//! Ticker errors.

use std::fmt;

use crate::reel::Glyph;

/// Errors returned by [`Ticker::update`](crate::Ticker::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerError {
    /// A slot's reel does not contain the glyph it must display.
    MissingTarget {
        /// Slot position.
        slot: usize,
        /// The glyph that could not be found.
        target: Glyph,
        /// Number of glyphs in the reel.
        reel_len: usize,
    },
    /// The ticker was disposed.
    Disposed,
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget {
                slot,
                target,
                reel_len,
            } => write!(
                f,
                "slot {slot}: target glyph {target:?} is not in its reel of {reel_len} glyphs"
            ),
            Self::Disposed => write!(f, "ticker has been disposed"),
        }
    }
}

impl std::error::Error for TickerError {}
