//! Chord symbol resolution.
//!
//! Labels like `"Cmaj7"` or `"F#m7b5/C"` are parsed into a root and a
//! quality, then expanded into every scale-degree reading across the
//! supported modes.

mod progression;
mod quality;
mod resolver;

pub use progression::{resolve_progression, ChordInference, KeyContinuity};
pub use quality::{ChordCandidate, ChordQuality, QualityTable};
pub use resolver::{ChordLabel, ChordParseError, ChordResolver};
