//! musicore - symbolic tonal music primitives and MIDI note extraction.
//!
//! This library provides scale-degree arithmetic, tonalities, relative notes
//! and melodies, chord symbol resolution, and reconstruction of note tables
//! from Standard MIDI Files.

pub mod chords;
pub mod midi;
pub mod score;
pub mod theory;

/// Musical time in beats (quarter notes), kept exact.
pub type Beats = num_rational::Rational64;

/// Any error raised by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Theory(#[from] theory::TheoryError),

    #[error(transparent)]
    Melody(#[from] score::MelodyError),

    #[error(transparent)]
    Chord(#[from] chords::ChordParseError),

    #[error(transparent)]
    Midi(#[from] midi::MidiParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

// Re-export commonly used types
pub use chords::{ChordResolver, KeyContinuity};
pub use midi::{parse_midi, NoteTable, ParseOptions};
pub use score::{Chord, Melody, Note};
pub use theory::{Mode, Tonality};
