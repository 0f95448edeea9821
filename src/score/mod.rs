//! Symbolic score building blocks: notes, chords and melodies.
//!
//! Notes are relative; they only acquire an absolute pitch when resolved
//! against a [`HarmonicContext`] such as a [`Chord`].

mod chord;
mod melody;
mod note;

pub use chord::{Chord, Extension};
pub use melody::{Melody, MelodyError, RepeatOperand, SequenceItem};
pub use note::{Note, NoteKind, NoteProjection, ResolvedPitch, DEFAULT_AMP};

/// MIDI pitch of the tonic of the identity tonality.
pub const MIDDLE_C: i32 = 60;

/// Something a relative note can be resolved against.
pub trait HarmonicContext {
    /// Absolute pitch of `note`, or `None` for rests and continuations.
    ///
    /// `last_pitch` is the previously sounded pitch, used by relative steps.
    fn to_pitch(&self, note: &Note, last_pitch: Option<i32>) -> Option<i32>;

    /// Pitch used when nothing has sounded yet.
    fn root_pitch(&self) -> i32;
}
