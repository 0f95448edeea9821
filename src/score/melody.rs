//! Ordered note sequences and their algebra.
//!
//! Every operation returns a new melody holding its own copies of the notes,
//! so a melody can be shared freely and never changes under another owner.

use super::note::{Note, NoteProjection, ResolvedPitch};
use super::HarmonicContext;
use crate::Beats;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Errors from melody operations.
#[derive(Debug, thiserror::Error)]
pub enum MelodyError {
    /// Operand a melody cannot be combined with.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// Attribute name with no per-note projection.
    #[error("no such attribute: {0}")]
    NoSuchAttribute(String),
}

/// Right-hand side of [`Melody::repeat_by`].
#[derive(Debug, Clone)]
pub enum RepeatOperand {
    Count(usize),
    Note(Note),
    Melody(Melody),
}

/// One entry of [`Melody::to_sequence`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem<C> {
    pub start: Beats,
    pub end: Beats,
    /// Absolute pitch, `None` for rests and continuations.
    pub pitch: Option<i32>,
    pub context: C,
    pub instrument: String,
    pub note: Note,
}

/// An ordered sequence of notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Melody {
    notes: Vec<Note>,
}

impl Melody {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    /// Sum of the note durations.
    pub fn duration(&self) -> Beats {
        self.notes
            .iter()
            .fold(Beats::zero(), |acc, n| acc + n.duration)
    }

    /// `self` followed by `other`.
    pub fn concat(&self, other: &Melody) -> Melody {
        self.notes.iter().chain(other.notes.iter()).cloned().collect()
    }

    /// `self` followed by a single note.
    pub fn concat_note(&self, note: &Note) -> Melody {
        self.notes
            .iter()
            .chain(std::iter::once(note))
            .cloned()
            .collect()
    }

    /// Concatenation where an absent left operand yields a copy of `rhs`.
    pub fn concat_opt(lhs: Option<&Melody>, rhs: &Melody) -> Melody {
        match lhs {
            Some(lhs) => lhs.concat(rhs),
            None => rhs.clone(),
        }
    }

    /// Concatenates a sequence of melodies; empty input gives an empty melody.
    pub fn from_notes<'a, I>(parts: I) -> Melody
    where
        I: IntoIterator<Item = &'a Melody>,
    {
        parts
            .into_iter()
            .flat_map(|m| m.notes.iter().cloned())
            .collect()
    }

    /// The notes tiled `times` times.
    pub fn repeat(&self, times: usize) -> Melody {
        self.notes
            .iter()
            .cycle()
            .take(self.notes.len() * times)
            .cloned()
            .collect()
    }

    /// Repetition by a dynamically chosen operand.
    ///
    /// A note is first wrapped into a one-note melody; only counts are valid
    /// repetition factors, so anything that is not a count after wrapping is
    /// rejected.
    pub fn repeat_by(&self, operand: RepeatOperand) -> Result<Melody, MelodyError> {
        match operand {
            RepeatOperand::Count(times) => Ok(self.repeat(times)),
            RepeatOperand::Note(note) => self.repeat_by(RepeatOperand::Melody(note.into())),
            RepeatOperand::Melody(other) => Err(MelodyError::InvalidOperand(format!(
                "cannot repeat melody `{}` by melody `{}`",
                self, other
            ))),
        }
    }

    /// Applies `f` to every note.
    pub fn map_notes<F>(&self, f: F) -> Melody
    where
        F: Fn(&Note) -> Note,
    {
        self.notes.iter().map(f).collect()
    }

    /// Shifts every pitched note's value by `offset`.
    pub fn combine(&self, offset: i32) -> Melody {
        self.map_notes(|n| n.combine(offset))
    }

    /// Shifts every note by `octaves` octaves.
    pub fn o(&self, octaves: i32) -> Melody {
        self.map_notes(|n| n.o(octaves))
    }

    /// Multiplies every duration by `factor`.
    pub fn augment(&self, factor: Beats) -> Melody {
        self.map_notes(|n| n.augment(factor))
    }

    /// Applies a projection to every note.
    pub fn broadcast(&self, projection: NoteProjection) -> Melody {
        self.map_notes(|n| n.project(projection))
    }

    /// Applies the projection registered under `name` to every note.
    pub fn broadcast_named(&self, name: &str) -> Result<Melody, MelodyError> {
        let projection = NoteProjection::from_name(name)
            .ok_or_else(|| MelodyError::NoSuchAttribute(name.to_string()))?;
        Ok(self.broadcast(projection))
    }

    /// Replaces every note matching `to_replace` by kind and value with the
    /// kind and value of `new_note`, keeping duration, octave and amplitude.
    pub fn replace_pitch(&self, to_replace: &Note, new_note: &Note) -> Melody {
        self.map_notes(|n| {
            if n.kind == to_replace.kind && n.val == to_replace.val {
                Note {
                    kind: new_note.kind,
                    val: new_note.val,
                    ..n.clone()
                }
            } else {
                n.clone()
            }
        })
    }

    /// Resolves every note to an absolute pitch.
    ///
    /// `last` carries the most recent sounding note across calls. It is
    /// replaced by each resolved note except rests and continuations, which
    /// leave it untouched so that a held note keeps referring to the pitch
    /// before it.
    pub fn get_pitches<C: HarmonicContext + ?Sized>(
        &self,
        context: &C,
        track: usize,
        time: Beats,
        last: Option<ResolvedPitch>,
    ) -> (Vec<ResolvedPitch>, Option<ResolvedPitch>) {
        let mut last = last;
        let mut time = time;
        let mut pitches = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            let resolved = note.pitch(context, track, time, last.as_ref());
            if !resolved.silence && !resolved.continuation {
                last = Some(resolved.clone());
            }
            time += note.duration;
            pitches.push(resolved);
        }
        (pitches, last)
    }

    /// Lays the notes out on a timeline starting at zero.
    ///
    /// Each item spans exactly its note's duration and starts where the
    /// previous one ended.
    pub fn to_sequence<C: HarmonicContext + Clone>(
        &self,
        context: &C,
        instrument: &str,
    ) -> Vec<SequenceItem<C>> {
        let mut time = Beats::zero();
        let mut last_pitch = None;
        let mut sequence = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            let pitch = context.to_pitch(note, last_pitch);
            if pitch.is_some() {
                last_pitch = pitch;
            }
            let start = time;
            let end = time + note.duration;
            sequence.push(SequenceItem {
                start,
                end,
                pitch,
                context: context.clone(),
                instrument: instrument.to_string(),
                note: note.clone(),
            });
            time = end;
        }
        sequence
    }

    /// All notes are continuations.
    pub fn is_continuation(&self) -> bool {
        self.notes.iter().all(Note::is_continuation)
    }

    pub fn starts_with_absolute_note(&self) -> bool {
        self.notes
            .first()
            .is_some_and(Note::starts_with_absolute_note)
    }

    /// Any note resolves without reference to a previous pitch.
    pub fn had_absolute_note(&self) -> bool {
        self.notes.iter().any(Note::starts_with_absolute_note)
    }

    pub fn starts_with_absolute_or_silence(&self) -> bool {
        self.notes
            .first()
            .is_some_and(Note::starts_with_absolute_or_silence)
    }

    pub fn starts_with_note(&self) -> bool {
        self.notes.first().is_some_and(Note::starts_with_note)
    }

    /// Canonical text form: note codes joined by `" + "`.
    pub fn to_code(&self) -> String {
        self.to_string()
    }
}

impl From<Note> for Melody {
    fn from(note: Note) -> Self {
        Melody::new(vec![note])
    }
}

impl FromIterator<Note> for Melody {
    fn from_iter<I: IntoIterator<Item = Note>>(iter: I) -> Self {
        Melody::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Melody {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

impl fmt::Display for Melody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, note) in self.notes.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", note)?;
        }
        Ok(())
    }
}

impl PartialEq for Melody {
    fn eq(&self, other: &Self) -> bool {
        self.to_code() == other.to_code()
    }
}

impl Eq for Melody {}

impl PartialEq<Note> for Melody {
    fn eq(&self, other: &Note) -> bool {
        *self == Melody::from(other.clone())
    }
}

impl Hash for Melody {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_code().hash(state);
    }
}
