//! Chords as harmonic contexts for note resolution.

use super::{HarmonicContext, Note, NoteKind, MIDDLE_C};
use crate::theory::{Tonality, SCALE_DEGREE_NAMES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of stacked thirds above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Extension {
    Triad,
    Seventh,
}

impl Extension {
    /// Scale steps of the chord tones, counted from the root.
    pub fn steps(self) -> &'static [i32] {
        match self {
            Extension::Triad => &[0, 2, 4],
            Extension::Seventh => &[0, 2, 4, 6],
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Extension::Triad => "",
            Extension::Seventh => "7",
        }
    }
}

/// A chord built on a scale degree of a tonality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    /// Scale degree of the root (0 = I ... 6 = VII).
    pub degree: u8,
    pub extension: Extension,
    pub tonality: Tonality,
    pub octave: i32,
}

impl Chord {
    /// Creates a triad on `degree` (taken mod 7) of `tonality`.
    pub fn new(degree: u8, tonality: Tonality) -> Self {
        Self {
            degree: degree % 7,
            extension: Extension::Triad,
            tonality,
            octave: 0,
        }
    }

    pub fn with_extension(&self, extension: Extension) -> Self {
        Self {
            extension,
            ..self.clone()
        }
    }

    /// Re-expresses the chord inside `tonality`, relative to its current one.
    pub fn modulate(&self, tonality: &Tonality) -> Self {
        Self {
            tonality: self.tonality.compose(tonality),
            ..self.clone()
        }
    }

    pub fn o(&self, octaves: i32) -> Self {
        Self {
            octave: self.octave + octaves,
            ..self.clone()
        }
    }

    /// Absolute pitch of the scale step `step` counted from the chord root.
    pub fn step_pitch(&self, step: i32) -> i32 {
        let scale = self.tonality.scale_pitches();
        let idx = self.degree as i32 + step;
        scale[idx.rem_euclid(7) as usize] + 12 * idx.div_euclid(7) + 12 * self.octave + MIDDLE_C
    }

    /// Absolute pitches of the chord tones, root first.
    pub fn chord_pitches(&self) -> Vec<i32> {
        self.extension
            .steps()
            .iter()
            .map(|&step| self.step_pitch(step))
            .collect()
    }

    /// Pitch classes of the chord tones, root first.
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.chord_pitches()
            .into_iter()
            .map(|p| p.rem_euclid(12) as u8)
            .collect()
    }

    /// Step index of the highest scale tone at or below `pitch`.
    fn step_at_or_below(&self, pitch: i32) -> i32 {
        let mut step = (pitch - self.root_pitch()).div_euclid(12) * 7 - 7;
        while self.step_pitch(step + 1) <= pitch {
            step += 1;
        }
        step
    }
}

impl HarmonicContext for Chord {
    fn to_pitch(&self, note: &Note, last_pitch: Option<i32>) -> Option<i32> {
        let octave_shift = 12 * note.octave;
        let pitch = match note.kind {
            NoteKind::Scale => self.step_pitch(note.val),
            NoteKind::Chord => {
                let steps = self.extension.steps();
                let size = steps.len() as i32;
                let idx = note.val.rem_euclid(size) as usize;
                self.step_pitch(steps[idx]) + 12 * note.val.div_euclid(size)
            }
            NoteKind::Chromatic => self.root_pitch() + note.val,
            NoteKind::ScaleUp | NoteKind::ScaleDown => {
                let anchor = last_pitch.unwrap_or_else(|| self.root_pitch());
                let direction = if note.kind == NoteKind::ScaleUp { 1 } else { -1 };
                self.step_pitch(self.step_at_or_below(anchor) + direction * note.val)
            }
            NoteKind::Silence | NoteKind::Continuation => return None,
        };
        Some(pitch + octave_shift)
    }

    fn root_pitch(&self) -> i32 {
        self.step_pitch(0)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} % {}",
            SCALE_DEGREE_NAMES[(self.degree % 7) as usize],
            self.extension.code(),
            self.tonality
        )?;
        if self.octave != 0 {
            write!(f, ".o({})", self.octave)?;
        }
        Ok(())
    }
}
