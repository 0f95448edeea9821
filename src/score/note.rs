//! Symbolic note representation.
//!
//! A note does not carry an absolute pitch. It names a position relative to
//! a harmonic context (a scale step, a chord tone, a chromatic offset) or to
//! the previously sounded pitch, and is resolved to a MIDI pitch only when a
//! context is supplied.

use super::HarmonicContext;
use crate::Beats;
use num_rational::Rational64;
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default note amplitude (MIDI velocity).
pub const DEFAULT_AMP: u8 = 66;

/// How a note's `val` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// Scale step counted from the chord root.
    Scale,
    /// Chord tone index; wraps into higher octaves past the chord size.
    Chord,
    /// Semitones above the chord root.
    Chromatic,
    /// Scale steps above the previously sounded pitch.
    ScaleUp,
    /// Scale steps below the previously sounded pitch.
    ScaleDown,
    /// Rest.
    Silence,
    /// Holds the previously sounded pitch.
    Continuation,
}

impl NoteKind {
    pub fn code(self) -> &'static str {
        match self {
            NoteKind::Scale => "s",
            NoteKind::Chord => "c",
            NoteKind::Chromatic => "h",
            NoteKind::ScaleUp => "su",
            NoteKind::ScaleDown => "sd",
            NoteKind::Silence => "r",
            NoteKind::Continuation => "l",
        }
    }

    /// Whether the kind carries a pitch-bearing `val`.
    pub fn is_pitched(self) -> bool {
        !matches!(self, NoteKind::Silence | NoteKind::Continuation)
    }

    /// Whether the kind resolves without reference to a previous pitch.
    pub fn is_absolute(self) -> bool {
        matches!(self, NoteKind::Scale | NoteKind::Chord | NoteKind::Chromatic)
    }
}

/// The enumerated per-note projections a melody can broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteProjection {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    /// Two thirds of the current duration.
    Triplet,
    /// One and a half times the current duration.
    Dotted,
}

impl NoteProjection {
    /// Looks a projection up by its attribute name (`"w"`, `"e"`, `"dot"`...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "w" => Some(NoteProjection::Whole),
            "h" => Some(NoteProjection::Half),
            "q" => Some(NoteProjection::Quarter),
            "e" => Some(NoteProjection::Eighth),
            "s" => Some(NoteProjection::Sixteenth),
            "t" => Some(NoteProjection::Triplet),
            "dot" => Some(NoteProjection::Dotted),
            _ => None,
        }
    }
}

/// A pitch resolved against a harmonic context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPitch {
    /// Absolute MIDI pitch. For rests and continuations this is the pitch
    /// carried over from the previous note.
    pub pitch: i32,

    /// The note was a rest.
    pub silence: bool,

    /// The note holds the previous pitch.
    pub continuation: bool,

    /// Voice/track index the note was resolved for.
    pub track: usize,

    /// Onset in beats.
    pub time: Beats,
}

/// A single symbolic note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,

    /// Step, tone index or semitone offset depending on `kind`.
    pub val: i32,

    /// Octave shift applied after resolution.
    pub octave: i32,

    /// Duration in beats (quarter notes).
    pub duration: Beats,

    /// Velocity used when the note is played.
    pub amp: u8,
}

impl Note {
    /// Creates a quarter note of the given kind.
    pub fn new(kind: NoteKind, val: i32) -> Self {
        Self {
            kind,
            val: if kind.is_pitched() { val } else { 0 },
            octave: 0,
            duration: Rational64::one(),
            amp: DEFAULT_AMP,
        }
    }

    pub fn scale(val: i32) -> Self {
        Self::new(NoteKind::Scale, val)
    }

    pub fn chord_tone(val: i32) -> Self {
        Self::new(NoteKind::Chord, val)
    }

    pub fn chromatic(val: i32) -> Self {
        Self::new(NoteKind::Chromatic, val)
    }

    pub fn up(steps: i32) -> Self {
        Self::new(NoteKind::ScaleUp, steps)
    }

    pub fn down(steps: i32) -> Self {
        Self::new(NoteKind::ScaleDown, steps)
    }

    pub fn silence() -> Self {
        Self::new(NoteKind::Silence, 0)
    }

    pub fn continuation() -> Self {
        Self::new(NoteKind::Continuation, 0)
    }

    /// Returns a copy with the given duration.
    pub fn with_duration(&self, duration: Beats) -> Self {
        Self {
            duration,
            ..self.clone()
        }
    }

    /// Returns a copy with the given amplitude.
    pub fn with_amp(&self, amp: u8) -> Self {
        Self {
            amp: amp.min(127),
            ..self.clone()
        }
    }

    /// Returns a copy shifted by `octaves` octaves.
    pub fn o(&self, octaves: i32) -> Self {
        Self {
            octave: self.octave + octaves,
            ..self.clone()
        }
    }

    /// Returns a copy whose duration is multiplied by `factor`.
    pub fn augment(&self, factor: Beats) -> Self {
        self.with_duration(self.duration * factor)
    }

    /// Returns a copy with `val` shifted by `offset`. Rests and
    /// continuations are returned unchanged.
    pub fn combine(&self, offset: i32) -> Self {
        if !self.kind.is_pitched() {
            return self.clone();
        }
        Self {
            val: self.val + offset,
            ..self.clone()
        }
    }

    /// Applies an enumerated projection.
    pub fn project(&self, projection: NoteProjection) -> Self {
        let duration = match projection {
            NoteProjection::Whole => Rational64::from_integer(4),
            NoteProjection::Half => Rational64::from_integer(2),
            NoteProjection::Quarter => Rational64::one(),
            NoteProjection::Eighth => Rational64::new(1, 2),
            NoteProjection::Sixteenth => Rational64::new(1, 4),
            NoteProjection::Triplet => self.duration * Rational64::new(2, 3),
            NoteProjection::Dotted => self.duration * Rational64::new(3, 2),
        };
        self.with_duration(duration)
    }

    pub fn is_silence(&self) -> bool {
        self.kind == NoteKind::Silence
    }

    pub fn is_continuation(&self) -> bool {
        self.kind == NoteKind::Continuation
    }

    pub fn starts_with_absolute_note(&self) -> bool {
        self.kind.is_absolute()
    }

    pub fn starts_with_absolute_or_silence(&self) -> bool {
        self.kind.is_absolute() || self.is_silence()
    }

    pub fn starts_with_note(&self) -> bool {
        self.kind.is_pitched()
    }

    /// Resolves the note to an absolute pitch.
    ///
    /// `last` is the most recent sounding note; it anchors relative steps and
    /// supplies the pitch of rests and continuations. Without it, the chord
    /// root is used.
    pub fn pitch<C: HarmonicContext + ?Sized>(
        &self,
        context: &C,
        track: usize,
        time: Beats,
        last: Option<&ResolvedPitch>,
    ) -> ResolvedPitch {
        let last_pitch = last.map(|r| r.pitch);
        let pitch = context
            .to_pitch(self, last_pitch)
            .or(last_pitch)
            .unwrap_or_else(|| context.root_pitch());
        ResolvedPitch {
            pitch,
            silence: self.is_silence(),
            continuation: self.is_continuation(),
            track,
            time,
        }
    }

    /// Canonical text form, e.g. `s2.o(1).e`.
    pub fn to_code(&self) -> String {
        self.to_string()
    }
}

fn duration_suffix(duration: Beats) -> Option<String> {
    let named = [
        (Rational64::one(), ""),
        (Rational64::from_integer(2), ".h"),
        (Rational64::from_integer(4), ".w"),
        (Rational64::new(1, 2), ".e"),
        (Rational64::new(1, 4), ".s"),
    ];
    match named.iter().find(|(value, _)| *value == duration) {
        Some((_, suffix)) if suffix.is_empty() => None,
        Some((_, suffix)) => Some(suffix.to_string()),
        None => Some(format!(
            ".augment({}/{})",
            duration.numer(),
            duration.denom()
        )),
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.code())?;
        if self.kind.is_pitched() {
            write!(f, "{}", self.val)?;
        }
        if self.octave != 0 {
            write!(f, ".o({})", self.octave)?;
        }
        if let Some(suffix) = duration_suffix(self.duration) {
            f.write_str(&suffix)?;
        }
        if self.amp != DEFAULT_AMP {
            write!(f, ".v({})", self.amp)?;
        }
        Ok(())
    }
}
