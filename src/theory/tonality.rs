//! Relative keys and their composition.
//!
//! A [`Tonality`] is the harmonic frame a chord lives in: a degree (in
//! semitones above the reference tonic), a mode and an octave. Tonalities
//! compose: `a.compose(&b)` reads as "`b` relative to `a`", which is how a
//! modulation is expressed.

use super::degree;
use super::mode::Mode;
use super::tables::DEGREE_NAMES;
use super::TheoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A relative key: degree, mode and octave.
///
/// Values are never mutated in place; every transformation returns a new
/// tonality. Equality and hashing are defined on the canonical form, so a
/// degree of 12 compares equal to degree 0 one octave up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tonality {
    /// Semitones above the reference tonic. Canonically in `0..12`.
    pub degree: i32,

    /// Interval pattern of the key.
    pub mode: Mode,

    /// Octave offset.
    pub octave: i32,
}

impl Tonality {
    /// The neutral element of [`Tonality::compose`] for degree and octave.
    pub const IDENTITY: Tonality = Tonality {
        degree: 0,
        mode: Mode::Major,
        octave: 0,
    };

    /// Creates a tonality in the default octave.
    pub fn new(degree: i32, mode: Mode) -> Self {
        Self {
            degree,
            mode,
            octave: 0,
        }
    }

    /// Creates a tonality with an explicit octave.
    pub fn with_octave(degree: i32, mode: Mode, octave: i32) -> Self {
        Self {
            degree,
            mode,
            octave,
        }
    }

    /// Absolute position: `degree + 12 * octave`.
    pub fn abs_degree(&self) -> i32 {
        degree::absolute(self.degree, self.octave)
    }

    /// Composes `other` relative to `self`.
    ///
    /// Degrees and octaves add with carry; the result takes the mode of
    /// `other`, so modulating into a key adopts that key's mode.
    pub fn compose(&self, other: &Tonality) -> Tonality {
        let (degree, octave) = degree::add((self.degree, self.octave), (other.degree, other.octave));
        Tonality {
            degree,
            mode: other.mode,
            octave,
        }
    }

    /// Composition where an absent operand acts as the identity.
    pub fn compose_opt(a: Option<&Tonality>, b: Option<&Tonality>) -> Option<Tonality> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.compose(b)),
            (Some(t), None) | (None, Some(t)) => Some(*t),
            (None, None) => None,
        }
    }

    /// Canonical representative: degree in `0..12`, overflow in the octave.
    pub fn canonical(&self) -> Tonality {
        Tonality::IDENTITY.compose(self)
    }

    pub fn change_mode(&self, mode: Mode) -> Tonality {
        Tonality { mode, ..*self }
    }

    /// One semitone down. The result is not normalized.
    pub fn flat(&self) -> Tonality {
        Tonality {
            degree: self.degree - 1,
            ..*self
        }
    }

    /// One semitone up. The result is not normalized.
    pub fn sharp(&self) -> Tonality {
        Tonality {
            degree: self.degree + 1,
            ..*self
        }
    }

    pub fn major(&self) -> Tonality {
        self.change_mode(Mode::Major)
    }

    pub fn minor(&self) -> Tonality {
        self.change_mode(Mode::Minor)
    }

    pub fn melodic_minor(&self) -> Tonality {
        self.change_mode(Mode::MelodicMinor)
    }

    pub fn dorian(&self) -> Tonality {
        self.change_mode(Mode::Dorian)
    }

    pub fn phrygian(&self) -> Tonality {
        self.change_mode(Mode::Phrygian)
    }

    pub fn lydian(&self) -> Tonality {
        self.change_mode(Mode::Lydian)
    }

    pub fn mixolydian(&self) -> Tonality {
        self.change_mode(Mode::Mixolydian)
    }

    pub fn aeolian(&self) -> Tonality {
        self.change_mode(Mode::Aeolian)
    }

    pub fn locrian(&self) -> Tonality {
        self.change_mode(Mode::Locrian)
    }

    /// Shifts by `octaves` octaves.
    pub fn o(&self, octaves: i32) -> Tonality {
        Tonality {
            octave: self.octave + octaves,
            ..*self
        }
    }

    /// One octave down.
    pub fn d(&self) -> Tonality {
        self.o(-1)
    }

    /// Absolute pitches of the seven scale steps starting at `abs_degree`.
    pub fn scale_pitches(&self) -> [i32; 7] {
        let base = self.abs_degree();
        self.mode.intervals().map(|interval| interval + base)
    }

    /// Pitch classes (mod 12) of the scale.
    pub fn scale_set(&self) -> BTreeSet<i32> {
        self.scale_pitches()
            .iter()
            .map(|pitch| pitch.rem_euclid(12))
            .collect()
    }

    /// Roman degree name of the canonical degree (`"I"`, `"II.b"`, ...).
    pub fn degree_name(&self) -> &'static str {
        DEGREE_NAMES[self.canonical().degree as usize]
    }

    fn key(&self) -> (i32, Mode, i32) {
        let canonical = self.canonical();
        (canonical.degree, canonical.mode, canonical.octave)
    }
}

impl Default for Tonality {
    fn default() -> Self {
        Tonality::IDENTITY
    }
}

impl PartialEq for Tonality {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Tonality {}

impl Hash for Tonality {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let canonical = self.canonical();
        write!(f, "{}.{}", self.degree_name(), canonical.mode)?;
        if canonical.octave != 0 {
            write!(f, ".o({})", canonical.octave)?;
        }
        Ok(())
    }
}

impl FromStr for Tonality {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TheoryError::InvalidTonality(s.to_string());

        let (body, octave) = match s.rfind(".o(") {
            Some(idx) if s.ends_with(')') => {
                let octave = s[idx + 3..s.len() - 1].parse().map_err(|_| invalid())?;
                (&s[..idx], octave)
            }
            _ => (s, 0),
        };

        let (name, mode) = body.rsplit_once('.').ok_or_else(invalid)?;
        let mode: Mode = mode.parse()?;
        let degree = DEGREE_NAMES
            .iter()
            .position(|&n| n == name)
            .ok_or_else(invalid)?;

        Ok(Tonality::with_octave(degree as i32, mode, octave))
    }
}
