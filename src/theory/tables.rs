//! Immutable lookup tables shared by the theory and chord components.
//!
//! The tables are built once per process by [`TheoryTables::standard`] and
//! handed to components by reference, so tests can construct a narrower set
//! (for example, fewer modes) without touching global state.

use super::mode::Mode;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Roman names of the twelve chromatic degrees, used by the tonality text form.
pub const DEGREE_NAMES: [&str; 12] = [
    "I", "II.b", "II", "III.b", "III", "IV", "IV.s", "V", "VI.b", "VI", "VII.b", "VII",
];

/// Roman names of the seven scale degrees a chord can be built on.
pub const SCALE_DEGREE_NAMES: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Note spellings accepted as chord roots, with their pitch class.
const NOTE_ROOTS: [(&str, u8); 21] = [
    ("C", 0),
    ("B#", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("Fb", 4),
    ("E#", 5),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
    ("Cb", 11),
];

static STANDARD: OnceLock<TheoryTables> = OnceLock::new();

/// Name and scale tables used to interpret symbols.
#[derive(Debug, Clone)]
pub struct TheoryTables {
    note_roots: HashMap<&'static str, u8>,

    /// Modes considered when enumerating chord readings.
    pub modes: Vec<Mode>,
}

impl TheoryTables {
    /// Builds tables restricted to the given modes.
    pub fn with_modes(modes: impl IntoIterator<Item = Mode>) -> Self {
        Self {
            note_roots: NOTE_ROOTS.into_iter().collect(),
            modes: modes.into_iter().collect(),
        }
    }

    /// The process-wide default tables covering every mode.
    pub fn standard() -> &'static TheoryTables {
        STANDARD.get_or_init(|| TheoryTables::with_modes(Mode::ALL))
    }

    /// Pitch class of a note spelling such as `"Eb"` or `"F#"`.
    pub fn root_of(&self, name: &str) -> Option<u8> {
        self.note_roots.get(name).copied()
    }
}
