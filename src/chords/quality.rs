//! Chord qualities and the table of their diatonic readings.

use crate::score::{Chord, Extension};
use crate::theory::{Mode, TheoryTables, Tonality};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interval content of a triad or seventh chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Dominant7,
    Minor7,
    HalfDiminished7,
    Diminished7,
    MinorMajor7,
    AugmentedMajor7,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 11] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Major7,
        ChordQuality::Dominant7,
        ChordQuality::Minor7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Diminished7,
        ChordQuality::MinorMajor7,
        ChordQuality::AugmentedMajor7,
    ];

    /// Semitones above the root, root included.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::MinorMajor7 => &[0, 3, 7, 11],
            ChordQuality::AugmentedMajor7 => &[0, 4, 8, 11],
        }
    }

    /// Label suffixes that denote this quality.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            ChordQuality::Major => &["", "M", "maj"],
            ChordQuality::Minor => &["m", "min"],
            ChordQuality::Diminished => &["dim"],
            ChordQuality::Augmented => &["aug", "+"],
            ChordQuality::Major7 => &["maj7", "M7"],
            ChordQuality::Dominant7 => &["7"],
            ChordQuality::Minor7 => &["m7", "min7"],
            ChordQuality::HalfDiminished7 => &["m7b5"],
            ChordQuality::Diminished7 => &["dim7"],
            ChordQuality::MinorMajor7 => &["mMaj7", "m(maj7)"],
            ChordQuality::AugmentedMajor7 => &["maj7#5", "aug(maj7)"],
        }
    }

    /// Four-note qualities are sevenths.
    pub fn is_seventh(self) -> bool {
        self.intervals().len() == 4
    }

    pub fn extension(self) -> Extension {
        if self.is_seventh() {
            Extension::Seventh
        } else {
            Extension::Triad
        }
    }

    pub fn from_intervals(intervals: &[i32]) -> Option<Self> {
        ChordQuality::ALL
            .into_iter()
            .find(|q| q.intervals() == intervals)
    }
}

/// One reading of a chord: a scale degree of a tonality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChordCandidate {
    /// Scale degree of the chord root (0 = I).
    pub degree: u8,
    /// Pitch class of the tonality's tonic.
    pub tonality_root: u8,
    pub mode: Mode,
    pub extension: Extension,
}

impl ChordCandidate {
    /// The same reading transposed by `semitones`.
    pub fn transposed(&self, semitones: u8) -> Self {
        Self {
            tonality_root: (self.tonality_root % 12 + semitones % 12) % 12,
            ..*self
        }
    }

    /// Realizes the reading as a chord.
    pub fn to_chord(&self) -> Chord {
        Chord::new(
            self.degree,
            Tonality::new(self.tonality_root as i32, self.mode),
        )
        .with_extension(self.extension)
    }
}

/// Readings of every quality with the chord root on pitch class 0.
#[derive(Debug, Clone, Default)]
pub struct QualityTable {
    readings: HashMap<ChordQuality, Vec<ChordCandidate>>,
}

impl QualityTable {
    /// Enumerates the triads and sevenths on every degree of every mode in
    /// `tables`, keyed by the quality they realize.
    pub fn build(tables: &TheoryTables) -> Self {
        let mut readings: HashMap<ChordQuality, Vec<ChordCandidate>> = HashMap::new();
        for &mode in &tables.modes {
            let scale = mode.intervals();
            for degree in 0..7u8 {
                for extension in [Extension::Triad, Extension::Seventh] {
                    let chord =
                        Chord::new(degree, Tonality::new(0, mode)).with_extension(extension);
                    let pitches = chord.chord_pitches();
                    let intervals: Vec<i32> = pitches.iter().map(|p| p - pitches[0]).collect();
                    let Some(quality) = ChordQuality::from_intervals(&intervals) else {
                        tracing::debug!(
                            "Unnamed diatonic chord on degree {} of {}: {:?}",
                            degree,
                            mode,
                            intervals
                        );
                        continue;
                    };
                    readings.entry(quality).or_default().push(ChordCandidate {
                        degree,
                        tonality_root: (-scale[degree as usize]).rem_euclid(12) as u8,
                        mode,
                        extension,
                    });
                }
            }
        }
        Self { readings }
    }

    /// Readings of `quality` rooted on pitch class 0.
    pub fn readings(&self, quality: ChordQuality) -> &[ChordCandidate] {
        self.readings
            .get(&quality)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seventh_detection() {
        assert!(ChordQuality::Major7.is_seventh());
        assert!(!ChordQuality::Augmented.is_seventh());
        assert_eq!(ChordQuality::Minor7.extension(), Extension::Seventh);
    }

    #[test]
    fn test_every_quality_has_readings() {
        let table = QualityTable::build(TheoryTables::standard());
        for quality in ChordQuality::ALL {
            assert!(!table.readings(quality).is_empty(), "{:?}", quality);
        }
    }

    #[test]
    fn test_readings_realize_their_quality() {
        let table = QualityTable::build(TheoryTables::standard());
        for quality in ChordQuality::ALL {
            for reading in table.readings(quality) {
                let classes = reading.to_chord().pitch_classes();
                let expected: Vec<u8> = quality.intervals().iter().map(|&i| i as u8).collect();
                assert_eq!(classes, expected, "{:?}", reading);
            }
        }
    }

    #[test]
    fn test_major_triad_readings_in_major_mode() {
        let table = QualityTable::build(&TheoryTables::with_modes([Mode::Major]));
        let roots: Vec<(u8, u8)> = table
            .readings(ChordQuality::Major)
            .iter()
            .map(|c| (c.degree, c.tonality_root))
            .collect();
        // I of C, IV of G, V of F
        assert_eq!(roots, vec![(0, 0), (3, 7), (4, 5)]);
        assert!(table.readings(ChordQuality::Augmented).is_empty());
    }

    #[test]
    fn test_transposed() {
        let c = ChordCandidate {
            degree: 4,
            tonality_root: 5,
            mode: Mode::Major,
            extension: Extension::Seventh,
        };
        assert_eq!(c.transposed(9).tonality_root, 2);

        let b = ChordCandidate {
            tonality_root: 11,
            ..c
        };
        assert_eq!(b.transposed(250).tonality_root, 9);
        assert_eq!(b.transposed(u8::MAX).tonality_root, 2);
    }
}
