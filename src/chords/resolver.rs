//! Chord label parsing.
//!
//! A label such as `"Ebm7/Bb"` is split into root, quality and bass. The
//! quality alone does not pin down the chord's function, so resolution
//! returns every (degree, tonality, mode, extension) reading consistent with
//! it and leaves the choice to a sequence-level step.

use super::quality::{ChordCandidate, ChordQuality, QualityTable};
use crate::theory::TheoryTables;
use serde::Serialize;
use std::sync::OnceLock;

/// Errors from chord label parsing.
#[derive(Debug, thiserror::Error)]
pub enum ChordParseError {
    /// No known quality suffix leaves a known root name.
    #[error("unknown chord: {0}")]
    UnknownChord(String),
}

/// A parsed chord label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordLabel {
    pub root_name: String,
    /// Pitch class of the root.
    pub root: u8,
    pub quality: ChordQuality,
    /// Text after `/`. Parsed and kept, not used for candidate generation.
    pub bass: Option<String>,
}

/// Turns chord labels into candidate readings.
#[derive(Debug, Clone)]
pub struct ChordResolver<'a> {
    tables: &'a TheoryTables,
    qualities: QualityTable,
    /// Known suffixes, longest first.
    suffixes: Vec<(&'static str, ChordQuality)>,
}

static STANDARD: OnceLock<ChordResolver<'static>> = OnceLock::new();

impl<'a> ChordResolver<'a> {
    pub fn new(tables: &'a TheoryTables) -> Self {
        let mut suffixes: Vec<(&'static str, ChordQuality)> = ChordQuality::ALL
            .into_iter()
            .flat_map(|q| q.suffixes().iter().map(move |&s| (s, q)))
            .collect();
        suffixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

        Self {
            tables,
            qualities: QualityTable::build(tables),
            suffixes,
        }
    }

    /// Resolver over [`TheoryTables::standard`].
    pub fn standard() -> &'static ChordResolver<'static> {
        STANDARD.get_or_init(|| ChordResolver::new(TheoryTables::standard()))
    }

    /// Parses `<root><quality>[/<bass>]`.
    ///
    /// Suffixes are tried longest first; the first one whose remaining
    /// prefix is a known note name wins.
    pub fn parse(&self, label: &str) -> Result<ChordLabel, ChordParseError> {
        let (chord, bass) = match label.split_once('/') {
            Some((chord, bass)) => (chord, Some(bass.to_string())),
            None => (label, None),
        };

        for &(suffix, quality) in &self.suffixes {
            let Some(root_name) = chord.strip_suffix(suffix) else {
                continue;
            };
            if let Some(root) = self.tables.root_of(root_name) {
                return Ok(ChordLabel {
                    root_name: root_name.to_string(),
                    root,
                    quality,
                    bass,
                });
            }
        }

        Err(ChordParseError::UnknownChord(label.to_string()))
    }

    /// Every reading of `quality` with its root on pitch class `root`.
    pub fn analyze(&self, root: u8, quality: ChordQuality) -> Vec<ChordCandidate> {
        self.qualities
            .readings(quality)
            .iter()
            .map(|c| c.transposed(root % 12))
            .collect()
    }

    /// Parses `label` and returns all of its readings.
    pub fn candidates(&self, label: &str) -> Result<Vec<ChordCandidate>, ChordParseError> {
        let parsed = self.parse(label)?;
        let candidates = self.analyze(parsed.root, parsed.quality);
        tracing::debug!("Resolved {} into {} readings", label, candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Extension;
    use crate::theory::Mode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_qualities() {
        let resolver = ChordResolver::standard();
        let cases = [
            ("C", 0, ChordQuality::Major),
            ("Cmaj7", 0, ChordQuality::Major7),
            ("Am", 9, ChordQuality::Minor),
            ("G7", 7, ChordQuality::Dominant7),
            ("Ebm7", 3, ChordQuality::Minor7),
            ("Bm7b5", 11, ChordQuality::HalfDiminished7),
            ("F#dim7", 6, ChordQuality::Diminished7),
            ("Bbaug", 10, ChordQuality::Augmented),
            ("Dbdim", 1, ChordQuality::Diminished),
            ("Cb", 11, ChordQuality::Major),
            ("AmMaj7", 9, ChordQuality::MinorMajor7),
        ];
        for (label, root, quality) in cases {
            let parsed = resolver.parse(label).unwrap();
            assert_eq!((parsed.root, parsed.quality), (root, quality), "{}", label);
        }
    }

    #[test]
    fn test_bass_is_kept() {
        let parsed = ChordResolver::standard().parse("C7/E").unwrap();
        assert_eq!(parsed.root, 0);
        assert_eq!(parsed.quality, ChordQuality::Dominant7);
        assert_eq!(parsed.bass.as_deref(), Some("E"));
        assert_eq!(
            ChordResolver::standard().candidates("C7/E").unwrap(),
            ChordResolver::standard().candidates("C7").unwrap()
        );
    }

    #[test]
    fn test_unknown_chord() {
        let resolver = ChordResolver::standard();
        for label in ["Xyz", "", "Cfoo", "H7"] {
            assert!(
                matches!(resolver.parse(label), Err(ChordParseError::UnknownChord(_))),
                "{}",
                label
            );
        }
        assert!(resolver.candidates("Xyz").is_err());
    }

    #[test]
    fn test_cmaj7_candidates_realize_major_seventh() {
        let resolver = ChordResolver::standard();
        let parsed = resolver.parse("Cmaj7").unwrap();
        assert!(parsed.quality.is_seventh());

        let candidates = resolver.candidates("Cmaj7").unwrap();
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert_eq!(candidate.extension, Extension::Seventh);
            assert_eq!(candidate.to_chord().pitch_classes(), vec![0, 4, 7, 11]);
        }
        // Imaj7 of C major and IVmaj7 of G major are both readings.
        assert!(candidates.iter().any(|c| c.degree == 0 && c.tonality_root == 0 && c.mode == Mode::Major));
        assert!(candidates.iter().any(|c| c.degree == 3 && c.tonality_root == 7 && c.mode == Mode::Major));
    }

    #[test]
    fn test_candidates_follow_root() {
        let resolver = ChordResolver::standard();
        let on_c = resolver.candidates("Cm").unwrap();
        let on_e = resolver.candidates("Em").unwrap();
        assert_eq!(on_c.len(), on_e.len());
        for (c, e) in on_c.iter().zip(&on_e) {
            assert_eq!((c.tonality_root + 4) % 12, e.tonality_root);
        }
    }

    #[test]
    fn test_restricted_tables() {
        let tables = TheoryTables::with_modes([Mode::Major]);
        let resolver = ChordResolver::new(&tables);
        assert_eq!(resolver.candidates("G").unwrap().len(), 3);
        assert!(resolver.candidates("Caug").unwrap().is_empty());
    }
}
