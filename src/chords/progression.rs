//! Turning a sequence of chord labels into chords.
//!
//! Picking one reading per label needs context from the neighbouring chords.
//! That decision belongs to a [`ChordInference`] implementation; this module
//! only wires label parsing to it.

use super::quality::ChordCandidate;
use super::resolver::{ChordParseError, ChordResolver};
use crate::score::Chord;

/// Chooses one reading per position of a progression.
pub trait ChordInference {
    /// `candidates[i]` holds the readings of the i-th chord. Returns one
    /// chord per non-empty position, in order.
    fn infer(&self, candidates: &[Vec<ChordCandidate>]) -> Vec<Chord>;
}

/// Keeps the tonality of the previous pick when a reading allows it and
/// otherwise takes the first reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyContinuity;

impl ChordInference for KeyContinuity {
    fn infer(&self, candidates: &[Vec<ChordCandidate>]) -> Vec<Chord> {
        let mut previous: Option<ChordCandidate> = None;
        let mut chords = Vec::with_capacity(candidates.len());
        for readings in candidates {
            let same_key = previous.and_then(|prev| {
                readings
                    .iter()
                    .find(|c| c.tonality_root == prev.tonality_root && c.mode == prev.mode)
            });
            let Some(pick) = same_key.or_else(|| readings.first()).copied() else {
                continue;
            };
            chords.push(pick.to_chord());
            previous = Some(pick);
        }
        chords
    }
}

/// Parses every label and lets `engine` pick the progression.
pub fn resolve_progression<S, E>(
    labels: &[S],
    resolver: &ChordResolver<'_>,
    engine: &E,
) -> Result<Vec<Chord>, ChordParseError>
where
    S: AsRef<str>,
    E: ChordInference + ?Sized,
{
    let candidates = labels
        .iter()
        .map(|label| resolver.candidates(label.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(engine.infer(&candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{Mode, Tonality};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_continuity_stays_in_key() {
        let chords =
            resolve_progression(&["C", "F", "G7", "C"], ChordResolver::standard(), &KeyContinuity)
                .unwrap();
        let c_major = Tonality::new(0, Mode::Major);
        assert_eq!(chords.len(), 4);
        assert!(chords.iter().all(|c| c.tonality == c_major));
        let degrees: Vec<u8> = chords.iter().map(|c| c.degree).collect();
        assert_eq!(degrees, vec![0, 3, 4, 0]);
    }

    #[test]
    fn test_unknown_label_aborts() {
        let result = resolve_progression(&["C", "Xyz"], ChordResolver::standard(), &KeyContinuity);
        assert!(matches!(result, Err(ChordParseError::UnknownChord(label)) if label == "Xyz"));
    }

    #[test]
    fn test_custom_engine() {
        struct Last;
        impl ChordInference for Last {
            fn infer(&self, candidates: &[Vec<ChordCandidate>]) -> Vec<Chord> {
                candidates
                    .iter()
                    .filter_map(|c| c.last().map(ChordCandidate::to_chord))
                    .collect()
            }
        }
        let chords = resolve_progression(&["Am"], ChordResolver::standard(), &Last).unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].pitch_classes(), vec![9, 0, 4]);
    }
}
