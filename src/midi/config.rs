//! Stream-level settings gathered alongside the notes.
//!
//! Tempo, time signature and program change events never become note rows;
//! they are collected into a [`RunConfig`] describing the whole file.

use super::event::{EventKind, EventStream};
use super::instruments::instrument_name;
use super::midi_import::MidiParseError;
use super::DEFAULT_TEMPO;
use crate::Beats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options controlling how a stream is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject files whose bar duration changes instead of reporting no bar
    /// duration.
    pub strict_bar_duration: bool,
}

/// Global properties of a parsed stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub ticks_per_beat: u32,

    /// Instrument name per channel, from the last program change seen.
    pub instruments: BTreeMap<u8, String>,

    /// First tempo of the stream in microseconds per beat.
    pub tempo: u32,

    /// Every tempo change as `(tick, microseconds per beat)`.
    pub tempos: Vec<(u64, u32)>,

    /// Distinct bar durations in beats, in order of first appearance.
    pub bar_durations: Vec<Beats>,

    /// The bar duration when exactly one was seen.
    pub bar_duration: Option<Beats>,
}

impl RunConfig {
    /// Collects the configuration of `stream`.
    ///
    /// # Errors
    ///
    /// [`MidiParseError::IgnoreFile`] when `options.strict_bar_duration` is
    /// set and the bar duration changes within the stream.
    pub fn collect(stream: &EventStream, options: &ParseOptions) -> Result<Self, MidiParseError> {
        let mut instruments = BTreeMap::new();
        let mut tempos = Vec::new();
        let mut bar_durations: Vec<Beats> = Vec::new();

        for event in &stream.events {
            match event.kind {
                EventKind::ProgramChange { program, channel } => {
                    instruments.insert(channel, instrument_name(program).to_string());
                }
                EventKind::SetTempo { tempo } => tempos.push((event.time, tempo)),
                EventKind::TimeSignature {
                    numerator,
                    denominator,
                } => match bar_duration(numerator, denominator) {
                    Some(duration) if !bar_durations.contains(&duration) => {
                        bar_durations.push(duration)
                    }
                    Some(_) => {}
                    None => tracing::warn!(
                        "Invalid time signature {}/{}",
                        numerator,
                        denominator
                    ),
                },
                _ => {}
            }
        }

        if bar_durations.len() > 1 && options.strict_bar_duration {
            return Err(MidiParseError::IgnoreFile(format!(
                "bar duration changes {} times",
                bar_durations.len() - 1
            )));
        }

        let tempo = tempos.first().map(|&(_, t)| t).unwrap_or_else(|| {
            tracing::debug!("No tempo event, using {} us per beat", DEFAULT_TEMPO);
            DEFAULT_TEMPO
        });

        Ok(Self {
            ticks_per_beat: stream.ticks_per_beat,
            instruments,
            tempo,
            tempos,
            bar_duration: match bar_durations.as_slice() {
                [single] => Some(*single),
                _ => None,
            },
            bar_durations,
        })
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.tempo as f64
    }
}

/// Length of a bar in beats (quarter notes): `numerator * 4 / denominator`.
pub fn bar_duration(numerator: u8, denominator: u8) -> Option<Beats> {
    if denominator == 0 {
        return None;
    }
    Some(Beats::new(numerator as i64 * 4, denominator as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEvent;
    use pretty_assertions::assert_eq;

    fn stream(events: Vec<MidiEvent>) -> EventStream {
        EventStream {
            ticks_per_beat: 480,
            events,
        }
    }

    fn strict() -> ParseOptions {
        ParseOptions {
            strict_bar_duration: true,
        }
    }

    #[test]
    fn test_bar_duration() {
        assert_eq!(bar_duration(4, 4), Some(Beats::from_integer(4)));
        assert_eq!(bar_duration(6, 8), Some(Beats::from_integer(3)));
        assert_eq!(bar_duration(3, 2), Some(Beats::from_integer(6)));
        assert_eq!(bar_duration(3, 0), None);
    }

    #[test]
    fn test_single_time_signature() {
        let config = RunConfig::collect(
            &stream(vec![MidiEvent::time_signature(0, 0, 3, 4)]),
            &strict(),
        )
        .unwrap();
        assert_eq!(config.bar_duration, Some(Beats::from_integer(3)));
    }

    #[test]
    fn test_repeated_equal_time_signature_is_single() {
        let config = RunConfig::collect(
            &stream(vec![
                MidiEvent::time_signature(0, 0, 4, 4),
                MidiEvent::time_signature(0, 1, 4, 4),
            ]),
            &strict(),
        )
        .unwrap();
        assert_eq!(config.bar_duration, Some(Beats::from_integer(4)));
    }

    #[test]
    fn test_bar_change_strict_and_lenient() {
        let events = stream(vec![
            MidiEvent::time_signature(0, 0, 4, 4),
            MidiEvent::time_signature(1920, 0, 3, 4),
        ]);
        let err = RunConfig::collect(&events, &strict()).unwrap_err();
        assert!(err.is_ignorable());

        let config = RunConfig::collect(&events, &ParseOptions::default()).unwrap();
        assert_eq!(config.bar_duration, None);
        assert_eq!(config.bar_durations.len(), 2);
    }

    #[test]
    fn test_no_time_signature() {
        let config = RunConfig::collect(&stream(vec![]), &strict()).unwrap();
        assert_eq!(config.bar_duration, None);
        assert_eq!(config.tempo, DEFAULT_TEMPO);
        assert!((config.bpm() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempos_and_instruments() {
        let config = RunConfig::collect(
            &stream(vec![
                MidiEvent::set_tempo(0, 0, 600_000),
                MidiEvent::program_change(0, 1, 2, 40),
                MidiEvent::set_tempo(960, 0, 400_000),
                MidiEvent::program_change(10, 1, 2, 42),
                MidiEvent::program_change(0, 2, 9, 0),
            ]),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(config.tempo, 600_000);
        assert_eq!(config.tempos, vec![(0, 600_000), (960, 400_000)]);
        assert_eq!(config.instruments.get(&2).map(String::as_str), Some("cello"));
        assert_eq!(
            config.instruments.get(&9).map(String::as_str),
            Some("acoustic_grand_piano")
        );
    }
}
