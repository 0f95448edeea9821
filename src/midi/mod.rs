//! MIDI input: event streams, note reconstruction and file import.
//!
//! A Standard MIDI File is flattened into an [`EventStream`] of
//! cumulative-tick events, which [`reconstruct`] turns into a [`NoteTable`]
//! of rows timed in beats. Tempo, time signature and program changes are
//! gathered into a [`RunConfig`].

mod config;
mod event;
mod instruments;
mod midi_import;
mod note;
mod reconstruct;

pub use config::{bar_duration, ParseOptions, RunConfig};
pub use event::{EventKind, EventStream, MidiEvent};
pub use instruments::{instrument_name, GM_INSTRUMENTS};
pub use midi_import::{
    events_from_bytes, events_from_smf, load_events, parse_events, parse_midi, MidiParseError,
    ParsedMidi,
};
pub use note::{NoteRow, NoteTable};
pub use reconstruct::{reconstruct, NoteReconstructor, ReconstructionStats};

use crate::Beats;

/// Tempo assumed when a stream carries no tempo event, in microseconds per
/// beat (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Converts an absolute tick position to beats.
///
/// `ticks_per_beat` must be positive.
pub fn ticks_to_beats(ticks: u64, ticks_per_beat: u32) -> Beats {
    Beats::new(ticks as i64, ticks_per_beat as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_conversions() {
        assert_eq!(ticks_to_beats(960, 480), Beats::from_integer(2));
        assert_eq!(ticks_to_beats(160, 480), Beats::new(1, 3));
        assert_eq!(ticks_to_beats(0, 96), Beats::from_integer(0));
    }
}
