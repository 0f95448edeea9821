//! Matching note-on/note-off events into note rows.
//!
//! State is kept per (track, pitch) key. A key opens on a note-on with
//! non-zero velocity and closes on the next terminating event for that key:
//! a note-off, a zero-velocity note-on, or another note-on while the key is
//! still sounding. A retriggered note therefore closes the sounding note
//! rather than starting a second one.
//!
//! Terminating events for a key that is not sounding are stray and produce
//! nothing. Keys still sounding when the stream ends are dropped. Both are
//! counted in [`ReconstructionStats`].

use super::event::{EventKind, EventStream, MidiEvent};
use super::note::{NoteRow, NoteTable};
use super::ticks_to_beats;
use serde::Serialize;
use std::collections::HashMap;

/// Per-key state. `start` and `velocity` are only meaningful while
/// `sounding` is set.
#[derive(Debug, Clone, Copy, Default)]
struct KeyState {
    start: u64,
    velocity: u8,
    sounding: bool,
}

/// Counters describing what reconstruction did with the events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionStats {
    /// Rows emitted.
    pub notes: usize,
    /// Terminating events that found their key silent.
    pub stray_terminations: usize,
    /// Keys still sounding at the end of the stream, dropped.
    pub unterminated: usize,
}

/// Incremental on/off matcher.
#[derive(Debug)]
pub struct NoteReconstructor {
    ticks_per_beat: u32,
    keys: HashMap<(usize, u8), KeyState>,
    rows: Vec<NoteRow>,
    stats: ReconstructionStats,
}

impl NoteReconstructor {
    /// Creates a matcher converting ticks with `ticks_per_beat` (at least 1).
    pub fn new(ticks_per_beat: u32) -> Self {
        Self {
            ticks_per_beat: ticks_per_beat.max(1),
            keys: HashMap::new(),
            rows: Vec::new(),
            stats: ReconstructionStats::default(),
        }
    }

    /// Feeds one event. Events other than note-on/note-off are ignored.
    pub fn process(&mut self, event: &MidiEvent) {
        match event.kind {
            EventKind::NoteOn {
                note,
                velocity,
                channel,
            } => {
                let state = self.keys.entry((event.track, note)).or_default();
                if velocity > 0 && !state.sounding {
                    *state = KeyState {
                        start: event.time,
                        velocity,
                        sounding: true,
                    };
                } else {
                    self.terminate(event, note, channel);
                }
            }
            EventKind::NoteOff { note, channel, .. } => self.terminate(event, note, channel),
            _ => {}
        }
    }

    fn terminate(&mut self, event: &MidiEvent, pitch: u8, channel: u8) {
        let state = self.keys.entry((event.track, pitch)).or_default();
        if !state.sounding {
            self.stats.stray_terminations += 1;
            return;
        }
        state.sounding = false;

        let duration = event.time.saturating_sub(state.start);
        self.rows.push(NoteRow {
            start: ticks_to_beats(state.start, self.ticks_per_beat),
            end: ticks_to_beats(event.time, self.ticks_per_beat),
            duration: ticks_to_beats(duration, self.ticks_per_beat),
            pitch,
            velocity: state.velocity,
            channel,
            track: event.track,
            voice: 0,
        });
        self.stats.notes += 1;
    }

    /// Number of keys currently sounding.
    pub fn sounding(&self) -> usize {
        self.keys.values().filter(|s| s.sounding).count()
    }

    /// Drops unterminated notes and returns the table sorted by start.
    pub fn finish(mut self) -> (NoteTable, ReconstructionStats) {
        self.stats.unterminated = self.sounding();
        if self.stats.unterminated > 0 {
            tracing::debug!(
                "Dropping {} notes without a terminating event",
                self.stats.unterminated
            );
        }
        if self.stats.stray_terminations > 0 {
            tracing::debug!(
                "Ignored {} terminating events for silent keys",
                self.stats.stray_terminations
            );
        }
        (NoteTable::from_rows(self.rows), self.stats)
    }
}

/// Runs the matcher over a whole stream.
pub fn reconstruct(stream: &EventStream) -> (NoteTable, ReconstructionStats) {
    let mut reconstructor = NoteReconstructor::new(stream.ticks_per_beat);
    for event in &stream.events {
        reconstructor.process(event);
    }
    reconstructor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Beats;
    use pretty_assertions::assert_eq;

    fn stream(ticks_per_beat: u32, events: Vec<MidiEvent>) -> EventStream {
        EventStream {
            ticks_per_beat,
            events,
        }
    }

    #[test]
    fn test_single_note_in_beats() {
        let (table, stats) = reconstruct(&stream(
            480,
            vec![
                MidiEvent::note_on(240, 0, 0, 60, 90),
                MidiEvent::note_off(1200, 0, 0, 60),
            ],
        ));
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.start, Beats::new(1, 2));
        assert_eq!(row.end, Beats::new(5, 2));
        assert_eq!(row.duration, Beats::from_integer(2));
        assert_eq!((row.pitch, row.velocity, row.track, row.voice), (60, 90, 0, 0));
        assert_eq!(stats.notes, 1);
    }

    #[test]
    fn test_zero_velocity_note_on_closes() {
        let (table, _) = reconstruct(&stream(
            96,
            vec![
                MidiEvent::note_on(0, 0, 3, 64, 70),
                MidiEvent::note_on(48, 0, 3, 64, 0),
            ],
        ));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].duration, Beats::new(1, 2));
        assert_eq!(table.rows()[0].channel, 3);
    }

    #[test]
    fn test_retrigger_closes_sounding_note() {
        let (table, stats) = reconstruct(&stream(
            1,
            vec![
                MidiEvent::note_on(0, 0, 0, 60, 100),
                MidiEvent::note_on(5, 0, 0, 60, 100),
                MidiEvent::note_off(8, 0, 0, 60),
            ],
        ));
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!((row.start, row.end), (Beats::from_integer(0), Beats::from_integer(5)));
        assert_eq!(stats.stray_terminations, 1);
        assert_eq!(stats.unterminated, 0);
    }

    #[test]
    fn test_unterminated_notes_are_dropped() {
        let (table, stats) = reconstruct(&stream(
            480,
            vec![
                MidiEvent::note_on(0, 0, 0, 60, 100),
                MidiEvent::note_on(0, 0, 0, 64, 100),
                MidiEvent::note_off(480, 0, 0, 64),
            ],
        ));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].pitch, 64);
        assert_eq!(stats.unterminated, 1);
    }

    #[test]
    fn test_keys_are_per_track() {
        let (table, stats) = reconstruct(&stream(
            2,
            vec![
                MidiEvent::note_on(0, 0, 0, 60, 100),
                MidiEvent::note_on(1, 1, 0, 60, 80),
                MidiEvent::note_off(2, 1, 0, 60),
                MidiEvent::note_off(4, 0, 0, 60),
            ],
        ));
        assert_eq!(stats.notes, 2);
        let rows = table.rows();
        assert_eq!((rows[0].track, rows[0].end), (0, Beats::from_integer(2)));
        assert_eq!((rows[1].track, rows[1].velocity), (1, 80));
        assert_eq!(rows[1].duration, Beats::new(1, 2));
    }

    #[test]
    fn test_rows_sorted_by_start() {
        let (table, _) = reconstruct(&stream(
            1,
            vec![
                MidiEvent::note_on(10, 1, 0, 50, 100),
                MidiEvent::note_off(12, 1, 0, 50),
                MidiEvent::note_on(0, 0, 0, 60, 100),
                MidiEvent::note_off(3, 0, 0, 60),
            ],
        ));
        let starts: Vec<Beats> = table.rows().iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![Beats::from_integer(0), Beats::from_integer(10)]);
    }

    #[test]
    fn test_other_events_ignored() {
        let mut reconstructor = NoteReconstructor::new(480);
        reconstructor.process(&MidiEvent::set_tempo(0, 0, 500_000));
        reconstructor.process(&MidiEvent::program_change(0, 0, 0, 5));
        reconstructor.process(&MidiEvent::note_on(0, 0, 0, 60, 1));
        assert_eq!(reconstructor.sounding(), 1);
        let (table, _) = reconstructor.finish();
        assert!(table.is_empty());
    }
}
