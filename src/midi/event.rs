//! Decoded MIDI events in cumulative-tick time.
//!
//! This is the input of note reconstruction: byte-level decoding has
//! already happened, and every event carries its absolute tick position and
//! the index of the track it came from.

use serde::{Deserialize, Serialize};

/// What happened at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    NoteOn { note: u8, velocity: u8, channel: u8 },
    NoteOff { note: u8, velocity: u8, channel: u8 },
    ProgramChange { program: u8, channel: u8 },
    TimeSignature { numerator: u8, denominator: u8 },
    /// Microseconds per beat.
    SetTempo { tempo: u32 },
}

/// A single event at an absolute tick position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    /// Cumulative ticks since the start of the track.
    pub time: u64,
    pub track: usize,
    pub kind: EventKind,
}

impl MidiEvent {
    pub fn note_on(time: u64, track: usize, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            time,
            track,
            kind: EventKind::NoteOn {
                note,
                velocity,
                channel,
            },
        }
    }

    pub fn note_off(time: u64, track: usize, channel: u8, note: u8) -> Self {
        Self {
            time,
            track,
            kind: EventKind::NoteOff {
                note,
                velocity: 0,
                channel,
            },
        }
    }

    pub fn program_change(time: u64, track: usize, channel: u8, program: u8) -> Self {
        Self {
            time,
            track,
            kind: EventKind::ProgramChange { program, channel },
        }
    }

    pub fn time_signature(time: u64, track: usize, numerator: u8, denominator: u8) -> Self {
        Self {
            time,
            track,
            kind: EventKind::TimeSignature {
                numerator,
                denominator,
            },
        }
    }

    pub fn set_tempo(time: u64, track: usize, tempo: u32) -> Self {
        Self {
            time,
            track,
            kind: EventKind::SetTempo { tempo },
        }
    }
}

/// Events of one file plus its tick resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    pub ticks_per_beat: u32,
    /// Events in processing order.
    pub events: Vec<MidiEvent>,
}

impl EventStream {
    pub fn new(ticks_per_beat: u32) -> Self {
        Self {
            ticks_per_beat,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: MidiEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
