//! Reconstructed note rows.
//!
//! A row is one matched note-on/note-off pair with times already converted
//! to beats.

use crate::Beats;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// A single reconstructed note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    /// Onset in beats.
    pub start: Beats,

    /// Release in beats.
    pub end: Beats,

    /// `end - start`.
    pub duration: Beats,

    /// MIDI note number (0-127). 60 = Middle C (C4).
    pub pitch: u8,

    /// Velocity of the opening note-on.
    pub velocity: u8,

    /// MIDI channel (0-15) of the closing event.
    pub channel: u8,

    /// Index of the source track.
    pub track: usize,

    /// Voice within the track. Always 0; voices are not separated.
    pub voice: u8,
}

/// Reconstructed notes ordered by start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTable {
    rows: Vec<NoteRow>,
}

impl NoteTable {
    /// Builds a table, stably sorting the rows by start time.
    pub fn from_rows(mut rows: Vec<NoteRow>) -> Self {
        rows.sort_by(|a, b| a.start.cmp(&b.start));
        Self { rows }
    }

    /// Returns all rows (sorted by start).
    pub fn rows(&self) -> &[NoteRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// End of the last sounding note, in beats.
    pub fn duration(&self) -> Beats {
        self.rows
            .iter()
            .map(|r| r.end)
            .max()
            .unwrap_or_else(Beats::zero)
    }
}
