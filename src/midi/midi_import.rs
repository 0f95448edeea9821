//! Standard MIDI File (SMF) import functionality.
//!
//! Reads .mid and .midi files into an [`EventStream`] and runs note
//! reconstruction over it. Supports SMF Format 0 (single track) and Format 1
//! (multi-track) files.
//!
//! # Limitations
//!
//! - Only note on/off, program change, tempo and time signature events are
//!   kept; everything else (controllers, pitch bend, SysEx) is skipped
//! - Track indices are the SMF track indices, so a Format 1 tempo track is
//!   track 0
//! - SMPTE timecode timing is rejected

use super::config::{ParseOptions, RunConfig};
use super::event::{EventStream, MidiEvent};
use super::note::NoteTable;
use super::reconstruct::{reconstruct, ReconstructionStats};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Errors that can occur during MIDI import.
#[derive(Debug, thiserror::Error)]
pub enum MidiParseError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MIDI parsing failed
    #[error("MIDI parse error: {0}")]
    Parse(String),

    /// Unsupported MIDI format or timing
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Well-formed file this crate deliberately refuses; batch callers
    /// should skip it.
    #[error("Ignored file: {0}")]
    IgnoreFile(String),
}

impl MidiParseError {
    /// Whether the error marks a file to skip rather than a failure.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, MidiParseError::IgnoreFile(_))
    }
}

/// Notes and configuration reconstructed from one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedMidi {
    pub notes: NoteTable,
    pub config: RunConfig,
    pub stats: ReconstructionStats,
}

/// Reconstructs notes and configuration from an in-memory event stream.
///
/// # Errors
///
/// Returns [`MidiParseError::UnsupportedFormat`] for a zero tick resolution
/// and [`MidiParseError::IgnoreFile`] when strict bar-duration checking
/// rejects the stream.
pub fn parse_events(
    stream: &EventStream,
    options: &ParseOptions,
) -> Result<ParsedMidi, MidiParseError> {
    if stream.ticks_per_beat == 0 {
        return Err(MidiParseError::UnsupportedFormat(
            "ticks per beat must be positive".to_string(),
        ));
    }

    let config = RunConfig::collect(stream, options)?;
    let (notes, stats) = reconstruct(stream);
    tracing::debug!(
        "Reconstructed {} notes from {} events ({} dropped)",
        notes.len(),
        stream.len(),
        stats.unterminated
    );

    Ok(ParsedMidi {
        notes,
        config,
        stats,
    })
}

/// Reads a MIDI file and reconstructs its note table.
///
/// # Arguments
///
/// * `path` - Path to the .mid or .midi file
/// * `options` - Interpretation options
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed, or is rejected by
/// `options`
pub fn parse_midi<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
) -> Result<ParsedMidi, MidiParseError> {
    let stream = load_events(path)?;
    parse_events(&stream, options)
}

/// Reads a MIDI file into an event stream.
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<EventStream, MidiParseError> {
    let data = fs::read(path.as_ref())?;
    events_from_bytes(&data)
}

/// Decodes SMF bytes into an event stream.
pub fn events_from_bytes(data: &[u8]) -> Result<EventStream, MidiParseError> {
    let smf = Smf::parse(data).map_err(|e| MidiParseError::Parse(e.to_string()))?;
    events_from_smf(&smf)
}

/// Flattens every track of a parsed SMF into cumulative-tick events.
pub fn events_from_smf(smf: &Smf) -> Result<EventStream, MidiParseError> {
    // Get ticks per beat from header
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => tpb.as_int() as u32,
        Timing::Timecode(_, _) => {
            return Err(MidiParseError::UnsupportedFormat(
                "SMPTE timecode timing not supported".to_string(),
            ))
        }
    };

    if smf.header.format == Format::Sequential {
        return Err(MidiParseError::UnsupportedFormat(
            "Format 2 (sequential) MIDI files not supported".to_string(),
        ));
    }

    let mut stream = EventStream::new(ticks_per_beat);
    for (track_idx, track) in smf.tracks.iter().enumerate() {
        push_track(&mut stream, track, track_idx);
    }
    Ok(stream)
}

/// Appends the relevant events of a single track.
fn push_track(stream: &mut EventStream, track: &[midly::TrackEvent], track_idx: usize) {
    // Current absolute tick position
    let mut current_tick: u64 = 0;

    for event in track {
        current_tick += event.delta.as_int() as u64;

        let parsed = match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo_val)) => Some(MidiEvent::set_tempo(
                current_tick,
                track_idx,
                tempo_val.as_int(),
            )),
            TrackEventKind::Meta(MetaMessage::TimeSignature(num, denom_power, _, _)) => {
                // denom_power is power of 2 (e.g., 2 means quarter note)
                let denom = 1u8.checked_shl(denom_power as u32).unwrap_or(0);
                Some(MidiEvent::time_signature(current_tick, track_idx, num, denom))
            }
            TrackEventKind::Midi { channel, message } => {
                let ch = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } => Some(MidiEvent::note_on(
                        current_tick,
                        track_idx,
                        ch,
                        key.as_int(),
                        vel.as_int(),
                    )),
                    MidiMessage::NoteOff { key, vel: _ } => {
                        Some(MidiEvent::note_off(current_tick, track_idx, ch, key.as_int()))
                    }
                    MidiMessage::ProgramChange { program } => Some(MidiEvent::program_change(
                        current_tick,
                        track_idx,
                        ch,
                        program.as_int(),
                    )),
                    _ => None, // Ignore other MIDI messages
                }
            }
            _ => None, // Ignore SysEx and other events
        };

        if let Some(parsed) = parsed {
            stream.push(parsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Beats;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn header(format: u16, tracks: u16, ppq: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"MThd");
        buf.extend_from_slice(&6u32.to_be_bytes());
        buf.extend_from_slice(&format.to_be_bytes());
        buf.extend_from_slice(&tracks.to_be_bytes());
        buf.extend_from_slice(&ppq.to_be_bytes());
        buf
    }

    fn push_chunk(buf: &mut Vec<u8>, track: &[u8]) {
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track.len() as u32).to_be_bytes());
        buf.extend_from_slice(track);
    }

    /// Format 1: a tempo/meta track and a melody track on channel 0.
    fn make_test_midi(time_signatures: &[(u8, u8)]) -> Vec<u8> {
        let mut buf = header(1, 2, 480);

        let mut track0 = Vec::new();
        // Set tempo to 120 BPM (500000 usec/beat)
        track0.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        for &(num, denom_power) in time_signatures {
            track0.extend_from_slice(&[0x00, 0xFF, 0x58, 0x04, num, denom_power, 0x18, 0x08]);
        }
        track0.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        push_chunk(&mut buf, &track0);

        let mut track1 = Vec::new();
        // Program change: violin
        track1.extend_from_slice(&[0x00, 0xC0, 40]);
        // C4 for one beat
        track1.extend_from_slice(&[0x00, 0x90, 60, 100]);
        track1.extend_from_slice(&[0x83, 0x60, 0x80, 60, 0]);
        // E4 for half a beat, closed by a zero-velocity note-on
        track1.extend_from_slice(&[0x00, 0x90, 64, 90]);
        track1.extend_from_slice(&[0x81, 0x70, 0x90, 64, 0]);
        // G4 never released
        track1.extend_from_slice(&[0x00, 0x90, 67, 80]);
        track1.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
        push_chunk(&mut buf, &track1);

        buf
    }

    #[test]
    fn test_events_from_bytes() {
        let stream = events_from_bytes(&make_test_midi(&[(4, 2)])).unwrap();
        assert_eq!(stream.ticks_per_beat, 480);
        assert_eq!(stream.events[0], MidiEvent::set_tempo(0, 0, 500_000));
        assert_eq!(stream.events[1], MidiEvent::time_signature(0, 0, 4, 4));
        assert_eq!(stream.events[2], MidiEvent::program_change(0, 1, 0, 40));
        assert_eq!(stream.events.last(), Some(&MidiEvent::note_on(720, 1, 0, 67, 80)));
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&make_test_midi(&[(4, 2)])).unwrap();

        let parsed = parse_midi(file.path(), &ParseOptions::default()).unwrap();
        let rows = parsed.notes.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pitch, 60);
        assert_eq!(rows[0].duration, Beats::from_integer(1));
        assert_eq!(rows[1].pitch, 64);
        assert_eq!(rows[1].start, Beats::from_integer(1));
        assert_eq!(rows[1].end, Beats::new(3, 2));
        assert!(rows.iter().all(|r| r.track == 1));

        assert_eq!(parsed.stats.unterminated, 1);
        assert_eq!(parsed.config.tempo, 500_000);
        assert_eq!(parsed.config.bar_duration, Some(Beats::from_integer(4)));
        assert_eq!(parsed.config.instruments.get(&0).map(String::as_str), Some("violin"));
    }

    #[test]
    fn test_strict_bar_change_is_ignorable() {
        let data = make_test_midi(&[(4, 2), (6, 3)]);
        let stream = events_from_bytes(&data).unwrap();
        let strict = ParseOptions {
            strict_bar_duration: true,
        };
        let err = parse_events(&stream, &strict).unwrap_err();
        assert!(err.is_ignorable());

        let parsed = parse_events(&stream, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.config.bar_duration, None);
        assert_eq!(parsed.notes.len(), 2);
    }

    #[test]
    fn test_rejects_garbage_and_timecode() {
        assert!(matches!(
            events_from_bytes(b"not a midi file"),
            Err(MidiParseError::Parse(_))
        ));

        // SMPTE timing: negative frames-per-second byte in the division field
        let mut buf = header(0, 1, 0xE728);
        push_chunk(&mut buf, &[0x00, 0xFF, 0x2F, 0x00]);
        assert!(matches!(
            events_from_bytes(&buf),
            Err(MidiParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let stream = EventStream::new(0);
        assert!(matches!(
            parse_events(&stream, &ParseOptions::default()),
            Err(MidiParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_midi("/nonexistent/file.mid", &ParseOptions::default()),
            Err(MidiParseError::Io(_))
        ));
    }
}
