//! musicore - command-line front end.
//!
//! # Usage
//!
//! ```bash
//! musicore notes song.mid other.mid          # note tables as JSON
//! musicore notes --strict --config opts.json *.mid
//! musicore chords C Am7 Dm7 G7               # chord readings and a progression
//! ```
//!
//! Set `RUST_LOG=musicore=debug` to see dropped notes and parse summaries.

use musicore::chords::{resolve_progression, ChordResolver, KeyContinuity};
use musicore::midi::{parse_midi, MidiParseError, ParseOptions, ParsedMidi};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// What the binary was asked to do.
enum Command {
    /// Extract note tables from MIDI files.
    Notes {
        files: Vec<PathBuf>,
        options: ParseOptions,
    },
    /// Resolve chord labels.
    Chords { labels: Vec<String> },
}

/// Command-line options for the application.
struct CliOptions {
    command: Command,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `notes [--strict] [--config FILE] FILE...`
    /// - `chords LABEL...`
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let Some(subcommand) = args.get(1) else {
            print_usage();
            std::process::exit(1);
        };

        let command = match subcommand.as_str() {
            "notes" => {
                let mut strict = false;
                let mut config: Option<PathBuf> = None;
                let mut files = Vec::new();
                let mut i = 2;

                while i < args.len() {
                    match args[i].as_str() {
                        "--strict" => strict = true,
                        "--config" | "-c" => {
                            i += 1;
                            if i >= args.len() {
                                bail!("--config requires a path argument");
                            }
                            config = Some(PathBuf::from(&args[i]));
                        }
                        other if other.starts_with('-') => {
                            bail!("Unknown option: {}", other);
                        }
                        other => files.push(PathBuf::from(other)),
                    }
                    i += 1;
                }

                let mut options = match config {
                    Some(path) => load_options(&path)?,
                    None => ParseOptions::default(),
                };
                options.strict_bar_duration |= strict;

                if files.is_empty() {
                    bail!("notes requires at least one MIDI file");
                }
                Command::Notes { files, options }
            }
            "chords" => {
                let labels: Vec<String> = args[2..].to_vec();
                if labels.is_empty() {
                    bail!("chords requires at least one chord label");
                }
                Command::Chords { labels }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown command: {}", other);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        };

        Ok(Self { command })
    }
}

fn print_usage() {
    eprintln!("musicore - tonal music primitives and MIDI note extraction");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  musicore notes [--strict] [--config FILE] FILE...");
    eprintln!("  musicore chords LABEL...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strict           Skip files whose bar duration changes");
    eprintln!("  -c, --config FILE  Read parse options from a JSON file");
    eprintln!("  -h, --help         Print this help message");
}

/// Reads parse options from a JSON file.
fn load_options(path: &Path) -> Result<ParseOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Notes { files, options } => run_notes(&files, &options),
        Command::Chords { labels } => run_chords(&labels),
    }
}

/// Outcome of a `notes` run.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    written: usize,
    skipped: usize,
    failed: usize,
}

/// Parses every file in parallel and prints one JSON line per kept file.
fn run_notes(files: &[PathBuf], options: &ParseOptions) -> Result<()> {
    let stdout = io::stdout();
    let summary = write_notes(files, options, &mut stdout.lock())?;
    tracing::info!(
        "Wrote {} files, skipped {}, failed {}",
        summary.written,
        summary.skipped,
        summary.failed
    );

    if summary.failed > 0 {
        bail!("{} of {} files failed to parse", summary.failed, files.len());
    }
    Ok(())
}

/// Writes the JSON line of every parsable file to `out`, in argument order.
///
/// A file that fails to parse is logged and counted; it never stops the
/// files after it.
fn write_notes<W: Write>(
    files: &[PathBuf],
    options: &ParseOptions,
    out: &mut W,
) -> Result<BatchSummary> {
    let results: Vec<(&PathBuf, Result<ParsedMidi, MidiParseError>)> = files
        .par_iter()
        .map(|path| (path, parse_midi(path, options)))
        .collect();

    let mut summary = BatchSummary::default();
    for (path, result) in results {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(e) if e.is_ignorable() => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", path.display(), e);
                summary.failed += 1;
                continue;
            }
        };

        let document = serde_json::json!({
            "file": path.display().to_string(),
            "duration": parsed.notes.duration(),
            "bpm": parsed.config.bpm(),
            "config": parsed.config,
            "stats": parsed.stats,
            "notes": parsed.notes,
        });
        writeln!(out, "{}", serde_json::to_string(&document)?)?;
        summary.written += 1;
    }

    Ok(summary)
}

/// Prints the readings of each label, then one chord per label.
fn run_chords(labels: &[String]) -> Result<()> {
    let resolver = ChordResolver::standard();

    for label in labels {
        let parsed = resolver.parse(label)?;
        let candidates = resolver.analyze(parsed.root, parsed.quality);
        println!("{} ({} readings)", label, candidates.len());
        for candidate in candidates {
            println!("  {}", candidate.to_chord());
        }
    }

    let progression = resolve_progression(labels, resolver, &KeyContinuity)
        .context("Failed to resolve progression")?;
    let names: Vec<String> = progression.iter().map(ToString::to_string).collect();
    println!("{}", names.join(" | "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Format 0 file with one quarter-note C4.
    fn single_note_midi() -> Vec<u8> {
        let track = [
            0x00, 0x90, 60, 100, // note on
            0x60, 0x80, 60, 0, // note off after 96 ticks
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let mut buf = Vec::new();
        buf.extend_from_slice(b"MThd");
        buf.extend_from_slice(&6u32.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&96u16.to_be_bytes());
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track.len() as u32).to_be_bytes());
        buf.extend_from_slice(&track);
        buf
    }

    #[test]
    fn test_bad_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.mid");
        let garbage = dir.path().join("garbage.mid");
        let good2 = dir.path().join("good2.mid");
        fs::write(&good, single_note_midi()).unwrap();
        fs::write(&garbage, b"not a midi file").unwrap();
        fs::write(&good2, single_note_midi()).unwrap();

        let mut out = Vec::new();
        let summary = write_notes(
            &[good, garbage, good2.clone()],
            &ParseOptions::default(),
            &mut out,
        )
        .unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                written: 2,
                skipped: 0,
                failed: 1,
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let last: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last["file"], good2.display().to_string());
        assert_eq!(last["stats"]["notes"], 1);
        assert_eq!(last["bpm"], 120.0);
    }
}
