// Bitsong CLI entry point.
//
// Composes a melody from the bits of a string and writes it to a MIDI file.
// With a TEXT argument the piece is generated from that text alone. Without
// one, stdin is read line by line on a background thread: the first line
// seeds the piece, later lines extend it as they arrive, and the piece ends
// when input closes.
//
// Usage:
//   bitsong [TEXT] [--output FILE.mid] [--json] [--max-events N]
//     [--preset classic|compact] [--config FILE.json] [--tempo BPM]
//
// Status goes through `log` (stderr, `RUST_LOG` to adjust); `--json` writes
// one event per line to stdout.

use anyhow::{Context, bail};
use bitsong_music::live::{ChannelSource, LiveSequencer};
use bitsong_music::midi::MidiSink;
use bitsong_music::sink::{EventSink, JsonLinesSink, PlayReport, play};
use bitsong_music::{ComposerConfig, NoteEvent, PlaybackConfig, Sequencer};
use clap::Parser;
use std::io::{BufRead, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;

/// Compose music from the bit pattern of text.
#[derive(Parser, Debug)]
#[command(name = "bitsong")]
#[command(about = "Deterministic melodies from the bits of a string")]
struct Args {
    /// Text to compose from. Reads lines from stdin if omitted.
    text: Option<String>,

    /// MIDI file to write
    #[arg(short, long, default_value = "bitsong.mid")]
    output: PathBuf,

    /// Also print each event as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Stop after this many events
    #[arg(long)]
    max_events: Option<usize>,

    /// Seed-width preset: classic (4/5 bits) or compact (3/4 bits)
    #[arg(long, default_value = "classic")]
    preset: String,

    /// JSON composer config; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playback tempo in BPM
    #[arg(long)]
    tempo: Option<u16>,
}

/// Collects events for the MIDI file and optionally echoes them as JSON.
struct CliSink {
    midi: MidiSink,
    json: Option<JsonLinesSink<Stdout>>,
}

impl EventSink for CliSink {
    type Error = std::io::Error;

    fn accept(&mut self, event: NoteEvent) -> Result<(), Self::Error> {
        if let Some(json) = &mut self.json {
            json.accept(event)?;
        }
        let Ok(()) = self.midi.accept(event);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ComposerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match ComposerConfig::preset(&args.preset) {
            Some(config) => config,
            None => bail!("unknown preset '{}' (expected classic or compact)", args.preset),
        },
    };
    let mut playback = PlaybackConfig::default();
    if let Some(tempo) = args.tempo {
        playback.tempo_bpm = tempo;
    }
    playback.validate().context("invalid playback settings")?;

    log::info!(
        "seed widths: tonic {} bits, scale {} bits; step {:?}",
        config.tonic_bits,
        config.scale_bits,
        config.step
    );

    let mut sequencer = Sequencer::new(config)?;
    let mut sink = CliSink {
        midi: MidiSink::new(playback),
        json: args.json.then(|| JsonLinesSink::new(std::io::stdout())),
    };

    let (events, key) = match &args.text {
        Some(text) => {
            sequencer.feed(text.as_bytes());
            let report = play(&mut sequencer, &mut sink, args.max_events)?;
            (report.events, sequencer.key().copied())
        }
        None => {
            let (events, sequencer) = compose_from_stdin(sequencer, &mut sink, args.max_events)?;
            (events, sequencer.key().copied())
        }
    };

    match key {
        Some(key) => log::info!("key: {key}"),
        None => log::warn!("input too short to choose a key"),
    }
    log::info!("{events} events, writing {}", args.output.display());
    sink.midi
        .write_file(&args.output)
        .map_err(|e| anyhow::anyhow!("writing {}: {e}", args.output.display()))?;
    Ok(())
}

/// Play from stdin lines until input closes or the event limit is reached.
fn compose_from_stdin(
    sequencer: Sequencer,
    sink: &mut CliSink,
    max_events: Option<usize>,
) -> anyhow::Result<(usize, Sequencer)> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(mut line) = line else { break };
            line.push('\n');
            if tx.send(line.into_bytes()).is_err() {
                break;
            }
        }
    });

    let mut live = LiveSequencer::new(sequencer, ChannelSource::new(rx));
    let mut total = 0;
    loop {
        let remaining = max_events.map(|max| max - total);
        let PlayReport { events, exhausted } = play(&mut live, sink, remaining)?;
        total += events;
        if !exhausted {
            break;
        }
        // Out of bits: wait for the next line, or stop if input is closed.
        match live.source_mut().wait() {
            Some(bytes) => live.feed(&bytes),
            None => break,
        }
    }
    log::debug!("stdin closed after {} refills", live.refills());
    Ok((total, live.into_inner().0))
}
