// MIDI file output from note events.
//
// `MidiSink` collects events as they are generated and renders them as a
// Standard MIDI File (SMF Format 0, one track). Events play back to back:
// each note starts when the previous one ends, and lasts
// `4 * ticks_per_quarter / denominator` ticks. Pitches outside the MIDI
// range are clamped to 0..=127 on output only; the collected events keep
// their original values. Rendering fails with `InvalidArgument` if the
// `PlaybackConfig` does not fit the MIDI header and tempo fields.
//
// Uses the `midly` crate for MIDI writing.

use crate::config::PlaybackConfig;
use crate::event::NoteEvent;
use crate::sink::EventSink;
use bitsong_bits::BitError;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::convert::Infallible;
use std::path::Path;

const CHANNEL: u8 = 0;

#[derive(Debug, Clone, Default)]
pub struct MidiSink {
    playback: PlaybackConfig,
    events: Vec<NoteEvent>,
}

impl MidiSink {
    pub fn new(playback: PlaybackConfig) -> Self {
        MidiSink {
            playback,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Length of one event in ticks.
    pub fn ticks_for(&self, event: &NoteEvent) -> u32 {
        4 * u32::from(self.playback.ticks_per_quarter) / u32::from(event.denominator)
    }

    /// Render the collected events as an in-memory SMF.
    pub fn to_smf(&self) -> Result<Smf<'static>, BitError> {
        self.playback.validate()?;
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(self.playback.ticks_per_quarter)),
        ));

        let channel = u4::new(CHANNEL);
        let tempo_microseconds = self.playback.tempo_microseconds();
        let mut track: Track<'static> = vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
            },
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(self.playback.program),
                    },
                },
            },
        ];

        for event in &self.events {
            let key = u7::new(event.pitch.clamp(0, 127) as u8);
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key,
                        vel: u7::new(event.velocity.min(127)),
                    },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(self.ticks_for(event)),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff { key, vel: u7::new(0) },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
        Ok(smf)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let smf = self.to_smf()?;
        let mut buf = Vec::new();
        smf.write(&mut buf)?;
        Ok(buf)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

impl EventSink for MidiSink {
    type Error = Infallible;

    fn accept(&mut self, event: NoteEvent) -> Result<(), Self::Error> {
        self.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(pitch: i32, denominator: u8) -> NoteEvent {
        NoteEvent {
            pitch,
            degree: 0,
            denominator,
            velocity: 127,
        }
    }

    #[test]
    fn test_ticks_per_denominator() {
        let sink = MidiSink::default();
        assert_eq!(sink.ticks_for(&note(60, 1)), 1920);
        assert_eq!(sink.ticks_for(&note(60, 4)), 480);
        assert_eq!(sink.ticks_for(&note(60, 16)), 120);
    }

    #[test]
    fn test_smf_layout() {
        let mut sink = MidiSink::new(PlaybackConfig::default());
        sink.accept(note(60, 2)).unwrap();
        sink.accept(note(64, 4)).unwrap();
        sink.accept(note(67, 4)).unwrap();

        let smf = sink.to_smf().unwrap();
        assert_eq!(smf.tracks.len(), 1);
        // tempo + program + 2 per note + end of track
        assert_eq!(smf.tracks[0].len(), 2 + 3 * 2 + 1);

        let total_ticks: u32 = smf.tracks[0].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total_ticks, 960 + 480 + 480);
    }

    #[test]
    fn test_out_of_range_pitches_are_clamped() {
        let mut sink = MidiSink::default();
        sink.accept(note(-5, 4)).unwrap();
        sink.accept(note(200, 4)).unwrap();
        let smf = sink.to_smf().unwrap();
        let keys: Vec<u8> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some(key.as_int()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![0, 127]);
        assert_eq!(sink.events()[0].pitch, -5);
    }

    #[test]
    fn test_tempo_meta_matches_bpm() {
        let sink = MidiSink::new(PlaybackConfig {
            tempo_bpm: 4,
            ..PlaybackConfig::default()
        });
        let smf = sink.to_smf().unwrap();
        match smf.tracks[0][0].kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => assert_eq!(t.as_int(), 15_000_000),
            ref other => panic!("expected tempo first, got {other:?}"),
        }
    }

    #[test]
    fn test_tempo_too_slow_for_midi_is_rejected() {
        let mut sink = MidiSink::new(PlaybackConfig {
            tempo_bpm: 2,
            ..PlaybackConfig::default()
        });
        sink.accept(note(60, 4)).unwrap();
        assert!(matches!(sink.to_smf(), Err(BitError::InvalidArgument(_))));
        assert!(sink.to_bytes().is_err());
    }

    #[test]
    fn test_bytes_start_with_header_chunk() {
        let mut sink = MidiSink::default();
        sink.accept(note(60, 1)).unwrap();
        let bytes = sink.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
