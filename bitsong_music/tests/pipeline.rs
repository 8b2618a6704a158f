// End-to-end tests for the bitsong pipeline.
//
// The canonical fixture starts from the single byte 0x35 ("5"), which is one
// bit short of the classic 9-bit key seed, and extends it with three more
// bytes. Every value below follows mechanically from MSB-first bit order:
//
//   0x35     0xA6     0x51     0xC3
//   00110101 10100110 01010001 11000011
//
//   seed     0011 | 01011          tonic 3 (Eb), scale 11 (whole tone, 6 steps)
//                                  start degree 30, bounds 18..=48
//   measure  0                     [1]
//   step     1001  (-1)            degree 29 -> pitch 3 + 48 + 10 = 61
//   measure  1 0 0                 [2, 2]
//   step     1010  (-2)            degree 27 -> pitch 3 + 48 + 6 = 57
//   step     0011  (+3)            degree 30 -> pitch 3 + 60 + 0 = 63
//   measure  1 0 0                 [2, 2]
//   step     0011  (+3)            degree 33 -> pitch 3 + 60 + 6 = 69
//   step     (no bits left)        Exhausted, one half note still pending
//
// The live tests feed the same sequencer from a second thread, through
// `SharedSequencer` and through an mpsc-backed `LiveSequencer`.

use bitsong_music::live::{ChannelSource, LiveSequencer, SharedSequencer};
use bitsong_music::midi::MidiSink;
use bitsong_music::scale::Scale;
use bitsong_music::sink::play;
use bitsong_music::{BitError, ComposerConfig, NoteEvent, PlaybackConfig, Sequencer};
use std::sync::mpsc;
use std::thread;

fn ev(pitch: i32, degree: i32, denominator: u8) -> NoteEvent {
    NoteEvent {
        pitch,
        degree,
        denominator,
        velocity: 127,
    }
}

#[test]
fn canonical_fixture_trace() {
    let mut seq = Sequencer::with_input(ComposerConfig::classic(), b"5").unwrap();
    assert_eq!(seq.next_event(), Err(BitError::Exhausted));
    assert!(seq.key().is_none(), "8 bits cannot seed a 9-bit key");

    seq.feed(&[0xA6, 0x51, 0xC3]);
    let mut events = Vec::new();
    let report = play(&mut seq, &mut events, None).unwrap();
    assert!(report.exhausted);

    let key = seq.key().copied().unwrap();
    assert_eq!(key.tonic, 3);
    assert_eq!(key.scale, Scale::WholeTone);
    assert_eq!(
        events,
        vec![ev(61, 29, 1), ev(57, 27, 2), ev(63, 30, 2), ev(69, 33, 2)]
    );
    assert_eq!(seq.pending_durations().collect::<Vec<_>>(), vec![2]);
    assert_eq!(seq.measures_built(), 3);
    assert_eq!(seq.decoder().remaining_bits(), 0);
}

#[test]
fn canonical_fixture_other_continuation() {
    // 0x9C continues the seed with a 1 bit: the same scale, a different walk.
    let mut seq = Sequencer::with_input(ComposerConfig::classic(), b"5").unwrap();
    seq.feed(&[0x9C, 0x3B]);
    let mut events = Vec::new();
    play(&mut seq, &mut events, None).unwrap();
    assert_eq!(seq.key().map(|k| k.scale), Some(Scale::WholeTone));
    assert_eq!(events, vec![ev(77, 37, 1), ev(79, 38, 1)]);
}

#[test]
fn same_text_same_midi() {
    let render = |text: &str| {
        let mut seq = Sequencer::with_input(ComposerConfig::classic(), text.as_bytes()).unwrap();
        let mut sink = MidiSink::new(PlaybackConfig::default());
        play(&mut seq, &mut sink, None).unwrap();
        sink.to_bytes().unwrap()
    };
    let a = render("Hello, world!");
    assert_eq!(a, render("Hello, world!"));
    assert_ne!(a, render("Hello, World!"));
}

#[test]
fn presets_diverge_on_the_same_input() {
    let text = b"one input, two readings of the seed";
    let collect = |config: ComposerConfig| {
        let mut seq = Sequencer::with_input(config, text).unwrap();
        let mut events: Vec<NoteEvent> = Vec::new();
        play(&mut seq, &mut events, None).unwrap();
        (seq.key().copied(), events)
    };
    let (classic_key, classic) = collect(ComposerConfig::classic());
    let (compact_key, compact) = collect(ComposerConfig::compact());
    assert!(classic_key.is_some() && compact_key.is_some());
    assert_ne!(classic, compact);
}

#[test]
fn shared_sequencer_fed_from_another_thread() {
    let shared = SharedSequencer::new(Sequencer::new(ComposerConfig::classic()).unwrap());
    let (done_tx, done_rx) = mpsc::channel();

    let producer = shared.clone();
    let handle = thread::spawn(move || {
        for line in ["first line\n", "second line\n", "third line\n"] {
            producer.feed(line.as_bytes());
            done_tx.send(()).unwrap();
        }
    });

    let mut events = Vec::new();
    let mut fed = 0;
    while fed < 3 {
        done_rx.recv().unwrap();
        fed += 1;
        while let Ok(event) = shared.next_event() {
            events.push(event);
        }
    }
    handle.join().unwrap();

    assert!(!events.is_empty());
    let emitted = shared.with(|s| s.events_emitted());
    assert_eq!(emitted as usize, events.len());
}

#[test]
fn live_sequencer_drains_a_channel() {
    let (tx, rx) = mpsc::channel();
    let seq = Sequencer::with_input(ComposerConfig::classic(), b"opening line").unwrap();
    let mut live = LiveSequencer::new(seq, ChannelSource::new(rx));

    let handle = thread::spawn(move || {
        for i in 0..5 {
            tx.send(format!("update {i}: the feed keeps going").into_bytes())
                .unwrap();
        }
    });
    handle.join().unwrap();

    let mut events: Vec<NoteEvent> = Vec::new();
    loop {
        let report = play(&mut live, &mut events, None).unwrap();
        assert!(report.exhausted);
        match live.source_mut().wait() {
            Some(bytes) => live.feed(&bytes),
            None => break,
        }
    }
    assert!(live.source_mut().is_closed());
    assert!(live.refills() > 0);
    assert!(events.len() > 10, "expected a long piece, got {}", events.len());
}
