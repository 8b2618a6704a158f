// The event producer: key seed, measure rhythm, pitch walk.
//
// `Sequencer` owns the one `Decoder` that every algorithm reads from, so the
// order of reads is the whole output contract:
//
// 1. On the first event, the key seed: `tonic_bits` (mod 12) then
//    `scale_bits` (mod the catalog size). The seed is read all-or-nothing:
//    if fewer than `tonic_bits + scale_bits` bits are available, nothing is
//    consumed and the call fails with `Exhausted`.
// 2. Whenever the current measure is used up, a new measure rhythm.
// 3. One pitch-walk step per event.
//
// A duration is only taken off the measure queue once its event is emitted;
// if the pitch step runs out of bits, the same duration is used on the retry.
// Reads themselves are not transactional (see `bitsong_bits::decoder`), so a
// retry after a mid-read exhaustion continues from wherever the cursor is.
//
// The sequencer is a pull-driven producer. Anything that yields events one
// call at a time implements `EventPattern`, which is what sinks and the live
// feeders drive.

use crate::config::ComposerConfig;
use crate::event::NoteEvent;
use crate::pitch::PitchWalker;
use crate::rhythm::RhythmBuilder;
use crate::scale::{Key, Scale};
use bitsong_bits::{BitError, Decoder};
use std::collections::VecDeque;

/// A lazy, pull-driven source of note events.
///
/// `Err(BitError::Exhausted)` means "nothing more right now"; whether more
/// will come is up to whoever feeds the underlying stream.
pub trait EventPattern {
    fn next_event(&mut self) -> Result<NoteEvent, BitError>;
}

/// Key and walker, fixed once the seed bits have been read.
#[derive(Debug, Clone)]
struct Seeded {
    key: Key,
    walker: PitchWalker,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    decoder: Decoder,
    config: ComposerConfig,
    rhythm: RhythmBuilder,
    seeded: Option<Seeded>,
    measure: VecDeque<u8>,
    measures_built: u64,
    events_emitted: u64,
}

impl Sequencer {
    pub fn new(config: ComposerConfig) -> Result<Self, BitError> {
        config.validate()?;
        Ok(Sequencer {
            decoder: Decoder::new(),
            rhythm: RhythmBuilder::new(config.max_denominator)?,
            config,
            seeded: None,
            measure: VecDeque::new(),
            measures_built: 0,
            events_emitted: 0,
        })
    }

    pub fn with_input(config: ComposerConfig, bytes: &[u8]) -> Result<Self, BitError> {
        let mut sequencer = Self::new(config)?;
        sequencer.feed(bytes);
        Ok(sequencer)
    }

    /// Append bytes to the stream. Safe to call between any two events.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.decoder.feed(bytes);
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// The key, once the seed has been read.
    pub fn key(&self) -> Option<&Key> {
        self.seeded.as_ref().map(|s| &s.key)
    }

    /// Current scale-degree index of the pitch walk, once seeded.
    pub fn degree(&self) -> Option<i32> {
        self.seeded.as_ref().map(|s| s.walker.index())
    }

    /// Durations left in the current measure.
    pub fn pending_durations(&self) -> impl Iterator<Item = u8> + '_ {
        self.measure.iter().copied()
    }

    pub fn measures_built(&self) -> u64 {
        self.measures_built
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// Release consumed bytes from the stream buffer.
    pub fn compact(&mut self) {
        self.decoder.cursor_mut().compact();
    }

    pub fn next_event(&mut self) -> Result<NoteEvent, BitError> {
        let seeded = match self.seeded.take() {
            Some(seeded) => seeded,
            None => read_seed(&mut self.decoder, &self.config)?,
        };
        let seeded = self.seeded.insert(seeded);

        if self.measure.is_empty() {
            let measure = self.rhythm.build_measure(&mut self.decoder)?;
            self.measures_built += 1;
            log::debug!("measure {}: {:?}", self.measures_built, measure);
            self.measure.extend(measure);
        }
        let Some(&denominator) = self.measure.front() else {
            return Err(BitError::invalid("rhythm builder produced an empty measure"));
        };

        let degree = seeded.walker.advance(&mut self.decoder)?;
        self.measure.pop_front();
        self.events_emitted += 1;

        let event = NoteEvent {
            pitch: seeded.key.degree_to_pitch(degree),
            degree,
            denominator,
            velocity: self.config.velocity,
        };
        log::trace!("event {}: {:?}", self.events_emitted, event);
        Ok(event)
    }
}

impl EventPattern for Sequencer {
    fn next_event(&mut self) -> Result<NoteEvent, BitError> {
        Sequencer::next_event(self)
    }
}

/// Read the key seed, or nothing at all if too few bits are buffered.
fn read_seed(decoder: &mut Decoder, config: &ComposerConfig) -> Result<Seeded, BitError> {
    if decoder.remaining_bits() < u64::from(config.seed_bits()) {
        return Err(BitError::Exhausted);
    }
    let tonic = decoder.read_uint(config.tonic_bits)? % 12;
    let scale_id = decoder.read_uint(config.scale_bits)? % Scale::COUNT;
    let key = Key::new(tonic as u8, scale_id)?;
    let walker = PitchWalker::new(key.steps_per_octave(), config)?;
    log::debug!(
        "seeded key {key} ({} steps per octave), degrees {:?}",
        key.steps_per_octave(),
        walker.bounds()
    );
    Ok(Seeded { key, walker })
}
