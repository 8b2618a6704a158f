// Bitsong music generator
//
// Turns the raw bit pattern of any byte stream (a string, a line of input, a
// live feed) into a deterministic melody. The bits are read in one fixed
// order by a single decoder: first a key seed, then for each measure a
// binary-subdivision rhythm, and one pitch-walk step per note.
//
// Architecture:
// - scale.rs: Scale catalog (16 scales) and `Key` lookup, degree -> pitch
// - config.rs: `ComposerConfig` presets (classic / compact), JSON loading,
//   `PlaybackConfig` for sinks
// - rhythm.rs: Measure rhythm by recursive binary subdivision
// - pitch.rs: Bounded pitch walk with single-octave correction
// - event.rs: `NoteEvent` (pitch, duration denominator, velocity)
// - sequencer.rs: `Sequencer` composing seed + rhythm + pitch; the
//   `EventPattern` pull interface
// - sink.rs: `EventSink` trait, JSON lines output, the `play` loop
// - midi.rs: MIDI file output from collected events
// - live.rs: Refilling from a live `ByteSource`, and a mutex-shared sequencer
//   for cross-thread feeding
//
// The generator is deterministic given the input bytes and config. Feeding
// the same bytes at different times can change the output only where a read
// was interrupted by running out of data.

pub mod config;
pub mod event;
pub mod live;
pub mod midi;
pub mod pitch;
pub mod rhythm;
pub mod scale;
pub mod sequencer;
pub mod sink;

pub use bitsong_bits::BitError;
pub use config::{ComposerConfig, PlaybackConfig, StepMode};
pub use event::NoteEvent;
pub use sequencer::{EventPattern, Sequencer};
