// The note events the sequencer emits.
//
// Durations are stored as the denominator `d` of a fraction of a whole
// note: `d = 4` is a quarter note. `duration()` gives the exact fraction and
// `beats()` gives the length in quarter-note beats (what a tempo applies to).

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Concrete pitch on the MIDI note-number scale. May fall outside 0..=127
    /// if the walk drifts; sinks decide how to handle that.
    pub pitch: i32,
    /// Scale-degree index the pitch was derived from.
    pub degree: i32,
    /// The note lasts `1 / denominator` of a whole note.
    pub denominator: u8,
    pub velocity: u8,
}

impl NoteEvent {
    /// Length as a fraction of a whole note.
    pub fn duration(&self) -> Ratio<u32> {
        Ratio::new(1, u32::from(self.denominator))
    }

    /// Length in quarter-note beats.
    pub fn beats(&self) -> Ratio<u32> {
        Ratio::new(4, u32::from(self.denominator))
    }
}
