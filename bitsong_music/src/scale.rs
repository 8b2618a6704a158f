// Scale catalog and key lookup.
//
// The sequencer never reasons about semitones itself. It picks a tonic
// (0-11) and a scale id from the bitstream, asks this module for a `Key`, and
// from then on only needs two things from it: how many scale steps make an
// octave, and which pitch a given scale-degree index lands on.
//
// Degree indices are unbounded integers. Index 0 is the tonic in octave 0;
// every `steps_per_octave()` steps up adds 12 semitones. Negative indices
// wrap downward with Euclidean division, so the mapping is monotonic across
// the whole integer range.

use bitsong_bits::BitError;
use serde::{Deserialize, Serialize};

/// The scales the bitstream can select from. The order is part of the
/// output contract: scale ids read from the stream index into `Scale::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    /// Major / Ionian: W W H W W W H
    Major,
    /// Harmonic minor: raised 7th over natural minor.
    HarmonicMinor,
    /// Natural minor / Aeolian.
    Aeolian,
    Dorian,
    /// Characteristic half-step from 1 to 2.
    Phrygian,
    /// Raised 4th.
    Lydian,
    /// Major with lowered 7th.
    Mixolydian,
    /// Diminished 5th over the tonic.
    Locrian,
    MajorPentatonic,
    MinorPentatonic,
    /// Minor pentatonic plus the flat 5th.
    Blues,
    WholeTone,
    Chromatic,
    /// Ascending melodic minor.
    MelodicMinor,
    HungarianMinor,
    /// Alternating whole and half steps.
    Octatonic,
}

impl Scale {
    pub const ALL: [Scale; 16] = [
        Scale::Major,
        Scale::HarmonicMinor,
        Scale::Aeolian,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Locrian,
        Scale::MajorPentatonic,
        Scale::MinorPentatonic,
        Scale::Blues,
        Scale::WholeTone,
        Scale::Chromatic,
        Scale::MelodicMinor,
        Scale::HungarianMinor,
        Scale::Octatonic,
    ];

    pub const COUNT: u32 = Self::ALL.len() as u32;

    pub fn from_id(id: u32) -> Result<Self, BitError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| {
                BitError::invalid(format!("scale id {id} out of range 0..{}", Self::COUNT))
            })
    }

    /// Semitone offsets from the tonic, ascending, starting at 0.
    pub fn semitones(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            Scale::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::WholeTone => &[0, 2, 4, 6, 8, 10],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Scale::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            Scale::HungarianMinor => &[0, 2, 3, 6, 7, 8, 11],
            Scale::Octatonic => &[0, 2, 3, 5, 6, 8, 9, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::HarmonicMinor => "harmonic minor",
            Scale::Aeolian => "aeolian",
            Scale::Dorian => "dorian",
            Scale::Phrygian => "phrygian",
            Scale::Lydian => "lydian",
            Scale::Mixolydian => "mixolydian",
            Scale::Locrian => "locrian",
            Scale::MajorPentatonic => "major pentatonic",
            Scale::MinorPentatonic => "minor pentatonic",
            Scale::Blues => "blues",
            Scale::WholeTone => "whole tone",
            Scale::Chromatic => "chromatic",
            Scale::MelodicMinor => "melodic minor",
            Scale::HungarianMinor => "hungarian minor",
            Scale::Octatonic => "octatonic",
        }
    }
}

/// A scale rooted on a tonic pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Pitch class of the tonic (0 = C, 3 = Eb, ...).
    pub tonic: u8,
    pub scale: Scale,
}

impl Key {
    /// Look up a key. Fails with `InvalidArgument` if `tonic >= 12` or the
    /// scale id is outside the catalog.
    pub fn new(tonic: u8, scale_id: u32) -> Result<Self, BitError> {
        if tonic >= 12 {
            return Err(BitError::invalid(format!("tonic {tonic} out of range 0..12")));
        }
        Ok(Key {
            tonic,
            scale: Scale::from_id(scale_id)?,
        })
    }

    pub fn steps_per_octave(&self) -> i32 {
        self.scale.semitones().len() as i32
    }

    /// Pitch (MIDI note number scale) of a scale-degree index.
    pub fn degree_to_pitch(&self, index: i32) -> i32 {
        let steps = self.steps_per_octave();
        let octave = index.div_euclid(steps);
        let step = index.rem_euclid(steps) as usize;
        i32::from(self.tonic) + octave * 12 + i32::from(self.scale.semitones()[step])
    }

    pub fn tonic_name(&self) -> &'static str {
        pitch_name(self.tonic)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.scale.name())
    }
}

pub fn pitch_name(pc: u8) -> &'static str {
    match pc % 12 {
        0 => "C", 1 => "C#", 2 => "D", 3 => "Eb",
        4 => "E", 5 => "F", 6 => "F#", 7 => "G",
        8 => "Ab", 9 => "A", 10 => "Bb", 11 => "B",
        _ => "?"
    }
}
