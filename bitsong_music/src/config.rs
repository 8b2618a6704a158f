// Composer and playback configuration.
//
// Every tunable of the generator lives in `ComposerConfig`: the bit widths
// of the key seed, how the pitch walk reads its steps, the deepest rhythmic
// subdivision, and the register bounds expressed in octaves of the chosen
// scale. Configs are plain serde structs so they can be loaded from JSON.
//
// Two presets exist because the seed widths differ between historical
// variants of the generator, and both produce valid (different) pieces from
// the same input:
// - `classic()`: 4-bit tonic, 5-bit scale.
// - `compact()`: 3-bit tonic, 4-bit scale.
//
// `PlaybackConfig` is separate: it only affects how sinks render events
// (tempo, MIDI resolution and program), never which events are generated.

use bitsong_bits::BitError;
use bitsong_bits::decoder::MAX_READ_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Octave settings must lie in `-MAX_OCTAVE..=MAX_OCTAVE`.
pub const MAX_OCTAVE: i32 = 16;

/// How the pitch walk reads each step from the bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepMode {
    /// A sign-magnitude integer of `width` bits (1 sign + width-1 magnitude).
    SignedDelta { width: u32 },
    /// A run of equal bits: ones step up by the run length, zeros step down.
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Bits read for the tonic (taken modulo 12).
    pub tonic_bits: u32,
    /// Bits read for the scale id (taken modulo the catalog size).
    pub scale_bits: u32,
    pub step: StepMode,
    /// Deepest subdivision denominator. A power of two in 1..=128.
    pub max_denominator: u8,
    /// Starting degree = `start_octave * steps_per_octave`.
    pub start_octave: i32,
    /// Lower bound of the walk = `lower_octave * steps_per_octave`.
    pub lower_octave: i32,
    /// Upper bound of the walk = `upper_octave * steps_per_octave`.
    pub upper_octave: i32,
    /// Velocity stamped on every event.
    pub velocity: u8,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl ComposerConfig {
    pub fn classic() -> Self {
        ComposerConfig {
            tonic_bits: 4,
            scale_bits: 5,
            step: StepMode::SignedDelta { width: 4 },
            max_denominator: 16,
            start_octave: 5,
            lower_octave: 3,
            upper_octave: 8,
            velocity: 127,
        }
    }

    pub fn compact() -> Self {
        ComposerConfig {
            tonic_bits: 3,
            scale_bits: 4,
            ..Self::classic()
        }
    }

    /// Look up a preset by name (`classic` or `compact`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "compact" => Some(Self::compact()),
            _ => None,
        }
    }

    /// Bits the key seed consumes before the first measure.
    pub fn seed_bits(&self) -> u32 {
        self.tonic_bits + self.scale_bits
    }

    pub fn validate(&self) -> Result<(), BitError> {
        for (name, width) in [("tonic_bits", self.tonic_bits), ("scale_bits", self.scale_bits)] {
            if width == 0 || width > MAX_READ_WIDTH {
                return Err(BitError::invalid(format!(
                    "{name} must be in 1..={MAX_READ_WIDTH}, got {width}"
                )));
            }
        }
        if let StepMode::SignedDelta { width } = self.step {
            if width == 0 || width > MAX_READ_WIDTH {
                return Err(BitError::invalid(format!(
                    "signed step width must be in 1..={MAX_READ_WIDTH}, got {width}"
                )));
            }
        }
        if !self.max_denominator.is_power_of_two() {
            return Err(BitError::invalid(format!(
                "max_denominator must be a power of two, got {}",
                self.max_denominator
            )));
        }
        for (name, octave) in [
            ("lower_octave", self.lower_octave),
            ("start_octave", self.start_octave),
            ("upper_octave", self.upper_octave),
        ] {
            if !(-MAX_OCTAVE..=MAX_OCTAVE).contains(&octave) {
                return Err(BitError::invalid(format!(
                    "{name} must be in -{MAX_OCTAVE}..={MAX_OCTAVE}, got {octave}"
                )));
            }
        }
        if !(self.lower_octave <= self.start_octave && self.start_octave <= self.upper_octave) {
            return Err(BitError::invalid(format!(
                "octaves must satisfy lower <= start <= upper, got {} / {} / {}",
                self.lower_octave, self.start_octave, self.upper_octave
            )));
        }
        if self.velocity > 127 {
            return Err(BitError::invalid(format!(
                "velocity must be in 0..=127, got {}",
                self.velocity
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ComposerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] BitError),
}

/// How sinks render events. Does not influence generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Quarter notes per minute.
    pub tempo_bpm: u16,
    pub ticks_per_quarter: u16,
    /// General MIDI program (0-127).
    pub program: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            tempo_bpm: 84,
            ticks_per_quarter: 480,
            program: 0,
        }
    }
}

impl PlaybackConfig {
    /// Microseconds per quarter note, as written to a MIDI tempo event.
    pub fn tempo_microseconds(&self) -> u32 {
        60_000_000 / u32::from(self.tempo_bpm.max(1))
    }

    /// Check the values fit the MIDI fields they are written to: a 24-bit
    /// tempo, a 15-bit division and a 7-bit program.
    pub fn validate(&self) -> Result<(), BitError> {
        if self.tempo_bpm == 0 || self.tempo_microseconds() > 0xFF_FFFF {
            return Err(BitError::invalid(format!(
                "tempo must be at least 4 bpm, got {}",
                self.tempo_bpm
            )));
        }
        if self.ticks_per_quarter == 0 || self.ticks_per_quarter > 0x7FFF {
            return Err(BitError::invalid(format!(
                "ticks_per_quarter must be in 1..=32767, got {}",
                self.ticks_per_quarter
            )));
        }
        if self.program > 127 {
            return Err(BitError::invalid(format!(
                "program must be in 0..=127, got {}",
                self.program
            )));
        }
        Ok(())
    }
}
