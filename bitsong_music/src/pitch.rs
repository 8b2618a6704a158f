// Bounded random walk over scale-degree indices.
//
// The walker holds a degree index and moves it once per note by a step read
// from the bitstream (a signed delta, or a signed run length, per
// `StepMode`). After each move it applies at most one octave correction:
// below the lower bound it moves up one octave, above the upper bound it
// moves down one octave. A single step larger than an octave can therefore
// leave the index outside the bounds; the next steps pull it back gradually
// rather than snapping it into range.
//
// All positions are in scale steps, so the bounds scale with the key: a
// pentatonic walk spans fewer semitones per step than a chromatic one but the
// same number of octaves.

use crate::config::{ComposerConfig, StepMode};
use bitsong_bits::{BitError, Decoder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchWalker {
    index: i32,
    lower_bound: i32,
    upper_bound: i32,
    steps_per_octave: i32,
    step: StepMode,
}

impl PitchWalker {
    /// Walker with the register policy from `config`, for a key with
    /// `steps_per_octave` degrees per octave.
    pub fn new(steps_per_octave: i32, config: &ComposerConfig) -> Result<Self, BitError> {
        if steps_per_octave <= 0 {
            return Err(BitError::invalid(format!(
                "steps_per_octave must be positive, got {steps_per_octave}"
            )));
        }
        let degree = |octave: i32| {
            steps_per_octave.checked_mul(octave).ok_or_else(|| {
                BitError::invalid(format!(
                    "octave {octave} out of range for {steps_per_octave} steps per octave"
                ))
            })
        };
        Ok(PitchWalker {
            index: degree(config.start_octave)?,
            lower_bound: degree(config.lower_octave)?,
            upper_bound: degree(config.upper_octave)?,
            steps_per_octave,
            step: config.step,
        })
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.lower_bound, self.upper_bound)
    }

    pub fn steps_per_octave(&self) -> i32 {
        self.steps_per_octave
    }

    /// Move to an arbitrary index (no clamping).
    pub fn set_index(&mut self, index: i32) {
        self.index = index;
    }

    /// Read one step, apply it, correct by at most one octave, and return the
    /// new index.
    pub fn advance(&mut self, decoder: &mut Decoder) -> Result<i32, BitError> {
        let delta = self.read_step(decoder)?;
        self.index = self.index.saturating_add(delta);
        if self.index < self.lower_bound {
            self.index += self.steps_per_octave;
        } else if self.index > self.upper_bound {
            self.index -= self.steps_per_octave;
        }
        log::trace!("pitch step {delta:+} -> degree {}", self.index);
        Ok(self.index)
    }

    fn read_step(&self, decoder: &mut Decoder) -> Result<i32, BitError> {
        match self.step {
            StepMode::SignedDelta { width } => decoder.read_signed_int(width),
            StepMode::Run => {
                // An unfinished run stays unread so more data can extend it.
                let run = decoder.peek_run().ok_or(BitError::Exhausted)?;
                if !run.is_complete() {
                    return Err(BitError::Exhausted);
                }
                decoder.read_run()?;
                let length = i32::try_from(run.length).unwrap_or(i32::MAX);
                Ok(if run.value { length } else { -length })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker(steps: i32) -> PitchWalker {
        PitchWalker::new(steps, &ComposerConfig::classic()).unwrap()
    }

    #[test]
    fn test_default_register() {
        let w = walker(7);
        assert_eq!(w.index(), 35);
        assert_eq!(w.bounds(), (21, 56));
    }

    #[test]
    fn test_signed_steps() {
        let mut w = walker(7);
        // 0101 (+5), 1011 (-3)
        let mut dec = Decoder::from_bytes(&[0b0101_1011]);
        assert_eq!(w.advance(&mut dec), Ok(40));
        assert_eq!(w.advance(&mut dec), Ok(37));
        assert_eq!(w.advance(&mut dec), Err(BitError::Exhausted));
    }

    #[test]
    fn test_clamps_once_from_below() {
        let mut w = walker(7);
        let (lower, _) = w.bounds();
        w.set_index(lower);
        // 1111 = -7: lands 7 below, one octave up brings it back to lower.
        let mut dec = Decoder::from_bytes(&[0b1111_0000]);
        assert_eq!(w.advance(&mut dec), Ok(lower - 7 + 7));
    }

    #[test]
    fn test_single_correction_may_stay_out_of_range() {
        // Pentatonic octave is 5 steps, so a -7 step overshoots by more than
        // one correction can fix.
        let mut w = walker(5);
        let (lower, _) = w.bounds();
        w.set_index(lower);
        let mut dec = Decoder::from_bytes(&[0b1111_0000]);
        let index = w.advance(&mut dec).unwrap();
        assert_eq!(index, lower - 7 + 5);
        assert!(index < lower, "one correction only, index {index} stays below {lower}");
    }

    #[test]
    fn test_clamps_once_from_above() {
        let mut w = walker(7);
        let (_, upper) = w.bounds();
        w.set_index(upper);
        // 0011 = +3 -> upper + 3 - 7
        let mut dec = Decoder::from_bytes(&[0b0011_0000]);
        assert_eq!(w.advance(&mut dec), Ok(upper + 3 - 7));
    }

    #[test]
    fn test_run_steps() {
        let config = ComposerConfig {
            step: StepMode::Run,
            ..ComposerConfig::classic()
        };
        let mut w = PitchWalker::new(7, &config).unwrap();
        // 111 00 1...: +3, -2, then a run of ones cut off by the end.
        let mut dec = Decoder::from_bytes(&[0b1110_0111]);
        assert_eq!(w.advance(&mut dec), Ok(38));
        assert_eq!(w.advance(&mut dec), Ok(36));
        assert_eq!(w.advance(&mut dec), Err(BitError::Exhausted));
        assert_eq!(w.index(), 36);
    }

    #[test]
    fn test_unfinished_run_is_read_whole_after_feed() {
        let config = ComposerConfig {
            step: StepMode::Run,
            ..ComposerConfig::classic()
        };
        let mut w = PitchWalker::new(7, &config).unwrap();
        // 00000 111 | 11 0...: the run of five ones spans the feed.
        let mut dec = Decoder::from_bytes(&[0b0000_0111]);
        assert_eq!(w.advance(&mut dec), Ok(30));
        assert_eq!(w.advance(&mut dec), Err(BitError::Exhausted));
        assert_eq!(dec.remaining_bits(), 3, "unfinished run left unread");

        dec.feed(&[0b1100_0000]);
        assert_eq!(w.advance(&mut dec), Ok(35));
    }

    #[test]
    fn test_rejects_overflowing_octaves() {
        let config = ComposerConfig {
            start_octave: 1_000_000_000,
            upper_octave: 1_000_000_000,
            ..ComposerConfig::classic()
        };
        assert!(matches!(
            PitchWalker::new(7, &config),
            Err(BitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_empty_scale() {
        assert!(PitchWalker::new(0, &ComposerConfig::classic()).is_err());
    }
}
