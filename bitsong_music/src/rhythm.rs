// Measure rhythm by recursive binary subdivision.
//
// A measure starts as one whole-note beat (denominator 1). At each beat one
// bit is read: a 1 splits the beat into two halves (denominator doubles) as
// long as the beat is still coarser than `max_denominator`; anything else
// makes the beat a leaf. Children are visited left first, so the leaves come
// out in the order they sound.
//
// The depth bound guarantees termination even on an all-ones stream: with
// the default bound of 16 the deepest split is 1 -> 2 -> 4 -> 8 -> 16. Note
// that a beat at the bound still consumes its bit before becoming a leaf.
//
// If the stream runs out mid-measure the partial measure is dropped and the
// error propagates. The bits already read stay consumed.

use bitsong_bits::{BitError, Decoder};
use num_rational::Ratio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmBuilder {
    max_denominator: u8,
}

impl Default for RhythmBuilder {
    fn default() -> Self {
        RhythmBuilder { max_denominator: 16 }
    }
}

impl RhythmBuilder {
    pub fn new(max_denominator: u8) -> Result<Self, BitError> {
        if !max_denominator.is_power_of_two() {
            return Err(BitError::invalid(format!(
                "max_denominator must be a power of two, got {max_denominator}"
            )));
        }
        Ok(RhythmBuilder { max_denominator })
    }

    pub fn max_denominator(&self) -> u8 {
        self.max_denominator
    }

    /// Build one measure: the beat denominators in playing order.
    pub fn build_measure(&self, decoder: &mut Decoder) -> Result<Vec<u8>, BitError> {
        let mut measure = Vec::new();
        self.subdivide(decoder, 1, &mut measure)?;
        log::trace!("built measure {measure:?}");
        Ok(measure)
    }

    fn subdivide(
        &self,
        decoder: &mut Decoder,
        denominator: u8,
        out: &mut Vec<u8>,
    ) -> Result<(), BitError> {
        if decoder.read_bit()? && denominator < self.max_denominator {
            self.subdivide(decoder, denominator * 2, out)?;
            self.subdivide(decoder, denominator * 2, out)?;
        } else {
            out.push(denominator);
        }
        Ok(())
    }
}

/// Total length of a measure as a fraction of a whole note.
pub fn measure_length(measure: &[u8]) -> Ratio<u32> {
    measure
        .iter()
        .map(|&d| Ratio::new(1, u32::from(d)))
        .fold(Ratio::from_integer(0), |acc, x| acc + x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(bytes: &[u8]) -> Result<Vec<u8>, BitError> {
        RhythmBuilder::default().build_measure(&mut Decoder::from_bytes(bytes))
    }

    #[test]
    fn test_zero_bit_is_whole_note() {
        assert_eq!(build(&[0x00]).unwrap(), vec![1]);
    }

    #[test]
    fn test_single_split() {
        // 1 0 0 -> two halves
        assert_eq!(build(&[0b1000_0000]).unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_left_subtree_first() {
        // 1 (split whole) 1 (split left half) 0 0 (two quarters) 0 (right half)
        assert_eq!(build(&[0b1100_0000]).unwrap(), vec![4, 4, 2]);
        // 1 0 (left half leaf) 1 0 0 (right half split into quarters)
        assert_eq!(build(&[0b1010_0000]).unwrap(), vec![2, 4, 4]);
    }

    #[test]
    fn test_all_ones_stops_at_sixteenths() {
        let mut dec = Decoder::from_bytes(&[0xFF; 8]);
        let measure = RhythmBuilder::default().build_measure(&mut dec).unwrap();
        assert_eq!(measure, vec![16; 16]);
        // 1 + 2 + 4 + 8 internal nodes plus 16 leaves, one bit each.
        assert_eq!(dec.cursor().consumed_bits(), 31);
    }

    #[test]
    fn test_measures_are_complete() {
        let inputs: [&[u8]; 5] = [
            b"hello",
            b"\x35\xA7\x00\xFF\x12",
            &[0b1011_0110, 0b1101_1011, 0b0110_1101, 0xFF, 0xFF],
            &[0xAA; 6],
            &[0xF0, 0x0F, 0xF0, 0x0F, 0xFF],
        ];
        for input in inputs {
            let mut dec = Decoder::from_bytes(input);
            while let Ok(measure) = RhythmBuilder::default().build_measure(&mut dec) {
                assert_eq!(
                    measure_length(&measure),
                    Ratio::from_integer(1),
                    "measure {measure:?} from {input:?} does not fill a whole note"
                );
                for d in &measure {
                    assert!(d.is_power_of_two() && *d <= 16, "bad denominator {d}");
                }
            }
        }
    }

    #[test]
    fn test_exhaustion_discards_partial_measure() {
        // 1 1 1 1 1 1 1 1: still inside the first half when the byte runs out.
        assert_eq!(build(&[0xFF]), Err(BitError::Exhausted));
        assert_eq!(build(&[]), Err(BitError::Exhausted));
    }

    #[test]
    fn test_custom_depth_bound() {
        let builder = RhythmBuilder::new(4).unwrap();
        let mut dec = Decoder::from_bytes(&[0xFF; 2]);
        assert_eq!(builder.build_measure(&mut dec).unwrap(), vec![4, 4, 4, 4]);
        assert!(RhythmBuilder::new(6).is_err());
    }
}
