// Numeric reads on top of `BitCursor`.
//
// Three primitives: `read_uint(n)` (n bits, MSB first), `read_signed_int(n)`
// (one sign bit, then n-1 magnitude bits; sign 1 means negative), and
// `read_run()` (the maximal run of equal bits at the current position).
//
// Reads are not transactional. If a read runs out of data halfway, the bits
// it already took stay consumed and the read fails with `Exhausted`. Callers
// that need an all-or-nothing read check `remaining_bits()` first.
//
// `peek_run` reports the same run as `read_run` without consuming it, for
// callers that only want a run once it is complete.
//
// `read_run` never consumes the bit that ends a run; it peeks at it. Two
// back-to-back runs therefore partition the stream: `111001...` reads as
// (1, 3) then (0, 2).

use crate::cursor::BitCursor;
use crate::error::BitError;

/// Widest integer a single read may produce.
pub const MAX_READ_WIDTH: u32 = 32;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The next bit differs from the run's value (and was left unread).
    Differing,
    /// The buffer ran out while the run was still going. More data might
    /// extend it.
    Exhausted,
}

/// A maximal sequence of equal bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub value: bool,
    /// Always at least 1.
    pub length: u64,
    pub end: RunEnd,
}

impl Run {
    pub fn is_complete(&self) -> bool {
        self.end == RunEnd::Differing
    }
}

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    cursor: BitCursor,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            cursor: BitCursor::from_bytes(bytes),
        }
    }

    pub fn from_cursor(cursor: BitCursor) -> Self {
        Self { cursor }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.cursor.feed(bytes);
    }

    pub fn cursor(&self) -> &BitCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut BitCursor {
        &mut self.cursor
    }

    pub fn remaining_bits(&self) -> u64 {
        self.cursor.remaining_bits()
    }

    pub fn read_bit(&mut self) -> Result<bool, BitError> {
        self.cursor.next_bit()
    }

    /// Read `n` bits as an unsigned integer, MSB first. `n == 0` yields 0
    /// without touching the cursor.
    pub fn read_uint(&mut self, n: u32) -> Result<u32, BitError> {
        if n > MAX_READ_WIDTH {
            return Err(BitError::invalid(format!(
                "read width {n} exceeds {MAX_READ_WIDTH} bits"
            )));
        }
        let mut value: u32 = 0;
        for _ in 0..n {
            let bit = self.cursor.next_bit()?;
            value = (value << 1) | u32::from(bit);
        }
        Ok(value)
    }

    /// Read a sign-magnitude integer of `n` bits total.
    pub fn read_signed_int(&mut self, n: u32) -> Result<i32, BitError> {
        if n == 0 {
            return Err(BitError::invalid("signed read needs at least one bit"));
        }
        if n > MAX_READ_WIDTH {
            return Err(BitError::invalid(format!(
                "read width {n} exceeds {MAX_READ_WIDTH} bits"
            )));
        }
        let negative = self.cursor.next_bit()?;
        let magnitude = self.read_uint(n - 1)?;
        // At most 31 magnitude bits, so this always fits.
        let magnitude = magnitude as i32;
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// The run `read_run` would return, without consuming it. `None` if no
    /// bit is available.
    pub fn peek_run(&self) -> Option<Run> {
        let value = self.cursor.peek_bit()?;
        let mut length = 1;
        loop {
            match self.cursor.peek_bit_at(length) {
                Some(bit) if bit == value => length += 1,
                Some(_) => {
                    return Some(Run {
                        value,
                        length,
                        end: RunEnd::Differing,
                    });
                }
                None => {
                    return Some(Run {
                        value,
                        length,
                        end: RunEnd::Exhausted,
                    });
                }
            }
        }
    }

    /// Read the run of equal bits starting at the cursor.
    ///
    /// Fails with `Exhausted` only if not even the first bit is available.
    /// A run cut short by the end of the buffer is returned with
    /// `RunEnd::Exhausted` so the caller can decide what a partial run means.
    pub fn read_run(&mut self) -> Result<Run, BitError> {
        let value = self.cursor.next_bit()?;
        let mut length = 1;
        loop {
            match self.cursor.peek_bit() {
                Some(bit) if bit == value => {
                    self.cursor.next_bit()?;
                    length += 1;
                }
                Some(_) => {
                    return Ok(Run {
                        value,
                        length,
                        end: RunEnd::Differing,
                    });
                }
                None => {
                    return Ok(Run {
                        value,
                        length,
                        end: RunEnd::Exhausted,
                    });
                }
            }
        }
    }
}
