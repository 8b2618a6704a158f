// Growable byte buffer with a bit-granular read position.
//
// Bits come out most-significant first within each byte, and bytes come out
// in the order they were fed. `feed` may be called at any time, including
// after a read has reported `Exhausted`; the next read simply sees the new
// data. Exhaustion is re-checked on each call and is never sticky.
//
// Consumed bytes stay in the buffer until `compact` drops them. The logical
// position (`consumed_bits`, `total_bits`) counts from the first byte ever fed
// and is unaffected by compaction, so long-running live sources can reclaim
// memory without disturbing the counters callers use for refill policies.

use crate::error::BitError;

/// Read position inside the live buffer: `byte` indexes the current byte,
/// `bit` is the number of bits already taken from it (0..8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitPosition {
    pub byte: usize,
    pub bit: u8,
}

#[derive(Debug, Clone, Default)]
pub struct BitCursor {
    buf: Vec<u8>,
    pos: BitPosition,
    /// Bytes removed from the front of `buf` by `compact`.
    dropped: u64,
}

impl BitCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut cursor = Self::new();
        cursor.feed(bytes);
        cursor
    }

    /// Append bytes to the end of the buffer. Never moves the read position.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take the next bit, MSB first. Fails with `Exhausted` only when no
    /// unread bit exists at the time of the call.
    pub fn next_bit(&mut self) -> Result<bool, BitError> {
        let bit = self.peek_bit().ok_or(BitError::Exhausted)?;
        self.pos.bit += 1;
        if self.pos.bit == 8 {
            self.pos.bit = 0;
            self.pos.byte += 1;
        }
        Ok(bit)
    }

    /// Look at the next bit without consuming it.
    pub fn peek_bit(&self) -> Option<bool> {
        let byte = *self.buf.get(self.pos.byte)?;
        Some((byte >> (7 - self.pos.bit)) & 1 == 1)
    }

    /// Look `offset` bits past the read position without consuming anything.
    /// `peek_bit_at(0)` is `peek_bit()`.
    pub fn peek_bit_at(&self, offset: u64) -> Option<bool> {
        let index = self.pos.byte as u64 * 8 + u64::from(self.pos.bit) + offset;
        let byte = *self.buf.get(usize::try_from(index / 8).ok()?)?;
        Some((byte >> (7 - index % 8)) & 1 == 1)
    }

    pub fn position(&self) -> BitPosition {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos.byte >= self.buf.len()
    }

    /// Bits consumed since the first byte was fed.
    pub fn consumed_bits(&self) -> u64 {
        (self.dropped + self.pos.byte as u64) * 8 + u64::from(self.pos.bit)
    }

    /// Bits fed since creation.
    pub fn total_bits(&self) -> u64 {
        (self.dropped + self.buf.len() as u64) * 8
    }

    pub fn remaining_bits(&self) -> u64 {
        self.total_bits() - self.consumed_bits()
    }

    /// Drop fully consumed bytes from the front of the buffer.
    pub fn compact(&mut self) {
        let done = self.pos.byte;
        if done == 0 {
            return;
        }
        self.buf.drain(..done);
        self.dropped += done as u64;
        self.pos.byte = 0;
        log::trace!("compacted {done} consumed bytes ({} dropped total)", self.dropped);
    }
}
