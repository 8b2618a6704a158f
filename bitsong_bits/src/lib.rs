// Bit-level reading over a byte stream that can keep growing.
//
// This crate is the leaf of the bitsong workspace. `BitCursor` owns the byte
// buffer and the read position; `Decoder` layers the numeric reads on top
// (fixed-width unsigned and sign-magnitude integers, plus runs of equal bits).
// `bitsong_music` drives both generative algorithms (rhythm subdivision and
// the pitch walk) from a single shared `Decoder`.
//
// Module overview:
// - `cursor.rs`:  `BitCursor`, MSB-first bit order, incremental `feed`.
// - `decoder.rs`: `Decoder`, `Run`, `RunEnd`.
// - `error.rs`:   `BitError` (`Exhausted` / `InvalidArgument`).
//
// **Critical constraint: determinism.** The same bytes fed in the same order
// must produce the same bits, in the same order, on every platform. Running
// out of data is never fatal: `Exhausted` is re-checked on every read, so a
// caller can feed more bytes and try again.

pub mod cursor;
pub mod decoder;
pub mod error;

pub use cursor::{BitCursor, BitPosition};
pub use decoder::{Decoder, Run, RunEnd};
pub use error::BitError;
