// Feeding a sequencer from a live byte source.
//
// Two ways to keep a sequencer supplied while it is being played:
//
// - `LiveSequencer` owns a sequencer and a `ByteSource`. Before each event it
//   checks how much of the stream has been consumed; once more than half of
//   everything fed so far has been read and the source has something new, it
//   appends a blank-line separator plus the new bytes. Polling never blocks,
//   so a scheduler can drive it at its own pace.
//
// - `SharedSequencer` wraps a sequencer in a mutex so a separate producer
//   thread can call `feed` while the consumer calls `next_event`. Each call
//   holds the lock only for its own duration.
//
// Waiting for data is always the caller's business. `next_event` reports
// `Exhausted` immediately; callers that want to block use
// `ChannelSource::wait` (or their own mechanism) and then retry.

use crate::event::NoteEvent;
use crate::sequencer::{EventPattern, Sequencer};
use bitsong_bits::BitError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

/// Inserted between the existing stream and each refill.
pub const REFILL_SEPARATOR: &[u8] = b"\n\n";

/// Something that may have new bytes available.
pub trait ByteSource {
    /// Return new bytes if any are ready. Must not block.
    fn poll(&mut self) -> Option<Vec<u8>>;
}

/// A `ByteSource` fed through an mpsc channel, typically from a reader
/// thread.
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    closed: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        ChannelSource { rx, closed: false }
    }

    /// True once the sending side has hung up and the queue is drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Block until the next chunk arrives. `None` once every sender is gone.
    pub fn wait(&mut self) -> Option<Vec<u8>> {
        match self.rx.recv() {
            Ok(bytes) => Some(bytes),
            Err(_) => {
                self.closed = true;
                None
            }
        }
    }
}

impl ByteSource for ChannelSource {
    fn poll(&mut self) -> Option<Vec<u8>> {
        match self.rx.try_recv() {
            Ok(bytes) => Some(bytes),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }
}

pub struct LiveSequencer<S: ByteSource> {
    sequencer: Sequencer,
    source: S,
    refills: u64,
}

impl<S: ByteSource> LiveSequencer<S> {
    pub fn new(sequencer: Sequencer, source: S) -> Self {
        LiveSequencer {
            sequencer,
            source,
            refills: 0,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn refills(&self) -> u64 {
        self.refills
    }

    /// Feed bytes directly, bypassing the refill policy (no separator).
    pub fn feed(&mut self, bytes: &[u8]) {
        self.sequencer.feed(bytes);
    }

    /// Pull from the source if more than half of the stream is consumed.
    /// Returns true if anything was fed.
    pub fn refill(&mut self) -> bool {
        let cursor = self.sequencer.decoder().cursor();
        if cursor.consumed_bits() * 2 <= cursor.total_bits() {
            return false;
        }
        let Some(bytes) = self.source.poll() else {
            return false;
        };
        self.sequencer.compact();
        self.sequencer.feed(REFILL_SEPARATOR);
        self.sequencer.feed(&bytes);
        self.refills += 1;
        log::info!("refill {}: fed {} new bytes", self.refills, bytes.len());
        true
    }

    pub fn into_inner(self) -> (Sequencer, S) {
        (self.sequencer, self.source)
    }
}

impl<S: ByteSource> EventPattern for LiveSequencer<S> {
    fn next_event(&mut self) -> Result<NoteEvent, BitError> {
        self.refill();
        self.sequencer.next_event()
    }
}

/// A sequencer that a producer thread can feed while another thread plays it.
#[derive(Clone)]
pub struct SharedSequencer {
    inner: Arc<Mutex<Sequencer>>,
}

impl SharedSequencer {
    pub fn new(sequencer: Sequencer) -> Self {
        SharedSequencer {
            inner: Arc::new(Mutex::new(sequencer)),
        }
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.inner.lock().feed(bytes);
    }

    pub fn next_event(&self) -> Result<NoteEvent, BitError> {
        self.inner.lock().next_event()
    }

    /// Run `f` with exclusive access to the sequencer.
    pub fn with<R>(&self, f: impl FnOnce(&mut Sequencer) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl EventPattern for SharedSequencer {
    fn next_event(&mut self) -> Result<NoteEvent, BitError> {
        SharedSequencer::next_event(self)
    }
}
