// Event sinks and the pull loop that feeds them.
//
// A sink receives events one at a time and may fail with its own error
// type. `play` pulls from any `EventPattern` until it runs dry or a limit is
// reached, and hands each event to the sink. Running out of bits ends the
// loop normally (reported in `PlayReport::exhausted`); a misuse error from
// the generator or a failure from the sink is returned unchanged.

use crate::event::NoteEvent;
use crate::sequencer::EventPattern;
use bitsong_bits::BitError;
use std::convert::Infallible;
use std::io::Write;
use thiserror::Error;

pub trait EventSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn accept(&mut self, event: NoteEvent) -> Result<(), Self::Error>;
}

impl EventSink for Vec<NoteEvent> {
    type Error = Infallible;

    fn accept(&mut self, event: NoteEvent) -> Result<(), Self::Error> {
        self.push(event);
        Ok(())
    }
}

/// Writes one JSON object per event, newline-terminated.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    type Error = std::io::Error;

    fn accept(&mut self, event: NoteEvent) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.writer, &event)?;
        self.writer.write_all(b"\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayReport {
    pub events: usize,
    /// True if the loop stopped because the stream ran out of bits (as
    /// opposed to hitting the event limit).
    pub exhausted: bool,
}

#[derive(Debug, Error)]
pub enum PlayError<E: std::error::Error + 'static> {
    #[error("generator error: {0}")]
    Generator(BitError),

    #[error("sink error: {0}")]
    Sink(#[source] E),
}

/// Pull events from `pattern` into `sink` until the stream is exhausted or
/// `max_events` events have been delivered.
pub fn play<P, S>(
    pattern: &mut P,
    sink: &mut S,
    max_events: Option<usize>,
) -> Result<PlayReport, PlayError<S::Error>>
where
    P: EventPattern + ?Sized,
    S: EventSink + ?Sized,
{
    let mut report = PlayReport::default();
    while max_events.is_none_or(|max| report.events < max) {
        match pattern.next_event() {
            Ok(event) => {
                sink.accept(event).map_err(PlayError::Sink)?;
                report.events += 1;
            }
            Err(BitError::Exhausted) => {
                report.exhausted = true;
                break;
            }
            Err(e) => return Err(PlayError::Generator(e)),
        }
    }
    log::debug!("played {} events (exhausted: {})", report.events, report.exhausted);
    Ok(report)
}
