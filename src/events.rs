//! The structural event stream the loader consumes.
//!
//! A stream is `StreamStart`, zero or more documents bounded by
//! `DocumentStart`/`DocumentEnd`, and `StreamEnd`. Inside a document, mappings
//! and sequences are bounded by their start/end events and scalars carry raw
//! text. Node start events may carry a tag and an anchor label.
//!
//! [`crate::live_events::LiveEvents`] produces these events from YAML text;
//! [`ReplayEvents`] replays a prepared vector, for callers that bring their own
//! tokenizer.

use std::collections::VecDeque;

use crate::error::{Error, Location};

/// One structural event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    StreamStart { location: Location },
    StreamEnd { location: Location },
    DocumentStart { location: Location },
    DocumentEnd { location: Location },
    /// Start of a mapping, with optional tag and anchor label of the node.
    MapStart {
        tag: Option<String>,
        anchor: Option<String>,
        location: Location,
    },
    MapEnd { location: Location },
    /// Start of a sequence, with optional tag and anchor label of the node.
    SeqStart {
        tag: Option<String>,
        anchor: Option<String>,
        location: Location,
    },
    SeqEnd { location: Location },
    /// Scalar node with its raw text.
    Scalar {
        value: String,
        tag: Option<String>,
        anchor: Option<String>,
        location: Location,
    },
}

impl Event {
    /// Get the source location attached to this event.
    pub fn location(&self) -> Location {
        match self {
            Event::StreamStart { location }
            | Event::StreamEnd { location }
            | Event::DocumentStart { location }
            | Event::DocumentEnd { location }
            | Event::MapStart { location, .. }
            | Event::MapEnd { location }
            | Event::SeqStart { location, .. }
            | Event::SeqEnd { location }
            | Event::Scalar { location, .. } => *location,
        }
    }

    /// Tag of a node event; `None` for boundaries and untagged nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Event::MapStart { tag, .. }
            | Event::SeqStart { tag, .. }
            | Event::Scalar { tag, .. } => tag.as_deref(),
            _ => None,
        }
    }

    /// Anchor label of a node event.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Event::MapStart { anchor, .. }
            | Event::SeqStart { anchor, .. }
            | Event::Scalar { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// Short human-readable name of the event kind, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Event::StreamStart { .. } => "stream start".to_owned(),
            Event::StreamEnd { .. } => "stream end".to_owned(),
            Event::DocumentStart { .. } => "document start".to_owned(),
            Event::DocumentEnd { .. } => "document end".to_owned(),
            Event::MapStart { .. } => "mapping start".to_owned(),
            Event::MapEnd { .. } => "mapping end".to_owned(),
            Event::SeqStart { .. } => "sequence start".to_owned(),
            Event::SeqEnd { .. } => "sequence end".to_owned(),
            Event::Scalar { value, .. } => format!("scalar `{value}`"),
        }
    }

    pub fn stream_start() -> Self {
        Event::StreamStart {
            location: Location::UNKNOWN,
        }
    }

    pub fn stream_end() -> Self {
        Event::StreamEnd {
            location: Location::UNKNOWN,
        }
    }

    pub fn document_start() -> Self {
        Event::DocumentStart {
            location: Location::UNKNOWN,
        }
    }

    pub fn document_end() -> Self {
        Event::DocumentEnd {
            location: Location::UNKNOWN,
        }
    }

    pub fn map_start() -> Self {
        Event::MapStart {
            tag: None,
            anchor: None,
            location: Location::UNKNOWN,
        }
    }

    pub fn map_end() -> Self {
        Event::MapEnd {
            location: Location::UNKNOWN,
        }
    }

    pub fn seq_start() -> Self {
        Event::SeqStart {
            tag: None,
            anchor: None,
            location: Location::UNKNOWN,
        }
    }

    pub fn seq_end() -> Self {
        Event::SeqEnd {
            location: Location::UNKNOWN,
        }
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Event::Scalar {
            value: value.into(),
            tag: None,
            anchor: None,
            location: Location::UNKNOWN,
        }
    }

    /// Set the tag of a node event. Boundary events are returned unchanged.
    pub fn with_tag(mut self, set_tag: impl Into<String>) -> Self {
        if let Event::MapStart { tag, .. } | Event::SeqStart { tag, .. } | Event::Scalar { tag, .. } =
            &mut self
        {
            *tag = Some(set_tag.into());
        }
        self
    }

    /// Set the anchor label of a node event. Boundary events are returned unchanged.
    pub fn with_anchor(mut self, set_anchor: impl Into<String>) -> Self {
        if let Event::MapStart { anchor, .. }
        | Event::SeqStart { anchor, .. }
        | Event::Scalar { anchor, .. } = &mut self
        {
            *anchor = Some(set_anchor.into());
        }
        self
    }
}

/// Pull-based source of events with one-item lookahead.
pub trait Events {
    /// Pull the next event from the stream.
    ///
    /// Returns:
    /// - `Ok(Some(Event))` for a real event,
    /// - `Ok(None)` once the source is exhausted,
    /// - `Err(Error)` on tokenizer failure.
    fn next(&mut self) -> Result<Option<Event>, Error>;

    /// Peek at the next event without consuming it.
    fn peek(&mut self) -> Result<Option<&Event>, Error>;

    /// Last location that `next` or `peek` has observed.
    fn last_location(&self) -> Location;
}

/// Event source that replays a pre-recorded buffer.
pub struct ReplayEvents {
    last_location: Location,
    buf: VecDeque<Event>,
}

impl ReplayEvents {
    pub fn new(buf: Vec<Event>) -> Self {
        Self {
            last_location: buf.first().map_or(Location::UNKNOWN, Event::location),
            buf: VecDeque::from(buf),
        }
    }

    /// Number of events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }
}

impl Events for ReplayEvents {
    fn next(&mut self) -> Result<Option<Event>, Error> {
        let ev = self.buf.pop_front();
        if let Some(ev) = &ev {
            self.last_location = ev.location();
        }
        Ok(ev)
    }

    fn peek(&mut self) -> Result<Option<&Event>, Error> {
        if let Some(ev) = self.buf.front() {
            self.last_location = ev.location();
            Ok(Some(ev))
        } else {
            Ok(None)
        }
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

/// Pull the next event, which must exist.
pub(crate) fn next_event(ev: &mut dyn Events) -> Result<Event, Error> {
    match ev.next()? {
        Some(event) => Ok(event),
        None => Err(Error::eof().with_event_location(ev)),
    }
}

/// Pull the next event and require it to satisfy `accept`.
fn expect(
    ev: &mut dyn Events,
    expected: &'static str,
    accept: fn(&Event) -> bool,
) -> Result<Event, Error> {
    let event = next_event(ev)?;
    if accept(&event) {
        Ok(event)
    } else {
        Err(Error::structural(expected, event.describe()).with_location(event.location()))
    }
}

pub(crate) fn expect_map_start(ev: &mut dyn Events) -> Result<Location, Error> {
    expect(ev, "mapping start", |e| matches!(e, Event::MapStart { .. })).map(|e| e.location())
}

pub(crate) fn expect_map_end(ev: &mut dyn Events) -> Result<Location, Error> {
    expect(ev, "mapping end", |e| matches!(e, Event::MapEnd { .. })).map(|e| e.location())
}

pub(crate) fn expect_seq_start(ev: &mut dyn Events) -> Result<Location, Error> {
    expect(ev, "sequence start", |e| matches!(e, Event::SeqStart { .. })).map(|e| e.location())
}

pub(crate) fn expect_stream_start(ev: &mut dyn Events) -> Result<Location, Error> {
    expect(ev, "stream start", |e| matches!(e, Event::StreamStart { .. })).map(|e| e.location())
}

pub(crate) fn expect_document_end(ev: &mut dyn Events) -> Result<Location, Error> {
    expect(ev, "document end", |e| matches!(e, Event::DocumentEnd { .. })).map(|e| e.location())
}

/// Pull a scalar and return its text and location.
pub(crate) fn expect_scalar(
    ev: &mut dyn Events,
    expected: &'static str,
) -> Result<(String, Location), Error> {
    match next_event(ev)? {
        Event::Scalar {
            value, location, ..
        } => Ok((value, location)),
        other => Err(Error::structural(expected, other.describe()).with_location(other.location())),
    }
}

/// True if the next event closes a mapping. Does not consume it.
pub(crate) fn at_map_end(ev: &mut dyn Events) -> Result<bool, Error> {
    match ev.peek()? {
        Some(Event::MapEnd { .. }) => Ok(true),
        Some(_) => Ok(false),
        None => Err(Error::eof().with_event_location(ev)),
    }
}

/// True if the next event closes a sequence. Does not consume it.
pub(crate) fn at_seq_end(ev: &mut dyn Events) -> Result<bool, Error> {
    match ev.peek()? {
        Some(Event::SeqEnd { .. }) => Ok(true),
        Some(_) => Ok(false),
        None => Err(Error::eof().with_event_location(ev)),
    }
}

/// Consume a single node (scalar, sequence or mapping) including everything
/// nested inside it.
pub(crate) fn skip_node(ev: &mut dyn Events) -> Result<(), Error> {
    let mut depth: usize = match next_event(ev)? {
        Event::Scalar { .. } => return Ok(()),
        Event::SeqStart { .. } | Event::MapStart { .. } => 1,
        other => {
            return Err(Error::structural("node", other.describe()).with_location(other.location()));
        }
    };
    while depth != 0 {
        match next_event(ev)? {
            Event::SeqStart { .. } | Event::MapStart { .. } => depth += 1,
            Event::SeqEnd { .. } | Event::MapEnd { .. } => depth -= 1,
            Event::Scalar { .. } => {}
            other => {
                return Err(Error::structural("node content", other.describe())
                    .with_location(other.location()));
            }
        }
    }
    Ok(())
}
