//!
//! Live events: a thin layer over the YAML event stream from `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Translate parser events into owned [`Event`]s, keeping stream and
//!   document boundaries.
//! - Render tags as `handle + suffix`, so a `%TAG !u! tag:unity3d.com,2011:`
//!   directive turns `!u!104` into `tag:unity3d.com,2011:104`. Tag directives
//!   stay in force for the rest of the stream.
//! - Recover the anchor label of each document's root node from the
//!   document header line. The parser numbers anchors and forgets their text,
//!   but Unity writes the object's file id there (`--- !u!104 &2`).
//! - Track source locations and enforce the optional [`Budget`].
//!
//! Aliases never occur in scene files and are rejected.

use std::borrow::Cow;

use saphyr_parser::{Event as RawEvent, Parser, StrInput};

use crate::budget::{Budget, BudgetEnforcer, BudgetReport};
use crate::error::{budget_error, location_from_span, Error, Location};
use crate::events::{Event, Events};

/// Live event source that wraps `saphyr_parser::Parser`.
pub struct LiveEvents<'a> {
    /// Underlying streaming parser that produces raw events from the input.
    parser: Parser<'a, StrInput<'a>>,
    /// Source text, kept for document header lookups.
    source: &'a str,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
    /// Single-item lookahead buffer (peeked event not yet consumed).
    look: Option<Event>,
    /// Container depth inside the current document; 0 means the next node is the root.
    depth: usize,
    /// Anchor label read from the current document's header line, until the root claims it.
    header_anchor: Option<String>,
    budget: Option<BudgetEnforcer>,
    /// Location of the last yielded event (for error reporting).
    last_location: Location,
}

impl<'a> LiveEvents<'a> {
    /// Create a new live event source over `input`.
    ///
    /// The input should already have gone through [`strip_header_suffixes`]
    /// if it may contain Unity's `stripped` document markers.
    pub fn new(input: &'a str, budget: Option<Budget>) -> Self {
        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            // Unity declares `%TAG !u!` once, before the first document only.
            parser: Parser::new_from_str(input).keep_tags(true),
            source: input,
            line_starts,
            look: None,
            depth: 0,
            header_anchor: None,
            budget: budget.map(BudgetEnforcer::new),
            last_location: Location::UNKNOWN,
        }
    }

    /// Text of the given 1-indexed line, without its line terminator.
    fn line(&self, row: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(row.checked_sub(1)?)?;
        let rest = self.source.get(start..)?;
        Some(rest.split('\n').next().unwrap_or(rest).trim_end_matches('\r'))
    }

    /// Anchor label for a node event: only a root node can claim the header's label.
    fn node_anchor(&mut self, anchor_id: usize) -> Option<String> {
        if self.depth == 0 {
            let label = self.header_anchor.take();
            if anchor_id != 0 { label } else { None }
        } else {
            None
        }
    }

    /// Core event pump: pulls and translates the next parser event.
    fn next_impl(&mut self) -> Result<Option<Event>, Error> {
        while let Some(item) = self.parser.next() {
            let (raw, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);

            let ev = match raw {
                RawEvent::Nothing => continue,
                RawEvent::StreamStart => Event::StreamStart { location },
                RawEvent::StreamEnd => Event::StreamEnd { location },
                RawEvent::DocumentStart(_explicit) => {
                    self.depth = 0;
                    self.header_anchor = self
                        .line(location.line() as usize)
                        .and_then(header_anchor)
                        .map(str::to_owned);
                    Event::DocumentStart { location }
                }
                RawEvent::DocumentEnd => {
                    self.header_anchor = None;
                    Event::DocumentEnd { location }
                }
                RawEvent::Alias(_) => {
                    return Err(
                        Error::msg("aliases are not supported in scene streams").with_location(location)
                    );
                }
                RawEvent::Scalar(value, _style, anchor_id, tag) => Event::Scalar {
                    // A missing value (`m_Name:`) comes back as `~` with an empty span.
                    value: if span.start.index() == span.end.index() {
                        String::new()
                    } else {
                        value.into_owned()
                    },
                    tag: tag.map(|t| format!("{}{}", t.handle, t.suffix)),
                    anchor: self.node_anchor(anchor_id),
                    location,
                },
                RawEvent::SequenceStart(anchor_id, tag) => {
                    let anchor = self.node_anchor(anchor_id);
                    self.depth += 1;
                    Event::SeqStart {
                        tag: tag.map(|t| format!("{}{}", t.handle, t.suffix)),
                        anchor,
                        location,
                    }
                }
                RawEvent::MappingStart(anchor_id, tag) => {
                    let anchor = self.node_anchor(anchor_id);
                    self.depth += 1;
                    Event::MapStart {
                        tag: tag.map(|t| format!("{}{}", t.handle, t.suffix)),
                        anchor,
                        location,
                    }
                }
                RawEvent::SequenceEnd => {
                    self.depth = self.depth.saturating_sub(1);
                    Event::SeqEnd { location }
                }
                RawEvent::MappingEnd => {
                    self.depth = self.depth.saturating_sub(1);
                    Event::MapEnd { location }
                }
            };

            if let Some(budget) = self.budget.as_mut() {
                budget
                    .observe(&ev)
                    .map_err(|breach| budget_error(breach).with_location(location))?;
            }
            self.last_location = location;
            return Ok(Some(ev));
        }
        Ok(None)
    }

    /// Budget counters observed so far, if a budget is enforced.
    pub fn budget_report(&self) -> Option<BudgetReport> {
        self.budget.as_ref().map(|budget| budget.report().clone())
    }

    /// Finalize the stream: report a budget breach detected at the end, if any.
    pub fn finish(&mut self) -> Result<(), Error> {
        if let Some(budget) = self.budget.take() {
            budget
                .finalize()
                .map_err(|breach| budget_error(breach).with_location(self.last_location))?;
        }
        Ok(())
    }
}

impl<'a> Events for LiveEvents<'a> {
    fn next(&mut self) -> Result<Option<Event>, Error> {
        if let Some(ev) = self.look.take() {
            self.last_location = ev.location();
            return Ok(Some(ev));
        }
        self.next_impl()
    }

    fn peek(&mut self) -> Result<Option<&Event>, Error> {
        if self.look.is_none() {
            self.look = self.next_impl()?;
        }
        Ok(self.look.as_ref())
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}

/// Anchor label written on a `---` document header line, e.g. `2` in
/// `--- !u!104 &2`.
pub(crate) fn header_anchor(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "---" {
        return None;
    }
    for token in tokens {
        if let Some(label) = token.strip_prefix('&') {
            return (!label.is_empty()).then_some(label);
        }
        if !token.starts_with('!') {
            break;
        }
    }
    None
}

/// Remove Unity's non-standard ` stripped` suffix from document header lines.
///
/// Prefab instances in scene files are written as `--- !u!4 &400 stripped`,
/// which no YAML parser accepts. Line structure is preserved so that
/// reported locations still match the original text.
pub fn strip_header_suffixes(input: &str) -> Cow<'_, str> {
    if !input.contains(" stripped") {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let eol = &line[body.len()..];
        match body
            .strip_suffix(" stripped")
            .filter(|head| head.starts_with("--- "))
        {
            Some(head) => {
                out.push_str(head);
                out.push_str(eol);
            }
            None => out.push_str(line),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_anchor_reads_label_after_tag() {
        assert_eq!(header_anchor("--- !u!104 &2"), Some("2"));
        assert_eq!(header_anchor("--- &7"), Some("7"));
        assert_eq!(header_anchor("--- !u!1"), None);
        assert_eq!(header_anchor("GameObject:"), None);
        assert_eq!(header_anchor("--- text &5"), None);
    }

    #[test]
    fn stripped_suffix_is_removed_from_headers_only() {
        let input = "--- !u!4 &400 stripped\r\nm_Name: stripped\n--- !u!1 &5\n";
        let out = strip_header_suffixes(input);
        assert_eq!(out, "--- !u!4 &400\r\nm_Name: stripped\n--- !u!1 &5\n");
    }

    #[test]
    fn input_without_stripped_is_borrowed() {
        assert!(matches!(strip_header_suffixes("a: 1\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn root_anchor_and_tag_are_recovered() {
        let yaml = "%TAG !u! tag:unity3d.com,2011:\n--- !u!104 &2\nRenderSettings:\n  m_Fog: 0\n";
        let mut ev = LiveEvents::new(yaml, None);
        let mut root = None;
        while let Some(event) = ev.next().unwrap() {
            if let Event::MapStart { .. } = event {
                root = Some(event);
                break;
            }
        }
        let root = root.expect("root mapping");
        assert_eq!(root.tag(), Some("tag:unity3d.com,2011:104"));
        assert_eq!(root.anchor(), Some("2"));
    }

    #[test]
    fn tag_directive_applies_to_later_documents() {
        let yaml = "%TAG !u! tag:unity3d.com,2011:\n--- !u!1 &1\nA: {}\n--- !u!4 &2\nB: {}\n";
        let mut ev = LiveEvents::new(yaml, None);
        let mut tags = Vec::new();
        while let Some(event) = ev.next().unwrap() {
            if let Some(tag) = event.tag() {
                tags.push(tag.to_owned());
            }
        }
        assert_eq!(tags, vec!["tag:unity3d.com,2011:1", "tag:unity3d.com,2011:4"]);
    }

    #[test]
    fn missing_value_is_empty_text() {
        let mut ev = LiveEvents::new("a:\nb: ~\n", None);
        let mut scalars = Vec::new();
        while let Some(event) = ev.next().unwrap() {
            if let Event::Scalar { value, .. } = event {
                scalars.push(value);
            }
        }
        assert_eq!(scalars, vec!["a", "", "b", "~"]);
    }

    #[test]
    fn aliases_are_rejected() {
        let mut ev = LiveEvents::new("a: &x 1\nb: *x\n", None);
        let mut result = Ok(());
        loop {
            match ev.next() {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        assert!(result.is_err());
    }
}
