//! Defines error and its location
use std::fmt;

use saphyr_parser::{ScanError, Span};
use serde::de;

use crate::budget::BudgetBreach;
use crate::events::Events;

/// Row/column location within the source YAML stream (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) row: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time,
    /// and by hand-built event streams that have no source text at all.
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    /// Create a new location record from 1-indexed coordinates.
    pub const fn new(row: usize, column: usize) -> Self {
        // Error reporting only; no scene file comes close to 4G lines.
        Self {
            row: row as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line number.
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// 1-indexed column number.
    pub fn column(&self) -> u64 {
        self.column as u64
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed `Location`.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

/// Everything that can abort a load.
///
/// Unknown document tags are deliberately absent: they are tallied in
/// [`crate::UnknownTagTally`], not raised.
#[derive(Debug)]
pub enum Error {
    /// Free-form error with optional source location.
    Message { msg: String, location: Location },
    /// Unexpected end of input.
    Eof { location: Location },
    /// An event of a different kind than the one the decoder requires was seen.
    /// The stream position can no longer be trusted after this.
    StructuralMismatch {
        expected: &'static str,
        found: String,
        location: Location,
    },
    /// The wrapper key of a double mapping does not name the expected class.
    ClassNameMismatch {
        expected: &'static str,
        found: String,
        location: Location,
    },
    /// Scalar text cannot be converted to the declared property type.
    UnsupportedScalarCoercion {
        value: String,
        target: &'static str,
        location: Location,
    },
    /// A property key has no counterpart on the class and unmatched
    /// properties are not ignored.
    UnknownProperty {
        class: &'static str,
        property: String,
        location: Location,
    },
    /// A decoded value does not fit the field its property writes to.
    PropertyType {
        class: &'static str,
        property: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// The same tag was registered for two different classes.
    DuplicateTag {
        tag: String,
        existing: &'static str,
        requested: &'static str,
    },
    /// A deferred value was resolved a second time.
    DeferredResolvedTwice { key: i64 },
    /// A YAML budget limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
    /// Reading the input failed.
    IOError { cause: std::io::Error },
    /// Fatal error raised while decoding a specific document.
    Document {
        index: usize,
        tag: Option<String>,
        error: Box<Error>,
    },
}

impl Error {
    /// Construct a `Message` error with no known location.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Structural mismatch: `expected` did not occur, `found` did instead.
    pub(crate) fn structural(expected: &'static str, found: impl Into<String>) -> Self {
        Error::StructuralMismatch {
            expected,
            found: found.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an unexpected end-of-input error with unknown location.
    pub(crate) fn eof() -> Self {
        Error::Eof {
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn coercion(value: impl Into<String>, target: &'static str) -> Self {
        Error::UnsupportedScalarCoercion {
            value: value.into(),
            target,
            location: Location::UNKNOWN,
        }
    }

    /// Attach/override a concrete location to this error and return it.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::Eof { location }
            | Error::StructuralMismatch { location, .. }
            | Error::ClassNameMismatch { location, .. }
            | Error::UnsupportedScalarCoercion { location, .. }
            | Error::UnknownProperty { location, .. }
            | Error::Budget { location, .. } => {
                *location = set_location;
            }
            // These errors do not carry a location of their own.
            Error::Document { .. }
            | Error::PropertyType { .. }
            | Error::DuplicateTag { .. }
            | Error::DeferredResolvedTwice { .. }
            | Error::IOError { .. } => {}
        }
        self
    }

    /// Attach the location the event source has last observed.
    pub(crate) fn with_event_location(self, events: &dyn Events) -> Self {
        self.with_location(events.last_location())
    }

    /// Wrap this error with the index and tag of the document it occurred in.
    pub(crate) fn in_document(self, index: usize, tag: Option<String>) -> Self {
        Error::Document {
            index,
            tag,
            error: Box::new(self),
        }
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::Eof { location }
            | Error::StructuralMismatch { location, .. }
            | Error::ClassNameMismatch { location, .. }
            | Error::UnsupportedScalarCoercion { location, .. }
            | Error::UnknownProperty { location, .. }
            | Error::Budget { location, .. } => {
                if location != &Location::UNKNOWN {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::Document { error, .. } => error.location(),
            Error::PropertyType { .. }
            | Error::DuplicateTag { .. }
            | Error::DeferredResolvedTwice { .. }
            | Error::IOError { .. } => None,
        }
    }

    /// The innermost error, looking through [`Error::Document`] wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Document { error, .. } => error.root_cause(),
            other => other,
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        let location = Location::new(mark.line(), mark.col() + 1);
        Error::Message {
            msg: err.info().to_owned(),
            location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::Eof { location } => fmt_with_location(f, "unexpected end of input", location),
            Error::StructuralMismatch {
                expected,
                found,
                location,
            } => fmt_with_location(
                f,
                &format!("structural mismatch: expected {expected}, found {found}"),
                location,
            ),
            Error::ClassNameMismatch {
                expected,
                found,
                location,
            } => fmt_with_location(
                f,
                &format!("key name {found} does not match class {expected}"),
                location,
            ),
            Error::UnsupportedScalarCoercion {
                value,
                target,
                location,
            } => fmt_with_location(
                f,
                &format!("cannot convert scalar `{value}` to {target}"),
                location,
            ),
            Error::UnknownProperty {
                class,
                property,
                location,
            } => fmt_with_location(
                f,
                &format!("class {class} has no property {property}"),
                location,
            ),
            Error::PropertyType {
                class,
                property,
                expected,
                found,
            } => write!(
                f,
                "property {class}.{property} expects {expected}, decoded {found}"
            ),
            Error::DuplicateTag {
                tag,
                existing,
                requested,
            } => write!(
                f,
                "tag {tag} is already bound to {existing}, cannot bind it to {requested}"
            ),
            Error::DeferredResolvedTwice { key } => {
                write!(f, "deferred value for file id {key} resolved twice")
            }
            Error::Budget { breach, location } => {
                fmt_with_location(f, &format!("YAML budget breached: {breach:?}"), location)
            }
            Error::IOError { cause } => write!(f, "IO error: {cause}"),
            Error::Document { index, tag, error } => match tag {
                Some(tag) => write!(f, "document {index} ({tag}): {error}"),
                None => write!(f, "document {index}: {error}"),
            },
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            Error::Document { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::IOError { cause }
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location != &Location::UNKNOWN {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.row, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}

/// Convert a budget breach report into a user-facing error.
pub(crate) fn budget_error(breach: BudgetBreach) -> Error {
    Error::Budget {
        breach,
        location: Location::UNKNOWN,
    }
}
