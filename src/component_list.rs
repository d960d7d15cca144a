//! Component-reference lists.
//!
//! A game object lists its components as a sequence of single-entry
//! mappings, each pairing a class id with the file id of the component:
//!
//! ```yaml
//! m_Component:
//! - 4: {fileID: 400}
//! - 33: {fileID: 3300}
//! ```
//!
//! The shape is fixed, so it is decoded event by event instead of through
//! serde. Newer scenes write `- component: {fileID: 400}`; ids that are not
//! integers read as 0.

use tracing::trace;

use crate::error::Error;
use crate::events::{
    at_seq_end, expect_map_end, expect_map_start, expect_scalar, expect_seq_start, next_event,
    Events,
};
use crate::parse_scalars::parse_int;

/// Class id to object id, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentList {
    entries: Vec<(i64, i64)>,
}

impl ComponentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `type_id` to `object_id`. A type id seen before keeps its
    /// position and takes the new object id.
    pub fn insert(&mut self, type_id: i64, object_id: i64) {
        match self.entries.iter_mut().find(|(t, _)| *t == type_id) {
            Some(entry) => entry.1 = object_id,
            None => self.entries.push((type_id, object_id)),
        }
    }

    pub fn get(&self, type_id: i64) -> Option<i64> {
        self.entries
            .iter()
            .find(|(t, _)| *t == type_id)
            .map(|(_, o)| *o)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i64, i64)> for ComponentList {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        let mut list = ComponentList::new();
        for (type_id, object_id) in iter {
            list.insert(type_id, object_id);
        }
        list
    }
}

/// Decode `[{<type id>: {<key>: <object id>}}, ...]`.
///
/// The inner key (`fileID` in practice) is read but not checked. Any event
/// out of place is a [`Error::StructuralMismatch`]; the id scalars themselves
/// never fail.
pub fn decode(ev: &mut dyn Events) -> Result<ComponentList, Error> {
    expect_seq_start(ev)?;
    let mut list = ComponentList::new();
    while !at_seq_end(ev)? {
        expect_map_start(ev)?;
        let type_id = integer(ev, "component type id")?;
        expect_map_start(ev)?;
        expect_scalar(ev, "object id key")?;
        let object_id = integer(ev, "component object id")?;
        expect_map_end(ev)?;
        expect_map_end(ev)?;
        list.insert(type_id, object_id);
    }
    next_event(ev)?;
    Ok(list)
}

fn integer(ev: &mut dyn Events, expected: &'static str) -> Result<i64, Error> {
    let (raw, location) = expect_scalar(ev, expected)?;
    Ok(parse_int(&raw).unwrap_or_else(|_| {
        trace!(raw = %raw, line = location.line(), "{expected} is not an integer, using 0");
        0
    }))
}
