//! Object graph builder: decodes one class instance from its double mapping.
//!
//! A typed value is wrapped twice on the wire:
//!
//! ```yaml
//! Light:            # outer mapping, single key naming the class
//!   m_Enabled: 1    # inner mapping, the class properties
//!   m_Color: {r: 1, g: 0.95, b: 0.84, a: 1}
//! ```
//!
//! Both mappings must close back to back once the properties are exhausted.
//! Any other shape leaves the event cursor in an unknown place, so structural
//! errors abort the whole load.

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::component_list;
use crate::de::Deser;
use crate::error::{Error, Location};
use crate::events::{at_map_end, expect_map_end, expect_map_start, expect_scalar, skip_node, Event, Events};
use crate::options::{Cfg, Options};
use crate::parse_scalars::{coerce, ScalarKind};
use crate::resolve::Deferred;
use crate::schema::{find_property, Decodable, Property, UnityObject};
use crate::value::{FileRef, Node, ObjectRef, Value, ValueKind};

/// A decoded instance together with the reference writes still waiting for
/// their target.
#[derive(Debug)]
pub struct Decoded<T> {
    pub object: T,
    pub deferred: Vec<Deferred>,
}

/// Outcome of decoding one property value.
enum Slot {
    /// Final value, written at once.
    Ready(Value),
    /// Reference to the object with this file id, written after the load.
    Deferred(i64),
    /// Nested instance with its own pending writes.
    Nested(Decoded<Box<dyn UnityObject>>),
}

/// Decode one instance of `T` from the event stream.
///
/// Returns `Ok(None)` without consuming anything when the next node is not a
/// mapping: the value is not in double-mapping form and the caller may try
/// another strategy.
pub fn decode<T: Decodable>(
    ev: &mut dyn Events,
    options: &Options,
) -> Result<Option<Decoded<T>>, Error> {
    decode_object::<T>(ev, Cfg::from_options(options))
}

pub(crate) fn decode_boxed<T: Decodable>(
    ev: &mut dyn Events,
    cfg: Cfg,
) -> Result<Option<Decoded<Box<dyn UnityObject>>>, Error> {
    Ok(decode_object::<T>(ev, cfg)?.map(|decoded| Decoded {
        object: Box::new(decoded.object) as Box<dyn UnityObject>,
        deferred: decoded.deferred,
    }))
}

pub(crate) fn decode_object<T: Decodable>(
    ev: &mut dyn Events,
    cfg: Cfg,
) -> Result<Option<Decoded<T>>, Error> {
    match ev.peek()? {
        Some(Event::MapStart { .. }) => {}
        Some(_) => return Ok(None),
        None => return Err(Error::eof().with_event_location(ev)),
    }
    expect_map_start(ev)?;

    let (class, location) = expect_scalar(ev, "class name key")?;
    if class != T::CLASS_NAME {
        return Err(Error::ClassNameMismatch {
            expected: T::CLASS_NAME,
            found: class,
            location,
        });
    }

    let mut object = T::default();
    let mut deferred = Vec::new();

    expect_map_start(ev)?;
    while !at_map_end(ev)? {
        let (key, location) = expect_scalar(ev, "property name")?;
        let properties = T::properties();
        let Some(index) = find_property(
            properties.iter().map(Property::descriptor),
            &key,
            cfg.case_insensitive_properties,
        ) else {
            if !cfg.ignore_unmatched {
                return Err(Error::UnknownProperty {
                    class: T::CLASS_NAME,
                    property: key,
                    location,
                });
            }
            trace!(class = T::CLASS_NAME, property = %key, "skipping unmatched property");
            skip_node(ev)?;
            continue;
        };

        match decode_value(ev, properties[index].kind, cfg)? {
            Slot::Ready(value) => object.write_property(index, value)?,
            Slot::Deferred(file_id) => deferred.push(Deferred::new(index, file_id)),
            Slot::Nested(nested) => {
                object.write_property(index, Value::Object(nested.object))?;
                deferred.extend(nested.deferred.into_iter().map(|d| d.under(index)));
            }
        }
    }

    // Property mapping, then the wrapper.
    expect_map_end(ev)?;
    expect_map_end(ev)?;

    Ok(Some(Decoded { object, deferred }))
}

fn decode_value(ev: &mut dyn Events, kind: ValueKind, cfg: Cfg) -> Result<Slot, Error> {
    let value = match kind {
        ValueKind::Bool => scalar(ev, ScalarKind::Bool)?,
        ValueKind::Int => scalar(ev, ScalarKind::Int)?,
        ValueKind::Int32 => scalar(ev, ScalarKind::Int32)?,
        ValueKind::Float => scalar(ev, ScalarKind::Float)?,
        ValueKind::Float32 => scalar(ev, ScalarKind::Float32)?,
        ValueKind::Str => scalar(ev, ScalarKind::Str)?,
        ValueKind::Color => Value::Color(composite(ev)?),
        ValueKind::Vector3 => Value::Vector3(composite(ev)?),
        ValueKind::Quaternion => Value::Quaternion(composite(ev)?),
        ValueKind::Rect => Value::Rect(composite(ev)?),
        ValueKind::FileRef => Value::FileRef(composite(ev)?),
        ValueKind::FileRefs => Value::FileRefs(composite(ev)?),
        ValueKind::Reference => {
            let file_ref: FileRef = composite(ev)?;
            if file_ref.is_null() {
                Value::Reference(ObjectRef::default())
            } else {
                return Ok(Slot::Deferred(file_ref.file_id));
            }
        }
        ValueKind::ComponentList => Value::ComponentList(component_list::decode(ev)?),
        ValueKind::Node => Value::Node(composite::<Node>(ev)?),
        ValueKind::Object(object_kind) => {
            return match object_kind.decode(ev, cfg)? {
                Some(nested) => Ok(Slot::Nested(nested)),
                None => {
                    let (found, location) = match ev.peek()? {
                        Some(event) => (event.describe(), event.location()),
                        None => ("end of input".to_owned(), ev.last_location()),
                    };
                    Err(Error::structural("mapping start", found).with_location(location))
                }
            };
        }
    };
    Ok(Slot::Ready(value))
}

fn scalar(ev: &mut dyn Events, kind: ScalarKind) -> Result<Value, Error> {
    let (raw, location) = expect_scalar(ev, kind.name())?;
    coerce(&raw, kind).map_err(|e| e.with_location(location))
}

/// Drive a serde type from the next node, attaching the node location to
/// errors that have none (missing fields and the like).
fn composite<T: DeserializeOwned>(ev: &mut dyn Events) -> Result<T, Error> {
    let location = ev.peek()?.map_or(Location::UNKNOWN, Event::location);
    T::deserialize(Deser::new(ev)).map_err(|e| {
        if e.location().is_none() {
            e.with_location(location)
        } else {
            e
        }
    })
}
