//! Decodable classes and their property tables.
//!
//! A class is decodable when it implements [`Decodable`]: it names itself
//! (the key of the outer wrapper mapping) and hands out a static table of
//! [`Property`] entries. Nothing is discovered at runtime; the
//! [`crate::Catalogue`] stores type-erased [`TypeDescriptor`]s built from that
//! table. Use [`crate::decodable!`] to declare a struct together with its
//! table.

use std::any::{Any, TypeId};
use std::fmt;

use crate::builder::{decode_boxed, Decoded};
use crate::error::Error;
use crate::events::Events;
use crate::options::Cfg;
use crate::value::{Value, ValueKind, ValueMismatch};

/// Writes a decoded value into one field.
pub type WriteFn<T> = fn(&mut T, Value) -> Result<(), ValueMismatch>;

/// Reaches the nested object stored under an `Object` property, if present.
pub type NestedFn<T> = fn(&mut T) -> Option<&mut dyn UnityObject>;

pub(crate) type DecodeFn =
    fn(&mut dyn Events, Cfg) -> Result<Option<Decoded<Box<dyn UnityObject>>>, Error>;

/// A class that can be decoded from its double-mapping form.
///
/// ```rust
/// use saphyr_unity::{Decodable, FromValue, Property, Value, ValueKind, ValueMismatch};
///
/// #[derive(Debug, Default)]
/// struct Marker {
///     label: String,
/// }
///
/// fn write_label(target: &mut Marker, value: Value) -> Result<(), ValueMismatch> {
///     target.label = String::from_value(value)?;
///     Ok(())
/// }
///
/// impl Decodable for Marker {
///     const CLASS_NAME: &'static str = "Marker";
///
///     fn properties() -> &'static [Property<Self>] {
///         const PROPERTIES: &[Property<Marker>] = &[Property {
///             name: "m_Label",
///             aliases: &[],
///             kind: ValueKind::Str,
///             write: Some(write_label),
///             nested: None,
///         }];
///         PROPERTIES
///     }
/// }
/// ```
pub trait Decodable: Default + fmt::Debug + 'static {
    /// Literal key of the outer wrapper mapping.
    const CLASS_NAME: &'static str;

    fn properties() -> &'static [Property<Self>];
}

/// One entry of a class property table.
pub struct Property<T: 'static> {
    /// Name as written in the file.
    pub name: &'static str,
    /// Alternative names accepted on input.
    pub aliases: &'static [&'static str],
    pub kind: ValueKind,
    /// `None` makes the property read-only: lookup ignores it and its value
    /// is skipped like an unknown one.
    pub write: Option<WriteFn<T>>,
    /// Set for `Object` properties so that deferred writes can reach into the
    /// nested instance after it has been stored.
    pub nested: Option<NestedFn<T>>,
}

impl<T: 'static> Property<T> {
    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.name,
            aliases: self.aliases,
            kind: self.kind,
            writable: self.write.is_some(),
        }
    }
}

impl<T: 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("kind", &self.kind)
            .field("writable", &self.write.is_some())
            .finish()
    }
}

/// Type-erased view of a [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ValueKind,
    pub writable: bool,
}

/// Resolve a property key to its index in the table.
///
/// Precedence: exact name, exact alias, and only with `case_insensitive`
/// an ASCII case-insensitive name, then alias. Read-only entries never match.
pub fn find_property<I>(properties: I, key: &str, case_insensitive: bool) -> Option<usize>
where
    I: Iterator<Item = PropertyDescriptor> + Clone,
{
    let writable = properties.enumerate().filter(|(_, p)| p.writable);

    let found = writable
        .clone()
        .find(|(_, p)| p.name == key)
        .or_else(|| writable.clone().find(|(_, p)| p.aliases.iter().any(|a| *a == key)));
    let found = match found {
        Some(hit) => Some(hit),
        None if case_insensitive => writable
            .clone()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(key))
            .or_else(|| {
                writable
                    .clone()
                    .find(|(_, p)| p.aliases.iter().any(|a| a.eq_ignore_ascii_case(key)))
            }),
        None => None,
    };
    found.map(|(index, _)| index)
}

/// Object-safe handle over any [`Decodable`] instance.
pub trait UnityObject: Any + fmt::Debug {
    fn class_name(&self) -> &'static str;

    /// Write `value` through the property at `index` of the class table.
    fn write_property(&mut self, index: usize, value: Value) -> Result<(), Error>;

    /// Nested object stored under the `Object` property at `index`.
    fn nested_mut(&mut self, index: usize) -> Option<&mut dyn UnityObject>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Decodable> UnityObject for T {
    fn class_name(&self) -> &'static str {
        T::CLASS_NAME
    }

    fn write_property(&mut self, index: usize, value: Value) -> Result<(), Error> {
        let property = T::properties().get(index).ok_or_else(|| {
            Error::msg(format!("class {} has no property #{index}", T::CLASS_NAME))
        })?;
        let write = property.write.ok_or_else(|| {
            Error::msg(format!("property {}.{} is read-only", T::CLASS_NAME, property.name))
        })?;
        write(self, value).map_err(|mismatch| Error::PropertyType {
            class: T::CLASS_NAME,
            property: property.name,
            expected: mismatch.expected,
            found: mismatch.found,
        })
    }

    fn nested_mut(&mut self, index: usize) -> Option<&mut dyn UnityObject> {
        let nested = T::properties().get(index)?.nested?;
        nested(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn UnityObject {
    pub fn is<T: Decodable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Decodable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Nested registered class used by [`ValueKind::Object`].
#[derive(Clone, Copy)]
pub struct ObjectKind {
    pub name: &'static str,
    decode: DecodeFn,
}

impl ObjectKind {
    pub const fn of<T: Decodable>() -> Self {
        Self {
            name: T::CLASS_NAME,
            decode: decode_boxed::<T>,
        }
    }

    pub(crate) fn decode(
        &self,
        ev: &mut dyn Events,
        cfg: Cfg,
    ) -> Result<Option<Decoded<Box<dyn UnityObject>>>, Error> {
        (self.decode)(ev, cfg)
    }
}

impl fmt::Debug for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectKind").field(&self.name).finish()
    }
}

/// Catalogue entry: the class name, its property table and its decoder.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: &'static str,
    type_id: TypeId,
    properties: Vec<PropertyDescriptor>,
    decode: DecodeFn,
}

impl TypeDescriptor {
    pub fn of<T: Decodable>() -> Self {
        Self {
            name: T::CLASS_NAME,
            type_id: TypeId::of::<T>(),
            properties: T::properties().iter().map(Property::descriptor).collect(),
            decode: decode_boxed::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Alias-aware lookup, see [`find_property`] for the precedence.
    pub fn property(&self, key: &str, case_insensitive: bool) -> Option<&PropertyDescriptor> {
        let index = find_property(self.properties.iter().copied(), key, case_insensitive)?;
        self.properties.get(index)
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn decode(
        &self,
        ev: &mut dyn Events,
        cfg: Cfg,
    ) -> Result<Option<Decoded<Box<dyn UnityObject>>>, Error> {
        (self.decode)(ev, cfg)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &'static str, aliases: &'static [&'static str], writable: bool) -> PropertyDescriptor {
        PropertyDescriptor {
            name,
            aliases,
            kind: ValueKind::Int,
            writable,
        }
    }

    #[test]
    fn exact_alias_beats_case_insensitive_name() {
        let table = [descriptor("m_speed", &[], true), descriptor("m_Velocity", &["m_Speed"], true)];
        assert_eq!(find_property(table.iter().copied(), "m_Speed", true), Some(1));
        assert_eq!(find_property(table.iter().copied(), "M_SPEED", true), Some(0));
        assert_eq!(find_property(table.iter().copied(), "M_SPEED", false), None);
    }

    #[test]
    fn read_only_entries_are_invisible() {
        let table = [descriptor("m_Id", &[], false), descriptor("m_Other", &["m_Id"], true)];
        assert_eq!(find_property(table.iter().copied(), "m_Id", false), Some(1));
    }
}
