//! Registry binding document tags to decodable classes.

use std::any::TypeId;
use std::collections::HashMap;

use crate::error::Error;
use crate::schema::{Decodable, PropertyDescriptor, TypeDescriptor};

/// Tag prefix Unity declares with `%TAG !u! tag:unity3d.com,2011:`.
pub const UNITY_TAG_PREFIX: &str = "tag:unity3d.com,2011:";

/// Full tag of a Unity class id, e.g. `tag:unity3d.com,2011:1` for `GameObject`.
pub fn unity_tag(class_id: u32) -> String {
    format!("{UNITY_TAG_PREFIX}{class_id}")
}

/// Tag to class bindings. At most one class per tag.
///
/// Built once before loading and only read while decoding, so one catalogue
/// can serve any number of loads.
///
/// ```rust
/// use saphyr_unity::{decodable, Catalogue};
///
/// decodable! {
///     pub struct Beacon as "Beacon" {
///         pub range: f32 => "m_Range": Float32,
///     }
/// }
///
/// let mut catalogue = Catalogue::new();
/// catalogue.register::<Beacon>("!beacon").unwrap();
/// assert_eq!(catalogue.resolve("!beacon").map(|t| t.name()), Some("Beacon"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    types: HashMap<String, TypeDescriptor>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `tag` to `T`.
    ///
    /// Binding a tag again to the same class is a no-op; binding it to another
    /// class fails with [`Error::DuplicateTag`] and leaves the catalogue
    /// unchanged.
    pub fn register<T: Decodable>(&mut self, tag: impl Into<String>) -> Result<&mut Self, Error> {
        let tag = tag.into();
        if let Some(existing) = self.types.get(&tag) {
            if existing.type_id() == TypeId::of::<T>() {
                return Ok(self);
            }
            return Err(Error::DuplicateTag {
                tag,
                existing: existing.name(),
                requested: T::CLASS_NAME,
            });
        }
        self.types.insert(tag, TypeDescriptor::of::<T>());
        Ok(self)
    }

    pub(crate) fn insert_descriptor(&mut self, tag: String, descriptor: TypeDescriptor) {
        self.types.insert(tag, descriptor);
    }

    /// Builder-style [`Catalogue::register`].
    pub fn with<T: Decodable>(mut self, tag: impl Into<String>) -> Result<Self, Error> {
        self.register::<T>(tag)?;
        Ok(self)
    }

    pub fn resolve(&self, tag: &str) -> Option<&TypeDescriptor> {
        self.types.get(tag)
    }

    /// Alias-aware property lookup on a registered class.
    pub fn property_for<'a>(
        &self,
        descriptor: &'a TypeDescriptor,
        name: &str,
        case_insensitive: bool,
    ) -> Option<&'a PropertyDescriptor> {
        descriptor.property(name, case_insensitive)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.types.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
