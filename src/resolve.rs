//! Deferred reference writes.
//!
//! A `{fileID: N}` reference may point at a document that comes later in the
//! stream. The builder does not wait for it: it records a [`Deferred`] write
//! and moves on. The loader subscribes every such write to the
//! [`DeferredValue`] of its file id, and once the stream is drained, resolves
//! each file id that matches a decoded document anchor. Writes land in
//! subscription order. A value nobody resolves leaves its fields at their
//! default.

use std::collections::HashMap;

use crate::error::Error;
use crate::loader::SceneObject;
use crate::schema::UnityObject;
use crate::value::{ObjectRef, Value};

/// A reference write recorded by the builder.
///
/// `path` holds the indices of the `Object` properties leading from the root
/// instance to the instance owning `property`; it is empty for properties of
/// the root itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub path: Vec<usize>,
    pub property: usize,
    pub key: i64,
}

impl Deferred {
    pub fn new(property: usize, key: i64) -> Self {
        Self {
            path: Vec::new(),
            property,
            key,
        }
    }

    /// Re-root this write one level up, below the `Object` property `index`.
    pub fn under(mut self, index: usize) -> Self {
        self.path.insert(0, index);
        self
    }
}

/// Where a resolved value must be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteTarget {
    /// Index into the decoded objects.
    pub object: usize,
    pub path: Vec<usize>,
    pub property: usize,
}

/// A value not known yet, with the writes waiting for it.
#[derive(Debug)]
pub struct DeferredValue {
    key: i64,
    waiters: Vec<WriteTarget>,
    resolved: bool,
}

impl DeferredValue {
    pub fn new(key: i64) -> Self {
        Self {
            key,
            waiters: Vec::new(),
            resolved: false,
        }
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn subscribe(&mut self, target: WriteTarget) {
        self.waiters.push(target);
    }

    /// Number of writes still waiting.
    pub fn pending(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Perform every waiting write in subscription order, then forget them.
    /// Returns the number of writes performed.
    pub fn resolve(&mut self, value: ObjectRef, objects: &mut [SceneObject]) -> Result<usize, Error> {
        if self.resolved {
            return Err(Error::DeferredResolvedTwice { key: self.key });
        }
        self.resolved = true;
        let waiters = std::mem::take(&mut self.waiters);
        for target in &waiters {
            write_target(objects, target, value)?;
        }
        Ok(waiters.len())
    }
}

/// All deferred values of one load, in first-registration order.
#[derive(Debug, Default)]
pub struct Resolver {
    values: Vec<DeferredValue>,
    by_key: HashMap<i64, usize>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deferred value for `key`, created on first use.
    pub fn deferred(&mut self, key: i64) -> &mut DeferredValue {
        let index = *self.by_key.entry(key).or_insert_with(|| {
            self.values.push(DeferredValue::new(key));
            self.values.len() - 1
        });
        &mut self.values[index]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes still waiting across all values.
    pub fn pending(&self) -> usize {
        self.values.iter().map(DeferredValue::pending).sum()
    }

    /// Resolve every value whose key matches the file id of a decoded object.
    /// When two objects share a file id, the first one wins. Returns the
    /// number of writes left unresolved.
    pub fn resolve_all(&mut self, objects: &mut [SceneObject]) -> Result<usize, Error> {
        let mut anchors: HashMap<i64, usize> = HashMap::new();
        for (index, object) in objects.iter().enumerate() {
            if let Some(file_id) = object.file_id {
                anchors.entry(file_id).or_insert(index);
            }
        }

        let mut unresolved = 0;
        for value in &mut self.values {
            if value.is_resolved() {
                continue;
            }
            match anchors.get(&value.key()) {
                Some(&index) => {
                    let target = ObjectRef {
                        file_id: value.key(),
                        target: Some(index),
                    };
                    value.resolve(target, objects)?;
                }
                None => unresolved += value.pending(),
            }
        }
        Ok(unresolved)
    }
}

fn write_target(objects: &mut [SceneObject], target: &WriteTarget, value: ObjectRef) -> Result<(), Error> {
    let root = objects
        .get_mut(target.object)
        .ok_or_else(|| Error::msg(format!("no decoded object #{}", target.object)))?;
    let mut object: &mut dyn UnityObject = root.object.as_mut();
    for &step in &target.path {
        let class = object.class_name();
        object = object
            .nested_mut(step)
            .ok_or_else(|| Error::msg(format!("{class} has no nested object under property #{step}")))?;
    }
    object.write_property(target.property, Value::Reference(value))
}
