//! Decoded property values and the fixed composite types of scene files.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;

use crate::component_list::ComponentList;
use crate::parse_scalars::narrow_f64;
use crate::schema::{Decodable, ObjectKind, UnityObject};

/// Declared semantic type of a property.
#[derive(Clone, Copy, Debug)]
pub enum ValueKind {
    Bool,
    Int,
    /// Integer checked against the 32-bit range while coercing.
    Int32,
    Float,
    /// Float checked against the single-precision range while coercing.
    Float32,
    Str,
    /// `{r, g, b, a}` mapping.
    Color,
    /// `{x, y, z}` mapping.
    Vector3,
    /// `{x, y, z, w}` mapping.
    Quaternion,
    /// `{x, y, width, height}` mapping.
    Rect,
    /// `{fileID: N}` kept as written, never resolved.
    FileRef,
    /// Sequence of `{fileID: N}` mappings kept as written.
    FileRefs,
    /// `{fileID: N}` resolved against the decoded documents after the load.
    Reference,
    /// `[{<type id>: {fileID: <object id>}}, ...]`.
    ComponentList,
    /// Any node, kept as a generic tree.
    Node,
    /// A nested registered class in its own double mapping.
    Object(ObjectKind),
}

/// A decoded property value, ready to be written into an object.
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Color(Color),
    Vector3(Vector3),
    Quaternion(Quaternion),
    Rect(Rect),
    FileRef(FileRef),
    FileRefs(Vec<FileRef>),
    Reference(ObjectRef),
    ComponentList(ComponentList),
    Node(Node),
    Object(Box<dyn UnityObject>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Color(_) => "color",
            Value::Vector3(_) => "vector3",
            Value::Quaternion(_) => "quaternion",
            Value::Rect(_) => "rect",
            Value::FileRef(_) => "file reference",
            Value::FileRefs(_) => "file reference list",
            Value::Reference(_) => "object reference",
            Value::ComponentList(_) => "component list",
            Value::Node(_) => "node",
            Value::Object(object) => object.class_name(),
        }
    }
}

/// A value did not fit the field it was written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Conversion from a decoded [`Value`] into a concrete field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueMismatch>;
}

macro_rules! from_value {
    ($($ty:ty => $variant:ident as $expected:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ValueMismatch {
                            expected: $expected,
                            found: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

from_value! {
    bool => Bool as "bool",
    i64 => Int as "integer",
    f64 => Float as "float",
    String => Str as "string",
    Color => Color as "color",
    Vector3 => Vector3 as "vector3",
    Quaternion => Quaternion as "quaternion",
    Rect => Rect as "rect",
    FileRef => FileRef as "file reference",
    Vec<FileRef> => FileRefs as "file reference list",
    ObjectRef => Reference as "object reference",
    ComponentList => ComponentList as "component list",
    Node => Node as "node",
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| ValueMismatch {
            expected: "32-bit integer",
            found: "integer out of range",
        })
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        let wide = f64::from_value(value)?;
        narrow_f64(wide).ok_or(ValueMismatch {
            expected: "32-bit float",
            found: "float out of range",
        })
    }
}

impl<T: Decodable> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        let found = value.type_name();
        match value {
            Value::Object(object) => object
                .into_any()
                .downcast::<T>()
                .map(|boxed| Some(*boxed))
                .map_err(|_| ValueMismatch {
                    expected: T::CLASS_NAME,
                    found,
                }),
            _ => Err(ValueMismatch {
                expected: T::CLASS_NAME,
                found,
            }),
        }
    }
}

/// RGBA color, components usually in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, serde::Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    /// Identity rotation.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A `{fileID: N}` reference as written in the file. `guid` and `type` are
/// present for references into other assets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct FileRef {
    #[serde(rename = "fileID")]
    pub file_id: i64,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default, rename = "type")]
    pub asset_type: Option<i64>,
}

impl FileRef {
    pub fn is_null(&self) -> bool {
        self.file_id == 0
    }
}

/// Reference to another object of the same stream.
///
/// `target` is the index of the referenced object in [`crate::Scene::objects`]
/// once resolved. A reference that was never resolved keeps the default
/// (file id 0, no target).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub file_id: i64,
    pub target: Option<usize>,
}

impl ObjectRef {
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// A node of any shape, kept as a generic tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Scalar(String::new())
    }
}

impl Node {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Value under a scalar key, for mapping nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = Node;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("any YAML node")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
                Ok(Node::Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
                Ok(Node::Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
                Ok(Node::Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
                Ok(Node::Scalar(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
                Ok(Node::Scalar(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
                Ok(Node::Scalar(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
                Ok(Node::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Node, E> {
                Ok(Node::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Node::Sequence(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Node::Mapping(entries))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}
