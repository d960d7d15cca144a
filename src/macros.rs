//! Public macros: option construction and class declarations.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let options = saphyr_unity::options! {
///     ignore_unmatched: false,
///     case_insensitive_properties: true,
/// };
/// assert!(!options.ignore_unmatched);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Declare a struct together with its [`crate::Decodable`] implementation.
///
/// Each field names the property key it is read from, optional aliases
/// separated by `|`, and the declared [`crate::ValueKind`]. `Object(T)`
/// properties must be stored as `Option<T>`. `Debug` and `Default` are
/// derived; add further derives as attributes.
///
/// ```rust
/// use saphyr_unity::{decodable, ObjectRef, Vector3};
///
/// decodable! {
///     #[derive(Clone)]
///     pub struct Waypoint as "Waypoint" {
///         pub position: Vector3 => "m_Position": Vector3,
///         pub next: ObjectRef => "m_Next": Reference,
///         pub name: String => "m_Name" | "name": Str,
///     }
/// }
///
/// use saphyr_unity::Decodable;
/// assert_eq!(Waypoint::CLASS_NAME, "Waypoint");
/// assert_eq!(Waypoint::properties()[2].aliases, &["name"]);
/// ```
#[macro_export]
macro_rules! decodable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $class:literal {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty => $prop:literal $(| $alias:literal)* : $kind:ident $(($obj:ty))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Decodable for $name {
            const CLASS_NAME: &'static str = $class;

            fn properties() -> &'static [$crate::Property<Self>] {
                const PROPERTIES: &[$crate::Property<$name>] = &[
                    $(
                        $crate::Property {
                            name: $prop,
                            aliases: &[$($alias),*],
                            kind: $crate::__decodable_kind!($kind $(($obj))?),
                            write: Some({
                                fn write(
                                    target: &mut $name,
                                    value: $crate::Value,
                                ) -> ::std::result::Result<(), $crate::ValueMismatch> {
                                    target.$field = $crate::FromValue::from_value(value)?;
                                    Ok(())
                                }
                                write as $crate::schema::WriteFn<$name>
                            }),
                            nested: $crate::__decodable_nested!($name, $field; $kind $(($obj))?),
                        },
                    )*
                ];
                PROPERTIES
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __decodable_kind {
    (Object($obj:ty)) => {
        $crate::ValueKind::Object($crate::ObjectKind::of::<$obj>())
    };
    ($kind:ident) => {
        $crate::ValueKind::$kind
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __decodable_nested {
    ($owner:ty, $field:ident; Object($obj:ty)) => {
        Some({
            fn nested(target: &mut $owner) -> ::std::option::Option<&mut dyn $crate::UnityObject> {
                match target.$field.as_mut() {
                    Some(object) => Some(object as &mut dyn $crate::UnityObject),
                    None => None,
                }
            }
            nested as $crate::schema::NestedFn<$owner>
        })
    };
    ($owner:ty, $field:ident; $kind:ident) => {
        None
    };
}
