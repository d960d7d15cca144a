//! Serde deserializer over the event stream.
//!
//! Composite property values (colors, vectors, file references, generic nodes)
//! are plain serde types; this module drives their `Deserialize` impls straight
//! from [`Events`]. Scalars follow the scene coercion rules of
//! [`crate::parse_scalars`], so `bool` fields accept `0` and `1`.

use serde::de::{self, Visitor};

use crate::error::{Error, Location};
use crate::events::{at_map_end, at_seq_end, expect_map_start, expect_seq_start, next_event, skip_node, Event, Events};
use crate::parse_scalars::{parse_bool, parse_f32, parse_float, parse_int};

/// Scalars treated as null by `Option` and unit targets.
fn scalar_is_nullish(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

/// The streaming Serde deserializer over `Events`.
///
/// Borrows the event source and forwards requests into it, translating the
/// structural events into Serde visitor calls. A fresh `Deser` is created for
/// every nested value.
pub(crate) struct Deser<'e> {
    ev: &'e mut dyn Events,
}

impl<'e> Deser<'e> {
    pub(crate) fn new(ev: &'e mut dyn Events) -> Self {
        Self { ev }
    }

    /// Consume the next scalar event and return `(value, location)`.
    fn take_scalar(&mut self) -> Result<(String, Location), Error> {
        match next_event(self.ev)? {
            Event::Scalar {
                value, location, ..
            } => Ok((value, location)),
            other => Err(Error::structural("scalar", other.describe()).with_location(other.location())),
        }
    }

    /// Parse an integer scalar and narrow it to the requested width.
    fn take_int<T: TryFrom<i64>>(&mut self, target: &'static str) -> Result<T, Error> {
        let (s, location) = self.take_scalar()?;
        let wide = parse_int(&s).map_err(|e| e.with_location(location))?;
        T::try_from(wide).map_err(|_| Error::coercion(s, target).with_location(location))
    }
}

impl<'de, 'e> de::Deserializer<'de> for Deser<'e> {
    type Error = Error;

    /// Scalars are handed over as strings; containers delegate to
    /// `deserialize_seq` / `deserialize_map`.
    fn deserialize_any<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.ev.peek()? {
            Some(Event::Scalar { .. }) => {
                let (s, _) = self.take_scalar()?;
                visitor.visit_string(s)
            }
            Some(Event::SeqStart { .. }) => self.deserialize_seq(visitor),
            Some(Event::MapStart { .. }) => self.deserialize_map(visitor),
            Some(other) => {
                Err(Error::structural("node", other.describe()).with_location(other.location()))
            }
            None => Err(Error::eof().with_event_location(self.ev)),
        }
    }

    /// Integer-as-boolean, then `true` / `false`.
    fn deserialize_bool<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, location) = self.take_scalar()?;
        let b = parse_bool(&s).map_err(|e| e.with_location(location))?;
        visitor.visit_bool(b)
    }

    fn deserialize_i8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i8(self.take_int("i8")?)
    }

    fn deserialize_i16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i16(self.take_int("i16")?)
    }

    fn deserialize_i32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i32(self.take_int("i32")?)
    }

    fn deserialize_i64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_i64(self.take_int("i64")?)
    }

    fn deserialize_u8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u8(self.take_int("u8")?)
    }

    fn deserialize_u16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u16(self.take_int("u16")?)
    }

    fn deserialize_u32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u32(self.take_int("u32")?)
    }

    /// Unsigned values above `i64::MAX` are not representable in scene files.
    fn deserialize_u64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_u64(self.take_int("u64")?)
    }

    fn deserialize_f32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, location) = self.take_scalar()?;
        let v = parse_f32(&s).map_err(|e| e.with_location(location))?;
        visitor.visit_f32(v)
    }

    fn deserialize_f64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, location) = self.take_scalar()?;
        let v = parse_float(&s).map_err(|e| e.with_location(location))?;
        visitor.visit_f64(v)
    }

    fn deserialize_char<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, location) = self.take_scalar()?;
        let mut it = s.chars();
        match (it.next(), it.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::coercion(s, "char").with_location(location)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, _) = self.take_scalar()?;
        visitor.visit_string(s)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(Error::msg("byte arrays are not supported in scene files").with_event_location(self.ev))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    /// A null-like scalar or an absent value (container end) is `None`.
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let nullish = match self.ev.peek()? {
            Some(Event::MapEnd { .. }) | Some(Event::SeqEnd { .. }) => return visitor.visit_none(),
            Some(Event::Scalar { value, .. }) => scalar_is_nullish(value),
            Some(_) => false,
            None => return Err(Error::eof().with_event_location(self.ev)),
        };
        if nullish {
            let _ = self.ev.next()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
        let (s, location) = self.take_scalar()?;
        if scalar_is_nullish(&s) {
            visitor.visit_unit()
        } else {
            Err(Error::coercion(s, "unit").with_location(location))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        expect_seq_start(self.ev)?;

        /// Streaming `SeqAccess` over the underlying `Events`.
        struct SA<'e> {
            ev: &'e mut dyn Events,
        }

        impl<'de, 'e> de::SeqAccess<'de> for SA<'e> {
            type Error = Error;

            fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Error>
            where
                T: de::DeserializeSeed<'de>,
            {
                if at_seq_end(self.ev)? {
                    return Ok(None);
                }
                seed.deserialize(Deser::new(self.ev)).map(Some)
            }
        }

        let result = visitor.visit_seq(SA { ev: &mut *self.ev })?;
        // Drop elements the visitor did not ask for (fixed-size tuples).
        while !at_seq_end(self.ev)? {
            skip_node(self.ev)?;
        }
        let _ = self.ev.next()?;
        Ok(result)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    /// Stream mapping pairs to the visitor. Keys are deserialized like any
    /// other node, so scalar keys reach field identifiers as strings.
    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        expect_map_start(self.ev)?;

        struct MA<'e> {
            ev: &'e mut dyn Events,
            done: bool,
        }

        impl<'de, 'e> de::MapAccess<'de> for MA<'e> {
            type Error = Error;

            fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Error>
            where
                K: de::DeserializeSeed<'de>,
            {
                if at_map_end(self.ev)? {
                    let _ = self.ev.next()?;
                    self.done = true;
                    return Ok(None);
                }
                seed.deserialize(Deser::new(self.ev)).map(Some)
            }

            fn next_value_seed<Vv>(&mut self, seed: Vv) -> Result<Vv::Value, Error>
            where
                Vv: de::DeserializeSeed<'de>,
            {
                seed.deserialize(Deser::new(self.ev))
            }
        }

        let mut access = MA {
            ev: &mut *self.ev,
            done: false,
        };
        let result = visitor.visit_map(&mut access)?;
        if !access.done {
            while !at_map_end(self.ev)? {
                skip_node(self.ev)?;
                skip_node(self.ev)?;
            }
            let _ = self.ev.next()?;
        }
        Ok(result)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_map(visitor)
    }

    /// Scene composites carry no enums; any request for one is a shape error.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let (found, location) = match self.ev.peek()? {
            Some(event) => (event.describe(), event.location()),
            None => ("end of input".to_owned(), self.ev.last_location()),
        };
        Err(Error::msg(format!("enum `{name}` is not supported in scene files, found {found}"))
            .with_location(location))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_string(visitor)
    }

    /// Skip the whole node without looking at it.
    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        skip_node(self.ev)?;
        visitor.visit_unit()
    }
}
