use std::{cell::Cell, fmt};

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{
    error::DecodeError,
    guard::Guard,
    options::DecodeOptions,
    value::{Table, Text, TextKind, Value},
};

/// Slot for the first error raised by the walk itself. Parser errors cannot
/// carry it through, so it is recovered here once the parser unwinds.
type Failure = Cell<Option<DecodeError>>;

fn fail<E: de::Error>(failure: &Failure, err: DecodeError) -> E {
    let error = E::custom(&err);
    failure.set(Some(err));
    error
}

/// Parses `source` and converts it into a [`Value`] in one pass.
pub(crate) fn loads(source: &str, options: DecodeOptions) -> Result<Value, DecodeError> {
    let failure = Failure::default();
    let mut deserializer = serde_json::Deserializer::from_str(source);
    // Depth is bounded by the guard instead.
    deserializer.disable_recursion_limit();

    ValueSeed::new(options, &failure)
        .deserialize(&mut deserializer)
        .and_then(|value| deserializer.end().map(|()| value))
        .map_err(|err| failure.take().unwrap_or_else(|| err.into()))
}

/// Decodes one JSON value at the guard's depth. Used both as the seed and as
/// the visitor it hands to the parser.
#[derive(Clone, Copy)]
pub(crate) struct ValueSeed<'f> {
    guard: Guard<DecodeOptions>,
    failure: &'f Failure,
}

impl<'f> ValueSeed<'f> {
    pub(crate) fn new(options: DecodeOptions, failure: &'f Failure) -> Self {
        Self {
            guard: Guard::new(options),
            failure,
        }
    }

    #[inline]
    fn nested(self) -> Self {
        Self {
            guard: self.guard.nested(),
            failure: self.failure,
        }
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let guard = self
            .guard
            .check()
            .map_err(|err| fail::<D::Error>(self.failure, err.into()))?;
        deserializer.deserialize_any(ValueSeed {
            guard,
            failure: self.failure,
        })
    }
}

impl<'de> Visitor<'de> for ValueSeed<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        if self.guard.options().null_to_nil {
            Ok(Value::Nil)
        } else {
            Ok(Value::keyword("null"))
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        self.visit_unit()
    }

    fn visit_bool<E: de::Error>(self, bool: bool) -> Result<Value, E> {
        Ok(Value::Boolean(bool))
    }

    fn visit_i64<E: de::Error>(self, int: i64) -> Result<Value, E> {
        Ok(Value::Number(int as f64))
    }

    fn visit_u64<E: de::Error>(self, int: u64) -> Result<Value, E> {
        Ok(Value::Number(int as f64))
    }

    fn visit_f64<E: de::Error>(self, real: f64) -> Result<Value, E> {
        Ok(Value::Number(real))
    }

    fn visit_str<E: de::Error>(self, str: &str) -> Result<Value, E> {
        Ok(Value::string(str))
    }

    fn visit_string<E: de::Error>(self, string: String) -> Result<Value, E> {
        Ok(Value::string(string))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self.nested())? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let key_seed = KeySeed {
            kind: if self.guard.options().keyword_keys {
                TextKind::Keyword
            } else {
                TextKind::String
            },
            failure: self.failure,
        };

        let mut table = Table::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key_seed(key_seed)? {
            let value = map.next_value_seed(self.nested())?;
            // Storing nil deletes the key, as in the host's tables.
            if value.is_nil() {
                table.remove(&key);
            } else {
                table.insert(key, value);
            }
        }
        Ok(Value::Mapping(table))
    }
}

/// Decodes an object key into text of the configured kind.
#[derive(Clone, Copy)]
struct KeySeed<'f> {
    kind: TextKind,
    failure: &'f Failure,
}

impl KeySeed<'_> {
    fn reject<E: de::Error>(self, found: &'static str) -> E {
        fail(self.failure, DecodeError::InvalidKeyType { found })
    }
}

impl<'de> DeserializeSeed<'de> for KeySeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for KeySeed<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string object key")
    }

    fn visit_str<E: de::Error>(self, str: &str) -> Result<Value, E> {
        Ok(Value::Text(Text::new(str, self.kind)))
    }

    fn visit_string<E: de::Error>(self, string: String) -> Result<Value, E> {
        Ok(Value::Text(Text::new(string, self.kind)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Err(self.reject("null"))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Value, E> {
        Err(self.reject("boolean"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Value, E> {
        Err(self.reject("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Value, E> {
        Err(self.reject("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Value, E> {
        Err(self.reject("number"))
    }
}
