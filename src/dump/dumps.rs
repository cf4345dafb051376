use std::cell::Cell;

use serde::{
    Serialize, Serializer,
    ser::{self, SerializeMap, SerializeSeq},
};

use crate::{
    error::EncodeError,
    guard::Guard,
    load::decoder,
    options::EncodeOptions,
    value::{Text, Value},
};

// Whole numbers in [I64_LOWER, I64_UPPER) are written as integer literals.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

type Failure = Cell<Option<EncodeError>>;

/// Writes `value` as JSON at the end of `output`. On error `output` is cut
/// back to its original length.
pub(crate) fn dumps(
    value: &Value,
    options: EncodeOptions,
    output: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let failure = Failure::default();
    let root = Encode {
        value,
        guard: Guard::new(options),
        failure: &failure,
    };

    let start = output.len();
    let result = if options.pretty {
        root.serialize(&mut serde_json::Serializer::pretty(&mut *output))
    } else {
        root.serialize(&mut serde_json::Serializer::new(&mut *output))
    };

    result.map_err(|err| {
        output.truncate(start);
        failure.take().unwrap_or_else(|| err.into())
    })
}

/// A value to encode at the guard's depth.
struct Encode<'a> {
    value: &'a Value,
    guard: Guard<EncodeOptions>,
    failure: &'a Failure,
}

impl<'a> Encode<'a> {
    #[inline]
    fn child(&self, value: &'a Value, guard: Guard<EncodeOptions>) -> Self {
        Self {
            value,
            guard: guard.nested(),
            failure: self.failure,
        }
    }

    fn fail<E: ser::Error>(&self, err: EncodeError) -> E {
        let error = E::custom(&err);
        self.failure.set(Some(err));
        error
    }

    fn text<E: ser::Error>(&self, text: &'a Text) -> Result<&'a str, E> {
        decoder::utf8(&text.bytes)
            .map_err(|offset| self.fail(EncodeError::InvalidUtf8 { offset }))
    }
}

impl Serialize for Encode<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let guard = self
            .guard
            .check()
            .map_err(|err| self.fail::<S::Error>(err.into()))?;

        match self.value {
            Value::Nil => serializer.serialize_unit(),
            Value::Boolean(bool) => serializer.serialize_bool(*bool),
            Value::Number(number) => match classify_number(*number) {
                Ok(Number::Int(int)) => serializer.serialize_i64(int),
                Ok(Number::Real(real)) => serializer.serialize_f64(real),
                Err(err) => Err(self.fail(err)),
            },
            Value::Text(text) => {
                if text.is_null_sentinel() {
                    serializer.serialize_unit()
                } else {
                    serializer.serialize_str(self.text::<S::Error>(text)?)
                }
            }
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item, guard))?;
                }
                seq.end()
            }
            Value::Mapping(table) => {
                let mut map = serializer.serialize_map(Some(table.len()))?;
                for (key, value) in table.slots() {
                    let key = match key {
                        Value::Nil => continue,
                        Value::Text(text) => text,
                        other => {
                            return Err(self.fail(EncodeError::InvalidKeyType {
                                found: other.kind_name().to_owned(),
                            }));
                        }
                    };
                    let value = self.child(value, guard);
                    // A `null` key becomes JSON null, which cannot key an
                    // object: the pair is dropped once its value checks out.
                    if key.is_null_sentinel() {
                        serde_json::to_value(&value)
                            .map_err(<S::Error as ser::Error>::custom)?;
                        continue;
                    }
                    map.serialize_entry(self.text::<S::Error>(key)?, &value)?;
                }
                map.end()
            }
            Value::Opaque(opaque) => Err(self.fail(EncodeError::UnsupportedType {
                kind: opaque.type_name.clone().into_owned(),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Real(f64),
}

fn classify_number(number: f64) -> Result<Number, EncodeError> {
    if !number.is_finite() {
        return Err(EncodeError::NonFiniteNumber(number));
    }
    if number.round() == number && (I64_LOWER..I64_UPPER).contains(&number) {
        return Ok(Number::Int(number as i64));
    }
    Ok(Number::Real(number))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::Table;

    fn to_json(value: &Value) -> Result<serde_json::Value, EncodeError> {
        let failure = Failure::default();
        let root = Encode {
            value,
            guard: Guard::new(EncodeOptions::default()),
            failure: &failure,
        };
        serde_json::to_value(&root)
            .map_err(|err| failure.take().unwrap_or_else(|| err.into()))
    }

    #[test]
    fn whole_numbers_become_integers() {
        assert_eq!(classify_number(3.0), Ok(Number::Int(3)));
        assert_eq!(classify_number(-0.0), Ok(Number::Int(0)));
        assert_eq!(
            classify_number(-1e18),
            Ok(Number::Int(-1_000_000_000_000_000_000))
        );
        assert_eq!(classify_number(I64_LOWER), Ok(Number::Int(i64::MIN)));
        assert_eq!(classify_number(1.5), Ok(Number::Real(1.5)));
    }

    #[test]
    fn whole_numbers_outside_i64_stay_real() {
        assert_eq!(classify_number(I64_UPPER), Ok(Number::Real(I64_UPPER)));
        assert_eq!(classify_number(1e300), Ok(Number::Real(1e300)));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert!(matches!(
            classify_number(f64::NAN),
            Err(EncodeError::NonFiniteNumber(_))
        ));
        assert_eq!(
            classify_number(f64::NEG_INFINITY),
            Err(EncodeError::NonFiniteNumber(f64::NEG_INFINITY))
        );
    }

    #[test]
    fn text_kinds_encode_alike() {
        for value in [
            Value::string("x"),
            Value::symbol("x"),
            Value::keyword("x"),
            Value::buffer("x"),
        ] {
            assert_eq!(to_json(&value), Ok(json!("x")));
        }
    }

    #[test]
    fn null_keys_drop_their_pair() {
        let table = Table::from_slots([
            (Value::keyword("null"), 1.into()),
            (Value::string("a"), Value::string("null")),
        ]);
        assert_eq!(to_json(&Value::Mapping(table)), Ok(json!({ "a": null })));
    }

    #[test]
    fn dropped_pair_values_are_still_checked() {
        let table =
            Table::from_slots([(Value::string("null"), Value::Number(f64::NAN))]);
        assert!(matches!(
            to_json(&Value::Mapping(table)),
            Err(EncodeError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn failed_dump_restores_output() {
        let mut output = b"[1,".to_vec();
        let value = Value::Sequence(vec![
            Value::string("ok"),
            Value::buffer(b"\xff".to_vec()),
        ]);
        assert_eq!(
            dumps(&value, EncodeOptions::default(), &mut output),
            Err(EncodeError::InvalidUtf8 { offset: 0 })
        );
        assert_eq!(output, b"[1,");
    }
}
