//! Bidirectional mapping between native JSON values and wire attribute values.
//!
//! `encode` and `decode` are mutual inverses over the supported tag set:
//! strings, numbers, booleans, non-empty homogeneous string/number arrays,
//! nested objects, and arrays of objects. Binary (`B`/`BS`) and explicit
//! `NULL` wire values are outside that set and are rejected with a typed
//! error. Numbers cross the wire as decimal text, never as binary floats.

use std::collections::HashMap;

use serde_json::{Map, Value};

use dynabridge_model::AttributeValue;

/// Errors raised while translating between native and wire values.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// A native or wire value has no representation in the supported tag set.
    #[error("unsupported value type {descriptor}")]
    UnsupportedType {
        /// The wire tag or a description of the offending native shape.
        descriptor: String,
    },
    /// A set or list mixes element types.
    #[error("array elements must all be {expected}")]
    MixedArray {
        /// The element kind fixed by the array's first element.
        expected: &'static str,
    },
    /// An empty array carries no element type to pick a set tag from.
    #[error("empty arrays carry no element type and cannot be encoded")]
    EmptyArray,
    /// A wire number did not parse as decimal text.
    #[error("invalid number literal '{text}'")]
    InvalidNumber {
        /// The offending literal.
        text: String,
    },
}

/// How [`Marshaller::encode_value`] treats empty native arrays.
///
/// An empty array has no first element to dictate a set tag, so the choice
/// of wire type is arbitrary. The default refuses to choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyArrayPolicy {
    /// Fail with [`MarshalError::EmptyArray`].
    #[default]
    Reject,
    /// Encode as an empty string set.
    StringSet,
    /// Encode as an empty number set.
    NumberSet,
}

/// Value marshaller with an explicit empty-array policy.
///
/// The free functions in this module delegate to `Marshaller::default()`,
/// which rejects empty arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Marshaller {
    empty_arrays: EmptyArrayPolicy,
}

impl Marshaller {
    /// Create a marshaller with the given empty-array policy.
    #[must_use]
    pub fn new(empty_arrays: EmptyArrayPolicy) -> Self {
        Self { empty_arrays }
    }

    /// Encode a native value into its wire representation.
    ///
    /// `Null` encodes to `Ok(None)`: absent on the wire rather than an
    /// explicit `NULL` tag. Object fields holding `Null` are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] for empty arrays (under the default policy),
    /// mixed arrays, and array element kinds with no set representation.
    pub fn encode_value(&self, value: &Value) -> Result<Option<AttributeValue>, MarshalError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(AttributeValue::S(s.clone()))),
            Value::Number(n) => Ok(Some(AttributeValue::N(n.to_string()))),
            Value::Bool(b) => Ok(Some(AttributeValue::Bool(*b))),
            Value::Array(items) => self.encode_array(items).map(Some),
            Value::Object(fields) => Ok(Some(AttributeValue::M(self.encode_fields(fields)?))),
        }
    }

    /// Encode a native object into a wire item, omitting `Null` fields.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] if any field value fails to encode.
    pub fn encode_item(
        &self,
        item: &Map<String, Value>,
    ) -> Result<HashMap<String, AttributeValue>, MarshalError> {
        self.encode_fields(item)
    }

    fn encode_fields(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<HashMap<String, AttributeValue>, MarshalError> {
        let mut encoded = HashMap::with_capacity(fields.len());
        for (name, value) in fields {
            if let Some(wire) = self.encode_value(value)? {
                encoded.insert(name.clone(), wire);
            }
        }
        Ok(encoded)
    }

    fn encode_array(&self, items: &[Value]) -> Result<AttributeValue, MarshalError> {
        // The first element dictates the wire tag for the whole array.
        match items.first() {
            None => match self.empty_arrays {
                EmptyArrayPolicy::Reject => Err(MarshalError::EmptyArray),
                EmptyArrayPolicy::StringSet => Ok(AttributeValue::Ss(Vec::new())),
                EmptyArrayPolicy::NumberSet => Ok(AttributeValue::Ns(Vec::new())),
            },
            Some(Value::String(_)) => {
                let elements = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        _ => Err(MarshalError::MixedArray {
                            expected: "strings",
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AttributeValue::Ss(elements))
            }
            Some(Value::Number(_)) => {
                let elements = items
                    .iter()
                    .map(|item| match item {
                        Value::Number(n) => Ok(n.to_string()),
                        _ => Err(MarshalError::MixedArray {
                            expected: "numbers",
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AttributeValue::Ns(elements))
            }
            Some(Value::Object(_)) => {
                let elements = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => {
                            Ok(AttributeValue::M(self.encode_fields(fields)?))
                        }
                        _ => Err(MarshalError::MixedArray {
                            expected: "objects",
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(AttributeValue::L(elements))
            }
            Some(other) => Err(MarshalError::UnsupportedType {
                descriptor: format!("array of {}", kind_of(other)),
            }),
        }
    }

    /// Decode a wire value back into its native representation.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::UnsupportedType`] for `B`, `BS`, and `NULL`
    /// tags, and [`MarshalError::InvalidNumber`] for unparseable number text.
    pub fn decode_value(&self, value: &AttributeValue) -> Result<Value, MarshalError> {
        match value {
            AttributeValue::S(s) => Ok(Value::String(s.clone())),
            AttributeValue::Ss(v) => Ok(Value::Array(
                v.iter().map(|s| Value::String(s.clone())).collect(),
            )),
            AttributeValue::N(n) => decode_number(n),
            AttributeValue::Ns(v) => Ok(Value::Array(
                v.iter()
                    .map(|n| decode_number(n))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
            AttributeValue::L(v) => Ok(Value::Array(
                v.iter()
                    .map(|item| self.decode_value(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            AttributeValue::M(m) => Ok(Value::Object(self.decode_fields(m)?)),
            unsupported => Err(MarshalError::UnsupportedType {
                descriptor: unsupported.type_descriptor().to_owned(),
            }),
        }
    }

    /// Decode a wire item back into a native object.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] if any attribute fails to decode.
    pub fn decode_item(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> Result<Map<String, Value>, MarshalError> {
        self.decode_fields(item)
    }

    fn decode_fields(
        &self,
        fields: &HashMap<String, AttributeValue>,
    ) -> Result<Map<String, Value>, MarshalError> {
        let mut decoded = Map::new();
        for (name, value) in fields {
            decoded.insert(name.clone(), self.decode_value(value)?);
        }
        Ok(decoded)
    }
}

fn decode_number(text: &str) -> Result<Value, MarshalError> {
    serde_json::from_str::<serde_json::Number>(text)
        .map(Value::Number)
        .map_err(|_| MarshalError::InvalidNumber {
            text: text.to_owned(),
        })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "nulls",
        Value::Bool(_) => "booleans",
        Value::Number(_) => "numbers",
        Value::String(_) => "strings",
        Value::Array(_) => "arrays",
        Value::Object(_) => "objects",
    }
}

// ---------------------------------------------------------------------------
// Free-function conveniences over Marshaller::default()
// ---------------------------------------------------------------------------

/// Encode a native value with the default (strict) marshaller.
///
/// # Errors
///
/// See [`Marshaller::encode_value`].
pub fn encode_value(value: &Value) -> Result<Option<AttributeValue>, MarshalError> {
    Marshaller::default().encode_value(value)
}

/// Encode a native object with the default (strict) marshaller.
///
/// # Errors
///
/// See [`Marshaller::encode_item`].
pub fn encode_item(item: &Map<String, Value>) -> Result<HashMap<String, AttributeValue>, MarshalError> {
    Marshaller::default().encode_item(item)
}

/// Decode a wire value with the default marshaller.
///
/// # Errors
///
/// See [`Marshaller::decode_value`].
pub fn decode_value(value: &AttributeValue) -> Result<Value, MarshalError> {
    Marshaller::default().decode_value(value)
}

/// Decode a wire item with the default marshaller.
///
/// # Errors
///
/// See [`Marshaller::decode_item`].
pub fn decode_item(
    item: &HashMap<String, AttributeValue>,
) -> Result<Map<String, Value>, MarshalError> {
    Marshaller::default().decode_item(item)
}

/// Encode a value that must be present on the wire.
///
/// Expression placeholders and update operands cannot hold the null
/// sentinel, so `Null` is rejected here instead of mapping to absence.
///
/// # Errors
///
/// Returns [`MarshalError::UnsupportedType`] for `Null`, plus anything
/// [`Marshaller::encode_value`] raises.
pub fn encode_non_null(value: &Value) -> Result<AttributeValue, MarshalError> {
    encode_value(value)?.ok_or_else(|| MarshalError::UnsupportedType {
        descriptor: "NULL".to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
