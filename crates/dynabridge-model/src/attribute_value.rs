//! The DynamoDB `AttributeValue` tagged union.
//!
//! On the wire an attribute value is a single-key JSON object whose key names
//! the type tag: `{"S": "hello"}`, `{"N": "42"}`, `{"SS": ["a", "b"]}` and so
//! on. Numbers travel as decimal text to preserve arbitrary precision, and
//! binary payloads are base64-encoded. Exactly one tag is populated per value.
//!
//! The type implements `Eq` and a deterministic `Hash` so that structurally
//! identical values can share a single expression placeholder when a condition
//! is compiled.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single DynamoDB attribute value.
///
/// The first seven variants form the set the value marshaller translates to
/// and from native values. `B`, `Bs`, and `Null` exist so that items arriving
/// off the wire deserialize faithfully; the marshaller rejects them with a
/// typed error instead of guessing at a native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// String set.
    Ss(Vec<String>),
    /// Number, as decimal text.
    N(String),
    /// Number set, each element as decimal text.
    Ns(Vec<String>),
    /// Boolean.
    Bool(bool),
    /// Heterogeneous list.
    L(Vec<AttributeValue>),
    /// Nested attribute map.
    M(HashMap<String, AttributeValue>),
    /// Binary, base64-encoded on the wire. Not marshalled.
    B(bytes::Bytes),
    /// Binary set. Not marshalled.
    Bs(Vec<bytes::Bytes>),
    /// Explicit null. Not marshalled.
    Null(bool),
}

impl AttributeValue {
    /// The wire tag for this value (`"S"`, `"NS"`, `"BOOL"`, ...).
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::Ss(_) => "SS",
            Self::N(_) => "N",
            Self::Ns(_) => "NS",
            Self::Bool(_) => "BOOL",
            Self::L(_) => "L",
            Self::M(_) => "M",
            Self::B(_) => "B",
            Self::Bs(_) => "BS",
            Self::Null(_) => "NULL",
        }
    }

    /// The string content, if this is an `S` value.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// The decimal text, if this is an `N` value.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// The boolean content, if this is a `BOOL` value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The nested map, if this is an `M` value.
    #[must_use]
    pub fn as_m(&self) -> Option<&HashMap<String, AttributeValue>> {
        match self {
            Self::M(m) => Some(m),
            _ => None,
        }
    }
}

impl Eq for AttributeValue {}

impl std::hash::Hash for AttributeValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::S(s) | Self::N(s) => s.hash(state),
            Self::Ss(v) | Self::Ns(v) => v.hash(state),
            Self::Bool(b) | Self::Null(b) => b.hash(state),
            Self::L(v) => v.hash(state),
            Self::M(m) => {
                // Maps hash their entries in sorted key order so that equal
                // maps hash equally regardless of insertion order.
                let mut pairs: Vec<_> = m.iter().collect();
                pairs.sort_by_key(|(k, _)| *k);
                for (k, v) in pairs {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Self::B(b) => b.hash(state),
            Self::Bs(v) => {
                for b in v {
                    b.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "{{S: {s}}}"),
            Self::N(n) => write!(f, "{{N: {n}}}"),
            Self::Ss(v) => write!(f, "{{SS: {v:?}}}"),
            Self::Ns(v) => write!(f, "{{NS: {v:?}}}"),
            Self::Bool(b) => write!(f, "{{BOOL: {b}}}"),
            Self::L(v) => write!(f, "{{L: {} items}}", v.len()),
            Self::M(m) => write!(f, "{{M: {} keys}}", m.len()),
            Self::B(b) => write!(f, "{{B: {} bytes}}", b.len()),
            Self::Bs(v) => write!(f, "{{BS: {} items}}", v.len()),
            Self::Null(b) => write!(f, "{{NULL: {b}}}"),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use base64::Engine;

        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::S(s) => map.serialize_entry("S", s)?,
            Self::Ss(v) => map.serialize_entry("SS", v)?,
            Self::N(n) => map.serialize_entry("N", n)?,
            Self::Ns(v) => map.serialize_entry("NS", v)?,
            Self::Bool(b) => map.serialize_entry("BOOL", b)?,
            Self::L(list) => map.serialize_entry("L", list)?,
            Self::M(m) => map.serialize_entry("M", m)?,
            Self::B(b) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(b);
                map.serialize_entry("B", &encoded)?;
            }
            Self::Bs(v) => {
                let encoded: Vec<String> = v
                    .iter()
                    .map(|b| base64::engine::general_purpose::STANDARD.encode(b))
                    .collect();
                map.serialize_entry("BS", &encoded)?;
            }
            Self::Null(b) => map.serialize_entry("NULL", b)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TagVisitor)
    }
}

struct TagVisitor;

impl<'de> Visitor<'de> for TagVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an attribute value object with exactly one type tag")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        use base64::Engine;

        let Some(tag) = map.next_key::<String>()? else {
            return Err(de::Error::custom("attribute value must carry a type tag"));
        };

        let value = match tag.as_str() {
            "S" => AttributeValue::S(map.next_value()?),
            "SS" => AttributeValue::Ss(map.next_value()?),
            "N" => AttributeValue::N(map.next_value()?),
            "NS" => AttributeValue::Ns(map.next_value()?),
            "BOOL" => AttributeValue::Bool(map.next_value()?),
            "L" => AttributeValue::L(map.next_value()?),
            "M" => AttributeValue::M(map.next_value()?),
            "B" => {
                let encoded: String = map.next_value()?;
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&encoded)
                    .map_err(de::Error::custom)?;
                AttributeValue::B(bytes::Bytes::from(decoded))
            }
            "BS" => {
                let encoded: Vec<String> = map.next_value()?;
                let decoded: Result<Vec<bytes::Bytes>, _> = encoded
                    .iter()
                    .map(|e| {
                        base64::engine::general_purpose::STANDARD
                            .decode(e)
                            .map(bytes::Bytes::from)
                    })
                    .collect();
                AttributeValue::Bs(decoded.map_err(de::Error::custom)?)
            }
            "NULL" => AttributeValue::Null(map.next_value()?),
            other => {
                return Err(de::Error::unknown_field(
                    other,
                    &["S", "SS", "N", "NS", "BOOL", "L", "M", "B", "BS", "NULL"],
                ));
            }
        };

        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_string_as_single_tag_object() {
        let val = AttributeValue::S("tacos".to_owned());
        assert_eq!(serde_json::to_string(&val).unwrap(), r#"{"S":"tacos"}"#);
    }

    #[test]
    fn test_should_serialize_number_as_decimal_text() {
        let val = AttributeValue::N("1427517440482".to_owned());
        assert_eq!(
            serde_json::to_string(&val).unwrap(),
            r#"{"N":"1427517440482"}"#
        );
    }

    #[test]
    fn test_should_serialize_string_set() {
        let val = AttributeValue::Ss(vec!["lunch".to_owned(), "dinner".to_owned()]);
        assert_eq!(
            serde_json::to_string(&val).unwrap(),
            r#"{"SS":["lunch","dinner"]}"#
        );
    }

    #[test]
    fn test_should_deserialize_number_set() {
        let val: AttributeValue = serde_json::from_str(r#"{"NS":["3","5"]}"#).unwrap();
        assert_eq!(
            val,
            AttributeValue::Ns(vec!["3".to_owned(), "5".to_owned()])
        );
    }

    #[test]
    fn test_should_roundtrip_nested_map() {
        let mut inner = HashMap::new();
        inner.insert("rating".to_owned(), AttributeValue::N("5".to_owned()));
        let val = AttributeValue::M(inner);
        let json = serde_json::to_string(&val).unwrap();
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(val, back);
    }

    #[test]
    fn test_should_roundtrip_list_of_maps() {
        let mut entry = HashMap::new();
        entry.insert("name".to_owned(), AttributeValue::S("salsa".to_owned()));
        let val = AttributeValue::L(vec![AttributeValue::M(entry)]);
        let json = serde_json::to_string(&val).unwrap();
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(val, back);
    }

    #[test]
    fn test_should_roundtrip_binary_through_base64() {
        let val = AttributeValue::B(bytes::Bytes::from_static(b"raw bytes"));
        let json = serde_json::to_string(&val).unwrap();
        assert!(json.starts_with(r#"{"B":"#));
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(val, back);
    }

    #[test]
    fn test_should_reject_unknown_type_tag() {
        let result = serde_json::from_str::<AttributeValue>(r#"{"XX":"?"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_should_distinguish_number_from_string_in_hash_and_eq() {
        // A string "5" and a number 5 must never share a dedup slot.
        let s = AttributeValue::S("5".to_owned());
        let n = AttributeValue::N("5".to_owned());
        assert_ne!(s, n);

        let mut table = HashMap::new();
        table.insert(s, ":1");
        table.insert(n, ":2");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_should_hash_maps_independently_of_insertion_order() {
        use std::hash::{BuildHasher, RandomState};

        let mut forward = HashMap::new();
        forward.insert("a".to_owned(), AttributeValue::N("1".to_owned()));
        forward.insert("b".to_owned(), AttributeValue::N("2".to_owned()));

        let mut reverse = HashMap::new();
        reverse.insert("b".to_owned(), AttributeValue::N("2".to_owned()));
        reverse.insert("a".to_owned(), AttributeValue::N("1".to_owned()));

        let state = RandomState::new();
        assert_eq!(
            state.hash_one(AttributeValue::M(forward)),
            state.hash_one(AttributeValue::M(reverse))
        );
    }

    #[test]
    fn test_should_expose_variant_accessors() {
        let mut fields = HashMap::new();
        fields.insert("rating".to_owned(), AttributeValue::N("5".to_owned()));
        let item = AttributeValue::M(fields);

        assert_eq!(item.as_m().unwrap()["rating"].as_n(), Some("5"));
        assert_eq!(AttributeValue::S("x".to_owned()).as_s(), Some("x"));
        assert_eq!(AttributeValue::Bool(true).as_bool(), Some(true));
        assert!(AttributeValue::Bool(true).as_s().is_none());
    }

    #[test]
    fn test_should_report_type_descriptor() {
        assert_eq!(AttributeValue::S(String::new()).type_descriptor(), "S");
        assert_eq!(AttributeValue::Null(true).type_descriptor(), "NULL");
        assert_eq!(AttributeValue::Bs(Vec::new()).type_descriptor(), "BS");
    }
}
