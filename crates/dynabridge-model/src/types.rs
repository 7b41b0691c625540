//! Key-schema and key-condition types.
//!
//! All structs follow the DynamoDB JSON wire format with `PascalCase` field
//! names; enums carry `#[serde(rename)]` attributes mapping idiomatic Rust
//! variants to the SCREAMING wire spellings.

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;

/// The role an attribute plays in a key schema.
///
/// `Hash` denotes the partition key; `Range` denotes the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Partition key.
    #[serde(rename = "HASH")]
    Hash,
    /// Sort key.
    #[serde(rename = "RANGE")]
    Range,
}

impl KeyType {
    /// The wire-format spelling of this key role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "HASH",
            Self::Range => "RANGE",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar attribute types allowed in key schemas.
///
/// The wire protocol may deliver type strings outside the documented set;
/// those are captured as `Unknown` and rejected where they are used rather
/// than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarAttributeType {
    /// String key.
    S,
    /// Number key.
    N,
    /// Binary key.
    B,
    /// A type string outside the documented set.
    Unknown(String),
}

impl ScalarAttributeType {
    /// The wire-format spelling of this scalar type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl Serialize for ScalarAttributeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScalarAttributeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "S" => Ok(Self::S),
            "N" => Ok(Self::N),
            "B" => Ok(Self::B),
            _ => Ok(Self::Unknown(s)),
        }
    }
}

impl std::fmt::Display for ScalarAttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a table or index key schema: an attribute name and its
/// `HASH`/`RANGE` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    /// The attribute name.
    pub attribute_name: String,
    /// The role of the attribute in the key schema.
    pub key_type: KeyType,
}

/// The declared scalar type of a key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    /// The attribute name.
    pub attribute_name: String,
    /// The scalar type of the attribute.
    pub attribute_type: ScalarAttributeType,
}

/// The legacy comparison-operator token set used by `KeyConditions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Membership in a candidate list.
    In,
    /// Less than or equal.
    Le,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// Inclusive range.
    Between,
    /// Attribute exists.
    NotNull,
    /// Attribute does not exist.
    Null,
    /// String or set containment.
    Contains,
    /// Negated containment.
    NotContains,
    /// String prefix match.
    BeginsWith,
}

impl ComparisonOperator {
    /// The wire-format spelling of this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::In => "IN",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Ge => "GE",
            Self::Gt => "GT",
            Self::Between => "BETWEEN",
            Self::NotNull => "NOT_NULL",
            Self::Null => "NULL",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::BeginsWith => "BEGINS_WITH",
        }
    }

    /// Parse a wire-format operator token, or `None` if the token is outside
    /// the known set.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EQ" => Some(Self::Eq),
            "NE" => Some(Self::Ne),
            "IN" => Some(Self::In),
            "LE" => Some(Self::Le),
            "LT" => Some(Self::Lt),
            "GE" => Some(Self::Ge),
            "GT" => Some(Self::Gt),
            "BETWEEN" => Some(Self::Between),
            "NOT_NULL" => Some(Self::NotNull),
            "NULL" => Some(Self::Null),
            "CONTAINS" => Some(Self::Contains),
            "NOT_CONTAINS" => Some(Self::NotContains),
            "BEGINS_WITH" => Some(Self::BeginsWith),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discrete key condition: a comparison operator plus its typed operands,
/// matching the legacy `KeyConditions` entry shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyCondition {
    /// The comparison to apply to the key attribute.
    pub comparison_operator: ComparisonOperator,
    /// The operand values, in input order.
    pub attribute_value_list: Vec<AttributeValue>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
