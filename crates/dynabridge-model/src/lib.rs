//! Wire-format model types for dynabridge.
//!
//! This crate defines the tagged-value representation DynamoDB uses on the
//! wire (`AttributeValue`) together with the key-schema and key-condition
//! types the translation layer consumes. Everything here is plain data with
//! hand-written serde where the wire format demands it; the marshalling and
//! expression-compilation logic lives in `dynabridge-core`.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod types;

pub use attribute_value::AttributeValue;
pub use types::{
    AttributeDefinition, ComparisonOperator, KeyCondition, KeySchemaElement, KeyType,
    ScalarAttributeType,
};
