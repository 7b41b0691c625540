//! Translation layer between native JSON values and the DynamoDB
//! query/expression sublanguage.
//!
//! Four pure, synchronous components, composed by a thin CRUD layer that
//! forwards their output to the database client unchanged:
//!
//! - [`marshal`] converts between `serde_json::Value` and the tagged
//!   [`AttributeValue`](dynabridge_model::AttributeValue) wire representation.
//! - [`expression`] lowers a nested boolean [`Condition`](expression::Condition)
//!   description into a condition-expression string plus attribute-name alias
//!   and value-placeholder tables.
//! - [`key`] parses compact key-condition strings against an index definition
//!   and builds primary-key attribute maps.
//! - [`update`] lowers an [`Update`](update::Update) description into an
//!   update-expression string and its value-placeholder table.
//!
//! Every call allocates its own transient state and returns a fully-formed
//! result or a typed error; nothing is shared across calls, so concurrent
//! compilation from many threads needs no coordination.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod expression;
pub mod key;
pub mod marshal;
pub mod update;

pub use expression::{
    compile_condition, Condition, ConditionExpression, ExpressionError, Operand, Operator,
};
pub use key::{build_key_condition, IndexDefinition, KeyAttribute, KeyError};
pub use marshal::{
    decode_item, decode_value, encode_item, encode_value, EmptyArrayPolicy, MarshalError,
    Marshaller,
};
pub use update::{compile_update, Update, UpdateExpression};
