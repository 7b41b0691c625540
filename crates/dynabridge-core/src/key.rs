//! Key-condition parsing and index key handling.
//!
//! Key conditions apply only to the partition/sort attributes of an index
//! and use a compact string grammar: `"<OPERATOR> <value> [<value> ...]"`,
//! or a bare `"<value>"` implying equality. Operand tokens become wire
//! values of the key's declared scalar type verbatim; numeric keys stay
//! decimal text. No quoting or escaping of embedded spaces is supported.

use std::collections::HashMap;

use dynabridge_model::{
    AttributeDefinition, AttributeValue, ComparisonOperator, KeyCondition, KeySchemaElement,
    KeyType, ScalarAttributeType,
};

use crate::expression::ExpressionError;
use crate::marshal::MarshalError;

/// Errors raised while deriving an index definition or building key maps.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The key schema defines no `HASH` element.
    #[error("key schema does not define a HASH key")]
    MissingPartitionKey,
    /// A key attribute has no matching attribute definition.
    #[error("no attribute definition for key attribute '{attribute}'")]
    UnknownAttribute {
        /// The undefined attribute.
        attribute: String,
    },
    /// The index defines a sort key but no sort value was provided.
    #[error("'{attribute}' is a defined sort key but no sort key value was provided")]
    MissingSortKeyValue {
        /// The sort key attribute.
        attribute: String,
    },
    /// A key value could not be rendered as a wire value.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// A key attribute: its name and declared scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    /// The attribute name.
    pub name: String,
    /// The declared scalar type.
    pub attribute_type: ScalarAttributeType,
}

/// The key shape of a table or secondary index: a partition attribute and
/// an optional sort attribute. Derived once from a schema description and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// The partition (`HASH`) key.
    pub partition: KeyAttribute,
    /// The sort (`RANGE`) key, when the index has one.
    pub sort: Option<KeyAttribute>,
}

impl IndexDefinition {
    /// Derive an index definition by pairing each key-schema role with its
    /// declared attribute type.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::UnknownAttribute`] for a key attribute missing
    /// from the definitions, and [`KeyError::MissingPartitionKey`] when the
    /// schema has no `HASH` element.
    pub fn from_key_schema(
        key_schema: &[KeySchemaElement],
        attribute_definitions: &[AttributeDefinition],
    ) -> Result<Self, KeyError> {
        let types: HashMap<&str, &ScalarAttributeType> = attribute_definitions
            .iter()
            .map(|def| (def.attribute_name.as_str(), &def.attribute_type))
            .collect();

        let mut partition = None;
        let mut sort = None;
        for element in key_schema {
            let attribute_type = types.get(element.attribute_name.as_str()).ok_or_else(|| {
                KeyError::UnknownAttribute {
                    attribute: element.attribute_name.clone(),
                }
            })?;
            let key = KeyAttribute {
                name: element.attribute_name.clone(),
                attribute_type: (*attribute_type).clone(),
            };
            match element.key_type {
                KeyType::Hash => partition = Some(key),
                KeyType::Range => sort = Some(key),
            }
        }

        Ok(Self {
            partition: partition.ok_or(KeyError::MissingPartitionKey)?,
            sort,
        })
    }

    /// Build the primary-key attribute map for get/delete/update calls.
    ///
    /// A provided sort value is ignored when the index has no sort key,
    /// matching the lenience of the query side.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::MissingSortKeyValue`] when the index defines a
    /// sort key and no value is given for it.
    pub fn key_for(
        &self,
        partition_value: &str,
        sort_value: Option<&str>,
    ) -> Result<HashMap<String, AttributeValue>, KeyError> {
        let mut key = HashMap::with_capacity(2);
        key.insert(
            self.partition.name.clone(),
            scalar_wire_value(&self.partition.attribute_type, partition_value)?,
        );

        if let Some(sort) = &self.sort {
            let value = sort_value.ok_or_else(|| KeyError::MissingSortKeyValue {
                attribute: sort.name.clone(),
            })?;
            key.insert(
                sort.name.clone(),
                scalar_wire_value(&sort.attribute_type, value)?,
            );
        }

        Ok(key)
    }

    /// Build the per-attribute key-condition map for query calls, running
    /// each condition string through [`build_key_condition`] against its
    /// key's type. A sort condition is ignored when the index has no sort
    /// key.
    ///
    /// # Errors
    ///
    /// Propagates [`ExpressionError`] from [`build_key_condition`].
    pub fn key_conditions_for(
        &self,
        partition_condition: &str,
        sort_condition: Option<&str>,
    ) -> Result<HashMap<String, KeyCondition>, ExpressionError> {
        let mut conditions = HashMap::with_capacity(2);
        conditions.insert(
            self.partition.name.clone(),
            build_key_condition(partition_condition, &self.partition.attribute_type)?,
        );

        if let (Some(sort), Some(condition)) = (&self.sort, sort_condition) {
            conditions.insert(
                sort.name.clone(),
                build_key_condition(condition, &sort.attribute_type)?,
            );
        }

        Ok(conditions)
    }
}

/// Parse a compact key-condition string against a key's scalar type.
///
/// A single token is an equality operand; with more than one token the
/// first is the operator and the rest are operands. Operator tokens are
/// validated eagerly against the known comparison-operator set.
///
/// # Errors
///
/// Returns [`ExpressionError::InvalidOperator`] for an unknown operator
/// token, and a marshal error for key types with no verbatim wire
/// rendering (`B` and unknown types).
pub fn build_key_condition(
    condition: &str,
    key_type: &ScalarAttributeType,
) -> Result<KeyCondition, ExpressionError> {
    let parts: Vec<&str> = condition.split(' ').collect();

    let (comparison_operator, operands) = if parts.len() > 1 {
        let token = parts[0];
        let operator =
            ComparisonOperator::from_token(token).ok_or_else(|| ExpressionError::InvalidOperator {
                operator: token.to_owned(),
            })?;
        (operator, &parts[1..])
    } else {
        (ComparisonOperator::Eq, &parts[..])
    };

    let attribute_value_list = operands
        .iter()
        .map(|token| scalar_wire_value(key_type, token))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeyCondition {
        comparison_operator,
        attribute_value_list,
    })
}

fn scalar_wire_value(
    attribute_type: &ScalarAttributeType,
    token: &str,
) -> Result<AttributeValue, MarshalError> {
    match attribute_type {
        ScalarAttributeType::S => Ok(AttributeValue::S(token.to_owned())),
        ScalarAttributeType::N => Ok(AttributeValue::N(token.to_owned())),
        other => Err(MarshalError::UnsupportedType {
            descriptor: other.as_str().to_owned(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn users_index() -> IndexDefinition {
        IndexDefinition::from_key_schema(
            &[
                KeySchemaElement {
                    attribute_name: "userId".to_owned(),
                    key_type: KeyType::Hash,
                },
                KeySchemaElement {
                    attribute_name: "createdDate".to_owned(),
                    key_type: KeyType::Range,
                },
            ],
            &[
                AttributeDefinition {
                    attribute_name: "userId".to_owned(),
                    attribute_type: ScalarAttributeType::S,
                },
                AttributeDefinition {
                    attribute_name: "createdDate".to_owned(),
                    attribute_type: ScalarAttributeType::N,
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_should_default_single_token_to_equality() {
        let condition = build_key_condition("123", &ScalarAttributeType::N).unwrap();
        assert_eq!(condition.comparison_operator, ComparisonOperator::Eq);
        assert_eq!(
            condition.attribute_value_list,
            vec![AttributeValue::N("123".to_owned())]
        );
    }

    #[test]
    fn test_should_parse_operator_and_operands() {
        let condition = build_key_condition("BETWEEN 1 10", &ScalarAttributeType::N).unwrap();
        assert_eq!(condition.comparison_operator, ComparisonOperator::Between);
        assert_eq!(
            condition.attribute_value_list,
            vec![
                AttributeValue::N("1".to_owned()),
                AttributeValue::N("10".to_owned()),
            ]
        );
    }

    #[test]
    fn test_should_wrap_tokens_in_the_key_type_verbatim() {
        let condition =
            build_key_condition("BEGINS_WITH user-", &ScalarAttributeType::S).unwrap();
        assert_eq!(
            condition.attribute_value_list,
            vec![AttributeValue::S("user-".to_owned())]
        );
    }

    #[test]
    fn test_should_reject_unknown_operator_tokens() {
        let err = build_key_condition("STARTS_WITH x", &ScalarAttributeType::S).unwrap_err();
        assert!(
            matches!(err, ExpressionError::InvalidOperator { operator } if operator == "STARTS_WITH")
        );
    }

    #[test]
    fn test_should_reject_binary_key_types() {
        let err = build_key_condition("123", &ScalarAttributeType::B).unwrap_err();
        assert!(matches!(err, ExpressionError::Marshal(_)));
    }

    #[test]
    fn test_should_derive_index_definition_from_schema() {
        let index = users_index();
        assert_eq!(index.partition.name, "userId");
        assert_eq!(index.partition.attribute_type, ScalarAttributeType::S);
        let sort = index.sort.unwrap();
        assert_eq!(sort.name, "createdDate");
        assert_eq!(sort.attribute_type, ScalarAttributeType::N);
    }

    #[test]
    fn test_should_reject_schema_without_hash_key() {
        let err = IndexDefinition::from_key_schema(
            &[KeySchemaElement {
                attribute_name: "createdDate".to_owned(),
                key_type: KeyType::Range,
            }],
            &[AttributeDefinition {
                attribute_name: "createdDate".to_owned(),
                attribute_type: ScalarAttributeType::N,
            }],
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::MissingPartitionKey));
    }

    #[test]
    fn test_should_reject_key_attribute_without_definition() {
        let err = IndexDefinition::from_key_schema(
            &[KeySchemaElement {
                attribute_name: "userId".to_owned(),
                key_type: KeyType::Hash,
            }],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, KeyError::UnknownAttribute { attribute } if attribute == "userId"));
    }

    #[test]
    fn test_should_build_full_primary_key() {
        let key = users_index().key_for("u-1", Some("1427517440482")).unwrap();
        assert_eq!(key["userId"], AttributeValue::S("u-1".to_owned()));
        assert_eq!(
            key["createdDate"],
            AttributeValue::N("1427517440482".to_owned())
        );
    }

    #[test]
    fn test_should_require_sort_value_when_index_has_sort_key() {
        let err = users_index().key_for("u-1", None).unwrap_err();
        assert!(
            matches!(err, KeyError::MissingSortKeyValue { attribute } if attribute == "createdDate")
        );
    }

    #[test]
    fn test_should_reject_binary_keys_when_building_key_maps() {
        let index = IndexDefinition {
            partition: KeyAttribute {
                name: "blob".to_owned(),
                attribute_type: ScalarAttributeType::B,
            },
            sort: None,
        };
        let err = index.key_for("deadbeef", None).unwrap_err();
        assert!(matches!(err, KeyError::Marshal(_)));
    }

    #[test]
    fn test_should_ignore_sort_value_without_sort_key() {
        let index = IndexDefinition {
            partition: KeyAttribute {
                name: "id".to_owned(),
                attribute_type: ScalarAttributeType::S,
            },
            sort: None,
        };
        let key = index.key_for("a", Some("ignored")).unwrap();
        assert_eq!(key.len(), 1);
    }

    #[test]
    fn test_should_build_key_conditions_for_query() {
        let conditions = users_index()
            .key_conditions_for("u-1", Some("GT 1000"))
            .unwrap();
        assert_eq!(
            conditions["userId"].comparison_operator,
            ComparisonOperator::Eq
        );
        assert_eq!(
            conditions["createdDate"].comparison_operator,
            ComparisonOperator::Gt
        );
        assert_eq!(
            conditions["createdDate"].attribute_value_list,
            vec![AttributeValue::N("1000".to_owned())]
        );
    }
}
