//! Lowering of update descriptions into update-expression strings.
//!
//! An [`Update`] collects actions into the four clause buckets (`SET`,
//! `ADD`, `DELETE`, `REMOVE`); plain attribute assignments are `SET`
//! shorthand. Compilation runs one placeholder counter across all buckets
//! and, unlike condition compilation, never deduplicates: every action gets
//! a fresh placeholder even when values repeat.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use dynabridge_model::AttributeValue;

use crate::expression::ExpressionError;
use crate::marshal;

/// A declarative update description.
///
/// ```
/// use dynabridge_core::update::{compile_update, Update};
///
/// let update = Update::new()
///     .set("name", "Bob")
///     .add("score", 5)
///     .remove("legacyFlag");
/// let compiled = compile_update(&update).unwrap();
/// assert_eq!(
///     compiled.update_expression,
///     "SET name = :1 ADD score :2 REMOVE legacyFlag "
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Vec<(String, Value)>,
    add: Vec<(String, Value)>,
    delete: Vec<(String, Value)>,
    remove: Vec<String>,
}

impl Update {
    /// An empty update description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `attribute` (a `SET` action).
    #[must_use]
    pub fn set(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((attribute.into(), value.into()));
        self
    }

    /// Add `value` to `attribute` (an `ADD` action; numbers or sets only,
    /// enforced downstream by the database).
    #[must_use]
    pub fn add(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add.push((attribute.into(), value.into()));
        self
    }

    /// Remove the elements of `value` from the set held by `attribute`
    /// (a `DELETE` action).
    #[must_use]
    pub fn delete(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.delete.push((attribute.into(), value.into()));
        self
    }

    /// Drop `attribute` from the item entirely (a `REMOVE` action).
    #[must_use]
    pub fn remove(mut self, attribute: impl Into<String>) -> Self {
        self.remove.push(attribute.into());
        self
    }

    /// `true` when no actions have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.delete.is_empty() && self.remove.is_empty()
    }
}

/// A compiled update: the expression string plus its value-placeholder
/// table. The table is omitted from serialized payloads when empty (a
/// `REMOVE`-only update has no placeholders, and the protocol forbids an
/// empty substitution map).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateExpression {
    /// The compiled update expression.
    pub update_expression: String,
    /// Placeholder (`:n`) to wire value.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

/// Placeholder table without dedup: every interned value takes the next
/// index, so the counter is just the table size.
#[derive(Debug, Default)]
struct ValueTable {
    values: HashMap<String, AttributeValue>,
}

impl ValueTable {
    fn intern(&mut self, value: &Value) -> Result<String, ExpressionError> {
        let encoded = marshal::encode_non_null(value)?;
        let placeholder = format!(":{}", self.values.len() + 1);
        self.values.insert(placeholder.clone(), encoded);
        Ok(placeholder)
    }
}

/// Compile an update description into an update-expression payload.
///
/// Non-empty clauses are emitted in a stable order (`SET`, `ADD`, `DELETE`,
/// `REMOVE`), each as `"<CLAUSE> <comma-joined actions> "` with a trailing
/// space. An empty description yields an empty expression.
///
/// # Errors
///
/// Returns [`ExpressionError`] if any action value fails to encode; nothing
/// is returned for a partially-compiled update.
pub fn compile_update(update: &Update) -> Result<UpdateExpression, ExpressionError> {
    let mut table = ValueTable::default();
    let mut expression = String::new();

    if !update.set.is_empty() {
        let mut actions = Vec::with_capacity(update.set.len());
        for (attribute, value) in &update.set {
            actions.push(format!("{attribute} = {}", table.intern(value)?));
        }
        push_clause(&mut expression, "SET", &actions);
    }

    if !update.add.is_empty() {
        let mut actions = Vec::with_capacity(update.add.len());
        for (attribute, value) in &update.add {
            actions.push(format!("{attribute} {}", table.intern(value)?));
        }
        push_clause(&mut expression, "ADD", &actions);
    }

    if !update.delete.is_empty() {
        let mut actions = Vec::with_capacity(update.delete.len());
        for (attribute, value) in &update.delete {
            actions.push(format!("{attribute} {}", table.intern(value)?));
        }
        push_clause(&mut expression, "DELETE", &actions);
    }

    if !update.remove.is_empty() {
        push_clause(&mut expression, "REMOVE", &update.remove);
    }

    debug!(
        expression = %expression,
        values = table.values.len(),
        "compiled update expression"
    );

    Ok(UpdateExpression {
        update_expression: expression,
        expression_attribute_values: table.values,
    })
}

fn push_clause(expression: &mut String, clause: &str, actions: &[String]) {
    expression.push_str(clause);
    expression.push(' ');
    expression.push_str(&actions.join(", "));
    expression.push(' ');
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_should_compile_implicit_set() {
        let out = compile_update(&Update::new().set("name", "Bob")).unwrap();
        assert_eq!(out.update_expression, "SET name = :1 ");
        assert_eq!(
            out.expression_attribute_values[":1"],
            AttributeValue::S("Bob".to_owned())
        );
    }

    #[test]
    fn test_should_compile_add() {
        let out = compile_update(&Update::new().add("score", 5)).unwrap();
        assert_eq!(out.update_expression, "ADD score :1 ");
        assert_eq!(
            out.expression_attribute_values[":1"],
            AttributeValue::N("5".to_owned())
        );
    }

    #[test]
    fn test_should_compile_delete_and_remove() {
        let out = compile_update(
            &Update::new()
                .delete("tags", json!(["stale"]))
                .remove("legacyFlag"),
        )
        .unwrap();
        assert_eq!(out.update_expression, "DELETE tags :1 REMOVE legacyFlag ");
        assert_eq!(
            out.expression_attribute_values[":1"],
            AttributeValue::Ss(vec!["stale".to_owned()])
        );
    }

    #[test]
    fn test_should_emit_clauses_in_stable_order() {
        // Bucket order is fixed regardless of call order.
        let out = compile_update(
            &Update::new()
                .remove("old")
                .add("score", 1)
                .set("name", "Bob"),
        )
        .unwrap();
        assert_eq!(
            out.update_expression,
            "SET name = :1 ADD score :2 REMOVE old "
        );
    }

    #[test]
    fn test_should_join_actions_within_a_clause() {
        let out = compile_update(&Update::new().set("a", 1).set("b", 2)).unwrap();
        assert_eq!(out.update_expression, "SET a = :1, b = :2 ");
    }

    #[test]
    fn test_should_not_dedup_repeated_values() {
        let out = compile_update(&Update::new().set("a", 5).set("b", 5)).unwrap();
        assert_eq!(out.update_expression, "SET a = :1, b = :2 ");
        assert_eq!(out.expression_attribute_values.len(), 2);
    }

    #[test]
    fn test_should_compile_empty_update_to_empty_expression() {
        let update = Update::new();
        assert!(update.is_empty());
        let out = compile_update(&update).unwrap();
        assert_eq!(out.update_expression, "");
        assert!(out.expression_attribute_values.is_empty());
    }

    #[test]
    fn test_should_omit_empty_value_table_from_payload() {
        let out = compile_update(&Update::new().remove("legacyFlag")).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"UpdateExpression":"REMOVE legacyFlag "}"#
        );
    }

    #[test]
    fn test_should_reject_null_action_values() {
        let err = compile_update(&Update::new().set("gone", Value::Null)).unwrap_err();
        assert!(matches!(err, ExpressionError::Marshal(_)));
    }
}
