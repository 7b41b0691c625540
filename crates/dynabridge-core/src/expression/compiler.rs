//! Lowering of condition trees into the expression string grammar.
//!
//! One compile context lives for exactly one [`compile_condition`] call:
//! it interns attribute aliases (`#1`, `#2`, ...) in first-seen order and
//! value placeholders (`:1`, `:2`, ...) deduplicated by the structural
//! equality of their encoded wire values. Identical operand values reuse one
//! placeholder across the entire compile, even across unrelated attributes;
//! that is an observable property of the output, not an optimization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use dynabridge_model::AttributeValue;

use super::ast::{Condition, Operand, Operator};
use crate::marshal::{self, MarshalError};

/// Errors raised while compiling condition, key-condition, or update
/// descriptions.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    /// An operator token outside the known set was given at a string
    /// boundary (key-condition strings, operator-token parsing).
    #[error("invalid operator '{operator}'")]
    InvalidOperator {
        /// The offending token.
        operator: String,
    },
    /// An `IN` condition was given a non-array operand.
    #[error("IN condition for attribute '{attribute}' requires an array value")]
    InvalidInOperand {
        /// The attribute the condition applies to.
        attribute: String,
    },
    /// A `BETWEEN` condition was given anything but a two-element array.
    #[error("BETWEEN condition for attribute '{attribute}' requires an array of exactly two values")]
    InvalidBetweenOperand {
        /// The attribute the condition applies to.
        attribute: String,
    },
    /// An operand value could not be encoded into a wire value.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// A compiled condition: the expression string plus the alias and
/// placeholder tables it references.
///
/// Serializes to the wire field names; empty tables are omitted from the
/// payload entirely, since the protocol forbids empty substitution maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionExpression {
    /// The compiled expression string.
    pub condition_expression: String,
    /// Alias (`#n`) to attribute name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: HashMap<String, String>,
    /// Placeholder (`:n`) to wire value.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

impl ConditionExpression {
    /// `true` when the compile saw no conditions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.condition_expression.is_empty()
    }
}

/// Per-compile interning state, created fresh for every call and discarded
/// with it. Never shared, so concurrent compiles cannot interleave their
/// numbering.
#[derive(Debug, Default)]
struct CompileContext {
    alias_by_name: HashMap<String, String>,
    placeholder_by_value: HashMap<AttributeValue, String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl CompileContext {
    /// Intern an attribute name, returning its `#n` alias. The first
    /// occurrence allocates the next index; later occurrences reuse it.
    fn alias(&mut self, name: &str) -> String {
        if let Some(alias) = self.alias_by_name.get(name) {
            return alias.clone();
        }
        let alias = format!("#{}", self.alias_by_name.len() + 1);
        self.alias_by_name.insert(name.to_owned(), alias.clone());
        self.names.insert(alias.clone(), name.to_owned());
        alias
    }

    /// Intern an operand value, returning its `:n` placeholder. Values that
    /// encode to the same wire value share one placeholder.
    fn placeholder(&mut self, value: &Value) -> Result<String, ExpressionError> {
        let encoded = marshal::encode_non_null(value)?;
        if let Some(placeholder) = self.placeholder_by_value.get(&encoded) {
            return Ok(placeholder.clone());
        }
        let placeholder = format!(":{}", self.placeholder_by_value.len() + 1);
        self.placeholder_by_value
            .insert(encoded.clone(), placeholder.clone());
        self.values.insert(placeholder.clone(), encoded);
        Ok(placeholder)
    }
}

/// Compile a condition description into an expression payload.
///
/// The top-level slice models the description's root: each element compiles
/// independently and the results join with ` AND `, without outer parens.
/// An empty slice means "no condition" and yields an empty expression.
///
/// # Errors
///
/// Any malformed operator/operand combination aborts the whole compile with
/// an [`ExpressionError`]; no partial result is returned.
pub fn compile_condition(
    conditions: &[Condition],
) -> Result<ConditionExpression, ExpressionError> {
    let mut ctx = CompileContext::default();
    let mut parts = Vec::with_capacity(conditions.len());
    for condition in conditions {
        parts.push(compile_node(condition, &mut ctx)?);
    }

    let expression = parts.join(" AND ");
    debug!(
        expression = %expression,
        names = ctx.names.len(),
        values = ctx.values.len(),
        "compiled condition expression"
    );

    Ok(ConditionExpression {
        condition_expression: expression,
        expression_attribute_names: ctx.names,
        expression_attribute_values: ctx.values,
    })
}

fn compile_node(condition: &Condition, ctx: &mut CompileContext) -> Result<String, ExpressionError> {
    match condition {
        Condition::Attr { name, operand } => compile_attr(name, operand, ctx),
        Condition::And(children) => compile_composite("AND", children, ctx),
        Condition::Or(children) => compile_composite("OR", children, ctx),
        Condition::Not(child) => Ok(format!("NOT {}", compile_node(child, ctx)?)),
    }
}

fn compile_composite(
    connective: &str,
    children: &[Condition],
    ctx: &mut CompileContext,
) -> Result<String, ExpressionError> {
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        parts.push(compile_node(child, ctx)?);
    }
    Ok(format!("( {} )", parts.join(&format!(" {connective} "))))
}

fn compile_attr(
    name: &str,
    operand: &Operand,
    ctx: &mut CompileContext,
) -> Result<String, ExpressionError> {
    // The alias is interned before any of the attribute's values, so alias
    // numbering ascends in attribute encounter order across the whole tree.
    let alias = ctx.alias(name);

    match operand {
        Operand::Value(value) => compile_operator(&alias, name, Operator::Eq, value, ctx),
        Operand::Ops(ops) => {
            let mut parts = Vec::with_capacity(ops.len());
            for (op, value) in ops {
                parts.push(compile_operator(&alias, name, *op, value, ctx)?);
            }
            if parts.len() == 1 {
                Ok(parts.remove(0))
            } else {
                Ok(format!("( {} )", parts.join(" AND ")))
            }
        }
    }
}

fn compile_operator(
    alias: &str,
    attribute: &str,
    op: Operator,
    value: &Value,
    ctx: &mut CompileContext,
) -> Result<String, ExpressionError> {
    match op {
        Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            let placeholder = ctx.placeholder(value)?;
            Ok(format!("{alias} {op} {placeholder}"))
        }
        Operator::In => {
            let Value::Array(candidates) = value else {
                return Err(ExpressionError::InvalidInOperand {
                    attribute: attribute.to_owned(),
                });
            };
            let mut placeholders = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                placeholders.push(ctx.placeholder(candidate)?);
            }
            Ok(format!("{alias} IN ({})", placeholders.join(", ")))
        }
        Operator::Between => {
            let bounds = match value {
                Value::Array(bounds) if bounds.len() == 2 => bounds,
                _ => {
                    return Err(ExpressionError::InvalidBetweenOperand {
                        attribute: attribute.to_owned(),
                    });
                }
            };
            let low = ctx.placeholder(&bounds[0])?;
            let high = ctx.placeholder(&bounds[1])?;
            Ok(format!("{alias} BETWEEN {low} AND {high}"))
        }
        Operator::Contains => {
            let placeholder = ctx.placeholder(value)?;
            Ok(format!("contains ( {alias}, {placeholder} )"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
