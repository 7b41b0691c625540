//! AST types for condition descriptions.
//!
//! The tree is deliberately a sum type: `And`, `Or`, and `Not` are explicit
//! constructors rather than reserved attribute names, and an operand is
//! either a bare value or an explicit operator map, so the compiler
//! dispatches on a closed set of shapes instead of inspecting runtime types.

use std::fmt;

use serde_json::Value;

/// Comparison and membership operators usable inside an operator map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
    /// Membership in a candidate list; the operand must be an array.
    In,
    /// Inclusive range; the operand must be an array of exactly two values.
    Between,
    /// String or set containment, rendered as the `contains` function.
    Contains,
}

impl Operator {
    /// The grammar token for this operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Contains => "CONTAINS",
        }
    }

    /// Parse a grammar token, or `None` if the token is outside the known
    /// operator set. String-typed inputs go through here so that unknown
    /// tokens surface as invalid-operator errors at the boundary; past it
    /// the enum is closed.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Self::Eq),
            "<>" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "CONTAINS" => Some(Self::Contains),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an attribute is tested against.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A bare value, meaning implicit equality.
    Value(Value),
    /// An explicit operator map. Entries are implicitly ANDed and compile
    /// in the order given.
    Ops(Vec<(Operator, Value)>),
}

impl Operand {
    /// A bare value operand (implicit equality).
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// An explicit operator map.
    #[must_use]
    pub fn ops(ops: impl IntoIterator<Item = (Operator, Value)>) -> Self {
        Self::Ops(ops.into_iter().collect())
    }

    /// Membership in a candidate list: `attr IN (...)`.
    #[must_use]
    pub fn one_of<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let candidates = values.into_iter().map(Into::into).collect();
        Self::Ops(vec![(Operator::In, Value::Array(candidates))])
    }

    /// Inclusive range: `attr BETWEEN low AND high`.
    #[must_use]
    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Ops(vec![(
            Operator::Between,
            Value::Array(vec![low.into(), high.into()]),
        )])
    }

    /// Containment: `contains ( attr, value )`.
    #[must_use]
    pub fn contains(value: impl Into<Value>) -> Self {
        Self::Ops(vec![(Operator::Contains, value.into())])
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// One node of a condition description.
///
/// A whole description is a slice of conditions, joined with `AND` at the
/// top level. For example, the tree for "userId = 5, createdDate after some
/// instant, and either name = tacos or type = tex-mex":
///
/// ```
/// use dynabridge_core::expression::{Condition, Operand, Operator};
/// use serde_json::json;
///
/// let conditions = [
///     Condition::eq("userId", 5),
///     Condition::attr("createdDate", Operand::ops([(Operator::Gt, json!(1_427_517_440_482_u64))])),
///     Condition::or([
///         Condition::eq("name", "tacos"),
///         Condition::eq("type", "tex-mex"),
///     ]),
/// ];
/// assert_eq!(conditions.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single attribute tested against its operand.
    Attr {
        /// The attribute name, aliased to `#n` in the compiled expression.
        name: String,
        /// What the attribute is tested against.
        operand: Operand,
    },
    /// Every child must hold; compiles to `( a AND b ... )`.
    And(Vec<Condition>),
    /// At least one child must hold; compiles to `( a OR b ... )`.
    Or(Vec<Condition>),
    /// The child must not hold; compiles to `NOT <child>`.
    Not(Box<Condition>),
}

impl Condition {
    /// An attribute tested against an operand.
    #[must_use]
    pub fn attr(name: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::Attr {
            name: name.into(),
            operand: operand.into(),
        }
    }

    /// Equality shorthand: `attr = value`.
    #[must_use]
    pub fn eq(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::attr(name, Operand::Value(value.into()))
    }

    /// Conjunction of the given conditions.
    #[must_use]
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::And(conditions.into_iter().collect())
    }

    /// Disjunction of the given conditions.
    #[must_use]
    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or(conditions.into_iter().collect())
    }

    /// Negation of the given condition.
    #[must_use]
    pub fn not(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_should_parse_operator_tokens() {
        assert_eq!(Operator::parse("="), Some(Operator::Eq));
        assert_eq!(Operator::parse("<>"), Some(Operator::Ne));
        assert_eq!(Operator::parse("BETWEEN"), Some(Operator::Between));
        assert_eq!(Operator::parse("STARTS_WITH"), None);
    }

    #[test]
    fn test_should_roundtrip_operator_tokens() {
        for op in [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Le,
            Operator::Gt,
            Operator::Ge,
            Operator::In,
            Operator::Between,
            Operator::Contains,
        ] {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_should_build_operand_shorthands() {
        assert_eq!(Operand::value("x"), Operand::Value(json!("x")));
        assert_eq!(
            Operand::one_of(["lunch", "dinner"]),
            Operand::Ops(vec![(Operator::In, json!(["lunch", "dinner"]))])
        );
        assert_eq!(
            Operand::between(3, 5),
            Operand::Ops(vec![(Operator::Between, json!([3, 5]))])
        );
        assert_eq!(
            Operand::contains("best"),
            Operand::Ops(vec![(Operator::Contains, json!("best"))])
        );
    }

    #[test]
    fn test_should_build_equality_leaf_from_shorthand() {
        assert_eq!(
            Condition::eq("name", "tacos"),
            Condition::Attr {
                name: "name".to_owned(),
                operand: Operand::Value(json!("tacos")),
            }
        );
    }
}
