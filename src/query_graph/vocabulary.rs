//! Display vocabulary for comparison operators and aggregate functions.
//!
//! The phrase tables are the single source of truth for how operators and
//! aggregates read in generated sentences. Every operator carries a distinct
//! phrase; in particular `In`/`NotIn` are kept apart so that a negated
//! membership test never renders like a positive one.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Comparison operator carried by a predicate edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    In,
    NotIn,
    Exists,
    NotExists,
    Like,
    NotLike,
    NotEqual,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Equal,
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::In,
        Operator::NotIn,
        Operator::Exists,
        Operator::NotExists,
        Operator::Like,
        Operator::NotLike,
        Operator::NotEqual,
    ];

    /// The SQL-ish symbol, used as the operator's identity in edge signatures.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equal => "=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::In => "In",
            Operator::NotIn => "Not In",
            Operator::Exists => "Exists",
            Operator::NotExists => "Not Exists",
            Operator::Like => "Like",
            Operator::NotLike => "Not Like",
            Operator::NotEqual => "!=",
        }
    }

    /// The English phrase inserted between an attribute and its operand.
    pub fn phrase(&self) -> &'static str {
        match self {
            Operator::GreaterThan => "is greater than",
            Operator::LessThan => "is less than",
            Operator::Equal => "is",
            Operator::GreaterOrEqual => "is equal to or greater than",
            Operator::LessOrEqual => "is equal to or less than",
            Operator::In => "is in",
            Operator::NotIn => "is not in",
            Operator::Exists => "exists",
            Operator::NotExists => "not exists",
            Operator::Like => "is like",
            Operator::NotLike => "is not like",
            Operator::NotEqual => "is not equal to",
        }
    }

    /// Look an operator up by its symbol (case-sensitive, as written in SQL
    /// fixtures).
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        OPERATOR_BY_SYMBOL.get(symbol).copied()
    }
}

lazy_static! {
    static ref OPERATOR_BY_SYMBOL: HashMap<&'static str, Operator> = Operator::ALL
        .iter()
        .map(|op| (op.symbol(), *op))
        .collect();
}

/// Aggregate function kind applied to an attribute via a transformation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl FunctionKind {
    /// Short name, used as the function node's signature.
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Min => "Min",
            FunctionKind::Max => "Max",
            FunctionKind::Sum => "Sum",
            FunctionKind::Avg => "Avg",
            FunctionKind::Count => "Cnt",
        }
    }

    /// Default display phrase prefixed to the aggregated attribute's label.
    pub fn phrase(&self) -> &'static str {
        match self {
            FunctionKind::Min => "minimum",
            FunctionKind::Max => "maximum",
            FunctionKind::Sum => "sum of",
            FunctionKind::Avg => "average",
            FunctionKind::Count => "number of",
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Operator::Equal, "is")]
    #[test_case(Operator::GreaterThan, "is greater than")]
    #[test_case(Operator::In, "is in")]
    #[test_case(Operator::NotIn, "is not in")]
    #[test_case(Operator::NotEqual, "is not equal to")]
    fn operator_phrases(op: Operator, expected: &str) {
        assert_eq!(op.phrase(), expected);
    }

    #[test]
    fn in_and_not_in_have_distinct_phrases() {
        assert_ne!(Operator::In.phrase(), Operator::NotIn.phrase());
    }

    #[test]
    fn operator_symbol_lookup() {
        assert_eq!(Operator::from_symbol(">="), Some(Operator::GreaterOrEqual));
        assert_eq!(Operator::from_symbol("Not In"), Some(Operator::NotIn));
        assert_eq!(Operator::from_symbol("<>"), None);
    }

    #[test]
    fn function_phrases() {
        assert_eq!(FunctionKind::Avg.phrase(), "average");
        assert_eq!(FunctionKind::Count.phrase(), "number of");
        assert_eq!(FunctionKind::Count.name(), "Cnt");
    }
}
