//! Edge variants of the query graph.

use serde::{Deserialize, Serialize};

use super::vocabulary::Operator;

/// A directed edge of the query graph. Each variant carries the phrase used
/// when the edge appears in generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Edge {
    /// Attribute → relation: the attribute is projected by the relation.
    Membership { label: String },
    /// Relation ↔ relation, standing in for a collapsed join-through-attribute
    /// path. Each direction carries its own phrase.
    Join { label: String },
    /// Attribute → value (selection predicate) or attribute/function
    /// (join, correlation or nested-subquery predicate).
    Predicate { operator: Operator },
    /// Relation ↔ attribute: the relation is restricted by a condition on the
    /// attribute. Attribute → relation in correlation cases.
    Selection { label: String },
    /// Attribute ↔ aggregate function applied to it.
    Transformation,
    /// Tags an attribute as belonging to GROUP BY.
    Grouping { label: String },
    /// Tags an attribute as belonging to HAVING.
    Having { label: String },
    /// Tags an attribute as belonging to ORDER BY.
    Order { label: String },
    /// Matches any concrete edge; only used for generic sub-pattern
    /// extraction, never constructed by the translation engine.
    Wildcard,
}

impl Edge {
    pub fn membership() -> Edge {
        Edge::Membership {
            label: "of".to_string(),
        }
    }

    pub fn join(label: impl Into<String>) -> Edge {
        Edge::Join {
            label: label.into(),
        }
    }

    pub fn predicate(operator: Operator) -> Edge {
        Edge::Predicate { operator }
    }

    pub fn selection() -> Edge {
        Edge::Selection {
            label: "whose".to_string(),
        }
    }

    pub fn grouping() -> Edge {
        Edge::Grouping {
            label: "group by".to_string(),
        }
    }

    pub fn having() -> Edge {
        Edge::Having {
            label: "having".to_string(),
        }
    }

    pub fn order() -> Edge {
        Edge::Order {
            label: "order by".to_string(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Edge::Membership { label }
            | Edge::Join { label }
            | Edge::Selection { label }
            | Edge::Grouping { label }
            | Edge::Having { label }
            | Edge::Order { label } => label,
            Edge::Predicate { operator } => operator.phrase(),
            Edge::Transformation | Edge::Wildcard => "",
        }
    }

    /// Textual template for a single hop: `src label + edge label + dst label`.
    pub fn one_hop_description(&self, src_label: &str, dst_label: &str) -> String {
        match self {
            Edge::Wildcard => String::new(),
            _ => format!("{} {} {}", src_label, self.label(), dst_label),
        }
    }

    /// Structural match used by generic sub-pattern comparison: a wildcard
    /// matches anything, predicates additionally compare operators.
    pub fn matches(&self, other: &Edge) -> bool {
        match (self, other) {
            (Edge::Wildcard, _) | (_, Edge::Wildcard) => true,
            (Edge::Predicate { operator: a }, Edge::Predicate { operator: b }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Edge::Membership { .. })
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Edge::Selection { .. })
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, Edge::Predicate { .. })
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self, Edge::Transformation)
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Edge::Predicate { operator } => Some(*operator),
            _ => None,
        }
    }
}
