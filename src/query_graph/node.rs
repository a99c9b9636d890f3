//! Node variants of the query graph.
//!
//! Node identity is structural, not allocation-based: two nodes are equal and
//! hash identically iff their case-insensitive signature matches. Hand-built
//! graphs routinely instantiate the same logical relation or attribute in
//! several places, and set membership (visited lists, reference points) must
//! still recognize them as one node.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::vocabulary::FunctionKind;

/// A table referenced by the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    /// Human-readable noun used in generated text ("student", "course", ...).
    pub label: String,
    pub alias: Option<String>,
}

impl Relation {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        Relation {
            name,
            label,
            alias: None,
        }
    }

    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Relation {
            name: name.into(),
            label: label.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A column of a relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub label: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        Attribute { name, label }
    }

    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// A literal operand. A value with an empty name is a wildcard that compares
/// equal to any other value, which generic sub-pattern matching relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value {
    pub name: String,
    pub label: String,
}

impl Value {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        Value { name, label }
    }

    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Value {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// An aggregate function applied to an attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub kind: FunctionKind,
    pub label: String,
}

impl Function {
    pub fn new(kind: FunctionKind) -> Self {
        Function {
            kind,
            label: kind.phrase().to_string(),
        }
    }

    pub fn labeled(kind: FunctionKind, label: impl Into<String>) -> Self {
        Function {
            kind,
            label: label.into(),
        }
    }
}

/// A node of the query graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Relation(Relation),
    Attribute(Attribute),
    Value(Value),
    Function(Function),
}

impl Node {
    pub fn relation(name: impl Into<String>, label: impl Into<String>) -> Node {
        Node::Relation(Relation::labeled(name, label))
    }

    pub fn attribute(name: impl Into<String>, label: impl Into<String>) -> Node {
        Node::Attribute(Attribute::labeled(name, label))
    }

    pub fn value(name: impl Into<String>) -> Node {
        Node::Value(Value::new(name))
    }

    pub fn value_labeled(name: impl Into<String>, label: impl Into<String>) -> Node {
        Node::Value(Value::labeled(name, label))
    }

    pub fn function(kind: FunctionKind) -> Node {
        Node::Function(Function::new(kind))
    }

    /// Case-insensitive identity key. All values share the constant signature
    /// `"value"` so that wildcard equality stays consistent with hashing.
    pub fn signature(&self) -> String {
        match self {
            Node::Relation(r) => r.name.to_lowercase(),
            Node::Attribute(a) => a.name.to_lowercase(),
            Node::Value(_) => "value".to_string(),
            Node::Function(f) => f.kind.name().to_lowercase(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Relation(r) => &r.label,
            Node::Attribute(a) => &a.label,
            Node::Value(v) => &v.label,
            Node::Function(f) => &f.label,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Node::Relation(_))
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, Node::Attribute(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Node::Value(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Node::Function(_))
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Node::Relation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Node::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Wildcard rule: an empty-named value matches any value.
            (Node::Value(a), Node::Value(b)) => {
                a.name.is_empty() || b.name.is_empty() || a.name.eq_ignore_ascii_case(&b.name)
            }
            (Node::Relation(_), Node::Relation(_))
            | (Node::Attribute(_), Node::Attribute(_))
            | (Node::Function(_), Node::Function(_)) => self.signature() == other.signature(),
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        self.signature().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
