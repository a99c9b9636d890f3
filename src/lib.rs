//! Queryspeak - English verbalization of database query graphs
//!
//! This crate turns a typed query graph (relations, attributes, values and
//! aggregate functions wired together with membership, join, selection and
//! predicate edges) into one natural-language sentence through:
//! - A structural graph model with interned nodes
//! - Reference-point selection over the graph's relations
//! - A multiple-reference-points traversal that accumulates typed clauses
//! - English clause rendering with grouping, having and ordering sentences

pub mod query_graph;
pub mod translator;

pub use query_graph::{Edge, FunctionKind, GraphError, Node, Operator, QueryGraph};
pub use translator::{translate, translate_from_subject, MrpTranslator, TranslateError};
