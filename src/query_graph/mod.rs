//! Typed query-graph model: nodes, edges, display vocabulary and the graph
//! itself with its derived views (reference points, query subjects,
//! projections).

mod edge;
mod errors;
mod graph;
mod node;
mod vocabulary;

pub use edge::Edge;
pub use errors::GraphError;
pub use graph::QueryGraph;
pub use node::{Attribute, Function, Node, Relation, Value};
pub use vocabulary::{FunctionKind, Operator};
