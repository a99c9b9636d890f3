use thiserror::Error;

use crate::query_graph::GraphError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslateError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The graph encodes a construct this engine refuses to verbalize, such
    /// as a predicate over an unvisited relation's attribute (a nested
    /// subquery). Translation fails rather than emitting a misleading
    /// sentence.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Having condition without a grouping: {0}")]
    HavingWithoutGrouping(String),
}
