use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    /// The input graph breaks a structural invariant (wrong node kind at an
    /// edge endpoint, several aggregates on one attribute, malformed chains).
    /// Always fatal for the current translation.
    #[error("Malformed query graph: {0}")]
    InvariantViolation(String),

    #[error("Node '{0}' not found in the query graph")]
    UnknownNode(String),
}
