//! Graph-specific error types.

use hn_core::{HnError, NodeId, PipeId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Geometry and topology construction errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate { what: &'static str, x: f64, y: f64 },

    /// A street polyline has fewer than two vertices.
    DegenerateLine { line: usize, vertices: usize },

    /// A pipe refers to a node that doesn't exist.
    InvalidNodeRef { pipe: PipeId, node: NodeId },

    /// A pipe starts and ends at the same node.
    SelfLoop { pipe: PipeId },

    /// A pipe has a non-positive or non-finite length.
    InvalidLength { pipe: PipeId, length: f64 },

    /// Adjacency list is inconsistent (pipe in node's list but pipe doesn't touch node).
    InconsistentAdjacency { pipe: PipeId, node: NodeId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::NonFiniteCoordinate { what, x, y } => {
                write!(f, "Non-finite coordinate in {}: ({}, {})", what, x, y)
            }
            GraphError::DegenerateLine { line, vertices } => {
                write!(
                    f,
                    "Street line {} has {} vertices (expected at least 2)",
                    line, vertices
                )
            }
            GraphError::InvalidNodeRef { pipe, node } => {
                write!(f, "Pipe {} refers to non-existent node {}", pipe, node)
            }
            GraphError::SelfLoop { pipe } => {
                write!(f, "Pipe {} starts and ends at the same node", pipe)
            }
            GraphError::InvalidLength { pipe, length } => {
                write!(f, "Pipe {} has invalid length {}", pipe, length)
            }
            GraphError::InconsistentAdjacency { pipe, node } => {
                write!(
                    f,
                    "Pipe {} in node {}'s adjacency list but doesn't touch that node",
                    pipe, node
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for HnError {
    fn from(err: GraphError) -> Self {
        HnError::Geometry {
            what: err.to_string(),
        }
    }
}
