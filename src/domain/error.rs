//! Tree errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::entities::NodeId;

/// Errors raised while building or querying a tree.
///
/// All of them are caller-data problems; none is transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A parent chain revisits an identifier; `path` lists the walk in visit order.
    #[error("Recursive Node to Parent relationship found. Path: {}", join_path(.path))]
    RecursiveRelationship { path: Vec<NodeId> },

    #[error("{0}")]
    NodeLookup(String),

    /// Path filtering re-entered a node on its own recursion stack.
    #[error("cyclic graph detected at node: {node}")]
    StructuralCycle { node: String },

    #[error("expected a JSON array of entities, found {found}")]
    NotAnArray { found: &'static str },

    #[error("entity at position {position} is not a JSON object")]
    InvalidEntity { position: usize },

    #[error("config error: {message}")]
    Config { message: String },
}

impl TreeError {
    pub(crate) fn no_node() -> Self {
        Self::NodeLookup("Tree: no node specified or node is null or undefined".to_string())
    }

    pub(crate) fn unknown_node(id: &NodeId) -> Self {
        Self::NodeLookup(format!("Tree: node {} does not exist in the current tree", id))
    }

    /// Visited path of a recursion failure.
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            Self::RecursiveRelationship { path } => Some(path),
            _ => None,
        }
    }
}

fn join_path(path: &[NodeId]) -> String {
    path.iter().join(",")
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
