use crate::arena::NodeId;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Structural contract violations.
///
/// These are programming errors on the caller's side (inserting at an index
/// past the end of a child list, removing a node that is not a child), not
/// recoverable editing conditions. Callers that hit one of these have already
/// broken a tree invariant upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("child index {index} out of range (parent has {len} children)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("node {0} is not a child of the given parent")]
    NotAChild(NodeId),

    #[error("node {0} has no parent")]
    NoParent(NodeId),
}

impl ModelError {
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
}
