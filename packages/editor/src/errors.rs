//! Error types for the editor

use crate::actions::EditError;
use protoform_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl EditorError {
    /// True for recoverable precondition failures (no preceding sibling, no
    /// grandparent, ...). These leave the document untouched and push no
    /// history entry; everything else signals a broken structural contract.
    pub fn is_precondition(&self) -> bool {
        matches!(self, EditorError::Edit(e) if e.is_precondition())
    }
}
