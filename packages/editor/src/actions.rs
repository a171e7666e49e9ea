//! # Edit Actions
//!
//! The full vocabulary of editing operations a host UI can request, plus the
//! precondition failures they can report.
//!
//! Every structural or value mutation on a document goes through
//! [`crate::Document::apply`] with one of these variants. Each committed
//! action follows the same three-phase contract:
//!
//! 1. **Validate** preconditions against the current selection and tree shape
//! 2. **Mutate** via the arena primitives
//! 3. **Record** a reversible [`crate::Edit`] and notify observers
//!
//! Precondition failures abort in phase 1 with a named [`EditError`] and
//! leave the document completely unchanged. Operations over an empty
//! selection are successful no-ops.

use protoform_model::{ElementData, ModelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Editing operations, dispatched by [`crate::Document::apply`].
///
/// Undo and redo travel through the same enum so a host can bind every menu
/// entry to one dispatch point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EditAction {
    /// Move the preceding sibling below the highlighted block.
    MoveFieldsUp,
    /// Move the succeeding sibling above the highlighted block.
    MoveFieldsDown,
    /// Detach every highlighted field from the tree.
    DeleteFields,
    /// Insert one blank field after the last highlighted field.
    AddNewField,
    /// Make the highlighted block children of its preceding sibling.
    DemoteFields,
    /// Raise the highlighted block to siblings of its parent.
    PromoteFields,
    /// Deep-copy the highlighted block and insert the copies after it.
    DuplicateFields,
    /// Snapshot the highlighted fields to the clipboard.
    CopyFields,
    /// Deep-copy the clipboard contents after the last highlighted field.
    PasteFields,
    /// Deep-copy externally supplied elements into the document.
    ImportFields { elements: Vec<ElementData> },
    /// Copy every field's default value into its value.
    LoadDefaults,
    /// Clear every field's value.
    ClearFields,
    /// Scale the numeric values of the highlighted fields.
    MultiplyValues { factor: f64 },
    /// Revert the most recent committed action.
    UndoLastAction,
    /// Reapply the most recently undone action.
    RedoAction,
}

impl EditAction {
    /// Presentation name, used for undo/redo menu labels.
    pub fn label(&self) -> &'static str {
        match self {
            EditAction::MoveFieldsUp => "Move Fields Up",
            EditAction::MoveFieldsDown => "Move Fields Down",
            EditAction::DeleteFields => "Delete Fields",
            EditAction::AddNewField => "Add New Field",
            EditAction::DemoteFields => "Demote Fields",
            EditAction::PromoteFields => "Promote Fields",
            EditAction::DuplicateFields => "Duplicate Fields",
            EditAction::CopyFields => "Copy Fields",
            EditAction::PasteFields => "Paste Fields",
            EditAction::ImportFields { .. } => "Import Fields",
            EditAction::LoadDefaults => "Load Default Values",
            EditAction::ClearFields => "Clear Fields",
            EditAction::MultiplyValues { .. } => "Multiply Values",
            EditAction::UndoLastAction => "Undo Last Action",
            EditAction::RedoAction => "Redo",
        }
    }
}

/// Why an edit was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Move-up or demote requires a sibling before the highlighted block.
    #[error("no preceding sibling")]
    NoPrecedingSibling,

    /// Move-down requires a sibling after the highlighted block.
    #[error("no succeeding sibling")]
    NoSucceedingSibling,

    /// Promote requires the block's parent to not be the root.
    #[error("no grandparent: fields are already at the top level")]
    NoGrandparent,

    /// Structural contract violation surfaced by the arena.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EditError {
    pub fn is_precondition(&self) -> bool {
        !matches!(self, EditError::Model(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serde_round_trip() {
        let action = EditAction::MultiplyValues { factor: 2.5 };
        let json = serde_json::to_string(&action).unwrap();
        let back: EditAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn test_labels_match_menu_names() {
        assert_eq!(EditAction::MoveFieldsUp.label(), "Move Fields Up");
        assert_eq!(EditAction::LoadDefaults.label(), "Load Default Values");
        assert_eq!(EditAction::RedoAction.label(), "Redo");
    }

    #[test]
    fn test_precondition_classification() {
        assert!(EditError::NoGrandparent.is_precondition());
        assert!(!EditError::Model(ModelError::index_out_of_bounds(3, 1)).is_precondition());
    }
}
