//! # Undo/Redo Stack
//!
//! Linear history of [`Edit`] records.
//!
//! ## Design
//!
//! - Each committed action captures its inverse before being pushed
//! - Undo reverts the record and moves it to the redo stack
//! - Redo reapplies the record's forward mutation
//! - A new push clears the redo stack (linear history, no branches)
//! - Undo/redo at a history boundary are silent no-ops

use crate::edits::Edit;
use crate::selection::Selection;
use protoform_model::{Arena, ModelResult};

/// Undo/redo history for one document.
#[derive(Debug, Default)]
pub struct UndoStack {
    /// Committed edits, most recent last.
    undo_stack: Vec<Edit>,

    /// Undone edits, most recent last.
    redo_stack: Vec<Edit>,

    /// Maximum number of undo levels (0 = unlimited).
    max_levels: usize,
}

impl UndoStack {
    /// New stack with the default history depth (100).
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a committed edit.
    ///
    /// Any previously undone edits are discarded: after a rollback point is
    /// overwritten the branch is irrecoverable.
    pub fn push(&mut self, edit: Edit) {
        self.undo_stack.push(edit);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Revert the most recent edit. Returns `false` (and touches nothing)
    /// when there is nothing to undo.
    pub fn undo(&mut self, arena: &mut Arena, selection: &mut Selection) -> ModelResult<bool> {
        let Some(edit) = self.undo_stack.pop() else {
            return Ok(false);
        };

        edit.op.revert(arena)?;
        *selection = edit.selection_before.clone();
        self.redo_stack.push(edit);
        Ok(true)
    }

    /// Reapply the most recently undone edit. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self, arena: &mut Arena, selection: &mut Selection) -> ModelResult<bool> {
        let Some(edit) = self.redo_stack.pop() else {
            return Ok(false);
        };

        edit.op.apply(arena)?;
        *selection = edit.selection_after.clone();
        self.undo_stack.push(edit);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Presentation name of the next undoable action, for menu labels.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo_stack.last().map(|edit| edit.label)
    }

    /// Presentation name of the next redoable action.
    pub fn redo_label(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|edit| edit.label)
    }

    /// Drop all history (document reset / reload).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::EditOp;
    use protoform_model::Field;

    fn insert_edit(arena: &mut Arena, root: protoform_model::NodeId, label: &'static str) -> Edit {
        let node = arena.alloc(Field::new());
        let op = EditOp::Insert {
            parent: root,
            index: arena.child_count(root),
            nodes: vec![node],
        };
        op.apply(arena).unwrap();
        Edit::new(label, op, Selection::new(), Selection::new())
    }

    #[test]
    fn test_empty_stack_is_a_no_op() {
        let mut arena = Arena::new();
        let root = arena.alloc(Field::new());
        let mut selection = Selection::new();
        let mut stack = UndoStack::new();

        assert!(!stack.undo(&mut arena, &mut selection).unwrap());
        assert!(!stack.redo(&mut arena, &mut selection).unwrap());
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_label(), None);
    }

    #[test]
    fn test_undo_moves_edit_to_redo_stack() {
        let mut arena = Arena::new();
        let root = arena.alloc(Field::new());
        let mut selection = Selection::new();
        let mut stack = UndoStack::new();

        let edit = insert_edit(&mut arena, root, "Add New Field");
        stack.push(edit);
        assert_eq!(stack.undo_label(), Some("Add New Field"));

        assert!(stack.undo(&mut arena, &mut selection).unwrap());
        assert_eq!(arena.child_count(root), 0);
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_label(), Some("Add New Field"));

        assert!(stack.redo(&mut arena, &mut selection).unwrap());
        assert_eq!(arena.child_count(root), 1);
    }

    #[test]
    fn test_new_push_clears_redo_tail() {
        let mut arena = Arena::new();
        let root = arena.alloc(Field::new());
        let mut selection = Selection::new();
        let mut stack = UndoStack::new();

        let edit = insert_edit(&mut arena, root, "Add New Field");
        stack.push(edit);
        stack.undo(&mut arena, &mut selection).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        let edit = insert_edit(&mut arena, root, "Duplicate Fields");
        stack.push(edit);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut arena = Arena::new();
        let root = arena.alloc(Field::new());
        let mut stack = UndoStack::with_max_levels(2);

        for _ in 0..3 {
            let edit = insert_edit(&mut arena, root, "Add New Field");
            stack.push(edit);
        }

        assert_eq!(stack.undo_levels(), 2);
    }
}
