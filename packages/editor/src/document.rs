//! # Document Handle
//!
//! Core editing state for one open protocol form.
//!
//! A Document owns the node arena, the highlighted selection, the clipboard
//! and the undo history, and is the single mutator of tree structure. Hosts
//! feed it UI events (node clicks, edit actions, attribute changes) and
//! drain a queue of change notifications back out.
//!
//! ## Lifecycle
//!
//! ```text
//! Parse → Build → Edit ⇄ Undo/Redo → Serialize
//!   ↓       ↓       ↓         ↓          ↓
//! maps    arena  actions   history     maps
//! ```
//!
//! All operations run to completion synchronously; an operation either
//! commits in full or fails in its validation phase before any mutation.

use crate::actions::{EditAction, EditError};
use crate::edits::{Edit, EditOp, PlacedNode, ValueChange};
use crate::errors::EditorError;
use crate::selection::Selection;
use crate::undo_stack::UndoStack;
use protoform_model::field::{DEFAULT, ELEMENT_NAME, VALUE};
use protoform_model::visitor::{walk_mut, VisitorMut};
use protoform_model::{
    build_tree, get_document_id, serialize_tree, Arena, ElementData, Field, InputType, NodeId,
};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Change notification for the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The highlighted set changed.
    SelectionChanged,
    /// Tree structure or field values changed.
    TreeUpdated,
    /// The unsaved-changes flag flipped.
    DirtyChanged(bool),
    /// Undo/redo availability or labels changed.
    HistoryChanged,
}

/// Editable protocol form document.
#[derive(Debug)]
pub struct Document {
    /// Path of the source file this document was built from.
    pub path: PathBuf,

    /// Increments on every committed mutation.
    pub version: u64,

    document_id: String,
    arena: Arena,
    root: NodeId,
    selection: Selection,
    clipboard: Vec<NodeId>,
    history: UndoStack,
    dirty: bool,
    events: Vec<DocumentEvent>,
}

impl Document {
    /// Blank document: a protocol title root with one empty step, the shape
    /// a new untitled file opens with.
    pub fn blank(path: PathBuf) -> Self {
        let mut arena = Arena::new();

        let mut title = Field::blank(InputType::ProtocolTitle);
        title.set(ELEMENT_NAME, Some("Title - click to edit"));
        let root = arena.alloc(title);

        let first_step = arena.alloc(Field::blank(InputType::FixedStep));
        arena.push_child(root, first_step);
        arena.set_parent(first_step, Some(root));

        Self::with_tree(path, arena, root)
    }

    /// Build a document from the parsed boundary representation.
    pub fn from_element(path: PathBuf, element: &ElementData) -> Self {
        let mut arena = Arena::new();
        let root = build_tree(&mut arena, element);
        Self::with_tree(path, arena, root)
    }

    fn with_tree(path: PathBuf, arena: Arena, root: NodeId) -> Self {
        let document_id = get_document_id(&path.to_string_lossy());
        Self {
            path,
            version: 0,
            document_id,
            arena,
            root,
            selection: Selection::new(),
            clipboard: Vec::new(),
            history: UndoStack::new(),
            dirty: false,
            events: Vec::new(),
        }
    }

    /// Serialize the whole tree back to the boundary representation.
    pub fn to_element(&self) -> ElementData {
        serialize_tree(&self.arena, self.root)
    }

    /// Replace the document contents with a freshly parsed tree (file
    /// reload). Selection, clipboard and history are dropped with the old
    /// arena; the path and document id stay.
    pub fn reload(&mut self, element: &ElementData) {
        let mut arena = Arena::new();
        self.root = build_tree(&mut arena, element);
        self.arena = arena;
        self.selection.clear();
        self.clipboard.clear();
        self.history.clear();
        self.version += 1;
        if self.dirty {
            self.dirty = false;
            self.emit(DocumentEvent::DirtyChanged(false));
        }
        self.emit(DocumentEvent::SelectionChanged);
        self.emit(DocumentEvent::TreeUpdated);
        self.emit(DocumentEvent::HistoryChanged);
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Highlighted nodes in sibling order.
    pub fn highlighted(&self) -> &[NodeId] {
        self.selection.highlighted()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Host saved the file: clear the unsaved-changes flag.
    pub fn mark_saved(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.emit(DocumentEvent::DirtyChanged(false));
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.history.redo_label()
    }

    /// Drain pending change notifications.
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// A field panel was clicked.
    pub fn node_clicked(&mut self, node: NodeId, clear_others: bool) {
        self.selection.node_clicked(&self.arena, node, clear_others);
        self.emit(DocumentEvent::SelectionChanged);
    }

    /// Single dispatch point for all edit actions.
    ///
    /// Precondition failures come back as [`EditError`] values with the
    /// document untouched; operations over an empty selection succeed
    /// without effect.
    pub fn apply(&mut self, action: EditAction) -> Result<(), EditorError> {
        debug!(action = action.label(), "applying edit action");

        let result = match &action {
            EditAction::UndoLastAction => self.undo(),
            EditAction::RedoAction => self.redo(),
            EditAction::MoveFieldsUp => self.move_fields_up(),
            EditAction::MoveFieldsDown => self.move_fields_down(),
            EditAction::DeleteFields => self.delete_fields(),
            EditAction::AddNewField => self.add_new_field(),
            EditAction::DemoteFields => self.demote_fields(),
            EditAction::PromoteFields => self.promote_fields(),
            EditAction::DuplicateFields => self.duplicate_fields(),
            EditAction::CopyFields => self.copy_fields(),
            EditAction::PasteFields => self.paste_fields(),
            EditAction::ImportFields { elements } => self.import_fields(elements),
            EditAction::LoadDefaults => self.load_defaults(),
            EditAction::ClearFields => self.clear_fields(),
            EditAction::MultiplyValues { factor } => self.multiply_values(*factor),
        };

        if let Err(err) = &result {
            if err.is_precondition() {
                warn!(action = action.label(), reason = %err, "edit action rejected");
            }
        }
        result
    }

    /// Change one attribute of one field (the property-panel surface).
    ///
    /// With `undoable` the change lands on the history; without, it only
    /// marks the document edited (transient UI state such as collapsing).
    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: Option<&str>, undoable: bool) {
        let selection_before = self.selection.clone();
        let before = self.arena.field_mut(node).set(key, value);
        if before.as_deref() == value {
            return;
        }

        if undoable {
            let change = ValueChange {
                node,
                key: key.to_string(),
                before,
                after: value.map(String::from),
            };
            self.push_edit(
                "Edit Attribute",
                EditOp::SetValues {
                    changes: vec![change],
                },
                selection_before,
            );
        } else {
            self.mark_edited();
        }
    }

    // ---- internal plumbing ------------------------------------------------

    fn emit(&mut self, event: DocumentEvent) {
        self.events.push(event);
    }

    fn mark_edited(&mut self) {
        self.version += 1;
        self.emit(DocumentEvent::TreeUpdated);
        if !self.dirty {
            self.dirty = true;
            self.emit(DocumentEvent::DirtyChanged(true));
        }
    }

    fn push_edit(&mut self, label: &'static str, op: EditOp, selection_before: Selection) {
        let edit = Edit::new(label, op, selection_before, self.selection.clone());
        self.history.push(edit);
        self.mark_edited();
        self.emit(DocumentEvent::HistoryChanged);
    }

    /// The highlighted block as (nodes, parent, first index, last index).
    /// `None` when nothing (or only the root) is highlighted.
    fn block(&self) -> Option<(Vec<NodeId>, NodeId, usize, usize)> {
        let nodes = self.selection.highlighted().to_vec();
        let first = *nodes.first()?;
        let parent = self.arena.parent(first)?;
        let first_index = self.arena.index_within_siblings(first)?;
        let last_index = first_index + nodes.len() - 1;
        Some((nodes, parent, first_index, last_index))
    }

    /// Where new fields land: after the last highlighted field, or appended
    /// to the root when nothing is highlighted.
    fn insertion_point(&self) -> (NodeId, usize) {
        match self.block() {
            Some((_, parent, _, last_index)) => (parent, last_index + 1),
            None => (self.root, self.arena.child_count(self.root)),
        }
    }

    // ---- edit operations --------------------------------------------------

    fn undo(&mut self) -> Result<(), EditorError> {
        if self.history.undo(&mut self.arena, &mut self.selection)? {
            self.mark_edited();
            self.emit(DocumentEvent::SelectionChanged);
            self.emit(DocumentEvent::HistoryChanged);
        }
        Ok(())
    }

    fn redo(&mut self) -> Result<(), EditorError> {
        if self.history.redo(&mut self.arena, &mut self.selection)? {
            self.mark_edited();
            self.emit(DocumentEvent::SelectionChanged);
            self.emit(DocumentEvent::HistoryChanged);
        }
        Ok(())
    }

    /// Swap the highlighted block with its preceding sibling by relocating
    /// that sibling to just after the block (one move, not n swaps).
    fn move_fields_up(&mut self) -> Result<(), EditorError> {
        let Some((nodes, parent, first_index, _)) = self.block() else {
            return Ok(());
        };
        if first_index == 0 {
            return Err(EditError::NoPrecedingSibling.into());
        }
        let predecessor = self
            .arena
            .child_at(parent, first_index - 1)
            .ok_or(EditError::NoPrecedingSibling)?;

        let selection_before = self.selection.clone();
        let op = EditOp::Relocate {
            parent,
            node: predecessor,
            from: first_index - 1,
            to: first_index - 1 + nodes.len(),
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;
        self.push_edit(EditAction::MoveFieldsUp.label(), op, selection_before);
        Ok(())
    }

    /// Symmetric to move-up: the succeeding sibling relocates to just before
    /// the block.
    fn move_fields_down(&mut self) -> Result<(), EditorError> {
        let Some((_, parent, first_index, last_index)) = self.block() else {
            return Ok(());
        };
        let successor = self
            .arena
            .child_at(parent, last_index + 1)
            .ok_or(EditError::NoSucceedingSibling)?;

        let selection_before = self.selection.clone();
        let op = EditOp::Relocate {
            parent,
            node: successor,
            from: last_index + 1,
            to: first_index,
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;
        self.push_edit(EditAction::MoveFieldsDown.label(), op, selection_before);
        Ok(())
    }

    fn delete_fields(&mut self) -> Result<(), EditorError> {
        let Some((nodes, parent, first_index, _)) = self.block() else {
            return Ok(());
        };
        let selection_before = self.selection.clone();

        let removed = nodes
            .iter()
            .enumerate()
            .map(|(offset, &node)| PlacedNode {
                node,
                parent,
                index: first_index + offset,
            })
            .collect();
        let op = EditOp::Delete { removed };
        op.apply(&mut self.arena).map_err(EditError::from)?;

        self.selection.clear();
        self.emit(DocumentEvent::SelectionChanged);
        self.push_edit(EditAction::DeleteFields.label(), op, selection_before);
        Ok(())
    }

    fn add_new_field(&mut self) -> Result<(), EditorError> {
        let selection_before = self.selection.clone();
        let (parent, index) = self.insertion_point();

        let node = self.arena.alloc(Field::blank(InputType::FixedStep));
        let op = EditOp::Insert {
            parent,
            index,
            nodes: vec![node],
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;

        self.selection.select_range(&self.arena, parent, index, index);
        self.emit(DocumentEvent::SelectionChanged);
        self.push_edit(EditAction::AddNewField.label(), op, selection_before);
        Ok(())
    }

    /// Raise the highlighted block to siblings of its parent, inserted just
    /// after it. Trailing siblings of the block stay nested: the last block
    /// member adopts them first.
    fn promote_fields(&mut self) -> Result<(), EditorError> {
        let Some((nodes, parent, first_index, last_index)) = self.block() else {
            return Ok(());
        };
        let grandparent = self.arena.parent(parent).ok_or(EditError::NoGrandparent)?;
        let parent_index = self
            .arena
            .index_within_siblings(parent)
            .ok_or(EditError::NoGrandparent)?;

        let moved: Vec<PlacedNode> = nodes
            .iter()
            .enumerate()
            .map(|(offset, &node)| PlacedNode {
                node,
                parent,
                index: first_index + offset,
            })
            .collect();
        let new_indices: Vec<usize> = (0..nodes.len()).map(|j| parent_index + 1 + j).collect();
        let adopted: Vec<PlacedNode> = self.arena.children(parent)[last_index + 1..]
            .iter()
            .enumerate()
            .map(|(offset, &node)| PlacedNode {
                node,
                parent,
                index: last_index + 1 + offset,
            })
            .collect();
        let adopted_by = moved[moved.len() - 1].node;

        let selection_before = self.selection.clone();
        let op = EditOp::Promote {
            moved,
            new_parent: grandparent,
            new_indices,
            adopted,
            adopted_by,
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;
        self.push_edit(EditAction::PromoteFields.label(), op, selection_before);
        Ok(())
    }

    /// Lower the highlighted block under its preceding sibling, appended in
    /// original order.
    fn demote_fields(&mut self) -> Result<(), EditorError> {
        let Some((nodes, parent, first_index, _)) = self.block() else {
            return Ok(());
        };
        if first_index == 0 {
            return Err(EditError::NoPrecedingSibling.into());
        }
        let new_parent = self
            .arena
            .child_at(parent, first_index - 1)
            .ok_or(EditError::NoPrecedingSibling)?;

        let selection_before = self.selection.clone();
        let op = EditOp::Demote {
            nodes,
            old_parent: parent,
            first_index,
            new_parent,
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;
        self.push_edit(EditAction::DemoteFields.label(), op, selection_before);
        Ok(())
    }

    fn duplicate_fields(&mut self) -> Result<(), EditorError> {
        let sources = self.selection.highlighted().to_vec();
        self.insert_copies(&sources, EditAction::DuplicateFields.label())
    }

    fn copy_fields(&mut self) -> Result<(), EditorError> {
        if self.selection.is_empty() {
            return Ok(());
        }
        // Snapshot only: not a mutation, so no history entry and no dirty.
        self.clipboard = self.selection.highlighted().to_vec();
        Ok(())
    }

    fn paste_fields(&mut self) -> Result<(), EditorError> {
        let sources = self.clipboard.clone();
        self.insert_copies(&sources, EditAction::PasteFields.label())
    }

    fn import_fields(&mut self, elements: &[ElementData]) -> Result<(), EditorError> {
        if elements.is_empty() {
            return Ok(());
        }
        let selection_before = self.selection.clone();
        let (parent, index) = self.insertion_point();

        let nodes: Vec<NodeId> = elements
            .iter()
            .map(|element| build_tree(&mut self.arena, element))
            .collect();
        let count = nodes.len();
        let op = EditOp::Insert { parent, index, nodes };
        op.apply(&mut self.arena).map_err(EditError::from)?;

        self.selection
            .select_range(&self.arena, parent, index, index + count - 1);
        self.emit(DocumentEvent::SelectionChanged);
        self.push_edit("Import Fields", op, selection_before);
        Ok(())
    }

    /// Deep-copy `sources` and insert the copies after the last highlighted
    /// field, then highlight the new contiguous range.
    fn insert_copies(&mut self, sources: &[NodeId], label: &'static str) -> Result<(), EditorError> {
        if sources.is_empty() {
            return Ok(());
        }
        let selection_before = self.selection.clone();
        let (parent, index) = self.insertion_point();

        let copies: Vec<NodeId> = sources
            .iter()
            .map(|&source| self.arena.duplicate_subtree(source))
            .collect();
        let count = copies.len();
        let op = EditOp::Insert {
            parent,
            index,
            nodes: copies,
        };
        op.apply(&mut self.arena).map_err(EditError::from)?;

        self.selection
            .select_range(&self.arena, parent, index, index + count - 1);
        self.emit(DocumentEvent::SelectionChanged);
        self.push_edit(label, op, selection_before);
        Ok(())
    }

    fn load_defaults(&mut self) -> Result<(), EditorError> {
        let selection_before = self.selection.clone();
        let mut visitor = CopyDefaultValues::default();
        walk_mut(&mut self.arena, self.root, &mut visitor);
        if visitor.changes.is_empty() {
            return Ok(());
        }
        self.push_edit(
            EditAction::LoadDefaults.label(),
            EditOp::SetValues {
                changes: visitor.changes,
            },
            selection_before,
        );
        Ok(())
    }

    fn clear_fields(&mut self) -> Result<(), EditorError> {
        let selection_before = self.selection.clone();
        let mut visitor = ClearValues::default();
        walk_mut(&mut self.arena, self.root, &mut visitor);
        if visitor.changes.is_empty() {
            return Ok(());
        }
        self.push_edit(
            EditAction::ClearFields.label(),
            EditOp::SetValues {
                changes: visitor.changes,
            },
            selection_before,
        );
        Ok(())
    }

    /// Scale the numeric values of the highlighted fields. Fields whose
    /// value does not parse as a number are left untouched.
    fn multiply_values(&mut self, factor: f64) -> Result<(), EditorError> {
        let Some((nodes, ..)) = self.block() else {
            return Ok(());
        };
        let selection_before = self.selection.clone();

        let mut changes = Vec::new();
        for node in nodes {
            let field = self.arena.field_mut(node);
            let Some(value) = field.get(VALUE) else {
                continue;
            };
            let Ok(number) = value.parse::<f64>() else {
                continue;
            };
            let scaled = format_number(number * factor);
            let before = field.set(VALUE, Some(&scaled));
            if before.as_deref() != Some(scaled.as_str()) {
                changes.push(ValueChange {
                    node,
                    key: VALUE.to_string(),
                    before,
                    after: Some(scaled),
                });
            }
        }

        if changes.is_empty() {
            return Ok(());
        }
        self.push_edit(
            EditAction::MultiplyValues { factor }.label(),
            EditOp::SetValues { changes },
            selection_before,
        );
        Ok(())
    }
}

/// Copy every field's `default` attribute into its `value`.
#[derive(Default)]
struct CopyDefaultValues {
    changes: Vec<ValueChange>,
}

impl VisitorMut for CopyDefaultValues {
    fn visit(&mut self, id: NodeId, field: &mut Field) {
        let Some(default) = field.get(DEFAULT).map(String::from) else {
            return;
        };
        let before = field.set(VALUE, Some(&default));
        if before.as_deref() != Some(default.as_str()) {
            self.changes.push(ValueChange {
                node: id,
                key: VALUE.to_string(),
                before,
                after: Some(default),
            });
        }
    }
}

/// Remove every field's `value` attribute.
#[derive(Default)]
struct ClearValues {
    changes: Vec<ValueChange>,
}

impl VisitorMut for ClearValues {
    fn visit(&mut self, id: NodeId, field: &mut Field) {
        let before = field.set(VALUE, None);
        if before.is_some() {
            self.changes.push(ValueChange {
                node: id,
                key: VALUE.to_string(),
                before,
                after: None,
            });
        }
    }
}

/// Render a scaled value without a spurious trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_document_shape() {
        let doc = Document::blank(PathBuf::from("untitled.pfm"));

        let root = doc.root();
        assert_eq!(doc.arena().field(root).input_type(), InputType::ProtocolTitle);
        assert_eq!(doc.arena().field(root).name(), Some("Title - click to edit"));
        assert_eq!(doc.arena().child_count(root), 1);

        let step = doc.arena().child_at(root, 0).unwrap();
        assert_eq!(doc.arena().field(step).input_type(), InputType::FixedStep);
        assert!(!doc.is_dirty());
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_document_id_derives_from_path() {
        let a = Document::blank(PathBuf::from("/protocols/a.pfm"));
        let b = Document::blank(PathBuf::from("/protocols/b.pfm"));
        assert_ne!(a.document_id(), b.document_id());
    }

    #[test]
    fn test_add_field_selects_it_and_dirties_document() {
        let mut doc = Document::blank(PathBuf::from("untitled.pfm"));
        doc.apply(EditAction::AddNewField).unwrap();

        assert_eq!(doc.arena().child_count(doc.root()), 2);
        let added = doc.arena().child_at(doc.root(), 1).unwrap();
        assert_eq!(doc.highlighted(), &[added]);
        assert!(doc.is_dirty());
        assert_eq!(doc.undo_label(), Some("Add New Field"));

        let events = doc.take_events();
        assert!(events.contains(&DocumentEvent::SelectionChanged));
        assert!(events.contains(&DocumentEvent::TreeUpdated));
        assert!(events.contains(&DocumentEvent::DirtyChanged(true)));
    }

    #[test]
    fn test_set_attribute_undoable_lands_on_history() {
        let mut doc = Document::blank(PathBuf::from("untitled.pfm"));
        let step = doc.arena().child_at(doc.root(), 0).unwrap();

        doc.set_attribute(step, VALUE, Some("37"), true);
        assert_eq!(doc.arena().field(step).get(VALUE), Some("37"));
        assert_eq!(doc.undo_label(), Some("Edit Attribute"));

        doc.apply(EditAction::UndoLastAction).unwrap();
        assert_eq!(doc.arena().field(step).get(VALUE), None);
    }

    #[test]
    fn test_set_attribute_non_undoable_only_dirties() {
        let mut doc = Document::blank(PathBuf::from("untitled.pfm"));
        let step = doc.arena().child_at(doc.root(), 0).unwrap();

        doc.set_attribute(step, "substepsCollapsed", Some("true"), false);
        assert!(doc.is_dirty());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_mark_saved_clears_dirty_flag() {
        let mut doc = Document::blank(PathBuf::from("untitled.pfm"));
        doc.apply(EditAction::AddNewField).unwrap();
        assert!(doc.is_dirty());

        doc.take_events();
        doc.mark_saved();
        assert!(!doc.is_dirty());
        assert_eq!(doc.take_events(), vec![DocumentEvent::DirtyChanged(false)]);
    }

    #[test]
    fn test_reload_replaces_tree_and_drops_history() {
        let mut doc = Document::blank(PathBuf::from("untitled.pfm"));
        doc.apply(EditAction::AddNewField).unwrap();
        assert!(doc.can_undo());
        assert!(doc.is_dirty());

        let parsed = ElementData::new("ProtocolTitle")
            .with_attribute(ELEMENT_NAME, "Fetched")
            .with_child(ElementData::new("TextField"));
        doc.take_events();
        doc.reload(&parsed);

        assert_eq!(doc.arena().field(doc.root()).name(), Some("Fetched"));
        assert!(!doc.can_undo());
        assert!(doc.highlighted().is_empty());
        assert!(!doc.is_dirty());

        let events = doc.take_events();
        assert!(events.contains(&DocumentEvent::DirtyChanged(false)));
        assert!(events.contains(&DocumentEvent::HistoryChanged));
    }

    #[test]
    fn test_format_number_trims_whole_values() {
        assert_eq!(format_number(6.0), "6");
        assert_eq!(format_number(2.5), "2.5");
    }
}
