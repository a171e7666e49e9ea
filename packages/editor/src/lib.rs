//! # Protoform Editor
//!
//! Transactional editing engine for protocol form documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: parsed element maps → node arena     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + edit actions   │
//! │  - Contiguous-sibling selection             │
//! │  - Validated structural/value mutations     │
//! │  - Reversible Edit records, linear history  │
//! │  - Change notifications for the host UI     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: node arena → element maps            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The Document is the sole mutator**: all structure changes flow
//!    through [`Document::apply`]
//! 2. **Validate, mutate, record**: each action checks its preconditions
//!    before touching the tree, then pushes a reversible [`Edit`]
//! 3. **No partial commits**: a rejected action leaves tree and selection
//!    exactly as they were
//! 4. **Linear history**: undoing and then editing discards the redo tail
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protoform_editor::{Document, EditAction};
//!
//! let mut doc = Document::from_element("wash.pfm".into(), &parsed)?;
//!
//! doc.node_clicked(node, true);
//! doc.apply(EditAction::DuplicateFields)?;
//! doc.apply(EditAction::UndoLastAction)?;
//!
//! let out = doc.to_element();
//! ```

mod actions;
mod document;
mod edits;
mod errors;
mod selection;
mod undo_stack;

pub use actions::{EditAction, EditError};
pub use document::{Document, DocumentEvent};
pub use edits::{Edit, EditOp, PlacedNode, ValueChange};
pub use errors::EditorError;
pub use selection::Selection;
pub use undo_stack::UndoStack;

// Re-export boundary types for convenience, plus the visitor surface so
// hosts can scan a document without reaching into the model crate.
pub use protoform_model::visitor::{walk, walk_mut, Visitor, VisitorMut};
pub use protoform_model::{ElementData, Field, InputType, NodeId};
