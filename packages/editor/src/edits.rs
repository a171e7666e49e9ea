//! # Edit Records
//!
//! Reversible descriptions of structural and value mutations.
//!
//! ## Design
//!
//! - Every committed action captures its inverse state *at apply time*:
//!   affected node ids, their (parent, index) pairs, and prior attribute
//!   values. Undo replays the captured pairs; it never recomputes positions
//!   from the current tree.
//! - Redo replays the forward transformation from the same captured state.
//!   History is linear, so the tree at redo time is identical to the tree
//!   the record was captured against.
//! - Each record also snapshots the selection before and after the action,
//!   so undo/redo resynchronize the highlighted set along with the tree.
//!
//! [`EditOp::apply`] is the single implementation of each forward mutation:
//! the document builds the record first, then applies it, then pushes it.

use crate::selection::Selection;
use protoform_model::{Arena, ModelResult, NodeId};

/// A node together with its captured (parent, index) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedNode {
    pub node: NodeId,
    pub parent: NodeId,
    pub index: usize,
}

/// Prior and new value of one attribute on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub node: NodeId,
    pub key: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// One reversible mutation, with enough captured state to invert it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    /// Freshly created nodes (add / duplicate / paste / import) inserted as a
    /// contiguous run at `parent[index..index + nodes.len()]`.
    Insert {
        parent: NodeId,
        index: usize,
        nodes: Vec<NodeId>,
    },

    /// Detached nodes, captured in ascending index order.
    Delete { removed: Vec<PlacedNode> },

    /// One sibling moved within its parent's child list (move up / down).
    /// Both indices are post-removal positions, so the relocation inverts by
    /// relocating the same node back to `from`.
    Relocate {
        parent: NodeId,
        node: NodeId,
        from: usize,
        to: usize,
    },

    /// A highlighted block raised to siblings of its parent. `moved` holds
    /// old positions (ascending) and `new_indices` the matching positions
    /// under the grandparent; `adopted` are the trailing siblings the last
    /// block member takes over first.
    Promote {
        moved: Vec<PlacedNode>,
        new_parent: NodeId,
        new_indices: Vec<usize>,
        adopted: Vec<PlacedNode>,
        adopted_by: NodeId,
    },

    /// A highlighted block lowered under its preceding sibling, appended in
    /// order. `first_index` is the block's former start position.
    Demote {
        nodes: Vec<NodeId>,
        old_parent: NodeId,
        first_index: usize,
        new_parent: NodeId,
    },

    /// Attribute edits (load defaults, clear fields, multiply values,
    /// single attribute changes).
    SetValues { changes: Vec<ValueChange> },
}

impl EditOp {
    /// Apply the forward mutation.
    pub fn apply(&self, arena: &mut Arena) -> ModelResult<()> {
        match self {
            EditOp::Insert { parent, index, nodes } => {
                for (offset, &node) in nodes.iter().enumerate() {
                    arena.attach(*parent, index + offset, node)?;
                }
                Ok(())
            }

            EditOp::Delete { removed } => {
                for placed in removed.iter().rev() {
                    arena.detach(placed.node)?;
                }
                Ok(())
            }

            EditOp::Relocate { parent, node, to, .. } => {
                arena.relocate_child(*parent, *node, *to)?;
                Ok(())
            }

            EditOp::Promote {
                moved,
                new_parent,
                new_indices,
                adopted,
                adopted_by,
            } => {
                // Trailing siblings first: they must not be orphaned when the
                // block leaves their parent.
                for placed in adopted {
                    arena.detach(placed.node)?;
                    let end = arena.child_count(*adopted_by);
                    arena.attach(*adopted_by, end, placed.node)?;
                }
                for placed in moved.iter().rev() {
                    arena.detach(placed.node)?;
                }
                for (placed, &index) in moved.iter().zip(new_indices) {
                    arena.attach(*new_parent, index, placed.node)?;
                }
                Ok(())
            }

            EditOp::Demote {
                nodes, new_parent, ..
            } => {
                for &node in nodes {
                    arena.detach(node)?;
                    let end = arena.child_count(*new_parent);
                    arena.attach(*new_parent, end, node)?;
                }
                Ok(())
            }

            EditOp::SetValues { changes } => {
                for change in changes {
                    arena
                        .field_mut(change.node)
                        .set(&change.key, change.after.as_deref());
                }
                Ok(())
            }
        }
    }

    /// Invert the mutation, restoring every captured (parent, index) pair
    /// and prior value. Structural mirror of [`EditOp::apply`].
    pub fn revert(&self, arena: &mut Arena) -> ModelResult<()> {
        match self {
            EditOp::Insert { nodes, .. } => {
                for &node in nodes.iter().rev() {
                    arena.detach(node)?;
                }
                Ok(())
            }

            EditOp::Delete { removed } => {
                // Ascending captured indices reconstruct the original run.
                for placed in removed {
                    arena.attach(placed.parent, placed.index, placed.node)?;
                }
                Ok(())
            }

            EditOp::Relocate { parent, node, from, .. } => {
                arena.relocate_child(*parent, *node, *from)?;
                Ok(())
            }

            EditOp::Promote { moved, adopted, .. } => {
                for placed in moved.iter().rev() {
                    arena.detach(placed.node)?;
                }
                for placed in moved {
                    arena.attach(placed.parent, placed.index, placed.node)?;
                }
                for placed in adopted.iter().rev() {
                    arena.detach(placed.node)?;
                }
                for placed in adopted {
                    arena.attach(placed.parent, placed.index, placed.node)?;
                }
                Ok(())
            }

            EditOp::Demote {
                nodes,
                old_parent,
                first_index,
                ..
            } => {
                for &node in nodes.iter().rev() {
                    arena.detach(node)?;
                }
                for (offset, &node) in nodes.iter().enumerate() {
                    arena.attach(*old_parent, first_index + offset, node)?;
                }
                Ok(())
            }

            EditOp::SetValues { changes } => {
                for change in changes.iter().rev() {
                    arena
                        .field_mut(change.node)
                        .set(&change.key, change.before.as_deref());
                }
                Ok(())
            }
        }
    }
}

/// One entry in the undo history: the operation plus the selection on either
/// side of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub label: &'static str,
    pub op: EditOp,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

impl Edit {
    pub fn new(
        label: &'static str,
        op: EditOp,
        selection_before: Selection,
        selection_after: Selection,
    ) -> Self {
        Self {
            label,
            op,
            selection_before,
            selection_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoform_model::Field;

    fn tree_with_children(count: usize) -> (Arena, NodeId, Vec<NodeId>) {
        let mut arena = Arena::new();
        let root = arena.alloc(Field::new());
        let mut children = Vec::new();
        for i in 0..count {
            let child = arena.alloc(Field::new());
            arena.attach(root, i, child).unwrap();
            children.push(child);
        }
        (arena, root, children)
    }

    #[test]
    fn test_insert_apply_then_revert_detaches() {
        let (mut arena, root, children) = tree_with_children(2);
        let new = arena.alloc(Field::new());
        let op = EditOp::Insert {
            parent: root,
            index: 1,
            nodes: vec![new],
        };

        op.apply(&mut arena).unwrap();
        assert_eq!(arena.children(root), &[children[0], new, children[1]]);

        op.revert(&mut arena).unwrap();
        assert_eq!(arena.children(root), children.as_slice());
        assert_eq!(arena.parent(new), None);
    }

    #[test]
    fn test_delete_revert_restores_captured_positions() {
        let (mut arena, root, children) = tree_with_children(4);
        let removed = vec![
            PlacedNode { node: children[1], parent: root, index: 1 },
            PlacedNode { node: children[2], parent: root, index: 2 },
        ];
        let op = EditOp::Delete { removed };

        op.apply(&mut arena).unwrap();
        assert_eq!(arena.children(root), &[children[0], children[3]]);

        op.revert(&mut arena).unwrap();
        assert_eq!(arena.children(root), children.as_slice());
        assert_eq!(arena.parent(children[1]), Some(root));
    }

    #[test]
    fn test_set_values_revert_restores_prior_values() {
        let (mut arena, _root, children) = tree_with_children(1);
        arena.field_mut(children[0]).set("value", Some("old"));

        let op = EditOp::SetValues {
            changes: vec![ValueChange {
                node: children[0],
                key: "value".to_string(),
                before: Some("old".to_string()),
                after: None,
            }],
        };

        op.apply(&mut arena).unwrap();
        assert_eq!(arena.field(children[0]).get("value"), None);

        op.revert(&mut arena).unwrap();
        assert_eq!(arena.field(children[0]).get("value"), Some("old"));
    }
}
