//! Node arena.
//!
//! Nodes live in a flat arena and refer to each other by `NodeId`, so the
//! parent back-reference and the child list are plain index fields rather
//! than a cyclic reference graph. Ids are stable for the life of the arena:
//! structural moves never change a node's id, and detached nodes keep their
//! slot (the undo history may still reference them). Duplication always
//! allocates fresh ids.

use crate::error::{ModelError, ModelResult};
use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    field: Field,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Flat store of document nodes.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node holding `field`.
    pub fn alloc(&mut self, field: Field) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            field,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn field(&self, id: NodeId) -> &Field {
        &self.node(id).field
    }

    pub fn field_mut(&mut self, id: NodeId) -> &mut Field {
        &mut self.node_mut(id).field
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.node(parent).children.get(index).copied()
    }

    /// Position of `id` in its parent's child list. `None` for a node with
    /// no parent (the root, or a detached node).
    pub fn index_within_siblings(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Rebind the parent back-reference only.
    ///
    /// This does not touch any child list. Callers must pair it with the
    /// matching `insert_child`/`push_child`/`remove_child` call, or the
    /// parent/child invariant breaks. The asymmetry allows building a subtree
    /// before attaching it.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.node_mut(id).parent = parent;
    }

    /// Append `child` to `parent`'s child list (back-reference not touched,
    /// see [`Arena::set_parent`]).
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` into `parent`'s child list at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> ModelResult<()> {
        let children = &mut self.node_mut(parent).children;
        if index > children.len() {
            return Err(ModelError::index_out_of_bounds(index, children.len()));
        }
        children.insert(index, child);
        Ok(())
    }

    /// Remove `child` from `parent`'s child list by identity.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> ModelResult<usize> {
        let children = &mut self.node_mut(parent).children;
        let position = children
            .iter()
            .position(|&c| c == child)
            .ok_or(ModelError::NotAChild(child))?;
        children.remove(position);
        Ok(position)
    }

    /// Detach `id` from its parent: remove it from the parent's child list
    /// and clear the back-reference. Returns the former (parent, index).
    pub fn detach(&mut self, id: NodeId) -> ModelResult<(NodeId, usize)> {
        let parent = self.parent(id).ok_or(ModelError::NoParent(id))?;
        let index = self.remove_child(parent, id)?;
        self.set_parent(id, None);
        Ok((parent, index))
    }

    /// Attach a detached node under `parent` at `index`, keeping both sides
    /// of the parent/child relation in sync.
    pub fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) -> ModelResult<()> {
        self.insert_child(parent, index, child)?;
        self.set_parent(child, Some(parent));
        Ok(())
    }

    /// Move `child` to position `dest` among its current siblings.
    ///
    /// The node is removed by identity and re-inserted at `dest` interpreted
    /// against the list *after* removal (clamped to its length). Relocation
    /// with the former post-removal index is therefore its own inverse.
    pub fn relocate_child(&mut self, parent: NodeId, child: NodeId, dest: usize) -> ModelResult<usize> {
        let from = self.remove_child(parent, child)?;
        let children = &mut self.node_mut(parent).children;
        let dest = dest.min(children.len());
        children.insert(dest, child);
        Ok(from)
    }

    /// New detached node with a copy of `id`'s attributes (children are not
    /// copied; see [`Arena::duplicate_subtree`]).
    pub fn duplicate(&mut self, id: NodeId) -> NodeId {
        let field = self.field(id).clone();
        self.alloc(field)
    }

    /// Deep-copy the subtree rooted at `id`. The copy is detached and every
    /// node in it has a fresh id; child order is preserved.
    pub fn duplicate_subtree(&mut self, id: NodeId) -> NodeId {
        let copy = self.duplicate(id);
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            let child_copy = self.duplicate_subtree(child);
            self.push_child(copy, child_copy);
            self.set_parent(child_copy, Some(copy));
        }
        copy
    }

    /// Pre-order traversal of the subtree rooted at `start`, including
    /// `start` itself.
    ///
    /// The walk is lazy against the current structure. Mutating the tree
    /// between `next()` calls is an unsupported precondition.
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            stack: vec![start],
        }
    }
}

/// Iterator returned by [`Arena::descendants`].
pub struct Descendants<'a> {
    arena: &'a Arena,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        // Push children reversed so the leftmost child pops first.
        for &child in self.arena.children(next).iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}
