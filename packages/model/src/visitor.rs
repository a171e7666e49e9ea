//! Visitor traversal over the node tree.
//!
//! Both traits walk a subtree in pre-order. Override `visit` to act on each
//! node; the walk functions drive the traversal so visitors stay small.

use crate::arena::{Arena, NodeId};
use crate::field::Field;

/// Read-only visitor over a subtree.
pub trait Visitor {
    fn visit(&mut self, id: NodeId, field: &Field);
}

/// Walk the subtree rooted at `start` (inclusive), pre-order.
pub fn walk<V: Visitor>(arena: &Arena, start: NodeId, visitor: &mut V) {
    for id in arena.descendants(start) {
        visitor.visit(id, arena.field(id));
    }
}

/// Mutating visitor over a subtree: sees each node's field mutably.
pub trait VisitorMut {
    fn visit(&mut self, id: NodeId, field: &mut Field);
}

/// Walk the subtree rooted at `start` (inclusive), pre-order, with mutable
/// field access. The node set is fixed up front; visitors may edit
/// attributes but not tree structure.
pub fn walk_mut<V: VisitorMut>(arena: &mut Arena, start: NodeId, visitor: &mut V) {
    let ids: Vec<NodeId> = arena.descendants(start).collect();
    for id in ids {
        visitor.visit(id, arena.field_mut(id));
    }
}
