//! # Selection
//!
//! The highlighted set: the run of fields the next edit action applies to.
//!
//! Invariant: the set is either empty, the root alone, or a **contiguous**
//! run of siblings under one parent, kept in sibling order. Multi-selection
//! across parents is never allowed; duplicate and delete would otherwise
//! have no coherent meaning. Every click recomputes the set by min/max index
//! expansion.

use protoform_model::{Arena, NodeId};

/// Current highlighted set of a document.
///
/// The root is tracked separately: it never participates in the sibling
/// list, so the contiguity invariant only ever ranges over non-root nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    highlighted: Vec<NodeId>,
    root_highlighted: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlighted nodes in sibling order. Never contains the root.
    pub fn highlighted(&self) -> &[NodeId] {
        &self.highlighted
    }

    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.highlighted.contains(&node)
    }

    pub fn root_highlighted(&self) -> bool {
        self.root_highlighted
    }

    pub fn clear(&mut self) {
        self.highlighted.clear();
        self.root_highlighted = false;
    }

    /// Handle a node click.
    ///
    /// With `clear_others` the clicked node becomes the whole selection
    /// (or the root marker, if it has no parent). Without it, the click
    /// extends the selection: already-highlighted nodes under a different
    /// parent are dropped first, then the remaining run is widened to every
    /// sibling index between the current min/max and the clicked index.
    pub fn node_clicked(&mut self, arena: &Arena, node: NodeId, clear_others: bool) {
        // The root is always deselected first, then re-marked only when the
        // clicked node itself is the root.
        self.root_highlighted = false;
        let parent = arena.parent(node);
        if parent.is_none() {
            self.root_highlighted = true;
        }

        if clear_others {
            self.highlighted.clear();
        } else {
            self.highlighted.retain(|&n| arena.parent(n) == parent);
        }

        let Some(parent) = parent else {
            // Clicked the root: nothing joins the sibling list.
            return;
        };

        if self.highlighted.is_empty() {
            self.highlighted.push(node);
            return;
        }

        let clicked = arena
            .index_within_siblings(node)
            .expect("clicked node has a parent");
        let (mut min, mut max) = (clicked, clicked);
        for &n in &self.highlighted {
            if let Some(index) = arena.index_within_siblings(n) {
                min = min.min(index);
                max = max.max(index);
            }
        }
        self.select_range(arena, parent, min, max);
    }

    /// Select the contiguous sibling run `[first, last]` under `parent`.
    pub fn select_range(&mut self, arena: &Arena, parent: NodeId, first: usize, last: usize) {
        self.root_highlighted = false;
        self.highlighted = arena.children(parent)[first..=last].to_vec();
    }
}
