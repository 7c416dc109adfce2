//! Hierarchy builder
//!
//! Nodes live in an arena in creation order. The tree shape is carried by
//! the `parent`/`children` links, so serializing the hierarchy is flat and
//! never recurses, however deep the recorded history grows.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::node::{NodeId, NodeIdAllocator, SnapshotNode};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    /// First node ever appended
    root: Option<NodeId>,
    /// Time-travel cursor
    current: Option<NodeId>,
    /// Arena, in creation order
    nodes: Vec<SnapshotNode>,
    #[serde(skip)]
    slots: HashMap<NodeId, usize>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot under the cursor and move the cursor onto it.
    ///
    /// The first appended node becomes the root.
    pub fn append(&mut self, ids: &mut NodeIdAllocator, payload: Value) -> NodeId {
        let id = ids.next_id();
        let parent = self.current;

        if let Some(parent_id) = parent {
            if let Some(&slot) = self.slots.get(&parent_id) {
                self.nodes[slot].children.push(id);
            }
        } else {
            self.root = Some(id);
        }

        self.slots.insert(id, self.nodes.len());
        self.nodes.push(SnapshotNode::new(id, parent, payload));
        self.current = Some(id);

        tracing::trace!(node_id = %id, parent = ?parent, "Appended snapshot node");

        id
    }

    /// Move the cursor to the node with `target`.
    ///
    /// Depth-first from the root; the first match wins. Returns `false` and
    /// leaves the cursor where it was when no node carries that id.
    pub fn navigate(&mut self, target: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id == target {
                self.current = Some(id);
                tracing::debug!(node_id = %id, "Moved hierarchy cursor");
                return true;
            }
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        tracing::debug!(node_id = %target, "Navigation target not in hierarchy");
        false
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn current_node(&self) -> Option<&SnapshotNode> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&SnapshotNode> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> &[SnapshotNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges between the root and the cursor
    pub fn depth_of_current(&self) -> Option<usize> {
        let mut id = self.current?;
        let mut depth = 0;
        while let Some(parent) = self.parent(id) {
            depth += 1;
            id = parent;
        }
        Some(depth)
    }

    /// Whether `id` can be reached from the root along child edges
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };

        // Walk upward: every node has at most one parent.
        let mut cursor = Some(id);
        let mut steps = 0;
        while let Some(node_id) = cursor {
            if node_id == root {
                return true;
            }
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.parent(node_id);
            steps += 1;
        }
        false
    }
}
