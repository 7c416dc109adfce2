//! Snapshot node and id allocation

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a snapshot node.
///
/// Ids come from a [`NodeIdAllocator`] and are never reused by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counter handing out node ids, starting at 1
#[derive(Debug, Clone, Default)]
pub struct NodeIdAllocator {
    last: u64,
}

impl NodeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        self.last += 1;
        NodeId(self.last)
    }

    /// The most recently issued id, if any
    pub fn last_issued(&self) -> Option<NodeId> {
        (self.last > 0).then_some(NodeId(self.last))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// Unique identifier
    pub id: NodeId,
    /// Parent node, `None` only for the root
    pub parent: Option<NodeId>,
    /// Child nodes in insertion order
    pub children: Vec<NodeId>,
    /// Captured application state, passed through untouched
    #[serde(rename = "stateSnapshot")]
    pub payload: Value,
}

impl SnapshotNode {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, payload: Value) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            payload,
        }
    }
}
