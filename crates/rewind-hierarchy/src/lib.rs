//! Rewind Snapshot Hierarchy
//!
//! Every recorded snapshot of a monitored tab becomes a node in a tree.
//! New snapshots always extend the branch under the time-travel cursor;
//! jumping only moves the cursor and never rewrites history.

mod node;
mod tree;

pub use node::{NodeId, NodeIdAllocator, SnapshotNode};
pub use tree::Hierarchy;
