//! Tab session data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rewind_hierarchy::{Hierarchy, NodeId, NodeIdAllocator};

/// Host-assigned identifier of a monitored tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime modes toggled from the observer consoles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Keep history across page reloads
    pub persist: bool,
    /// Agent ignores new state changes
    pub locked: bool,
    /// Agent stops emitting snapshots
    pub paused: bool,
}

impl Mode {
    pub fn set(&mut self, field: ModeField, value: bool) {
        match field {
            ModeField::Persist => self.persist = value,
            ModeField::Locked => self.locked = value,
            ModeField::Paused => self.paused = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeField {
    Persist,
    Locked,
    Paused,
}

impl ModeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeField::Persist => "persist",
            ModeField::Locked => "locked",
            ModeField::Paused => "paused",
        }
    }
}

impl std::fmt::Display for ModeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSession {
    /// Page title reported by the agent
    pub title: String,
    /// Every recorded snapshot, in recording order
    pub snapshots: Vec<Value>,
    /// Snapshot tree with the time-travel cursor
    pub hierarchy: Hierarchy,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Used only when node ids are scoped per session
    #[serde(skip)]
    pub(crate) node_ids: NodeIdAllocator,
}

impl TabSession {
    pub fn new(title: String) -> Self {
        let now = Utc::now();

        Self {
            title,
            snapshots: Vec::new(),
            hierarchy: Hierarchy::new(),
            mode: Mode::default(),
            created_at: now,
            updated_at: now,
            node_ids: NodeIdAllocator::new(),
        }
    }

    /// Append a snapshot to the history list and to the hierarchy
    pub fn record(&mut self, ids: &mut NodeIdAllocator, payload: Value) -> NodeId {
        self.snapshots.push(payload.clone());
        let id = self.hierarchy.append(ids, payload);
        self.updated_at = Utc::now();
        id
    }

    /// Like [`record`](Self::record), drawing ids from this session's own counter
    pub(crate) fn record_with_own_ids(&mut self, payload: Value) -> NodeId {
        self.snapshots.push(payload.clone());
        let id = self.hierarchy.append(&mut self.node_ids, payload);
        self.updated_at = Utc::now();
        id
    }

    /// Drop everything after the first snapshot when `keep_first`.
    ///
    /// The hierarchy is left as is.
    pub fn reset_history(&mut self, keep_first: bool) {
        if keep_first {
            self.snapshots.truncate(1);
            self.updated_at = Utc::now();
        }
    }

    /// Replace the history list wholesale (import). The hierarchy is left as is.
    pub fn replace_history(&mut self, snapshots: Vec<Value>) {
        self.snapshots = snapshots;
        self.updated_at = Utc::now();
    }

    /// Move the time-travel cursor
    pub fn jump_to(&mut self, id: NodeId) -> bool {
        self.hierarchy.navigate(id)
    }

    pub fn set_mode(&mut self, field: ModeField, value: bool) {
        self.mode.set(field, value);
        self.updated_at = Utc::now();
    }

    /// A reloaded page starts unlocked and unpaused
    pub fn clear_transient_modes(&mut self) {
        self.mode.locked = false;
        self.mode.paused = false;
        self.updated_at = Utc::now();
    }

    /// Update the title; empty titles are ignored
    pub fn set_title(&mut self, title: &str) {
        if !title.is_empty() && title != self.title {
            self.title = title.to_string();
            self.updated_at = Utc::now();
        }
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }
}
