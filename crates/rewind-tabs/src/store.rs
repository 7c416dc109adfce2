//! Session Store
//!
//! Owns every live tab session and its reload tracker. The store is owned
//! by the single event-processing context, so it takes `&mut self` and
//! carries no locks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use rewind_hierarchy::{NodeId, NodeIdAllocator};

use crate::error::TabError;
use crate::state::ReloadTracker;
use crate::tab::{ModeField, TabId, TabSession};
use crate::Result;

/// Scope in which snapshot node ids are unique
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIdScope {
    /// One counter shared by all tabs
    #[default]
    Global,
    /// Each tab counts from 1
    PerSession,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    /// Live sessions, ordered by tab id for stable broadcasts
    sessions: BTreeMap<TabId, TabSession>,
    /// Reload bookkeeping, dropped together with the session
    trackers: HashMap<TabId, ReloadTracker>,
    /// Shared node id counter (global scope)
    node_ids: NodeIdAllocator,
    scope: NodeIdScope,
}

impl SessionStore {
    pub fn new(scope: NodeIdScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Get the session for a tab, creating an empty one on first sight
    pub fn get_or_create(&mut self, tab_id: TabId, title: &str) -> &mut TabSession {
        self.trackers.entry(tab_id).or_default();

        let session = self.sessions.entry(tab_id).or_insert_with(|| {
            tracing::info!(tab_id = %tab_id, title = %title, "Created tab session");
            TabSession::new(title.to_string())
        });
        session.set_title(title);
        session
    }

    pub fn get(&self, tab_id: TabId) -> Result<&TabSession> {
        self.sessions.get(&tab_id).ok_or(TabError::NotFound(tab_id))
    }

    pub fn get_mut(&mut self, tab_id: TabId) -> Result<&mut TabSession> {
        self.sessions
            .get_mut(&tab_id)
            .ok_or(TabError::NotFound(tab_id))
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.sessions.contains_key(&tab_id)
    }

    /// Remove a session and its reload tracker. Returns whether it existed.
    pub fn destroy(&mut self, tab_id: TabId) -> bool {
        self.trackers.remove(&tab_id);
        let existed = self.sessions.remove(&tab_id).is_some();

        if existed {
            tracing::info!(tab_id = %tab_id, "Destroyed tab session");
        }

        existed
    }

    pub fn apply_mode(&mut self, tab_id: TabId, field: ModeField, value: bool) -> Result<()> {
        self.get_mut(tab_id)?.set_mode(field, value);
        tracing::debug!(tab_id = %tab_id, field = %field, value, "Applied mode");
        Ok(())
    }

    /// Truncate the history list to its first entry when `keep_first`.
    /// The hierarchy keeps growing regardless.
    pub fn reset_history(&mut self, tab_id: TabId, keep_first: bool) -> Result<()> {
        self.get_mut(tab_id)?.reset_history(keep_first);
        Ok(())
    }

    pub fn replace_history(&mut self, tab_id: TabId, snapshots: Vec<Value>) -> Result<()> {
        let count = snapshots.len();
        self.get_mut(tab_id)?.replace_history(snapshots);
        tracing::info!(tab_id = %tab_id, count, "Imported snapshot history");
        Ok(())
    }

    /// Record a snapshot in both the history list and the hierarchy
    pub fn append_snapshot(&mut self, tab_id: TabId, payload: Value) -> Result<NodeId> {
        let session = self
            .sessions
            .get_mut(&tab_id)
            .ok_or(TabError::NotFound(tab_id))?;

        let id = match self.scope {
            NodeIdScope::Global => session.record(&mut self.node_ids, payload),
            NodeIdScope::PerSession => session.record_with_own_ids(payload),
        };

        Ok(id)
    }

    pub fn tracker(&self, tab_id: TabId) -> ReloadTracker {
        self.trackers.get(&tab_id).copied().unwrap_or_default()
    }

    pub fn tracker_mut(&mut self, tab_id: TabId) -> &mut ReloadTracker {
        self.trackers.entry(tab_id).or_default()
    }

    /// All live sessions keyed by tab id
    pub fn sessions(&self) -> &BTreeMap<TabId, TabSession> {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
