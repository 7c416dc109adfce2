//! Recording State Machine
//!
//! ```text
//! Unseen
//!   ↓ first snapshot
//! Steady  ←─────────────┐
//!   ↓ reload            │ reload echo dropped
//! ArmedAfterReload ─────┘
//! ```
//!
//! A reloaded page re-emits its initial snapshot. The armed state swallows
//! exactly that one echo.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// No snapshot recorded yet
    Unseen,
    /// A reload was seen; the next snapshot is its echo
    ArmedAfterReload,
    /// Normal recording
    Steady,
}

impl RecordingState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: RecordingState) -> bool {
        match (self, target) {
            (RecordingState::Unseen, RecordingState::Steady) => true,
            (RecordingState::Steady, RecordingState::ArmedAfterReload) => true,
            (RecordingState::ArmedAfterReload, RecordingState::Steady) => true,
            // Same state is always valid (reload before first snapshot, repeated reloads)
            (a, b) if *a == b => true,
            // Only closing the tab brings a session back to Unseen
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingState::Unseen => "unseen",
            RecordingState::ArmedAfterReload => "armed_after_reload",
            RecordingState::Steady => "steady",
        }
    }
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient reload bookkeeping for one tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadTracker {
    pub reloaded: bool,
    pub first_snapshot_received: bool,
}

impl ReloadTracker {
    pub fn state(&self) -> RecordingState {
        match (self.first_snapshot_received, self.reloaded) {
            (false, _) => RecordingState::Unseen,
            (true, true) => RecordingState::ArmedAfterReload,
            (true, false) => RecordingState::Steady,
        }
    }

    /// A reload notification arrived
    pub fn mark_reloaded(&mut self) -> RecordingState {
        self.reloaded = true;
        self.state()
    }

    /// The first snapshot of this tab was recorded
    pub fn mark_first_snapshot(&mut self) -> RecordingState {
        self.first_snapshot_received = true;
        self.reloaded = false;
        self.state()
    }

    /// Drop the armed flag. Returns whether it was set.
    pub fn consume_reload(&mut self) -> bool {
        std::mem::replace(&mut self.reloaded, false)
    }
}
