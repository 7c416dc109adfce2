//! Rewind Tab Sessions
//!
//! One session per monitored tab: the recorded snapshots, the snapshot
//! hierarchy with its time-travel cursor, and the persist/lock/pause modes.
//! Sessions live only in memory and disappear when their tab closes.

mod error;
mod state;
mod store;
mod tab;

pub use error::TabError;
pub use state::{RecordingState, ReloadTracker};
pub use store::{NodeIdScope, SessionStore};
pub use tab::{Mode, ModeField, TabId, TabSession};

pub type Result<T> = std::result::Result<T, TabError>;
