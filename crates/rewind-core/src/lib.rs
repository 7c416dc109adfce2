//! Rewind Core
//!
//! Central coordination layer of the time-travel debugger.
//! The [`Recorder`] owns every tab session and every observer channel and
//! is driven one event at a time, either directly or through the task
//! started by [`spawn_recorder`].

mod agent;
mod config;
mod error;
mod recorder;
mod runtime;

pub use agent::{AgentDelivery, AgentEnvelope, AgentEvent};
pub use config::Config;
pub use error::CoreError;
pub use recorder::Recorder;
pub use runtime::{spawn_recorder, HostEvent, RecorderHandle};

// Re-export core components
pub use rewind_hierarchy::{Hierarchy, NodeId, NodeIdAllocator, SnapshotNode};
pub use rewind_observers::{
    ObserverCommand, ObserverError, ObserverHandle, ObserverId, ObserverRegistry,
    ObserverRequest, OutboundMessage,
};
pub use rewind_tabs::{
    Mode, ModeField, NodeIdScope, RecordingState, ReloadTracker, SessionStore, TabError, TabId,
    TabSession,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// `RUST_LOG` wins over `default_filter`. Output goes to stderr so stdout
/// stays free for protocol traffic.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
