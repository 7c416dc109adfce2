//! Recorder
//!
//! The single event-processing context. Every host event is handled to
//! completion before the next one, so the session store, the reload
//! trackers and the observer registry are plain owned values.

use serde_json::Value;
use tokio::sync::mpsc;

use rewind_observers::{
    ObserverCommand, ObserverHandle, ObserverId, ObserverRegistry, ObserverRequest,
    OutboundMessage,
};
use rewind_tabs::{RecordingState, SessionStore, TabError, TabId};

use crate::agent::{AgentDelivery, AgentEnvelope, AgentEvent};
use crate::config::Config;
use crate::error::CoreError;
use crate::runtime::HostEvent;
use crate::Result;

pub struct Recorder {
    /// All live tab sessions
    store: SessionStore,
    /// Connected observer consoles
    observers: ObserverRegistry,
    /// Commands relayed to in-page agents
    agent_tx: Option<mpsc::UnboundedSender<AgentDelivery>>,
    /// Agent message types to drop on arrival
    ignored_message_types: Vec<String>,
}

impl Recorder {
    pub fn new(config: &Config) -> Self {
        Self {
            store: SessionStore::new(config.node_id_scope),
            observers: ObserverRegistry::new(),
            agent_tx: None,
            ignored_message_types: config.ignored_message_types.clone(),
        }
    }

    /// Route relayed commands to `tx`
    pub fn with_agent_outbox(mut self, tx: mpsc::UnboundedSender<AgentDelivery>) -> Self {
        self.agent_tx = Some(tx);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    /// Dispatch one host event. `Shutdown` is the caller's business.
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Agent(envelope) => self.handle_agent_message(envelope),
            HostEvent::ObserverConnected(handle) => self.connect_observer(handle),
            HostEvent::ObserverMessage { observer, message } => {
                self.handle_observer_message(observer, message)
            }
            HostEvent::ObserverDisconnected(id) => {
                self.disconnect_observer(id);
            }
            HostEvent::TabRemoved(tab_id) => self.tab_closed(tab_id),
            HostEvent::Shutdown => {}
        }
    }

    // === Agent events ===

    pub fn handle_agent_message(&mut self, envelope: AgentEnvelope) {
        let AgentEnvelope {
            tab_id,
            title,
            message,
        } = envelope;

        match AgentEvent::parse(&message, &self.ignored_message_types) {
            Some(AgentEvent::RecordSnap(payload)) => self.record_snapshot(tab_id, &title, payload),
            Some(AgentEvent::TabReload) => self.tab_reloaded(tab_id, &title),
            None => tracing::trace!(tab_id = %tab_id, "Ignoring agent message"),
        }
    }

    /// Handle a `recordSnap` from the agent of `tab_id`
    pub fn record_snapshot(&mut self, tab_id: TabId, title: &str, payload: Value) {
        self.store.get_or_create(tab_id, title);
        let from = self.store.tracker(tab_id).state();

        match from {
            RecordingState::Unseen => {
                let to = self.store.tracker_mut(tab_id).mark_first_snapshot();
                log_transition(tab_id, from, to);

                self.append(tab_id, payload);
                self.broadcast_initial();
            }
            RecordingState::ArmedAfterReload => {
                self.store.tracker_mut(tab_id).consume_reload();
                log_transition(tab_id, from, RecordingState::Steady);
                tracing::debug!(tab_id = %tab_id, "Discarded reload echo snapshot");

                self.broadcast_update(tab_id);
            }
            RecordingState::Steady => {
                self.append(tab_id, payload);
                self.broadcast_update(tab_id);
            }
        }
    }

    /// Handle a `tabReload` from the agent of `tab_id`
    pub fn tab_reloaded(&mut self, tab_id: TabId, title: &str) {
        let session = self.store.get_or_create(tab_id, title);
        session.clear_transient_modes();

        let persist = session.mode.persist;
        if !persist {
            session.reset_history(true);
        }

        let from = self.store.tracker(tab_id).state();
        let to = self.store.tracker_mut(tab_id).mark_reloaded();
        log_transition(tab_id, from, to);

        tracing::info!(tab_id = %tab_id, persist, "Tab reloaded");

        if !persist {
            self.broadcast_initial();
        }
    }

    fn append(&mut self, tab_id: TabId, payload: Value) {
        match self.store.append_snapshot(tab_id, payload) {
            Ok(node_id) => {
                tracing::debug!(tab_id = %tab_id, node_id = %node_id, "Recorded snapshot")
            }
            Err(e) => tracing::warn!(tab_id = %tab_id, error = %e, "Failed to record snapshot"),
        }
    }

    // === Observers ===

    /// Register an observer; it gets the current state at once if any tab is known
    pub fn connect_observer(&mut self, handle: ObserverHandle) {
        let initial = if self.store.is_empty() {
            None
        } else {
            match OutboundMessage::initial_connect(self.store.sessions()) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize sessions for new observer");
                    None
                }
            }
        };

        self.observers.connect(handle, initial);
    }

    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    /// Handle a raw command from an observer
    pub fn handle_observer_message(&mut self, observer: ObserverId, message: Value) {
        let request = match ObserverRequest::parse(message) {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::debug!(observer_id = %observer, "Ignoring unknown observer action");
                return;
            }
            Err(e) => {
                tracing::warn!(observer_id = %observer, error = %e, "Malformed observer message");
                return;
            }
        };

        let tab_id = request.tab_id;
        let action = request.command.action();

        match self.apply_command(request) {
            Ok(()) => {
                tracing::debug!(observer_id = %observer, tab_id = %tab_id, action, "Applied observer command")
            }
            Err(CoreError::Tab(TabError::NotFound(_))) => {
                tracing::debug!(tab_id = %tab_id, action, "Command for unknown tab ignored")
            }
            Err(e) => tracing::warn!(tab_id = %tab_id, action, error = %e, "Observer command failed"),
        }
    }

    /// Apply a parsed command and relay it to the agent when required
    pub fn apply_command(&mut self, request: ObserverRequest) -> Result<()> {
        let ObserverRequest {
            tab_id,
            command,
            raw,
        } = request;
        let forward = command.forwards_to_agent();

        match command {
            ObserverCommand::Import(snapshots) => self.store.replace_history(tab_id, snapshots)?,
            ObserverCommand::EmptySnap => self.store.reset_history(tab_id, true)?,
            ObserverCommand::SetMode { field, value } => {
                self.store.apply_mode(tab_id, field, value)?
            }
            ObserverCommand::JumpToSnap { index } => {
                if !self.store.get_mut(tab_id)?.jump_to(index) {
                    tracing::debug!(tab_id = %tab_id, node_id = %index, "Jump target not found");
                }
            }
        }

        if forward {
            self.forward_to_agent(tab_id, raw);
        }

        Ok(())
    }

    fn forward_to_agent(&self, tab_id: TabId, message: Value) {
        let Some(tx) = &self.agent_tx else {
            tracing::trace!(tab_id = %tab_id, "No agent outbox, command not relayed");
            return;
        };

        if tx.send(AgentDelivery { tab_id, message }).is_err() {
            tracing::warn!(tab_id = %tab_id, "Agent outbox closed, command not relayed");
        }
    }

    // === Tab lifecycle ===

    /// The tab behind `tab_id` closed: tell observers, then forget it
    pub fn tab_closed(&mut self, tab_id: TabId) {
        self.observers.broadcast(&OutboundMessage::delete_tab(tab_id));
        self.store.destroy(tab_id);
    }

    // === Broadcasts ===

    fn broadcast_initial(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        match OutboundMessage::initial_connect(self.store.sessions()) {
            Ok(message) => {
                self.observers.broadcast(&message);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize sessions"),
        }
    }

    fn broadcast_update(&mut self, source: TabId) {
        if self.observers.is_empty() {
            return;
        }
        match OutboundMessage::send_snapshots(self.store.sessions(), source) {
            Ok(message) => {
                self.observers.broadcast(&message);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize sessions"),
        }
    }
}

fn log_transition(tab_id: TabId, from: RecordingState, to: RecordingState) {
    debug_assert!(from.can_transition_to(to));
    tracing::debug!(tab_id = %tab_id, from = %from, to = %to, "Recording state transition");
}
