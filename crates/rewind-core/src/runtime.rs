//! Recorder event loop
//!
//! The recorder runs on its own task and drains a single queue of host
//! events, so events are processed strictly one at a time in arrival order.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rewind_observers::{ObserverHandle, ObserverId, OutboundMessage};
use rewind_tabs::TabId;

use crate::agent::AgentEnvelope;
use crate::error::CoreError;
use crate::recorder::Recorder;
use crate::Result;

/// Everything the host transport can tell the recorder
#[derive(Debug)]
pub enum HostEvent {
    /// A message from an in-page agent
    Agent(AgentEnvelope),
    /// An observer console opened its channel
    ObserverConnected(ObserverHandle),
    /// A command from an observer console
    ObserverMessage { observer: ObserverId, message: Value },
    /// An observer console went away
    ObserverDisconnected(ObserverId),
    /// A monitored tab was closed
    TabRemoved(TabId),
    /// Stop the event loop
    Shutdown,
}

/// Cloneable handle feeding the recorder task
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<HostEvent>,
}

impl RecorderHandle {
    pub async fn send(&self, event: HostEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| CoreError::RecorderStopped)
    }

    pub async fn agent_message(&self, envelope: AgentEnvelope) -> Result<()> {
        self.send(HostEvent::Agent(envelope)).await
    }

    /// Open an observer channel; the receiver yields everything broadcast to it
    pub async fn connect_observer(
        &self,
    ) -> Result<(ObserverId, mpsc::UnboundedReceiver<OutboundMessage>)> {
        let (handle, rx) = ObserverHandle::channel();
        let id = handle.id();
        self.send(HostEvent::ObserverConnected(handle)).await?;
        Ok((id, rx))
    }

    pub async fn observer_message(&self, observer: ObserverId, message: Value) -> Result<()> {
        self.send(HostEvent::ObserverMessage { observer, message })
            .await
    }

    pub async fn disconnect_observer(&self, observer: ObserverId) -> Result<()> {
        self.send(HostEvent::ObserverDisconnected(observer)).await
    }

    pub async fn tab_removed(&self, tab_id: TabId) -> Result<()> {
        self.send(HostEvent::TabRemoved(tab_id)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(HostEvent::Shutdown).await
    }
}

/// Start the recorder task.
///
/// The task ends on [`HostEvent::Shutdown`] or once every handle is
/// dropped, and hands the recorder back through its join handle.
pub fn spawn_recorder(
    mut recorder: Recorder,
    queue_capacity: usize,
) -> (RecorderHandle, JoinHandle<Recorder>) {
    let (tx, mut rx) = mpsc::channel(queue_capacity.max(1));

    let task = tokio::spawn(async move {
        tracing::info!("Recorder started");

        while let Some(event) = rx.recv().await {
            if matches!(event, HostEvent::Shutdown) {
                break;
            }
            recorder.handle_event(event);
        }

        tracing::info!(sessions = recorder.store().len(), "Recorder stopped");
        recorder
    });

    (RecorderHandle { tx }, task)
}
