//! Observer channel handle

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::ObserverError;
use crate::protocol::OutboundMessage;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of one observer connection
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    id: ObserverId,
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ObserverHandle {
    pub fn new(id: ObserverId, tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self { id, tx }
    }

    /// Create a handle with a fresh id and the receiver the transport drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(ObserverId::new(), tx), rx)
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn post(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| ObserverError::ChannelClosed(self.id))
    }
}
