//! Observer Registry
//!
//! Tracks connected observer consoles and fans messages out to them.

use std::collections::HashMap;

use crate::channel::{ObserverHandle, ObserverId};
use crate::protocol::OutboundMessage;

#[derive(Debug, Default)]
pub struct ObserverRegistry {
    channels: HashMap<ObserverId, ObserverHandle>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer and hand it `initial`, if any, right away so a
    /// late joiner sees the existing history.
    pub fn connect(&mut self, handle: ObserverHandle, initial: Option<OutboundMessage>) {
        let id = handle.id();

        if let Some(message) = initial {
            if let Err(e) = handle.post(message) {
                tracing::debug!(observer_id = %id, error = %e, "Observer left before initial sync");
                return;
            }
        }

        self.channels.insert(id, handle);
        tracing::info!(observer_id = %id, observers = self.channels.len(), "Observer connected");
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let removed = self.channels.remove(&id).is_some();
        if removed {
            tracing::info!(observer_id = %id, observers = self.channels.len(), "Observer disconnected");
        }
        removed
    }

    /// Deliver `message` to every registered observer.
    ///
    /// Observers whose channel has closed are pruned; the others still get
    /// the message. Returns the number of successful deliveries.
    pub fn broadcast(&mut self, message: &OutboundMessage) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, handle) in &self.channels {
            match handle.post(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(observer_id = %id, error = %e, "Dropping closed observer");
                    closed.push(*id);
                }
            }
        }

        for id in closed {
            self.disconnect(id);
        }

        tracing::trace!(action = message.action(), delivered, "Broadcast to observers");

        delivered
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.channels.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
