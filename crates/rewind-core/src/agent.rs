//! In-page agent protocol

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rewind_tabs::TabId;

/// A message from an agent, stamped by the transport with its tab
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEnvelope {
    pub tab_id: TabId,
    /// Current page title
    #[serde(default)]
    pub title: String,
    pub message: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// `recordSnap`: a new state snapshot
    RecordSnap(Value),
    /// `tabReload`: the page is reloading
    TabReload,
}

impl AgentEvent {
    /// Extract the session action from an agent message.
    ///
    /// Handshake messages whose `type` is listed in `ignored_types`, and
    /// messages with any other action, yield `None`.
    pub fn parse(message: &Value, ignored_types: &[String]) -> Option<Self> {
        if let Some(kind) = message.get("type").and_then(Value::as_str) {
            if ignored_types.iter().any(|t| t == kind) {
                return None;
            }
        }

        match message.get("action").and_then(Value::as_str)? {
            "recordSnap" => Some(Self::RecordSnap(
                message.get("payload").cloned().unwrap_or(Value::Null),
            )),
            "tabReload" => Some(Self::TabReload),
            _ => None,
        }
    }
}

/// A command relayed to the agent of one tab
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDelivery {
    pub tab_id: TabId,
    pub message: Value,
}
