//! Observer wire protocol
//!
//! Outbound messages carry the whole session map. It is serialized once
//! per broadcast and shared between all observers behind an `Arc`.
//!
//! Inbound commands look like:
//! ```text
//! { "action": "setLock", "payload": true, "tabId": 101 }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use rewind_hierarchy::NodeId;
use rewind_tabs::{ModeField, TabId, TabSession};

use crate::error::ObserverError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Full session map; sent on connect, after reloads and on a tab's first snapshot
    InitialConnectSnapshots { payload: Arc<Value> },
    /// Full session map after a steady-state recording
    SendSnapshots {
        payload: Arc<Value>,
        #[serde(rename = "sourceTab")]
        source_tab: TabId,
    },
    /// The tab closed and its session is gone
    DeleteTab { payload: TabId },
}

impl OutboundMessage {
    pub fn initial_connect(sessions: &BTreeMap<TabId, TabSession>) -> Result<Self> {
        Ok(Self::InitialConnectSnapshots {
            payload: Arc::new(serde_json::to_value(sessions)?),
        })
    }

    pub fn send_snapshots(
        sessions: &BTreeMap<TabId, TabSession>,
        source_tab: TabId,
    ) -> Result<Self> {
        Ok(Self::SendSnapshots {
            payload: Arc::new(serde_json::to_value(sessions)?),
            source_tab,
        })
    }

    pub fn delete_tab(tab_id: TabId) -> Self {
        Self::DeleteTab { payload: tab_id }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::InitialConnectSnapshots { .. } => "initialConnectSnapshots",
            Self::SendSnapshots { .. } => "sendSnapshots",
            Self::DeleteTab { .. } => "deleteTab",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObserverCommand {
    /// Replace the recorded history
    Import(Vec<Value>),
    /// Drop everything but the first snapshot
    EmptySnap,
    /// setLock / setPause / setPersist
    SetMode { field: ModeField, value: bool },
    /// Move the time-travel cursor to a node
    JumpToSnap { index: NodeId },
}

impl ObserverCommand {
    /// Whether the in-page agent must see this command too
    pub fn forwards_to_agent(&self) -> bool {
        matches!(self, Self::SetMode { .. } | Self::JumpToSnap { .. })
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Import(_) => "import",
            Self::EmptySnap => "emptySnap",
            Self::SetMode {
                field: ModeField::Locked,
                ..
            } => "setLock",
            Self::SetMode {
                field: ModeField::Paused,
                ..
            } => "setPause",
            Self::SetMode {
                field: ModeField::Persist,
                ..
            } => "setPersist",
            Self::JumpToSnap { .. } => "jumpToSnap",
        }
    }
}

/// A parsed observer command together with the raw message, which is what
/// gets relayed to the agent.
#[derive(Debug, Clone)]
pub struct ObserverRequest {
    pub tab_id: TabId,
    pub command: ObserverCommand,
    pub raw: Value,
}

impl ObserverRequest {
    /// Parse a raw observer message.
    ///
    /// Returns `Ok(None)` for actions this core does not know.
    pub fn parse(raw: Value) -> Result<Option<Self>> {
        let action = raw
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ObserverError::MissingField("action"))?;

        let command = match action {
            "import" => {
                let snapshots = raw
                    .get("payload")
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or(ObserverError::InvalidField {
                        field: "payload",
                        expected: "array of snapshots",
                    })?;
                ObserverCommand::Import(snapshots)
            }
            "emptySnap" => ObserverCommand::EmptySnap,
            "setLock" => ObserverCommand::SetMode {
                field: ModeField::Locked,
                value: bool_payload(&raw)?,
            },
            "setPause" => ObserverCommand::SetMode {
                field: ModeField::Paused,
                value: bool_payload(&raw)?,
            },
            "setPersist" => ObserverCommand::SetMode {
                field: ModeField::Persist,
                value: bool_payload(&raw)?,
            },
            "jumpToSnap" => {
                let index = raw
                    .get("index")
                    .and_then(Value::as_u64)
                    .ok_or(ObserverError::InvalidField {
                        field: "index",
                        expected: "node id",
                    })?;
                ObserverCommand::JumpToSnap {
                    index: NodeId(index),
                }
            }
            _ => return Ok(None),
        };

        let tab_id = raw
            .get("tabId")
            .and_then(Value::as_i64)
            .map(TabId)
            .ok_or(ObserverError::MissingField("tabId"))?;

        Ok(Some(Self {
            tab_id,
            command,
            raw,
        }))
    }
}

fn bool_payload(raw: &Value) -> Result<bool> {
    raw.get("payload")
        .and_then(Value::as_bool)
        .ok_or(ObserverError::InvalidField {
            field: "payload",
            expected: "bool",
        })
}
