//! Bridge line format

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rewind_core::{AgentDelivery, OutboundMessage, TabId};

/// One stdin line
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BridgeInput {
    Agent {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        #[serde(default)]
        title: String,
        message: Value,
    },
    ObserverConnect {
        observer: String,
    },
    ObserverMessage {
        observer: String,
        message: Value,
    },
    ObserverDisconnect {
        observer: String,
    },
    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    Shutdown,
}

/// One stdout line
#[derive(Debug, Serialize)]
#[serde(tag = "to", rename_all = "camelCase")]
pub enum BridgeOutput<'a> {
    Observer {
        observer: &'a str,
        message: &'a OutboundMessage,
    },
    Agent {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        message: &'a Value,
    },
}

impl<'a> BridgeOutput<'a> {
    pub fn agent(delivery: &'a AgentDelivery) -> Self {
        Self::Agent {
            tab_id: delivery.tab_id,
            message: &delivery.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inputs() {
        let input: BridgeInput = serde_json::from_str(
            r#"{"event":"agent","tabId":4,"title":"App","message":{"action":"tabReload"}}"#,
        )
        .unwrap();
        assert!(matches!(input, BridgeInput::Agent { tab_id: TabId(4), .. }));

        let input: BridgeInput =
            serde_json::from_str(r#"{"event":"observerConnect","observer":"panel"}"#).unwrap();
        assert!(matches!(input, BridgeInput::ObserverConnect { observer } if observer == "panel"));

        let input: BridgeInput =
            serde_json::from_str(r#"{"event":"tabRemoved","tabId":4}"#).unwrap();
        assert!(matches!(input, BridgeInput::TabRemoved { tab_id: TabId(4) }));

        let input: BridgeInput = serde_json::from_str(r#"{"event":"shutdown"}"#).unwrap();
        assert!(matches!(input, BridgeInput::Shutdown));

        assert!(serde_json::from_str::<BridgeInput>(r#"{"event":"explode"}"#).is_err());
    }

    #[test]
    fn test_output_lines() {
        let message = OutboundMessage::delete_tab(TabId(4));
        let line = serde_json::to_value(BridgeOutput::Observer {
            observer: "panel",
            message: &message,
        })
        .unwrap();
        assert_eq!(
            line,
            json!({"to": "observer", "observer": "panel", "message": {"action": "deleteTab", "payload": 4}})
        );

        let delivery = AgentDelivery {
            tab_id: TabId(4),
            message: json!({"action": "setLock", "payload": true, "tabId": 4}),
        };
        let line = serde_json::to_value(BridgeOutput::agent(&delivery)).unwrap();
        assert_eq!(line["to"], "agent");
        assert_eq!(line["tabId"], 4);
        assert_eq!(line["message"]["action"], "setLock");
    }
}
