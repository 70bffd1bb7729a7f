//! WebSocket Message Types
//!
//! Message types exchanged between the dashboard page and a session.

use serde::{Deserialize, Serialize};

use crate::controls::{RenderedView, SelectorState, Tab, View, ViewData, WidgetChange};
use crate::render::RenderArtifact;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A widget in `tab` changed
    Widget { tab: Tab, change: WidgetChange },
    /// Re-send every view of a tab
    Refresh { tab: Tab },
    /// Restore every widget to its default
    Reset,
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Reconciled country widgets of a tab
    Controls {
        tab: Tab,
        countries: Vec<String>,
        select_all: bool,
        deselect_all: bool,
    },
    /// A freshly rendered view
    View {
        tab: Tab,
        view: View,
        artifact: RenderArtifact,
        rows: ViewData,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostic: Option<String>,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    pub fn controls(tab: Tab, state: &SelectorState) -> Self {
        ServerMessage::Controls {
            tab,
            countries: state.selected.clone(),
            select_all: state.select_all,
            deselect_all: state.deselect_all,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

impl From<RenderedView> for ServerMessage {
    fn from(rendered: RenderedView) -> Self {
        ServerMessage::View {
            tab: rendered.tab,
            view: rendered.view,
            artifact: rendered.artifact,
            rows: rendered.data,
            diagnostic: rendered.diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StatMode;

    #[test]
    fn test_client_message_deserialize_widget() {
        let json = r#"{"type": "widget", "tab": "snapshot", "change": {"control": "top_n", "value": 5}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Widget { tab, change } => {
                assert_eq!(tab, Tab::Snapshot);
                assert_eq!(change, WidgetChange::TopN(5));
            }
            _ => panic!("Expected Widget"),
        }

        let json = r#"{"type": "widget", "tab": "trend", "change": {"control": "stat_mode", "value": "per_capita"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Widget {
                change: WidgetChange::StatMode(StatMode::PerCapita),
                ..
            }
        ));
    }

    #[test]
    fn test_client_message_deserialize_simple() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "reset"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Reset));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "refresh", "tab": "trend"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Refresh { tab: Tab::Trend }));
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_serialize_controls() {
        let state = SelectorState {
            selected: vec!["Chad".to_string()],
            select_all: false,
            deselect_all: false,
        };
        let json = serde_json::to_string(&ServerMessage::controls(Tab::Trend, &state)).unwrap();
        assert!(json.contains("\"type\":\"controls\""));
        assert!(json.contains("\"tab\":\"trend\""));
        assert!(json.contains("\"countries\":[\"Chad\"]"));
    }

    #[test]
    fn test_server_message_serialize_view() {
        let msg = ServerMessage::View {
            tab: Tab::Snapshot,
            view: View::Map,
            artifact: RenderArtifact::placeholder(),
            rows: ViewData::Map(Vec::new()),
            diagnostic: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"view\""));
        assert!(json.contains("\"view\":\"map\""));
        assert!(json.contains("\"kind\":\"placeholder\""));
        assert!(json.contains("\"rows\":[]"));
        assert!(!json.contains("diagnostic"));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }
}
