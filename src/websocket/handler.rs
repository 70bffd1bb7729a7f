//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and runs one dashboard session per
//! connection. Client messages are applied strictly in arrival order on the
//! receive task; outgoing messages go through the hub.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::controls::{DashboardSession, Tab, View};
use crate::query::QueryExecutor;
use crate::render::ChartRenderer;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Shared pipeline handles used by one session
struct SessionContext {
    executor: Arc<QueryExecutor>,
    renderer: Arc<dyn ChartRenderer>,
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let hub = Arc::clone(&state.ws_hub);
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting WebSocket connection");
            if let Some(text) = encode(&ServerMessage::error(e.to_string())) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    let mut session = DashboardSession::new(
        Arc::clone(&state.universe),
        (*state.dashboard).clone(),
    );
    let context = SessionContext {
        executor: Arc::clone(&state.executor),
        renderer: Arc::clone(&state.renderer),
    };

    // Connected first, then every view of the default state
    let mut initial = vec![ServerMessage::Connected {
        connection_id: connection_id.clone(),
    }];
    initial.extend(render_views(&session, View::all(), &context));
    for message in initial {
        let _ = hub.send_to(&connection_id, message).await;
    }

    let conn_id_for_send = connection_id.clone();

    // Task to forward messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(text) = encode(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = connection_id.clone();

    // Task to receive messages and drive the session
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            let message = match result {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            };

            let replies = match message {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        tracing::debug!(
                            connection_id = %conn_id_for_recv,
                            msg = ?client_msg,
                            "Client message"
                        );
                        process_message(&mut session, client_msg, &context)
                    }
                    Err(e) => {
                        tracing::debug!(
                            connection_id = %conn_id_for_recv,
                            error = %e,
                            "Invalid client message"
                        );
                        vec![ServerMessage::error(format!("Invalid message format: {}", e))]
                    }
                },
                Message::Binary(_) => {
                    vec![ServerMessage::error("Binary messages not supported")]
                }
                // Axum answers pings itself
                Message::Ping(_) | Message::Pong(_) => Vec::new(),
                Message::Close(_) => {
                    tracing::debug!(connection_id = %conn_id_for_recv, "Client requested close");
                    break;
                }
            };

            for reply in replies {
                if hub_for_recv.send_to(&conn_id_for_recv, reply).await.is_err() {
                    return;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

fn render_views(
    session: &DashboardSession,
    views: &[View],
    context: &SessionContext,
) -> Vec<ServerMessage> {
    session
        .render_all(views, &context.executor, context.renderer.as_ref())
        .into_iter()
        .map(ServerMessage::from)
        .collect()
}

/// Apply one client message and produce the replies, in send order
fn process_message(
    session: &mut DashboardSession,
    message: ClientMessage,
    context: &SessionContext,
) -> Vec<ServerMessage> {
    match message {
        ClientMessage::Widget { tab, change } => {
            let echo = change.echoes_controls();
            match session.apply(tab, change) {
                Ok(views) => {
                    let mut replies = Vec::with_capacity(views.len() + 1);
                    if echo {
                        replies.push(ServerMessage::controls(tab, session.controls(tab)));
                    }
                    replies.extend(render_views(session, &views, context));
                    replies
                }
                Err(e) => vec![ServerMessage::error(e.to_string())],
            }
        }
        ClientMessage::Refresh { tab } => render_views(session, View::for_tab(tab), context),
        ClientMessage::Reset => {
            session.reset();
            let mut replies = vec![
                ServerMessage::controls(Tab::Trend, session.controls(Tab::Trend)),
                ServerMessage::controls(Tab::Snapshot, session.controls(Tab::Snapshot)),
            ];
            replies.extend(render_views(session, View::all(), context));
            replies
        }
        ClientMessage::Ping => vec![ServerMessage::Pong],
    }
}
