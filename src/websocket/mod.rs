//! WebSocket Dashboard Sessions
//!
//! Each connection to `/ws` owns one dashboard session: the widget state of
//! both tabs. Widget changes are applied in arrival order and every view the
//! change affects is re-rendered and pushed back.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: registry of open connections and their outgoing channels
//! - **Handler**: WebSocket upgrade and the per-connection session loop
//! - **Messages**: client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8050/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'view') draw(msg.view, msg.artifact);
//! };
//!
//! ws.send(JSON.stringify({
//!   type: 'widget',
//!   tab: 'snapshot',
//!   change: {control: 'year', value: 2012},
//! }));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
