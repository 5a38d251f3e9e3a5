//! WebSocket upgrade + chat loop. Each connection carries one user's dialog;
//! every client message gets exactly one JSON reply.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::chat::{perform, Conversation};
use crate::domain::UserId;
use crate::error::ServiceError;
use crate::protocol::{ClientWsMessage, ServerWsMessage, WsQuery};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state), fields(user = %q.user))]
pub async fn ws_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  Query(q): Query<WsQuery>,
) -> impl IntoResponse {
  let Some(user) = UserId::parse(&q.user) else {
    return ServiceError::InvalidUser.into_response();
  };
  info!(target: "leetdaily", %user, "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state, user))
}

#[instrument(level = "info", skip(socket, state), fields(%user))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>, user: UserId) {
  info!(target: "leetdaily", "WebSocket connected");
  let mut conversation = Conversation::new();

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "leetdaily", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &user, &mut conversation).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "leetdaily", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "leetdaily", "WebSocket disconnected");
}

async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  user: &UserId,
  conversation: &mut Conversation,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,
    ClientWsMessage::Chat { text } => {
      let action = conversation.handle(&text);
      debug!(target: "chat", %user, state = ?conversation.state(), "Dialog advanced");
      let text = perform(&state.orchestrator, user, action, &state.problems_url).await;
      ServerWsMessage::Reply { text }
    }
  }
}
