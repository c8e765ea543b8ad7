//! WebSocket endpoint pushing one summary (or error) per inbound request.

use super::AppState;
use crate::pipeline::SummaryApi;
use axum::extract::{
    State,
    ws::{Message, WebSocket, WebSocketUpgrade},
};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
struct WsRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WsReply {
    Summary { summary: String },
    Error { error: String },
}

/// `GET /ws` – upgrade the connection and serve summaries per message.
pub(super) async fn websocket_handler<S>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> Response
where
    S: SummaryApi + 'static,
{
    ws.on_upgrade(move |socket| run_session(socket, state))
}

/// Per-connection loop: each text frame carries a document reference; the
/// reply is a summary or an error message. A bad reference never closes the
/// session; a client that stops reading ends the loop cleanly.
async fn run_session<S>(mut socket: WebSocket, state: Arc<AppState<S>>)
where
    S: SummaryApi,
{
    tracing::info!("WebSocket session established");

    while let Some(inbound) = socket.recv().await {
        let message = match inbound {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(%error, "WebSocket receive failed");
                break;
            }
        };
        let raw = match message {
            Message::Text(raw) => raw,
            Message::Close(_) => break,
            // Ping/pong are handled by the protocol layer; binary is ignored.
            _ => continue,
        };

        let reply = match parse_request(&raw) {
            Ok(url) => match state.service.summarize_url(&url).await {
                Ok(summary) => WsReply::Summary { summary },
                Err(error) => {
                    tracing::error!(%error, "WebSocket summarize failed");
                    WsReply::Error {
                        error: error.to_string(),
                    }
                }
            },
            Err(detail) => WsReply::Error { error: detail },
        };

        let Ok(payload) = serde_json::to_string(&reply) else {
            break;
        };
        if socket.send(Message::Text(payload)).await.is_err() {
            tracing::debug!("WebSocket client went away during send");
            break;
        }
    }

    tracing::info!("WebSocket session closed");
}

fn parse_request(raw: &str) -> Result<String, String> {
    match serde_json::from_str::<WsRequest>(raw) {
        Ok(WsRequest { url: Some(url) }) if !url.trim().is_empty() => Ok(url),
        Ok(_) => Err("missing document reference".to_string()),
        Err(error) => Err(format!("invalid request payload: {error}")),
    }
}
