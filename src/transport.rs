//! Bidirectional socket the controller drives the dispatcher through
//! (spec.md §6 "Transport"). The handshake and reconnection semantics are
//! the enclosing host's concern; this module only implements the wire
//! contract: `{type:"command",...}` in, `{type:"result",...}` out, over an
//! axum WebSocket upgrade.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use core_types::{Command, ResultEnvelope};
use dispatcher::Dispatcher;
use futures::StreamExt;
use prometheus::{Encoder, TextEncoder};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct TransportState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: TransportState) -> Router {
    Router::new()
        .route("/agent", get(upgrade))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Exposes the dispatch counters/histogram from [`dispatcher::metrics`] as
/// a scrapeable prometheus endpoint.
async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let format_type = encoder.format_type().to_string();
    let metric_families = dispatcher::metrics::DISPATCH_REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        warn!(?err, "failed to encode prometheus metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response();
    }
    match String::from_utf8(buffer) {
        Ok(body) => {
            let mut response = body.into_response();
            if let Ok(value) = HeaderValue::from_str(&format_type) {
                response.headers_mut().insert(axum::http::header::CONTENT_TYPE, value);
            }
            response
        }
        Err(err) => {
            warn!(?err, "prometheus output was not valid utf-8");
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}

async fn upgrade(State(state): State<TransportState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        serve_socket(socket, state).await;
    })
}

async fn serve_socket(mut socket: WebSocket, state: TransportState) {
    info!("transport: controller connected");
    while let Some(message) = socket.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "transport: socket error, closing");
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
                continue;
            }
            Message::Close(frame) => {
                debug!(?frame, "transport: controller closed the socket");
                break;
            }
            Message::Binary(_) | Message::Pong(_) => continue,
        };

        if let Some(result) = handle_inbound(&text, &state.dispatcher).await {
            let payload = serde_json::to_string(&result).expect("ResultEnvelope always serializes");
            if socket.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    }
    info!("transport: controller disconnected");
}

/// Returns `None` for a non-command message that should be silently
/// dropped after logging (spec.md §6: "Non-command inbound messages are
/// ignored with a log entry").
async fn handle_inbound(text: &str, dispatcher: &Dispatcher) -> Option<ResultEnvelope> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "transport: malformed inbound JSON");
            return Some(ResultEnvelope::unknown(format!("malformed JSON: {err}")));
        }
    };

    let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
    if kind != "command" {
        debug!(kind, "transport: ignoring non-command inbound message");
        return None;
    }

    match serde_json::from_value::<Command>(value) {
        Ok(command) => Some(dispatcher.dispatch(command).await),
        Err(err) => {
            warn!(error = %err, "transport: command envelope failed to parse");
            Some(ResultEnvelope::unknown(format!(
                "malformed command envelope: {err}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Layer;
    use serde_json::Map;

    fn dispatcher() -> Dispatcher {
        crate::wiring::build_dispatcher(&uia_config::AgentConfig::default())
    }

    #[tokio::test]
    async fn malformed_json_yields_unknown_id_error() {
        let dispatcher = dispatcher();
        let result = handle_inbound("{not json", &dispatcher).await.unwrap();
        assert_eq!(result.id, "unknown");
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn non_command_message_is_ignored() {
        let dispatcher = dispatcher();
        let result = handle_inbound(r#"{"type":"hello","agentName":"x"}"#, &dispatcher).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn well_formed_command_dispatches_and_preserves_id() {
        let dispatcher = dispatcher();
        let command = Command::new("a1", Layer::System, "ping", Map::new());
        let text = serde_json::to_string(&command).unwrap();
        let result = handle_inbound(&text, &dispatcher).await.unwrap();
        assert_eq!(result.id, "a1");
        assert!(result.is_success());
    }
}
