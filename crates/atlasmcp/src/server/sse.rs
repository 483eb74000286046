//! Legacy session-keyed SSE transport
//!
//! `GET /sse` opens a stream: the server generates a session id,
//! registers a sender for it, and emits an `endpoint` event telling the
//! client where to POST. `POST /messages?sessionId=` looks the sender up
//! and pushes the JSON-RPC response over the stream. The registry entry
//! is removed when the stream is dropped.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::ServerState;

/// Process-wide registry of live SSE sessions.
#[derive(Clone, Default)]
pub struct SseSessions {
    inner: Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>,
}

impl SseSessions {
    fn insert(&self, session_id: String, tx: mpsc::Sender<String>) {
        if let Ok(mut sessions) = self.inner.lock() {
            sessions.insert(session_id, tx);
        }
    }

    fn remove(&self, session_id: &str) {
        if let Ok(mut sessions) = self.inner.lock() {
            sessions.remove(session_id);
        }
    }

    fn get(&self, session_id: &str) -> Option<mpsc::Sender<String>> {
        self.inner
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(session_id).cloned())
    }
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Unregisters the session when the stream is dropped.
struct SessionGuard {
    sessions: SseSessions,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.session_id);
    }
}

pub async fn sse_handler(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = generate_session_id();
    let (tx, rx) = mpsc::channel::<String>(32);

    state.sessions.insert(session_id.clone(), tx);

    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id: session_id.clone(),
    };

    // The endpoint event tells the client where to POST its requests;
    // after that, every response pushed for this session is relayed.
    // The guard travels with the stream so the registry entry is
    // removed when the client disconnects.
    let endpoint = format!("/messages?sessionId={session_id}");
    let initial = stream::once(async move { Ok(Event::default().event("endpoint").data(endpoint)) });

    let messages = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        let event = Event::default().event("message").data(message);
        Some((Ok(event), (rx, guard)))
    });

    Sse::new(initial.chain(messages)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keepalive"),
    )
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

pub async fn message_handler(
    State(state): State<ServerState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(tx) = state.sessions.get(&query.session_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("No transport found for sessionId {}", query.session_id)
            })),
        );
    };

    let response = crate::mcp::handle_request(&body, &state.ctx).await;
    let response_json = serde_json::to_string(&response).unwrap_or_default();

    if tx.send(response_json).await.is_err() {
        // The stream closed between lookup and send.
        state.sessions.remove(&query.session_id);
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("No transport found for sessionId {}", query.session_id)
            })),
        );
    }

    (StatusCode::ACCEPTED, Json(serde_json::json!({ "ok": true })))
}
