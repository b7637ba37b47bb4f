//! WebSocket upgrade and per-connection forwarding loop.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::state::AppState;

// Per-client backlog before the emitter waits on a slow socket.
const EVENT_BUFFER: usize = 32;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let id = state.broker.open(state.telemetry_for_session(), tx);

    // Cancel the session on drop, whichever way this function exits.
    struct SessionGuard(AppState, u64);
    impl Drop for SessionGuard {
        fn drop(&mut self) {
            self.0.broker.close(self.1);
        }
    }
    let _guard = SessionGuard(state.clone(), id);
    info!(session = id, clients = state.broker.active_count(), "client connected");

    loop {
        tokio::select! {
            ev = rx.recv() => {
                let Some(ev) = ev else { break };
                let js = match ev.to_json() {
                    Ok(js) => js,
                    Err(e) => {
                        warn!(session = id, event = ev.name(), "serialize failed: {e}");
                        continue;
                    }
                };
                if sink.send(Message::Text(js)).await.is_err() {
                    break;
                }
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients have nothing to say beyond lifecycle.
                Some(Ok(_)) => {}
            },
        }
    }

    drop(_guard);
    info!(session = id, clients = state.broker.active_count(), "client disconnected");
}
