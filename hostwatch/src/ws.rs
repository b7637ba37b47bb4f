//! WebSocket channel to the agent. Runs as its own task and reports
//! everything through the event queue; it never touches session state.

use std::io;
use std::time::Duration;

use futures_util::StreamExt;
use hostwatch_core::ServerEvent;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::session::ClientEvent;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Upper bound on one connect attempt (TCP plus handshake).
pub const CONNECT_TIMEOUT: Duration = RECONNECT_DELAY;

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, WsError> {
    connect_with_timeout(url, CONNECT_TIMEOUT).await
}

/// An attempt that outlives `limit` fails with `ErrorKind::TimedOut`.
pub async fn connect_with_timeout(url: &str, limit: Duration) -> Result<WsStream, WsError> {
    match tokio::time::timeout(limit, connect_async(url)).await {
        Ok(res) => res.map(|(ws, _)| ws),
        Err(_) => Err(WsError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no handshake within {limit:?}"),
        ))),
    }
}

pub fn spawn_channel(url: String, tx: mpsc::Sender<ClientEvent>) -> JoinHandle<()> {
    tokio::spawn(run_channel(url, tx))
}

/// Connect, forward, and reconnect every [`RECONNECT_DELAY`] until the
/// receiving side goes away.
async fn run_channel(url: String, tx: mpsc::Sender<ClientEvent>) {
    let mut first_attempt = true;
    loop {
        match connect(&url).await {
            Ok(ws) => {
                if tx.send(ClientEvent::Connected).await.is_err() {
                    return;
                }
                forward(ws, &tx).await;
                if tx.send(ClientEvent::Disconnected).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(%url, "connect failed: {e}");
                if first_attempt && tx.send(ClientEvent::ChannelUnavailable).await.is_err() {
                    return;
                }
            }
        }
        first_attempt = false;
        tokio::time::sleep(RECONNECT_DELAY).await;
        if tx.is_closed() {
            return;
        }
    }
}

// Pump text frames into the queue until the stream ends.
async fn forward(mut ws: WsStream, tx: &mpsc::Sender<ClientEvent>) {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(txt)) => match ServerEvent::from_json(&txt) {
                Ok(ev) => {
                    if tx.send(ClientEvent::Server(ev)).await.is_err() {
                        return;
                    }
                }
                Err(e) => debug!("skipping undecodable frame: {e}"),
            },
            Ok(Message::Close(_)) => return,
            Ok(_) => {}
            Err(e) => {
                warn!("stream error: {e}");
                return;
            }
        }
    }
}
