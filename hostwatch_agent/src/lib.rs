//! hostwatch agent: samples host metrics and the process table and streams
//! them to every connected WebSocket client on its own schedule.

pub mod config;
pub mod error;
pub mod metrics;
pub mod processes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod ws;

use std::sync::Arc;

use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>hostwatch</title></head>
<body>
<h1>hostwatch agent</h1>
<p>Live telemetry is streamed over WebSocket at <code>/ws</code>.</p>
<p>Events: <code>systemInfo</code>, <code>resourceUpdate</code>, <code>processUpdate</code>, <code>chromeData</code>.</p>
</body>
</html>
"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// Builds state for a config: live enumerator selected for this platform.
pub fn build_state(cfg: &config::AgentConfig) -> AppState {
    let total_memory = metrics::MetricSampler::new().total_memory();
    let enumerator = processes::ProcessEnumerator::new(
        processes::Platform::detect().source(),
        total_memory,
        cfg.proc_timeout,
        cfg.proc_concurrency,
    );
    AppState {
        broker: Arc::new(session::SessionBroker::new(session::Schedule::default())),
        enumerator: Arc::new(enumerator),
        simulate: cfg.simulate,
    }
}
