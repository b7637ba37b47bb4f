//! hostwatch_agent entry point: parses config, wires state, serves HTTP + WS.

use std::net::SocketAddr;

use hostwatch_agent::{build_state, config, router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config::from_env() {
        Ok(cfg) => cfg,
        Err(msg) if msg.starts_with("Usage:") => {
            println!("{msg}");
            return Ok(());
        }
        Err(msg) => anyhow::bail!(msg),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = build_state(&cfg);
    if cfg.simulate {
        info!("serving synthetic telemetry (--simulate)");
    } else if let Some(note) = state.enumerator.data_quality_note() {
        warn!(source = state.enumerator.source_name(), "{note}");
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("hostwatch agent running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
