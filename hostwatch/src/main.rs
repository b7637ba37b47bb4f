//! Entry point for the hostwatch TUI. Parses args and runs the App.

mod app;
mod history;
mod session;
mod table;
mod ui;
mod ws;

use std::env;
use std::fs::File;
use std::sync::Mutex;

use app::App;

const DEFAULT_URL: &str = "ws://127.0.0.1:3000/ws";

#[derive(Debug, PartialEq, Eq)]
struct ParsedArgs {
    /// `None` means run without a channel (`--simulate`).
    url: Option<String>,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--simulate] [ws://HOST:PORT/ws]\n\
         \n\
         Connects to {DEFAULT_URL} when no URL is given. With --simulate no\n\
         connection is made and the dashboard runs on simulated data.\n\
         \n\
         Environment:\n\
         \x20 HOSTWATCH_LOG_FILE   write logs to this file (RUST_LOG filters, default info)"
    )
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostwatch".into());
    let mut url: Option<String> = None;
    let mut simulate = false; // --simulate

    for arg in it {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--simulate" => simulate = true,
            _ if arg.starts_with('-') => {
                return Err(format!("Unexpected argument '{arg}'.\n{}", usage(&prog)))
            }
            _ => {
                if url.is_some() {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
                let parsed = url::Url::parse(&arg).map_err(|e| format!("invalid url '{arg}': {e}"))?;
                if !matches!(parsed.scheme(), "ws" | "wss") {
                    return Err(format!("url must use ws:// or wss://, got '{arg}'"));
                }
                url = Some(arg);
            }
        }
    }

    Ok(ParsedArgs {
        url: if simulate {
            None
        } else {
            Some(url.unwrap_or_else(|| DEFAULT_URL.to_string()))
        },
    })
}

// The TUI owns the terminal, so logs only go to a file when asked for.
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = env::var("HOSTWATCH_LOG_FILE") else {
        return Ok(());
    };
    let file = File::create(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) if msg.starts_with("Usage:") => {
            println!("{msg}");
            return Ok(());
        }
        Err(msg) => anyhow::bail!(msg),
    };
    init_logging()?;

    let mut app = App::default();
    app.run(parsed.url).await
}
