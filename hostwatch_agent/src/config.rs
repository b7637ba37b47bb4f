//! Agent configuration: command-line flags with environment fallbacks.

use std::time::Duration;

use crate::processes::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub port: u16,
    pub simulate: bool,
    pub proc_timeout: Duration,
    pub proc_concurrency: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            simulate: false,
            proc_timeout: DEFAULT_TIMEOUT,
            proc_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT] [--simulate]\n\
         \n\
         Environment:\n\
         \x20 PORT                         listen port when no flag is given (default {DEFAULT_PORT})\n\
         \x20 HOSTWATCH_SIMULATE=1         serve synthetic telemetry\n\
         \x20 HOSTWATCH_PROC_TIMEOUT_MS    process listing timeout (default {})\n\
         \x20 HOSTWATCH_PROC_CONCURRENCY   concurrent process listings (default {DEFAULT_CONCURRENCY})\n\
         \x20 RUST_LOG                     log filter (default info)",
        DEFAULT_TIMEOUT.as_millis()
    )
}

/// Parses args (program name first) against an env lookup. `Err` carries the
/// text to print: usage for `--help`, or a message for bad input.
pub fn parse_args<I, F>(args: I, env: F) -> Result<AgentConfig, String>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "hostwatch_agent".into());
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    let mut simulate = env("HOSTWATCH_SIMULATE").is_some_and(|v| v != "0");

    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => return Err(usage(&prog)),
            "--port" => long = it.next(),
            "-p" => short = it.next(),
            "--simulate" => simulate = true,
            _ if a.starts_with("--port=") => {
                if let Some((_, v)) = a.split_once('=') {
                    long = Some(v.to_string());
                }
            }
            _ => return Err(format!("Unexpected argument '{a}'.\n{}", usage(&prog))),
        }
    }

    let port = match long.or(short).or_else(|| env("PORT")) {
        Some(s) => s
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("invalid port '{s}'"))?,
        None => DEFAULT_PORT,
    };

    let proc_timeout = env("HOSTWATCH_PROC_TIMEOUT_MS")
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);
    let proc_concurrency = env("HOSTWATCH_PROC_CONCURRENCY")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CONCURRENCY);

    Ok(AgentConfig {
        port,
        simulate,
        proc_timeout,
        proc_concurrency,
    })
}

pub fn from_env() -> Result<AgentConfig, String> {
    parse_args(std::env::args(), |k| std::env::var(k).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("agent")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn port_long_short_and_assign() {
        assert_eq!(parse_args(args(&["--port", "9001"]), no_env).unwrap().port, 9001);
        assert_eq!(parse_args(args(&["-p", "9002"]), no_env).unwrap().port, 9002);
        assert_eq!(parse_args(args(&["--port=9003"]), no_env).unwrap().port, 9003);
        assert_eq!(parse_args(args(&[]), no_env).unwrap().port, DEFAULT_PORT);
    }

    #[test]
    fn flag_beats_env_port() {
        let env = |k: &str| (k == "PORT").then(|| "4000".to_string());
        assert_eq!(parse_args(args(&[]), env).unwrap().port, 4000);
        assert_eq!(parse_args(args(&["-p", "5000"]), env).unwrap().port, 5000);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(parse_args(args(&["--port", "http"]), no_env).is_err());
        assert!(parse_args(args(&["--port", "70000"]), no_env).is_err());
    }

    #[test]
    fn help_returns_usage() {
        let err = parse_args(args(&["--help"]), no_env).unwrap_err();
        assert!(err.starts_with("Usage:"));
    }

    #[test]
    fn env_tuning() {
        let env = |k: &str| match k {
            "HOSTWATCH_SIMULATE" => Some("1".to_string()),
            "HOSTWATCH_PROC_TIMEOUT_MS" => Some("250".to_string()),
            "HOSTWATCH_PROC_CONCURRENCY" => Some("0".to_string()),
            _ => None,
        };
        let cfg = parse_args(args(&[]), env).unwrap();
        assert!(cfg.simulate);
        assert_eq!(cfg.proc_timeout, Duration::from_millis(250));
        assert_eq!(cfg.proc_concurrency, DEFAULT_CONCURRENCY);
    }
}
