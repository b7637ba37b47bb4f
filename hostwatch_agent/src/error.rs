//! Error types for sampling and process enumeration.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// OS introspection failed; the affected emission is skipped, never faked.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("total physical memory reported as zero")]
    NoMemory,

    #[error("no CPUs reported by the OS")]
    NoCpus,

    #[error("failed to read CPU tick counters: {0}")]
    CpuTicks(#[from] std::io::Error),

    #[error("malformed CPU tick counters: {0:?}")]
    BadCpuTicks(String),
}

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("failed to execute `{cmd}`: {source}")]
    Spawn {
        cmd: String,
        source: std::io::Error,
    },

    #[error("`{cmd}` exited with {status}: {stderr}")]
    NonZeroExit {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{cmd}` timed out after {timeout:?}")]
    Timeout { cmd: String, timeout: Duration },

    #[error("process listing limiter closed")]
    LimiterClosed,
}
