//! Process table enumeration through the platform's listing command.
//!
//! Each platform is a [`ProcessSource`]: the command to run plus a pure parser
//! for its stdout, so parsers are testable against captured output. The
//! source is picked once at startup by [`Platform::detect`].

use std::process::Stdio;
use std::time::Duration;

use chrono::Local;
use hostwatch_core::format::round1;
use hostwatch_core::types::sort_by_cpu_desc;
use hostwatch_core::{ProcessRecord, ProcessStatus, MAX_PROCESSES};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::EnumerateError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONCURRENCY: usize = 4;

/// tasklist reports no CPU figures; every Windows row carries this value.
pub const TASKLIST_CPU_PLACEHOLDER: f64 = 0.0;

pub trait ProcessSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn program(&self) -> &'static str;

    fn args(&self) -> &[&'static str];

    /// Parses raw stdout. Malformed rows are dropped, never fatal.
    fn parse(&self, stdout: &str, total_memory: u64) -> Vec<ProcessRecord>;

    /// Known gaps in what this source can report, logged once at startup.
    fn data_quality_note(&self) -> Option<&'static str> {
        None
    }
}

/// Windows family: `tasklist /FO CSV /NH`.
pub struct TasklistSource;

impl ProcessSource for TasklistSource {
    fn name(&self) -> &'static str {
        "tasklist"
    }

    fn program(&self) -> &'static str {
        "tasklist"
    }

    fn args(&self) -> &[&'static str] {
        &["/FO", "CSV", "/NH"]
    }

    fn parse(&self, stdout: &str, total_memory: u64) -> Vec<ProcessRecord> {
        parse_tasklist_csv(stdout, total_memory)
    }

    fn data_quality_note(&self) -> Option<&'static str> {
        Some("tasklist does not report CPU usage or start time; process cpu is a placeholder (0.0) and started is the sampling time")
    }
}

/// POSIX family: `ps -eo pid,pcpu,pmem,state,time,comm`, busiest first.
pub struct PsSource {
    args: Vec<&'static str>,
}

impl Default for PsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PsSource {
    pub fn new() -> Self {
        #[cfg(target_os = "linux")]
        let args = vec!["-eo", "pid,pcpu,pmem,state,time,comm", "--sort=-pcpu"];
        // BSD ps has no --sort; -r orders by cpu.
        #[cfg(not(target_os = "linux"))]
        let args = vec!["-r", "-eo", "pid,pcpu,pmem,state,time,comm"];
        Self { args }
    }
}

impl ProcessSource for PsSource {
    fn name(&self) -> &'static str {
        "ps"
    }

    fn program(&self) -> &'static str {
        "ps"
    }

    fn args(&self) -> &[&'static str] {
        &self.args
    }

    fn parse(&self, stdout: &str, _total_memory: u64) -> Vec<ProcessRecord> {
        parse_ps_output(stdout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn source(self) -> Box<dyn ProcessSource> {
        match self {
            Platform::Windows => Box::new(TasklistSource),
            Platform::Posix => Box::new(PsSource::new()),
        }
    }
}

/// Splits one `"a","b","c"` row. Returns `None` for anything not fully quoted.
fn split_quoted_csv(line: &str) -> Option<Vec<&str>> {
    let inner = line.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.split("\",\"").collect())
}

/// Rows: `"name","pid","session","sessionNum","12,345 K"`.
pub fn parse_tasklist_csv(stdout: &str, total_memory: u64) -> Vec<ProcessRecord> {
    let started = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut out: Vec<ProcessRecord> = stdout
        .lines()
        .filter_map(|line| {
            let fields = split_quoted_csv(line)?;
            if fields.len() < 5 {
                return None;
            }
            let pid = fields[1].trim().parse::<u32>().ok().filter(|p| *p > 0)?;
            // Grouping separators and the unit suffix vary by locale; keep digits.
            let digits: String = fields[4].chars().filter(char::is_ascii_digit).collect();
            let mem_kb = digits.parse::<u64>().ok()?;
            let memory = if total_memory > 0 {
                round1(mem_kb as f64 * 1024.0 / total_memory as f64 * 100.0)
            } else {
                0.0
            };
            Some(ProcessRecord {
                pid,
                name: fields[0].to_string(),
                cpu: TASKLIST_CPU_PLACEHOLDER,
                memory,
                status: ProcessStatus::Running,
                started: started.clone(),
            })
        })
        .collect();
    // Memory is the only real signal here; the cpu sort below is stable.
    out.sort_by(|a, b| b.memory.total_cmp(&a.memory));
    out
}

/// Header line first, then `pid %cpu %mem state time comm...` rows.
pub fn parse_ps_output(stdout: &str) -> Vec<ProcessRecord> {
    stdout
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                return None;
            }
            let pid = parts[0].parse::<u32>().ok().filter(|p| *p > 0)?;
            let cpu = parts[1].parse::<f64>().ok()?;
            let memory = parts[2].parse::<f64>().ok()?;
            Some(ProcessRecord {
                pid,
                name: parts[5..].join(" "),
                // Multi-threaded processes can exceed one core's worth.
                cpu: round1(cpu.clamp(0.0, 100.0)),
                memory: round1(memory),
                status: ProcessStatus::from(parts[3]),
                started: parts[4].to_string(),
            })
        })
        .collect()
}

/// Sort busiest first and cap at [`MAX_PROCESSES`].
pub fn normalize(mut records: Vec<ProcessRecord>) -> Vec<ProcessRecord> {
    sort_by_cpu_desc(&mut records);
    records.truncate(MAX_PROCESSES);
    records
}

/// Runs `program args...` with a hard timeout; the child is killed on expiry.
async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, EnumerateError> {
    let cmd = format!("{program} {}", args.join(" "));
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| EnumerateError::Spawn {
            cmd: cmd.clone(),
            source,
        })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(output)) => Err(EnumerateError::NonZeroExit {
            cmd,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }),
        Ok(Err(source)) => Err(EnumerateError::Spawn { cmd, source }),
        Err(_) => Err(EnumerateError::Timeout { cmd, timeout }),
    }
}

/// Shared by all sessions. Concurrent invocations are bounded by a semaphore.
pub struct ProcessEnumerator {
    source: Box<dyn ProcessSource>,
    total_memory: u64,
    timeout: Duration,
    permits: Semaphore,
}

impl ProcessEnumerator {
    pub fn new(
        source: Box<dyn ProcessSource>,
        total_memory: u64,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            total_memory,
            timeout,
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn data_quality_note(&self) -> Option<&'static str> {
        self.source.data_quality_note()
    }

    pub async fn list_processes(&self) -> Result<Vec<ProcessRecord>, EnumerateError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EnumerateError::LimiterClosed)?;
        let stdout = run_command(self.source.program(), self.source.args(), self.timeout).await?;
        let records = self.source.parse(&stdout, self.total_memory);
        debug!(source = self.source.name(), rows = records.len(), "process listing parsed");
        Ok(normalize(records))
    }

    /// Failures degrade to an empty snapshot for this tick.
    pub async fn list_or_empty(&self) -> Vec<ProcessRecord> {
        match self.list_processes().await {
            Ok(v) => v,
            Err(e) => {
                warn!(source = self.source.name(), "process listing failed: {e}");
                Vec::new()
            }
        }
    }
}
