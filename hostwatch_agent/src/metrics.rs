//! Host metrics using sysinfo plus raw CPU tick counters.
//!
//! CPU busy % is computed from idle/total tick deltas between two consecutive
//! samples of the same sampler. The very first sample has no baseline and falls
//! back to the cumulative since-boot counters.

#[cfg(target_os = "linux")]
use std::fs;

use hostwatch_core::format::{format_bytes, format_uptime};
use hostwatch_core::{ResourceSample, SystemInfo};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::error::SampleError;

/// Aggregated tick counters across all cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTicks {
    pub idle: u64,
    pub total: u64,
}

impl CpuTicks {
    /// Parses the aggregate `cpu` line of /proc/stat:
    /// `cpu  user nice system idle iowait irq softirq steal ...`
    pub fn parse_proc_stat(s: &str) -> Option<CpuTicks> {
        let line = s.lines().find(|l| l.starts_with("cpu "))?;
        let vals: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .take(8)
            .map(|tok| tok.parse::<u64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if vals.len() < 4 {
            return None;
        }
        let idle = vals[3].saturating_add(vals.get(4).copied().unwrap_or(0));
        let total = vals.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        Some(CpuTicks { idle, total })
    }

    /// Busy percentage since `prev`, or since boot when there is no baseline.
    /// `None` when no ticks elapsed.
    pub fn busy_pct_since(self, prev: Option<CpuTicks>) -> Option<f64> {
        let (idle, total) = match prev {
            Some(p) => (
                self.idle.saturating_sub(p.idle),
                self.total.saturating_sub(p.total),
            ),
            None => (self.idle, self.total),
        };
        if total == 0 {
            return None;
        }
        Some((100.0 - 100.0 * (idle as f64 / total as f64)).clamp(0.0, 100.0))
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_ticks() -> Result<CpuTicks, SampleError> {
    let s = fs::read_to_string("/proc/stat")?;
    CpuTicks::parse_proc_stat(&s)
        .ok_or_else(|| SampleError::BadCpuTicks(s.lines().next().unwrap_or("").to_string()))
}

/// Node-style architecture label (`x64`, `arm64`, ...).
pub fn arch_label() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Kernel family name as `uname -s` would print it.
fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows_NT",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

fn host_name() -> String {
    System::host_name()
        .or_else(|| hostname::get().ok().and_then(|h| h.into_string().ok()))
        .unwrap_or_else(|| "unknown".into())
}

/// Per-session sampler. Owns its sysinfo handle and its previous tick
/// baseline so concurrent sessions never disturb each other's deltas.
pub struct MetricSampler {
    sys: System,
    last_ticks: Option<CpuTicks>,
    last_cpu: f64,
}

impl Default for MetricSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSampler {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        Self {
            sys: System::new_with_specifics(refresh_kind),
            last_ticks: None,
            last_cpu: 0.0,
        }
    }

    pub fn total_memory(&mut self) -> u64 {
        self.sys.refresh_memory();
        self.sys.total_memory()
    }

    pub fn system_info(&mut self) -> Result<SystemInfo, SampleError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SampleError::NoMemory);
        }
        let cpu_cores = self.sys.cpus().len();
        if cpu_cores == 0 {
            return Err(SampleError::NoCpus);
        }
        let release = System::kernel_version().unwrap_or_default();
        Ok(SystemInfo {
            os_type: format!("{} {}", os_family(), release).trim_end().to_string(),
            hostname: host_name(),
            uptime: format_uptime(System::uptime()),
            arch: arch_label().to_string(),
            total_memory: format_bytes(total, 2),
            cpu_cores,
        })
    }

    pub fn resource_usage(&mut self) -> Result<ResourceSample, SampleError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SampleError::NoMemory);
        }
        let used = total.saturating_sub(self.sys.available_memory());
        let memory_pct = used as f64 / total as f64 * 100.0;
        let cpu_pct = self.cpu_busy_pct()?;
        Ok(ResourceSample::new(cpu_pct, memory_pct))
    }

    #[cfg(target_os = "linux")]
    fn cpu_busy_pct(&mut self) -> Result<f64, SampleError> {
        let now = read_cpu_ticks()?;
        if let Some(pct) = now.busy_pct_since(self.last_ticks) {
            self.last_cpu = pct;
        }
        self.last_ticks = Some(now);
        Ok(self.last_cpu)
    }

    // No raw tick counters here; sysinfo already diffs between refreshes.
    #[cfg(not(target_os = "linux"))]
    fn cpu_busy_pct(&mut self) -> Result<f64, SampleError> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(SampleError::NoCpus);
        }
        self.last_cpu = f64::from(self.sys.global_cpu_usage());
        self.last_ticks = None;
        Ok(self.last_cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  100 0 50 800 50 0 0 0 0 0\n\
                        cpu0 50 0 25 400 25 0 0 0 0 0\n\
                        intr 12345\n";

    #[test]
    fn parses_aggregate_line_only() {
        let t = CpuTicks::parse_proc_stat(STAT).unwrap();
        assert_eq!(t, CpuTicks { idle: 850, total: 1000 });
    }

    #[test]
    fn rejects_garbage() {
        assert!(CpuTicks::parse_proc_stat("intr 1 2 3\n").is_none());
        assert!(CpuTicks::parse_proc_stat("cpu  a b c d\n").is_none());
    }

    #[test]
    fn first_sample_uses_cumulative_counters() {
        let t = CpuTicks { idle: 850, total: 1000 };
        let pct = t.busy_pct_since(None).unwrap();
        assert!((pct - 15.0).abs() < 1e-9);
    }

    #[test]
    fn later_samples_use_deltas() {
        let prev = CpuTicks { idle: 850, total: 1000 };
        // 100 new ticks, 25 of them idle -> 75% busy, regardless of history
        let now = CpuTicks { idle: 875, total: 1100 };
        let pct = now.busy_pct_since(Some(prev)).unwrap();
        assert!((pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn no_elapsed_ticks_yields_none() {
        let t = CpuTicks { idle: 10, total: 20 };
        assert!(t.busy_pct_since(Some(t)).is_none());
    }

    #[test]
    fn arch_labels_follow_node_names() {
        let label = arch_label();
        assert!(!label.is_empty());
        assert_ne!(label, "x86_64");
        assert_ne!(label, "aarch64");
    }

    #[test]
    fn live_system_info_is_sane() {
        let mut sampler = MetricSampler::new();
        let info = sampler.system_info().expect("system info");
        assert!(info.cpu_cores >= 1);
        assert!(info.uptime.ends_with("minutes"));
        let sample = sampler.resource_usage().expect("resource sample");
        assert!((0.0..=100.0).contains(&sample.cpu_usage));
        assert!((0.0..=100.0).contains(&sample.memory_usage));
    }
}
