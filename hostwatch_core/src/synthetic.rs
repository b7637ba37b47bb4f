//! Synthetic telemetry: fabricated process tables, resource gauges and
//! timelines with bounded random-walk dynamics. Used as placeholder data and
//! as the full fallback when no live channel exists.

use std::time::Duration;

use chrono::Local;
use rand::seq::index::sample;
use rand::Rng;

use crate::format::round1;
use crate::types::{
    sort_by_cpu_desc, ProcessRecord, ProcessStatus, ResourceSample, SystemInfo,
    TimelineCategory, TimelineEvent, TimelineSnapshot,
};

const PROCESS_NAMES: [&str; 20] = [
    "chrome.exe",
    "firefox.exe",
    "explorer.exe",
    "svchost.exe",
    "devenv.exe",
    "node.exe",
    "postgres.exe",
    "slack.exe",
    "code.exe",
    "outlook.exe",
    "teams.exe",
    "discord.exe",
    "spotify.exe",
    "msedge.exe",
    "powershell.exe",
    "cmd.exe",
    "winword.exe",
    "excel.exe",
    "photoshop.exe",
    "notepad.exe",
];

const TIMELINE_PROCESSES: [&str; 5] = [
    "Chrome Main",
    "Chrome GPU",
    "Chrome Renderer",
    "Chrome Utility",
    "Chrome Extension",
];

const PERFORMANCE_TASKS: [(&str, &str); 5] = [
    ("JavaScript Execution", "#4285F4"),
    ("Rendering", "#34A853"),
    ("Painting", "#FBBC05"),
    ("Compositing", "#EA4335"),
    ("Idle", "#9E9E9E"),
];

const MEMORY_TASKS: [(&str, &str); 4] = [
    ("Heap Allocation", "#4285F4"),
    ("Garbage Collection", "#34A853"),
    ("Memory Leak", "#EA4335"),
    ("Cache Usage", "#FBBC05"),
];

const NETWORK_TASKS: [(&str, &str); 5] = [
    ("DNS Lookup", "#4285F4"),
    ("TCP Connection", "#34A853"),
    ("TLS Negotiation", "#FBBC05"),
    ("Request/Response", "#EA4335"),
    ("Content Download", "#9C27B0"),
];

pub const SPIKE_COUNT: usize = 3;
const THREE_DAYS_MS: i64 = 3 * 86_400_000;

pub const EVOLVE_CPU_RANGE: (f64, f64) = (0.1, 95.0);
pub const EVOLVE_MEMORY_RANGE: (f64, f64) = (0.1, 50.0);

/// A fresh table of 30..40 processes, three of them spiking, sorted by cpu.
pub fn generate_processes<R: Rng + ?Sized>(rng: &mut R) -> Vec<ProcessRecord> {
    let count = rng.gen_range(30..40);
    let now = Local::now();
    let mut records: Vec<ProcessRecord> = (0..count)
        .map(|_| {
            let started = now - chrono::Duration::milliseconds(rng.gen_range(0..THREE_DAYS_MS));
            ProcessRecord {
                pid: rng.gen_range(1000..11000),
                name: PROCESS_NAMES[rng.gen_range(0..PROCESS_NAMES.len())].to_string(),
                cpu: rng.gen_range(0.0..5.0),
                memory: rng.gen_range(0.0..2.0),
                status: if rng.gen_bool(0.1) {
                    ProcessStatus::Suspended
                } else {
                    ProcessStatus::Running
                },
                started: started.format("%Y-%m-%d %H:%M:%S").to_string(),
            }
        })
        .collect();

    for idx in sample(rng, records.len(), SPIKE_COUNT) {
        records[idx].cpu = rng.gen_range(15.0..35.0);
        records[idx].memory = rng.gen_range(5.0..15.0);
    }

    sort_by_cpu_desc(&mut records);
    records
}

/// One random-walk step for every record, then re-sort by cpu.
pub fn evolve<R: Rng + ?Sized>(records: &mut [ProcessRecord], rng: &mut R) {
    for p in records.iter_mut() {
        p.cpu = (p.cpu + rng.gen_range(-3.0..3.0)).clamp(EVOLVE_CPU_RANGE.0, EVOLVE_CPU_RANGE.1);
        p.memory = (p.memory + rng.gen_range(-0.5..1.5))
            .clamp(EVOLVE_MEMORY_RANGE.0, EVOLVE_MEMORY_RANGE.1);
        if rng.gen_bool(0.02) {
            p.status = p.status.toggled();
        }
    }
    sort_by_cpu_desc(records);
}

/// Noise riding on slow sinusoids so the trace looks organic. `t` is any
/// monotonically increasing clock (wall time since the epoch in practice).
pub fn generate_resource_sample<R: Rng + ?Sized>(rng: &mut R, t: Duration) -> ResourceSample {
    let ms = t.as_millis() as f64;
    let cpu = (rng.gen_range(0.0..50.0) + (ms / 10_000.0).sin() * 20.0 + 20.0).clamp(5.0, 95.0);
    let memory =
        (rng.gen_range(0.0..30.0) + (ms / 12_000.0).cos() * 15.0 + 40.0).clamp(10.0, 95.0);
    ResourceSample {
        cpu_usage: round1(cpu),
        memory_usage: round1(memory),
    }
}

/// Back-to-back events per process for every category.
pub fn generate_timeline<R: Rng + ?Sized>(rng: &mut R) -> TimelineSnapshot {
    let mut snap = TimelineSnapshot::default();
    for process in TIMELINE_PROCESSES {
        for category in TimelineCategory::ALL {
            let (tasks, lo, hi): (&[(&str, &str)], u64, u64) = match category {
                TimelineCategory::Performance => (&PERFORMANCE_TASKS[..], 100, 600),
                TimelineCategory::Memory => (&MEMORY_TASKS[..], 50, 350),
                TimelineCategory::Network => (&NETWORK_TASKS[..], 50, 450),
            };
            let mut start_time = 0;
            for (task, color) in tasks {
                let duration = rng.gen_range(lo..hi);
                snap.events_mut(category).push(TimelineEvent {
                    process: process.to_string(),
                    task: task.to_string(),
                    start_time,
                    duration,
                    color: color.to_string(),
                });
                start_time += duration;
            }
        }
    }
    snap
}

/// Placeholder host shown while running on synthetic data.
pub fn simulated_system_info() -> SystemInfo {
    SystemInfo {
        os_type: "Windows 10 Pro".into(),
        hostname: "USER-PC".into(),
        uptime: "2 days, 5 hours, 0 minutes".into(),
        arch: "x64".into(),
        total_memory: "16 GB".into(),
        cpu_cores: 8,
    }
}
