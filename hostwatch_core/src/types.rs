//! Data types sent from the agent to its clients over WebSocket.
//! Keep this module minimal and stable: it defines the wire format.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::format::round1;

/// Quasi-static host description, sent once per connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os_type: String,
    pub hostname: String,
    pub uptime: String,
    pub arch: String,
    pub total_memory: String,
    pub cpu_cores: usize,
}

/// Point-in-time gauges; both values travel as one-decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSample {
    #[serde(with = "decimal_string")]
    pub cpu_usage: f64,
    #[serde(with = "decimal_string")]
    pub memory_usage: f64,
}

impl ResourceSample {
    pub fn new(cpu_usage: f64, memory_usage: f64) -> Self {
        Self {
            cpu_usage: round1(cpu_usage.clamp(0.0, 100.0)),
            memory_usage: round1(memory_usage.clamp(0.0, 100.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessStatus {
    Running,
    Suspended,
    /// Raw platform state code (e.g. `S`, `R`, `Z` from ps).
    Other(String),
}

impl ProcessStatus {
    /// Running and Suspended swap; platform codes are left alone.
    pub fn toggled(&self) -> Self {
        match self {
            ProcessStatus::Running => ProcessStatus::Suspended,
            ProcessStatus::Suspended => ProcessStatus::Running,
            ProcessStatus::Other(code) => ProcessStatus::Other(code.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcessStatus::Running => "Running",
            ProcessStatus::Suspended => "Suspended",
            ProcessStatus::Other(code) => code,
        }
    }
}

impl From<String> for ProcessStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Running" => ProcessStatus::Running,
            "Suspended" => ProcessStatus::Suspended,
            _ => ProcessStatus::Other(s),
        }
    }
}

impl From<&str> for ProcessStatus {
    fn from(s: &str) -> Self {
        ProcessStatus::from(s.to_string())
    }
}

impl From<ProcessStatus> for String {
    fn from(s: ProcessStatus) -> Self {
        match s {
            ProcessStatus::Other(code) => code,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    #[serde(serialize_with = "one_decimal", deserialize_with = "decimal_string::deserialize")]
    pub cpu: f64,
    #[serde(serialize_with = "one_decimal", deserialize_with = "decimal_string::deserialize")]
    pub memory: f64,
    pub status: ProcessStatus,
    // Timestamp on Windows, cumulative CPU time on POSIX.
    pub started: String,
}

/// Sorts records descending by cpu. Stable, so equal-cpu rows keep their order.
pub fn sort_by_cpu_desc(records: &mut [ProcessRecord]) {
    records.sort_by(|a, b| b.cpu.total_cmp(&a.cpu));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub process: String,
    pub task: String,
    pub start_time: u64,
    pub duration: u64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelineCategory {
    Performance,
    Memory,
    Network,
}

impl TimelineCategory {
    pub const ALL: [TimelineCategory; 3] = [
        TimelineCategory::Performance,
        TimelineCategory::Memory,
        TimelineCategory::Network,
    ];

    pub fn next(self) -> Self {
        match self {
            TimelineCategory::Performance => TimelineCategory::Memory,
            TimelineCategory::Memory => TimelineCategory::Network,
            TimelineCategory::Network => TimelineCategory::Performance,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineCategory::Performance => "Performance",
            TimelineCategory::Memory => "Memory",
            TimelineCategory::Network => "Network",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub performance: Vec<TimelineEvent>,
    pub memory: Vec<TimelineEvent>,
    pub network: Vec<TimelineEvent>,
}

impl TimelineSnapshot {
    pub fn events(&self, category: TimelineCategory) -> &[TimelineEvent] {
        match category {
            TimelineCategory::Performance => &self.performance,
            TimelineCategory::Memory => &self.memory,
            TimelineCategory::Network => &self.network,
        }
    }

    pub fn events_mut(&mut self, category: TimelineCategory) -> &mut Vec<TimelineEvent> {
        match category {
            TimelineCategory::Performance => &mut self.performance,
            TimelineCategory::Memory => &mut self.memory,
            TimelineCategory::Network => &mut self.network,
        }
    }
}

/// One pushed message: `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    SystemInfo(SystemInfo),
    ResourceUpdate(ResourceSample),
    ProcessUpdate(Vec<ProcessRecord>),
    ChromeData(TimelineSnapshot),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::SystemInfo(_) => "systemInfo",
            ServerEvent::ResourceUpdate(_) => "resourceUpdate",
            ServerEvent::ProcessUpdate(_) => "processUpdate",
            ServerEvent::ChromeData(_) => "chromeData",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

fn one_decimal<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round1(*v))
}

// Percentages as "12.3"; decoding also takes plain numbers.
mod decimal_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{v:.1}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(n),
            Raw::Text(t) => t.trim().parse::<f64>().map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_update_uses_decimal_strings() {
        let ev = ServerEvent::ResourceUpdate(ResourceSample::new(12.34, 56.78));
        let js = ev.to_json().unwrap();
        assert_eq!(
            js,
            r#"{"event":"resourceUpdate","data":{"cpuUsage":"12.3","memoryUsage":"56.8"}}"#
        );
    }

    #[test]
    fn process_record_accepts_string_percentages() {
        let js = r#"{"pid":42,"name":"node","cpu":"3.5","memory":1.25,"status":"S","started":"00:01:02"}"#;
        let p: ProcessRecord = serde_json::from_str(js).unwrap();
        assert_eq!(p.cpu, 3.5);
        assert_eq!(p.memory, 1.25);
        assert_eq!(p.status, ProcessStatus::Other("S".into()));
    }

    #[test]
    fn status_round_trips_known_names() {
        assert_eq!(ProcessStatus::from("Running"), ProcessStatus::Running);
        assert_eq!(String::from(ProcessStatus::Suspended), "Suspended");
        assert_eq!(ProcessStatus::Running.toggled(), ProcessStatus::Suspended);
        assert_eq!(
            ProcessStatus::Other("Z".into()).toggled(),
            ProcessStatus::Other("Z".into())
        );
    }

    #[test]
    fn system_info_field_names() {
        let info = SystemInfo {
            os_type: "Linux 6.1.0".into(),
            hostname: "box".into(),
            uptime: "0 days, 1 hours, 0 minutes".into(),
            arch: "x64".into(),
            total_memory: "16 GB".into(),
            cpu_cores: 8,
        };
        let v = serde_json::to_value(ServerEvent::SystemInfo(info)).unwrap();
        assert_eq!(v["event"], "systemInfo");
        assert_eq!(v["data"]["osType"], "Linux 6.1.0");
        assert_eq!(v["data"]["cpuCores"], 8);
        assert_eq!(v["data"]["totalMemory"], "16 GB");
    }
}
