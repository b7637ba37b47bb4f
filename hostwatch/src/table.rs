//! Process table view model: current snapshot plus the search filter.

use hostwatch_core::{ProcessRecord, MAX_PROCESSES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Low,
    Medium,
    High,
}

pub fn cpu_level(cpu: f64) -> UsageLevel {
    if cpu > 20.0 {
        UsageLevel::High
    } else if cpu > 10.0 {
        UsageLevel::Medium
    } else {
        UsageLevel::Low
    }
}

pub fn memory_level(memory: f64) -> UsageLevel {
    if memory > 10.0 {
        UsageLevel::High
    } else if memory > 5.0 {
        UsageLevel::Medium
    } else {
        UsageLevel::Low
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessTableView {
    records: Vec<ProcessRecord>,
    query: String,
}

impl ProcessTableView {
    /// Replaces the snapshot; the query survives.
    pub fn set_records(&mut self, records: Vec<ProcessRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    /// Rows to show: name (case-insensitive) or pid substring matches, first
    /// [`MAX_PROCESSES`] in snapshot order.
    pub fn visible(&self) -> Vec<&ProcessRecord> {
        let needle = self.query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.pid.to_string().contains(&needle)
            })
            .take(MAX_PROCESSES)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::ProcessStatus;

    fn rec(pid: u32, name: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.into(),
            cpu: 1.0,
            memory: 1.0,
            status: ProcessStatus::Running,
            started: String::new(),
        }
    }

    #[test]
    fn search_matches_name_or_pid() {
        let mut t = ProcessTableView::default();
        t.set_records(vec![rec(1234, "Chrome.exe"), rec(42, "node"), rec(9123, "bash")]);

        t.query = String::from("chrome");
        let pids: Vec<u32> = t.visible().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1234]);

        t.query = String::from("123");
        let pids: Vec<u32> = t.visible().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1234, 9123]);

        t.query = String::from("");
        assert_eq!(t.visible().len(), 3);
    }

    #[test]
    fn at_most_fifty_rows() {
        let mut t = ProcessTableView::default();
        t.set_records((1..=80).map(|i| rec(i, "worker")).collect());
        t.query = String::from("work");
        assert_eq!(t.visible().len(), MAX_PROCESSES);
        assert_eq!(t.visible()[0].pid, 1);
    }

    #[test]
    fn query_editing() {
        let mut t = ProcessTableView::default();
        t.push_query_char('n');
        t.push_query_char('o');
        t.pop_query_char();
        assert_eq!(t.query(), "n");
    }

    #[test]
    fn usage_thresholds_are_exclusive() {
        assert_eq!(cpu_level(20.0), UsageLevel::Medium);
        assert_eq!(cpu_level(20.1), UsageLevel::High);
        assert_eq!(cpu_level(10.0), UsageLevel::Low);
        assert_eq!(memory_level(10.0), UsageLevel::Medium);
        assert_eq!(memory_level(5.0), UsageLevel::Low);
        assert_eq!(memory_level(11.0), UsageLevel::High);
    }
}
