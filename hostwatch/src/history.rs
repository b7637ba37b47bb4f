//! Bounded history for the CPU/memory charts.

use std::collections::VecDeque;

use hostwatch_core::ResourceSample;

/// Points kept on screen for each usage chart.
pub const SERIES_CAP: usize = 20;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub cpu: f64,
    pub memory: f64,
}

// Starts full of blank points so the charts have a fixed width from the first frame.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    points: VecDeque<SeriesPoint>,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingSeries {
    pub fn new() -> Self {
        Self {
            points: std::iter::repeat_with(SeriesPoint::default)
                .take(SERIES_CAP)
                .collect(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, sample: &ResourceSample) {
        push_capped(
            &mut self.points,
            SeriesPoint {
                label: label.into(),
                cpu: sample.cpu_usage,
                memory: sample.memory_usage,
            },
            SERIES_CAP,
        );
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    // Sparkline data (whole percents).
    pub fn cpu_bars(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.cpu.round() as u64).collect()
    }

    pub fn memory_bars(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.memory.round() as u64).collect()
    }
}

/// Wall-clock label for a new point.
pub fn now_label() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
