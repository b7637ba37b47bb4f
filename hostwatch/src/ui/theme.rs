//! Shared UI theme constants.

use ratatui::style::Color;

use crate::session::StatusBadge;
use crate::table::UsageLevel;

pub const CPU_FG: Color = Color::Cyan;
pub const MEM_FG: Color = Color::Magenta;
pub const DIM: Color = Color::DarkGray;

pub fn status_color(s: StatusBadge) -> Color {
    match s {
        StatusBadge::Live => Color::Green,
        StatusBadge::Connecting | StatusBadge::Simulated => Color::Yellow,
        StatusBadge::Disconnected => Color::Red,
    }
}

pub fn usage_color(level: UsageLevel) -> Color {
    match level {
        UsageLevel::Low => Color::Green,
        UsageLevel::Medium => Color::Yellow,
        UsageLevel::High => Color::Red,
    }
}
