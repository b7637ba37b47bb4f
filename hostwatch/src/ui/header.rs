//! Top header: host summary and connection status.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::session::{ClientSession, StatusBadge};
use crate::ui::theme::{status_color, DIM};

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, s: &ClientSession) {
    let status = s.status();
    let mut badge = format!(" {} ", status.label());
    if status == StatusBadge::Disconnected {
        if let Some(at) = s.fallback_deadline() {
            let left = at.saturating_duration_since(Instant::now());
            badge = format!(" Disconnected (simulating in {:.0}s) ", left.as_secs_f64().ceil());
        }
    }

    let title = Line::from(vec![
        Span::styled("hostwatch", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            badge,
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(status_color(status)),
        ),
        Span::styled(
            "  (q quit, / search, Tab timeline, r regenerate)",
            Style::default().fg(DIM),
        ),
    ]);

    let info = match &s.system_info {
        Some(i) => format!(
            "OS: {} | Host: {} | Uptime: {} | Arch: {} | Memory: {} | Cores: {}",
            i.os_type, i.hostname, i.uptime, i.arch, i.total_memory, i.cpu_cores
        ),
        None => "waiting for system info...".into(),
    };

    let p = Paragraph::new(vec![title, Line::from(info)])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(p, area);
}
