//! CPU and memory sparklines fed from the rolling series.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
};

use crate::history::RollingSeries;
use crate::ui::theme::{CPU_FG, MEM_FG};

pub fn draw_usage(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    name: &str,
    data: &[u64],
    now: Option<f64>,
    color: Color,
) {
    let title = match now {
        Some(v) => format!("{name} (now: {v:>5.1}%)"),
        None => name.to_string(),
    };
    let max_points = area.width.saturating_sub(2) as usize;
    let start = data.len().saturating_sub(max_points);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data[start..])
        .max(100)
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}

pub fn draw_cpu(f: &mut ratatui::Frame<'_>, area: Rect, series: &RollingSeries) {
    let now = series.latest().map(|p| p.cpu);
    draw_usage(f, area, "CPU", &series.cpu_bars(), now, CPU_FG);
}

pub fn draw_memory(f: &mut ratatui::Frame<'_>, area: Rect, series: &RollingSeries) {
    let now = series.latest().map(|p| p.memory);
    draw_usage(f, area, "Memory", &series.memory_bars(), now, MEM_FG);
}
