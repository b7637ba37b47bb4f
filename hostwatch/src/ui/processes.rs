//! Process table with usage coloring, a search line and keyboard scrolling.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::table::{cpu_level, memory_level, ProcessTableView};
use crate::ui::theme::{usage_color, DIM};

const COLS: [Constraint; 6] = [
    Constraint::Length(8),      // PID
    Constraint::Percentage(35), // Name
    Constraint::Length(7),      // CPU %
    Constraint::Length(7),      // Mem %
    Constraint::Length(10),     // Status
    Constraint::Min(10),        // Started
];

pub fn draw_processes(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &ProcessTableView,
    scroll_offset: usize,
    searching: bool,
) {
    let visible = view.visible();
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Processes ({} shown of {})",
        visible.len(),
        view.records().len()
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(DIM)
    };
    let cursor = if searching { "_" } else { "" };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Search: ", search_style),
            Span::raw(format!("{}{cursor}", view.query())),
        ])),
        parts[0],
    );

    let viewport_rows = parts[1].height.saturating_sub(1) as usize;
    let offset = clamp_offset(scroll_offset, visible.len(), viewport_rows);

    let rows = visible.iter().skip(offset).take(viewport_rows).map(|p| {
        Row::new(vec![
            Cell::from(p.pid.to_string()).style(Style::default().fg(DIM)),
            Cell::from(p.name.clone()),
            Cell::from(format!("{:>5.1}%", p.cpu))
                .style(Style::default().fg(usage_color(cpu_level(p.cpu)))),
            Cell::from(format!("{:>5.1}%", p.memory))
                .style(Style::default().fg(usage_color(memory_level(p.memory)))),
            Cell::from(p.status.to_string()),
            Cell::from(p.started.clone()),
        ])
    });

    let header = Row::new(vec!["PID", "Name", "CPU %", "Mem %", "Status", "Started"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, parts[1]);
}

pub fn clamp_offset(offset: usize, total_rows: usize, viewport_rows: usize) -> usize {
    offset.min(total_rows.saturating_sub(viewport_rows))
}

/// Up/Down/PageUp/PageDown/Home/End. The draw step clamps the result.
pub fn processes_handle_key(scroll_offset: &mut usize, key: KeyEvent, page_size: usize) {
    match key.code {
        KeyCode::Up => *scroll_offset = scroll_offset.saturating_sub(1),
        KeyCode::Down => *scroll_offset = scroll_offset.saturating_add(1),
        KeyCode::PageUp => *scroll_offset = scroll_offset.saturating_sub(page_size.max(1)),
        KeyCode::PageDown => *scroll_offset = scroll_offset.saturating_add(page_size.max(1)),
        KeyCode::Home => *scroll_offset = 0,
        KeyCode::End => *scroll_offset = usize::MAX,
        _ => {}
    }
}
