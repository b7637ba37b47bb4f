//! Timeline panel: one row per process, events drawn as colored bar segments
//! scaled to the longest process in the selected category.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use hostwatch_core::{TimelineCategory, TimelineEvent, TimelineSnapshot};

use crate::ui::util::{hex_color, truncate_middle};

const NAME_W: usize = 18;

/// Groups events by process, keeping first-seen order.
pub fn rows(events: &[TimelineEvent]) -> Vec<(&str, Vec<&TimelineEvent>)> {
    let mut out: Vec<(&str, Vec<&TimelineEvent>)> = Vec::new();
    for ev in events {
        match out.iter_mut().find(|(p, _)| *p == ev.process) {
            Some((_, v)) => v.push(ev),
            None => out.push((ev.process.as_str(), vec![ev])),
        }
    }
    out
}

/// Column span `[from, to)` of an event in a bar `width` cells wide covering
/// `0..total` ms. Every event gets at least one cell.
pub fn span_cells(ev: &TimelineEvent, total: u64, width: usize) -> (usize, usize) {
    if total == 0 || width == 0 {
        return (0, 0);
    }
    let scale = |ms: u64| ((ms as u128 * width as u128) / total as u128) as usize;
    let from = scale(ev.start_time).min(width.saturating_sub(1));
    let to = scale(ev.start_time + ev.duration).clamp(from + 1, width);
    (from, to)
}

pub fn draw_timeline(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    snapshot: &TimelineSnapshot,
    category: TimelineCategory,
) {
    let events = snapshot.events(category);
    let total = events
        .iter()
        .map(|e| e.start_time + e.duration)
        .max()
        .unwrap_or(0);
    let title = format!("Chrome {} Timeline ({total} ms)", category.label());
    let block = Block::default().borders(Borders::ALL).title(title);
    let bar_w = (area.width as usize).saturating_sub(2 + NAME_W + 1);

    let lines: Vec<Line> = rows(events)
        .into_iter()
        .map(|(process, evs)| {
            let mut spans = vec![Span::raw(format!(
                "{:<width$} ",
                truncate_middle(process, NAME_W),
                width = NAME_W
            ))];
            let mut col = 0;
            for ev in evs {
                let (from, to) = span_cells(ev, total, bar_w);
                if to <= col {
                    continue;
                }
                let from = from.max(col);
                if from > col {
                    spans.push(Span::raw(" ".repeat(from - col)));
                }
                spans.push(Span::styled(
                    "█".repeat(to - from),
                    Style::default().fg(hex_color(&ev.color)),
                ));
                col = to;
            }
            Line::from(spans)
        })
        .collect();

    let body = if lines.is_empty() {
        vec![Line::from(Span::styled(
            "no events",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        lines
    };
    f.render_widget(Paragraph::new(body).block(block), area);
}
