//! App state and main loop: input handling, draining channel events, driving
//! the fallback timer, and drawing.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::session::{ClientEvent, ClientSession};
use crate::ui::processes::{clamp_offset, draw_processes, processes_handle_key};
use crate::ui::{header::draw_header, timeline::draw_timeline, usage};
use crate::ws::spawn_channel;

// Queue between the channel task and the UI loop.
const EVENT_QUEUE: usize = 256;
const FRAME: Duration = Duration::from_millis(100);

pub struct App {
    pub session: ClientSession,
    pub searching: bool,
    pub procs_scroll_offset: usize,
    should_quit: bool,
    last_procs_area: Option<Rect>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(ClientSession::default())
    }
}

impl App {
    pub fn new(session: ClientSession) -> Self {
        Self {
            session,
            searching: false,
            procs_scroll_offset: 0,
            should_quit: false,
            last_procs_area: None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// `url == None` runs without a channel: simulated data from the start.
    pub async fn run(&mut self, url: Option<String>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE);
        let channel = match url {
            Some(url) => Some(spawn_channel(url, tx)),
            None => {
                self.session
                    .apply(ClientEvent::ChannelUnavailable, Instant::now());
                None
            }
        };

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal, &mut rx).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        if let Some(h) = channel {
            h.abort();
        }

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<ClientEvent>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    self.handle_key(k);
                }
            }
            if self.should_quit() {
                break;
            }

            // Both producers are applied here, in arrival order.
            while let Ok(ev) = rx.try_recv() {
                self.session.apply(ev, Instant::now());
            }
            self.session.poll(Instant::now());

            terminal.draw(|f| self.draw(f))?;
            sleep(FRAME).await;
        }
        Ok(())
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        if k.kind != KeyEventKind::Press {
            return;
        }
        if self.searching {
            match k.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                KeyCode::Backspace => self.session.table.pop_query_char(),
                KeyCode::Char(c) => self.session.table.push_query_char(c),
                _ => {}
            }
            self.procs_scroll_offset = 0;
            return;
        }
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
        if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Tab => self.session.cycle_category(),
            KeyCode::Char('r') => self.session.regenerate_timeline(),
            _ => {
                // page size = visible rows (borders 2 + search 1 + header 1)
                let page = self
                    .last_procs_area
                    .map(|a| a.height.saturating_sub(4).max(1) as usize)
                    .unwrap_or(10);
                processes_handle_key(&mut self.procs_scroll_offset, k, page);
                self.procs_scroll_offset = clamp_offset(
                    self.procs_scroll_offset,
                    self.session.table.visible().len(),
                    page,
                );
            }
        }
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, usage charts, timeline, processes
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),   // header
                Constraint::Length(8),   // cpu + memory
                Constraint::Length(8),   // timeline
                Constraint::Min(8),      // processes
            ])
            .split(area);

        draw_header(f, rows[0], &self.session);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        usage::draw_cpu(f, charts[0], &self.session.series);
        usage::draw_memory(f, charts[1], &self.session.series);

        draw_timeline(f, rows[2], &self.session.timeline, self.session.category);

        // Cache for input handlers
        self.last_procs_area = Some(rows[3]);
        draw_processes(
            f,
            rows[3],
            &self.session.table,
            self.procs_scroll_offset,
            self.searching,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_core::TimelineCategory;
    use rand::{rngs::StdRng, SeedableRng};
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(ClientSession::new(StdRng::seed_from_u64(1)))
    }

    fn press(a: &mut App, code: KeyCode) {
        a.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn search_mode_captures_keys() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        assert!(a.searching);
        for c in "qr".chars() {
            press(&mut a, KeyCode::Char(c));
        }
        assert!(!a.should_quit(), "q is text while searching");
        assert_eq!(a.session.table.query(), "qr");
        press(&mut a, KeyCode::Backspace);
        press(&mut a, KeyCode::Enter);
        assert!(!a.searching);
        assert_eq!(a.session.table.query(), "q");
        press(&mut a, KeyCode::Char('q'));
        assert!(a.should_quit());
    }

    #[test]
    fn tab_and_regenerate() {
        let mut a = app();
        let before = a.session.timeline.clone();
        press(&mut a, KeyCode::Tab);
        assert_eq!(a.session.category, TimelineCategory::Memory);
        press(&mut a, KeyCode::Char('r'));
        assert_ne!(a.session.timeline, before);
    }

    #[test]
    fn draws_a_simulated_frame() {
        let mut a = app();
        a.session
            .apply(ClientEvent::ChannelUnavailable, Instant::now());
        let mut term = Terminal::new(TestBackend::new(100, 40)).unwrap();
        term.draw(|f| a.draw(f)).unwrap();
        let text: String = term
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Simulated Data"));
        assert!(text.contains("USER-PC"));
        assert!(text.contains("Performance"));
    }
}
