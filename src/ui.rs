use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{
    io::{self, Stdout},
    time::{Duration, Instant},
};

use crate::screens::browse::{BrowseScreen, ScreenAction};
use crate::statusbar::StatusBarRenderer;

pub struct App {
    browse_screen: BrowseScreen,
    statusbar_renderer: StatusBarRenderer,
    should_quit: bool,
}

impl App {
    pub fn new(browse_screen: BrowseScreen) -> Self {
        let statusbar_renderer = StatusBarRenderer::new(browse_screen.page.contract().mode);
        Self {
            browse_screen,
            statusbar_renderer,
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen, EnableMouseCapture)?;

        let result = self.run_app(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn run_app(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|f| self.ui(f))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                let action = match event::read()? {
                    // Windows reports both press and release
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.browse_screen.handle_input(key.code, key.modifiers)
                    }
                    Event::Mouse(mouse) => self.browse_screen.handle_mouse_input(mouse),
                    _ => None,
                };
                if let Some(ScreenAction::Quit) = action {
                    self.should_quit = true;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }

            if self.should_quit {
                log::info!("leaving browse screen");
                break;
            }
        }

        Ok(())
    }

    fn on_tick(&mut self) {
        let screen = &self.browse_screen;
        self.statusbar_renderer.set_location(screen.location().to_string());
        let message = match screen.selected_row() {
            Some(row) => match &row.href {
                Some(href) => format!("{} -> {href}", row.name),
                None => row.name.clone(),
            },
            None => "Empty navigation".to_string(),
        };
        self.statusbar_renderer.set_status_message(message);
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.browse_screen.render(f, chunks[0]);
        self.statusbar_renderer.render_status_bar(f, chunks[1]);
    }
}
