use super::types::{InputMode, ScreenAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

const PAGE_SIZE: isize = 10;

impl super::BrowseScreen {
    pub fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<ScreenAction> {
        if self.input_mode == InputMode::Editing {
            self.handle_location_input(key, modifiers);
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(ScreenAction::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(ScreenAction::Quit)
            }
            KeyCode::Char('/') | KeyCode::Char('g') => self.open_location_prompt(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_SIZE),
            KeyCode::PageDown => self.move_selection(PAGE_SIZE),
            KeyCode::Home => {
                self.selected_row_index = 0;
                self.scroll_offset = 0;
            }
            KeyCode::End => {
                self.selected_row_index = self.tree_rows.len().saturating_sub(1);
                self.update_scroll();
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.click_row(self.selected_row_index),
            KeyCode::Right => {
                // Expand only, never navigate away
                if self.can_expand(self.selected_row_index) {
                    self.click_row(self.selected_row_index);
                }
            }
            KeyCode::Left => {
                // 1. If current row is expanded, collapse it
                // 2. Otherwise move to parent
                if self.can_collapse(self.selected_row_index) {
                    self.click_row(self.selected_row_index);
                } else {
                    self.move_to_parent();
                }
            }
            KeyCode::Char('r') => {
                // nothing to reload before the first navigation
                if let Some(location) = self.page.location().map(str::to_string) {
                    self.navigate_to(&location);
                }
            }
            _ => {}
        }
        None
    }

    fn open_location_prompt(&mut self) {
        let current = self.page.location().unwrap_or("/").to_string();
        self.location_input = Input::new(current);
        self.input_mode = InputMode::Editing;
    }

    fn handle_location_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let location = self.location_input.value().to_string();
                log::info!("navigating to {location}");
                self.navigate_to(&location);
            }
            // Let tui-input handle all other keys
            _ => {
                self.location_input
                    .handle_event(&crossterm::event::Event::Key(KeyEvent::new(key, modifiers)));
            }
        }
    }

    pub fn handle_mouse_input(&mut self, mouse: MouseEvent) -> Option<ScreenAction> {
        if self.input_mode == InputMode::Editing {
            return None;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_left_click(mouse.column, mouse.row, self.tree_area);
            }
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::ScrollDown => self.move_selection(1),
            _ => {}
        }
        None
    }

    fn handle_left_click(&mut self, x: u16, y: u16, tree_area: Rect) {
        // Check if click is within the tree area
        if x < tree_area.x
            || x >= tree_area.x + tree_area.width
            || y < tree_area.y
            || y >= tree_area.y + tree_area.height
        {
            return;
        }

        let relative_y = y.saturating_sub(tree_area.y);
        let clicked_index = (relative_y as usize).saturating_add(self.scroll_offset);
        if clicked_index >= self.tree_rows.len() {
            return;
        }

        self.selected_row_index = clicked_index;
        self.update_scroll();

        if self.is_double_click(x, y, Instant::now()) {
            self.click_row(clicked_index);
        }
    }

    fn is_double_click(&mut self, x: u16, y: u16, now: Instant) -> bool {
        const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(500);
        const DOUBLE_CLICK_DISTANCE: u16 = 2;

        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let time_diff = now.duration_since(last_time);
            let distance = x.abs_diff(last_pos.0) + y.abs_diff(last_pos.1);

            if time_diff <= DOUBLE_CLICK_THRESHOLD && distance <= DOUBLE_CLICK_DISTANCE {
                // Reset click tracking after detecting double-click
                self.last_click_time = None;
                self.last_click_position = None;
                return true;
            }
        }

        self.last_click_time = Some(now);
        self.last_click_position = Some((x, y));
        false
    }
}
