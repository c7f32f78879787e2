use super::types::{InputMode, RowKind};
use crate::ui_utils::LayoutUtils;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

impl super::BrowseScreen {
    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        // Move events from hot buffer to main buffer
        tui_logger::move_events();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Page header
                Constraint::Min(0),    // Tree view
                Constraint::Length(8), // Log
                Constraint::Length(1), // Help line
            ])
            .split(area);

        self.render_header(f, chunks[0]);
        self.render_tree_view(f, chunks[1]);
        self.render_log(f, chunks[2]);
        self.render_help_line(f, chunks[3]);

        if self.input_mode == InputMode::Editing {
            self.render_location_prompt(f, area);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mode = format!("{:?}", self.page.contract().mode);
        let header = LayoutUtils::create_title_paragraph(Line::from(vec![
            Span::styled(&self.page_name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  location: "),
            Span::styled(self.location(), Style::default().fg(Color::Yellow)),
            Span::raw("  mode: "),
            Span::styled(mode, Style::default().fg(Color::Cyan)),
        ]));
        f.render_widget(header, area);
    }

    fn render_tree_view(&mut self, f: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize; // Subtract borders
        self.current_visible_height = visible_height;
        self.tree_area = Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };
        self.update_scroll_with_height(visible_height);

        let start_idx = self.scroll_offset.min(self.tree_rows.len());
        let end_idx = (start_idx + visible_height).min(self.tree_rows.len());
        let visible_rows = &self.tree_rows[start_idx..end_idx];

        let items: Vec<ListItem> = visible_rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let is_selected = start_idx + i == self.selected_row_index;

                let icon = match row.kind {
                    RowKind::Collapsible | RowKind::Toggle => "📁",
                    RowKind::Link => "📄",
                };
                let indent = "  ".repeat(row.level);
                let expand_icon = if row.should_show_expand_indicator() {
                    if row.is_expanded { "▼" } else { "▶" }
                } else {
                    " "
                };
                let mut text = format!("{indent}{expand_icon} {icon} {}", row.name);
                if let Some(href) = &row.href {
                    text.push_str(&format!("  {href}"));
                }

                let style = match (is_selected, row.is_current) {
                    (true, true) => Style::default().bg(Color::Blue).fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    (true, false) => Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
                    (false, true) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    (false, false) => Style::default().fg(Color::White),
                };

                ListItem::new(Line::from(text)).style(style)
            })
            .collect();

        let title = if self.tree_rows.len() > visible_height {
            format!("Navigation ({}/{} shown)", visible_rows.len(), self.tree_rows.len())
        } else {
            "Navigation".to_string()
        };

        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        );
        f.render_widget(list, area);

        if self.tree_rows.len() > visible_height {
            self.render_tree_scrollbar(f, area, visible_height);
        }
    }

    fn render_tree_scrollbar(&self, f: &mut Frame, area: Rect, visible_height: usize) {
        if area.width == 0 || self.tree_rows.is_empty() {
            return;
        }
        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        if scrollbar_area.height == 0 {
            return;
        }

        let total_items = self.tree_rows.len();
        let scrollbar_height = scrollbar_area.height as usize;

        // Calculate thumb position and size
        let thumb_size = ((visible_height * scrollbar_height) / total_items).max(1);
        let thumb_position = (self.scroll_offset * scrollbar_height) / total_items;

        for y in 0..scrollbar_height {
            let is_thumb = y >= thumb_position && y < thumb_position + thumb_size;
            let symbol = if is_thumb { "█" } else { "│" };
            let style = if is_thumb {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            f.render_widget(
                Paragraph::new(symbol).style(style),
                Rect {
                    x: scrollbar_area.x,
                    y: scrollbar_area.y + y as u16,
                    width: 1,
                    height: 1,
                },
            );
        }
    }

    fn render_log(&self, f: &mut Frame, area: Rect) {
        let logger_widget = TuiLoggerWidget::default()
            .block(Block::default().title("Log").borders(Borders::ALL))
            .output_timestamp(Some("%H:%M:%S".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Long))
            .output_target(false)
            .output_file(false)
            .output_line(false)
            .output_separator(' ')
            .style_info(Style::default().fg(Color::White))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_error(Style::default().fg(Color::Red))
            .style_debug(Style::default().fg(Color::DarkGray))
            .style_trace(Style::default().fg(Color::Gray))
            .state(&self.logger_widget_state);
        f.render_widget(logger_widget, area);
    }

    fn render_help_line(&self, f: &mut Frame, area: Rect) {
        let last = match &self.last_report {
            Some(report) => report.summary(),
            None => "not reconciled yet".to_string(),
        };
        let help = Paragraph::new(Line::from(vec![
            Span::styled(last, Style::default().fg(Color::Yellow)),
            Span::raw(" | ↑/↓ move, ←/→ collapse/expand, Enter click, / location, r reload, q quit"),
        ]))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        f.render_widget(help, area);
    }

    fn render_location_prompt(&self, f: &mut Frame, area: Rect) {
        let popup_area = LayoutUtils::centered_rect(60, 20, area);
        let popup_area = Rect {
            height: popup_area.height.max(3).min(area.height),
            ..popup_area
        };
        f.render_widget(Clear, popup_area);

        // Use tui-input's built-in scrolling
        let width = popup_area.width.max(3) - 3;
        let scroll = self.location_input.visual_scroll(width as usize);
        let input = Paragraph::new(self.location_input.value())
            .style(Style::default().fg(Color::Yellow))
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .title("Go to location (Enter to apply, Esc to cancel)")
                    .borders(Borders::ALL)
                    .title_style(Style::default().fg(Color::Yellow)),
            );
        f.render_widget(input, popup_area);

        let cursor_x = self.location_input.visual_cursor().max(scroll) - scroll + 1;
        f.set_cursor_position((popup_area.x + cursor_x as u16, popup_area.y + 1));
    }
}
