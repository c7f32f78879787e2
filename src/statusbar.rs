use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::nav::ReconcileMode;

pub struct StatusBarRenderer {
    pub status_message: String,
    pub location: String,
    pub mode: ReconcileMode,
}

impl StatusBarRenderer {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            status_message: "Ready".to_string(),
            location: "-".to_string(),
            mode,
        }
    }

    pub fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = format!(
            " {} | Location: {} | Mode: {:?}",
            self.status_message, self.location, self.mode
        );

        let status =
            Paragraph::new(status_text).style(Style::default().bg(Color::Blue).fg(Color::White));
        f.render_widget(status, area);
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = message;
    }

    pub fn set_location(&mut self, location: String) {
        self.location = location;
    }
}
