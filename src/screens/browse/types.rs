use crate::dom::NodeId;
use crate::nav::{PageController, ReconcileReport};
use ratatui::layout::Rect;
use tui_input::Input;
use tui_logger::TuiWidgetState;

#[derive(Clone, Debug, PartialEq)]
pub enum RowKind {
    /// `<details>`-style container, opened through its summary
    Collapsible,
    /// Caret toggle paired with a nested container
    Toggle,
    /// Tree link to a page
    Link,
}

/// One visible line of the navigation tree.
#[derive(Clone, Debug)]
pub struct TreeRow {
    pub node: NodeId,
    /// Node that receives the click for this row
    pub click_target: NodeId,
    pub name: String,
    pub kind: RowKind,
    pub level: usize,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_current: bool,
    pub href: Option<String>,
}

impl TreeRow {
    pub fn should_show_expand_indicator(&self) -> bool {
        matches!(self.kind, RowKind::Collapsible | RowKind::Toggle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    Quit,
}

pub struct BrowseScreen {
    pub page: PageController,
    pub page_name: String,

    // Tree navigation state
    pub tree_rows: Vec<TreeRow>,
    pub selected_row_index: usize,
    pub scroll_offset: usize,
    pub current_visible_height: usize,
    pub tree_area: Rect,

    // Location prompt
    pub input_mode: InputMode,
    pub location_input: Input,

    pub logger_widget_state: TuiWidgetState,
    pub last_report: Option<ReconcileReport>,

    // Mouse state for double-click detection
    pub last_click_time: Option<std::time::Instant>,
    pub last_click_position: Option<(u16, u16)>,
}

impl BrowseScreen {
    pub fn new(page: PageController, page_name: String) -> Self {
        let mut browse_screen = Self {
            page,
            page_name,
            tree_rows: Vec::new(),
            selected_row_index: 0,
            scroll_offset: 0,
            current_visible_height: 0,
            tree_area: Rect::default(),
            input_mode: InputMode::Normal,
            location_input: Input::default(),
            logger_widget_state: TuiWidgetState::new(),
            last_report: None,
            last_click_time: None,
            last_click_position: None,
        };

        browse_screen.rebuild_rows();
        browse_screen
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.tree_rows.get(self.selected_row_index)
    }

    pub fn location(&self) -> &str {
        self.page.location().unwrap_or("-")
    }
}
