//! Popup layout and hit testing.
//!
//! The layout is a pure function of the screen area, the controller state
//! and the scroll offset, so rendering and mouse handling always agree on
//! where things are.
//!
//! ```text
//! ┌ Extensions ──────────────────────────────┐
//! │[ Update all ] [ Update all + reload tabs ]│  bulk bar
//! │                                          │
//! │◆ Dark Reader                 Updated   ⋮ │  row
//! │  [Close] [Update + reload tabs]          │  panel actions
//! │  ◆ docs.rs                               │  panel tab
//! │▤ JSON Viewer                           ⋮ │  row
//! │ Enter Menu │ a Update all │ q Quit        │  key hints
//! └──────────────────────────────────────────┘
//! ```

use ratatui::layout::{Position, Rect};
use unicode_width::UnicodeWidthStr;

use crate::controller::{Controller, MenuAction, PanelContent};

use super::action_menu::ActionMenu;

/// Width of a row's menu trigger.
pub const TRIGGER_WIDTH: u16 = 3;

/// Glyph drawn as the menu trigger.
pub const TRIGGER_GLYPH: &str = "⋮";

/// Label of the bulk update button.
pub const BULK_UPDATE_LABEL: &str = "Update all";

/// Label of the bulk update-and-reload button.
pub const BULK_RELOAD_LABEL: &str = "Update all + reload tabs";

/// Label of the panel's close button.
pub const PANEL_CLOSE_LABEL: &str = "Close";

/// Label of the panel's update-and-reload button.
pub const PANEL_RELOAD_LABEL: &str = "Update + reload tabs";

/// Indent of panel lines under their row.
pub const PANEL_INDENT: u16 = 2;

/// Horizontal extent of a bracketed button label: `[ label ]`.
#[must_use]
pub fn button_width(label: &str) -> u16 {
    label.width() as u16 + 4
}

/// What one list line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// An extension row.
    Row(usize),
    /// The Close / Update + reload buttons of a row's panel.
    PanelActions(usize),
    /// "Loading tabs...", "No open tabs." and the like.
    PanelMessage(usize),
    /// One tab entry of a row's panel.
    PanelTab { row: usize, tab: usize },
}

/// A list line and where it landed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLine {
    pub kind: LineKind,
    pub area: Rect,
}

/// Result of a mouse hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Trigger(usize),
    Row(usize),
    MenuItem(MenuAction),
    /// Inside the menu box but not on an item.
    MenuFrame,
    BulkUpdate,
    BulkReload,
    PanelClose(usize),
    PanelReload(usize),
    PanelTab { row: usize, tab: usize },
    /// Inside a panel but not on anything actionable.
    Panel(usize),
    Outside,
}

/// Every list line in order, before scrolling.
#[must_use]
pub fn list_lines(controller: &Controller) -> Vec<LineKind> {
    let mut lines = Vec::new();
    for (index, row) in controller.rows().iter().enumerate() {
        lines.push(LineKind::Row(index));
        if !controller.is_panel_open(row.id()) {
            continue;
        }
        lines.push(LineKind::PanelActions(index));
        match row.panel() {
            PanelContent::Loaded(entries) if !entries.is_empty() => {
                lines.extend((0..entries.len()).map(|tab| LineKind::PanelTab { row: index, tab }));
            }
            _ => lines.push(LineKind::PanelMessage(index)),
        }
    }
    lines
}

/// Adjusts `scroll` so that line `index` is inside a window of `height` lines.
#[must_use]
pub fn scroll_to_show(index: usize, scroll: usize, height: usize) -> usize {
    if height == 0 {
        return scroll;
    }
    if index < scroll {
        index
    } else if index >= scroll + height {
        index + 1 - height
    } else {
        scroll
    }
}

/// Screen areas of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLayout {
    /// Outer frame, border included.
    pub frame: Rect,
    /// Inside the border.
    pub inner: Rect,
    pub bulk_update: Rect,
    pub bulk_reload: Rect,
    /// Area the list lines scroll within.
    pub list: Rect,
    pub footer: Rect,
    /// Visible list lines.
    pub lines: Vec<ListLine>,
    /// Lines scrolled off above.
    pub hidden_above: usize,
    /// Lines that did not fit below.
    pub hidden_below: usize,
}

impl PopupLayout {
    /// Lays the popup out in `area`.
    #[must_use]
    pub fn compute(area: Rect, controller: &Controller, popup_width: u16, scroll: usize) -> Self {
        let width = popup_width.min(area.width);
        let frame = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y,
            width,
            area.height,
        );
        let inner = Rect::new(
            frame.x.saturating_add(1),
            frame.y.saturating_add(1),
            frame.width.saturating_sub(2),
            frame.height.saturating_sub(2),
        );

        let bulk_update = Rect::new(
            inner.x,
            inner.y,
            button_width(BULK_UPDATE_LABEL).min(inner.width),
            inner.height.min(1),
        );
        let reload_x = bulk_update.right().saturating_add(1).min(inner.right());
        let bulk_reload = Rect::new(
            reload_x,
            inner.y,
            button_width(BULK_RELOAD_LABEL).min(inner.right().saturating_sub(reload_x)),
            inner.height.min(1),
        );

        let list = Rect::new(
            inner.x,
            inner.y.saturating_add(2),
            inner.width,
            inner.height.saturating_sub(3),
        );
        let footer = Rect::new(
            inner.x,
            inner.bottom().saturating_sub(1),
            inner.width,
            inner.height.min(1),
        );

        let all = list_lines(controller);
        let scroll = scroll.min(all.len());
        let visible = list.height as usize;

        let lines: Vec<ListLine> = all
            .iter()
            .skip(scroll)
            .take(visible)
            .enumerate()
            .map(|(offset, kind)| ListLine {
                kind: *kind,
                area: Rect::new(list.x, list.y + offset as u16, list.width, 1),
            })
            .collect();

        let hidden_below = all.len().saturating_sub(scroll + lines.len());

        Self {
            frame,
            inner,
            bulk_update,
            bulk_reload,
            list,
            footer,
            lines,
            hidden_above: scroll,
            hidden_below,
        }
    }

    /// Screen line of a row, if visible.
    #[must_use]
    pub fn row_area(&self, row: usize) -> Option<Rect> {
        self.lines
            .iter()
            .find(|l| l.kind == LineKind::Row(row))
            .map(|l| l.area)
    }

    /// Menu trigger of a row, if visible.
    #[must_use]
    pub fn trigger_area(&self, row: usize) -> Option<Rect> {
        self.row_area(row).map(trigger_in)
    }

    /// Hit-tests a click at (`x`, `y`).
    #[must_use]
    pub fn hit(&self, x: u16, y: u16, controller: &Controller) -> Hit {
        let point = Position::new(x, y);

        if let Some(menu) = controller.open_menu() {
            if menu.placement.contains(point) {
                return MenuAction::ALL
                    .iter()
                    .enumerate()
                    .find(|(index, _)| ActionMenu::item_area(menu.placement, *index).contains(point))
                    .map_or(Hit::MenuFrame, |(_, action)| Hit::MenuItem(*action));
            }
        }

        if self.bulk_update.contains(point) {
            return Hit::BulkUpdate;
        }
        if self.bulk_reload.contains(point) {
            return Hit::BulkReload;
        }

        let Some(line) = self.lines.iter().find(|l| l.area.contains(point)) else {
            return Hit::Outside;
        };

        match line.kind {
            LineKind::Row(row) if trigger_in(line.area).contains(point) => Hit::Trigger(row),
            LineKind::Row(row) => Hit::Row(row),
            LineKind::PanelActions(row) => {
                let (close, reload) = panel_buttons(line.area);
                if close.contains(point) {
                    Hit::PanelClose(row)
                } else if reload.contains(point) {
                    Hit::PanelReload(row)
                } else {
                    Hit::Panel(row)
                }
            }
            LineKind::PanelMessage(row) => Hit::Panel(row),
            LineKind::PanelTab { row, tab } => Hit::PanelTab { row, tab },
        }
    }
}

/// Trigger cell range at the right end of a row line.
#[must_use]
pub fn trigger_in(line: Rect) -> Rect {
    let width = TRIGGER_WIDTH.min(line.width);
    Rect::new(line.right() - width, line.y, width, line.height)
}

/// Close and update-and-reload buttons on a panel actions line.
#[must_use]
pub fn panel_buttons(line: Rect) -> (Rect, Rect) {
    let start = line.x.saturating_add(PANEL_INDENT).min(line.right());
    let close_width = button_width(PANEL_CLOSE_LABEL).min(line.right() - start);
    let close = Rect::new(start, line.y, close_width, line.height);

    let reload_x = close.right().saturating_add(1).min(line.right());
    let reload_width = button_width(PANEL_RELOAD_LABEL).min(line.right() - reload_x);
    let reload = Rect::new(reload_x, line.y, reload_width, line.height);
    (close, reload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_to_show() {
        assert_eq!(scroll_to_show(0, 3, 5), 0);
        assert_eq!(scroll_to_show(4, 0, 5), 0);
        assert_eq!(scroll_to_show(5, 0, 5), 1);
        assert_eq!(scroll_to_show(9, 2, 5), 5);
        assert_eq!(scroll_to_show(9, 2, 0), 2);
    }

    #[test]
    fn test_trigger_at_right_edge() {
        let line = Rect::new(1, 4, 40, 1);
        assert_eq!(trigger_in(line), Rect::new(38, 4, 3, 1));
    }

    #[test]
    fn test_panel_buttons() {
        let (close, reload) = panel_buttons(Rect::new(1, 5, 50, 1));
        assert_eq!(close, Rect::new(3, 5, 9, 1));
        assert_eq!(reload.x, 13);
        assert_eq!(reload.width, button_width(PANEL_RELOAD_LABEL));
    }

    #[test]
    fn test_button_width() {
        assert_eq!(button_width("Update all"), 14);
    }
}
