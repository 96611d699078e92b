//! Floating Update/More menu for one row.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::controller::MenuAction;
use crate::geometry::MenuSize;

/// Horizontal padding inside the border on each side.
const PADDING: u16 = 1;

/// Rendered menu.
pub struct ActionMenu {
    cursor: usize,
}

impl ActionMenu {
    #[must_use]
    pub fn new(cursor: usize) -> Self {
        Self { cursor }
    }

    /// Size the menu needs, capped at `max_width` cells.
    #[must_use]
    pub fn measure(max_width: u16) -> MenuSize {
        let label = MenuAction::ALL
            .iter()
            .map(|a| a.label().width() as u16)
            .max()
            .unwrap_or(0);
        let width = (label + 2 * PADDING + 2).min(max_width.max(3));
        MenuSize::new(width, MenuAction::ALL.len() as u16 + 2)
    }

    /// Line of entry `index` inside a menu placed at `placement`.
    #[must_use]
    pub fn item_area(placement: Rect, index: usize) -> Rect {
        let inner = placement.inner(ratatui::layout::Margin::new(1, 1));
        let y = inner.y.saturating_add(index as u16);
        if index >= MenuAction::ALL.len() || y >= inner.bottom() {
            return Rect::new(inner.x, inner.bottom(), 0, 0);
        }
        Rect::new(inner.x, y, inner.width, 1)
    }
}

impl Widget for ActionMenu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let bg = Color::Rgb(30, 30, 40);
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .style(Style::default().bg(bg))
            .render(area, buf);

        for (index, action) in MenuAction::ALL.iter().enumerate() {
            let line = Self::item_area(area, index);
            if line.width == 0 {
                continue;
            }
            let style = if index == self.cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(bg)
            };
            buf.set_style(line, style);
            buf.set_stringn(
                line.x + PADDING.min(line.width),
                line.y,
                action.label(),
                line.width.saturating_sub(PADDING) as usize,
                style,
            );
        }
    }
}
