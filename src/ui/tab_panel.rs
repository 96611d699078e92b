//! Tabs panel render helpers.
//!
//! The panel opens under its row: a line of buttons, then one line per open
//! tab, or a single message line while loading or when there is nothing to
//! show.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::controller::{PanelContent, TabEntry};

use super::layout::{PANEL_CLOSE_LABEL, PANEL_INDENT, PANEL_RELOAD_LABEL, panel_buttons};
use super::popup_view::fit_text;

/// Shown until the tab query answers.
pub const LOADING_TABS: &str = "Loading tabs...";

/// Shown when the query returned no tabs.
pub const NO_TABS: &str = "No open tabs.";

/// Shown when the query failed.
pub const TABS_FAILED: &str = "Could not load tabs.";

/// Keyboard-selectable things in the panel, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelItem {
    Close,
    Reload,
    Tab(usize),
}

impl PanelItem {
    /// Number of selectable items with `tabs` entries loaded.
    #[must_use]
    pub fn count(tabs: usize) -> usize {
        2 + tabs
    }

    /// Item at keyboard position `cursor`.
    #[must_use]
    pub fn at(cursor: usize, tabs: usize) -> Option<Self> {
        match cursor {
            0 => Some(Self::Close),
            1 => Some(Self::Reload),
            n if n - 2 < tabs => Some(Self::Tab(n - 2)),
            _ => None,
        }
    }
}

/// Message line text for panel contents with no entries to list.
#[must_use]
pub fn panel_message(content: &PanelContent) -> &'static str {
    match content {
        PanelContent::NotLoaded | PanelContent::Loading => LOADING_TABS,
        PanelContent::Loaded(_) => NO_TABS,
        PanelContent::Failed => TABS_FAILED,
    }
}

fn button_style(selected: bool, bg: Color) -> Style {
    if selected {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).bg(bg)
    }
}

/// Renders the Close / Update + reload buttons.
pub fn render_actions(selected: Option<PanelItem>, line: Rect, buf: &mut Buffer, bg: Color) {
    let (close, reload) = panel_buttons(line);
    for (area, label, item) in [
        (close, PANEL_CLOSE_LABEL, PanelItem::Close),
        (reload, PANEL_RELOAD_LABEL, PanelItem::Reload),
    ] {
        if area.width == 0 {
            continue;
        }
        let text = fit_text(&format!("[ {} ]", label), area.width as usize);
        Paragraph::new(Span::styled(text, button_style(selected == Some(item), bg)))
            .render(area, buf);
    }
}

/// Renders the loading / empty / failed line.
pub fn render_message(content: &PanelContent, line: Rect, buf: &mut Buffer, bg: Color) {
    let area = indented(line);
    let text = fit_text(panel_message(content), area.width as usize);
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .bg(bg)
                .add_modifier(Modifier::ITALIC),
        )
        .render(area, buf);
}

/// Renders one tab entry: favicon glyph then label.
pub fn render_tab(entry: &TabEntry, selected: bool, line: Rect, buf: &mut Buffer, bg: Color) {
    let area = indented(line);
    let style = if selected {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default().fg(Color::Gray).bg(bg)
    };
    let label_width = (area.width as usize).saturating_sub(2);
    let text = Line::from(vec![
        Span::styled(format!("{} ", entry.icon.glyph()), style.fg(Color::DarkGray)),
        Span::styled(fit_text(entry.label(), label_width), style),
    ]);
    Paragraph::new(text).style(style).render(area, buf);
}

fn indented(line: Rect) -> Rect {
    let indent = PANEL_INDENT.min(line.width);
    Rect::new(line.x + indent, line.y, line.width - indent, line.height)
}
