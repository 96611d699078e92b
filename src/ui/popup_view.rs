//! The popup: bulk buttons, extension rows, the open tabs panel and the
//! key hint bar, drawn from a [`PopupLayout`].

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::controller::{
    Controller, EMPTY_MESSAGE, LOADING_MESSAGE, Listing, Row, RowStatus,
};

use super::key_hint_bar::{HintContext, KeyHintBar};
use super::layout::{
    BULK_RELOAD_LABEL, BULK_UPDATE_LABEL, LineKind, PopupLayout, TRIGGER_GLYPH, trigger_in,
};
use super::tab_panel::{self, PanelItem};

/// Popup background.
pub const POPUP_BG: Color = Color::Rgb(24, 24, 32);

/// Title on the popup border.
pub const POPUP_TITLE: &str = " Extensions ";

/// Cuts `text` to `width` cells, ending in `…` when shortened.
#[must_use]
pub fn fit_text(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Where keyboard selection sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Selected row.
    pub row: Option<usize>,
    /// Selected panel item, when the panel has focus.
    pub panel: Option<PanelItem>,
}

/// Whole-popup widget.
pub struct PopupView<'a> {
    controller: &'a Controller,
    layout: &'a PopupLayout,
    selection: Selection,
    hints: HintContext,
}

impl<'a> PopupView<'a> {
    #[must_use]
    pub fn new(
        controller: &'a Controller,
        layout: &'a PopupLayout,
        selection: Selection,
        hints: HintContext,
    ) -> Self {
        Self {
            controller,
            layout,
            selection,
            hints,
        }
    }

    fn render_bulk_bar(&self, buf: &mut Buffer) {
        let enabled = self.controller.listing() == Listing::Ready;
        let style = if enabled {
            Style::default()
                .fg(Color::Yellow)
                .bg(POPUP_BG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray).bg(POPUP_BG)
        };

        for (area, label) in [
            (self.layout.bulk_update, BULK_UPDATE_LABEL),
            (self.layout.bulk_reload, BULK_RELOAD_LABEL),
        ] {
            if area.width > 0 {
                let text = fit_text(&format!("[ {} ]", label), area.width as usize);
                Paragraph::new(Span::styled(text, style)).render(area, buf);
            }
        }
    }

    fn render_row(&self, index: usize, row: &Row, line: Rect, buf: &mut Buffer) {
        let selected = self.selection.row == Some(index) && self.selection.panel.is_none();
        let menu_open = self.controller.is_menu_open(row.id());
        let base = if selected {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(POPUP_BG)
        };
        buf.set_style(line, base);

        let trigger = trigger_in(line);
        let status = row.status_text();
        let status_style = match row.status() {
            RowStatus::Updating => base.fg(Color::Yellow),
            RowStatus::Updated => base.fg(Color::Green),
            RowStatus::Idle => base,
        };

        // glyph + space + name, then status, then the trigger
        let status_width = if status.is_empty() { 0 } else { status.width() + 1 };
        let name_width = (line.width.saturating_sub(trigger.width) as usize)
            .saturating_sub(2 + status_width);
        let name = fit_text(row.name(), name_width);
        let pad = name_width.saturating_sub(name.width());

        let mut spans = vec![
            Span::styled(format!("{} ", row.icon().glyph()), base.fg(Color::Cyan)),
            Span::styled(name, base),
            Span::styled(" ".repeat(pad), base),
        ];
        if !status.is_empty() {
            spans.push(Span::styled(format!("{} ", status), status_style));
        }
        let body = Rect::new(line.x, line.y, line.width - trigger.width, 1);
        Paragraph::new(Line::from(spans)).render(body, buf);

        let trigger_style = if menu_open {
            Style::default().bg(Color::Cyan).fg(Color::Black)
        } else {
            base.fg(Color::Gray)
        };
        buf.set_style(trigger, trigger_style);
        if trigger.width > 0 {
            let x = trigger.x + trigger.width / 2;
            buf.set_string(x, trigger.y, TRIGGER_GLYPH, trigger_style);
        }
    }

    fn render_message(&self, text: &str, buf: &mut Buffer) {
        let area = self.layout.list;
        if area.height == 0 {
            return;
        }
        Paragraph::new(fit_text(text, area.width as usize))
            .style(Style::default().fg(Color::DarkGray).bg(POPUP_BG))
            .render(Rect::new(area.x, area.y, area.width, 1), buf);
    }

    fn render_scroll_marks(&self, buf: &mut Buffer) {
        let list = self.layout.list;
        if list.width == 0 || list.height == 0 {
            return;
        }
        let x = self.layout.frame.right().saturating_sub(1);
        let style = Style::default().fg(Color::DarkGray).bg(POPUP_BG);
        if self.layout.hidden_above > 0 {
            buf.set_string(x, list.y, "▲", style);
        }
        if self.layout.hidden_below > 0 {
            buf.set_string(x, list.bottom() - 1, "▼", style);
        }
    }
}

impl Widget for PopupView<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let frame = self.layout.frame;
        if frame.width < 3 || frame.height < 3 {
            return;
        }

        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(POPUP_TITLE)
            .style(Style::default().bg(POPUP_BG))
            .render(frame, buf);

        self.render_bulk_bar(buf);

        match self.controller.listing() {
            Listing::Loading => self.render_message(LOADING_MESSAGE, buf),
            Listing::Empty => self.render_message(EMPTY_MESSAGE, buf),
            Listing::Ready => {
                let rows = self.controller.rows();
                for line in &self.layout.lines {
                    match line.kind {
                        LineKind::Row(index) => {
                            if let Some(row) = rows.get(index) {
                                self.render_row(index, row, line.area, buf);
                            }
                        }
                        LineKind::PanelActions(_) => {
                            tab_panel::render_actions(self.selection.panel, line.area, buf, POPUP_BG);
                        }
                        LineKind::PanelMessage(index) => {
                            if let Some(row) = rows.get(index) {
                                tab_panel::render_message(row.panel(), line.area, buf, POPUP_BG);
                            }
                        }
                        LineKind::PanelTab { row, tab } => {
                            let entry = rows.get(row).and_then(|r| r.panel().entries().get(tab));
                            if let Some(entry) = entry {
                                let selected = self.selection.panel == Some(PanelItem::Tab(tab));
                                tab_panel::render_tab(entry, selected, line.area, buf, POPUP_BG);
                            }
                        }
                    }
                }
                self.render_scroll_marks(buf);
            }
        }

        KeyHintBar::for_context(self.hints).render(self.layout.footer, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("Dark Reader", 20), "Dark Reader");
        assert_eq!(fit_text("Dark Reader", 6), "Dark …");
        assert_eq!(fit_text("Dark Reader", 1), "…");
        assert_eq!(fit_text("Dark Reader", 0), "");
    }

    #[test]
    fn test_fit_text_wide_chars() {
        // Each ideograph is two cells wide
        assert_eq!(fit_text("拡張機能", 5), "拡張…");
    }
}
