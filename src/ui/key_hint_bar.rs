//! Key hints along the bottom of the popup.
//!
//! The hints follow what has focus: the extension list, an open action
//! menu, or the open tabs panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

/// Badge colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyHintStyle {
    #[default]
    Normal,
    /// Primary action of the context.
    Highlighted,
    /// Actions that touch every extension or every tab.
    Bulk,
}

impl KeyHintStyle {
    /// Badge background.
    #[must_use]
    pub const fn badge_bg(self) -> Color {
        match self {
            Self::Normal => Color::DarkGray,
            Self::Highlighted => Color::Cyan,
            Self::Bulk => Color::Yellow,
        }
    }

    /// Badge foreground.
    #[must_use]
    pub const fn badge_fg(self) -> Color {
        match self {
            Self::Normal => Color::White,
            Self::Highlighted | Self::Bulk => Color::Black,
        }
    }
}

/// One key badge and its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub description: &'static str,
    pub style: KeyHintStyle,
}

impl KeyHint {
    #[must_use]
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self::styled(key, description, KeyHintStyle::Normal)
    }

    #[must_use]
    pub const fn styled(key: &'static str, description: &'static str, style: KeyHintStyle) -> Self {
        Self {
            key,
            description,
            style,
        }
    }

    /// Cells used by ` key ` plus the description.
    fn width(&self) -> usize {
        self.key.width() + 2 + self.description.width()
    }
}

/// What the keyboard currently drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintContext {
    #[default]
    List,
    Menu,
    Panel,
}

/// Hints for `context`, most important first.
#[must_use]
pub fn hints_for(context: HintContext) -> Vec<KeyHint> {
    match context {
        HintContext::List => vec![
            KeyHint::styled("Enter", "Menu", KeyHintStyle::Highlighted),
            KeyHint::new("u", "Update"),
            KeyHint::new("o", "Tabs"),
            KeyHint::styled("a", "Update all", KeyHintStyle::Bulk),
            KeyHint::styled("A", "+ reload", KeyHintStyle::Bulk),
            KeyHint::new("q", "Quit"),
        ],
        HintContext::Menu => vec![
            KeyHint::styled("Enter", "Run", KeyHintStyle::Highlighted),
            KeyHint::new("↑↓", "Move"),
            KeyHint::new("Esc", "Close"),
        ],
        HintContext::Panel => vec![
            KeyHint::styled("Enter", "Update + reload tab", KeyHintStyle::Highlighted),
            KeyHint::new("r", "Reload all"),
            KeyHint::new("Tab", "List"),
            KeyHint::new("Esc", "Close"),
        ],
    }
}

const DIVIDER: &str = " │ ";

/// A single line of key hints, truncated with `…+N` when they do not fit.
#[derive(Debug, Clone)]
pub struct KeyHintBar {
    hints: Vec<KeyHint>,
}

impl KeyHintBar {
    #[must_use]
    pub fn new(hints: Vec<KeyHint>) -> Self {
        Self { hints }
    }

    /// Bar for the given focus.
    #[must_use]
    pub fn for_context(context: HintContext) -> Self {
        Self::new(hints_for(context))
    }

    /// How many hints fit in `available` cells, leaving room for the
    /// overflow marker when some are dropped.
    fn fitting(&self, available: usize) -> usize {
        let widths: Vec<usize> = self
            .hints
            .iter()
            .enumerate()
            .map(|(i, h)| h.width() + if i == 0 { 1 } else { DIVIDER.width() })
            .collect();

        let mut count = 0;
        let mut used = 0;
        for width in &widths {
            if used + width > available {
                break;
            }
            used += width;
            count += 1;
        }

        while count > 0 && count < self.hints.len() {
            let marker = overflow_marker(self.hints.len() - count).width();
            if used + marker <= available {
                break;
            }
            count -= 1;
            used -= widths[count];
        }
        count
    }
}

fn overflow_marker(hidden: usize) -> String {
    format!(" …+{}", hidden)
}

/// Writes clipped text left to right along one line.
struct LineWriter<'b> {
    buf: &'b mut Buffer,
    x: u16,
    y: u16,
    end: u16,
}

impl LineWriter<'_> {
    fn put(&mut self, text: &str, style: Style) {
        if self.x >= self.end {
            return;
        }
        let room = (self.end - self.x) as usize;
        let (next, _) = self.buf.set_stringn(self.x, self.y, text, room, style);
        self.x = next;
    }
}

impl Widget for KeyHintBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let background = Style::default().bg(Color::Black).fg(Color::DarkGray);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), background);

        let shown = self.fitting(area.width as usize);
        let mut line = LineWriter {
            buf,
            x: area.x + 1,
            y: area.y,
            end: area.right(),
        };

        for (i, hint) in self.hints.iter().take(shown).enumerate() {
            if i > 0 {
                line.put(DIVIDER, background);
            }
            let badge = Style::default()
                .bg(hint.style.badge_bg())
                .fg(hint.style.badge_fg())
                .add_modifier(Modifier::BOLD);
            line.put(&format!(" {} ", hint.key), badge);
            line.put(hint.description, Style::default().fg(Color::Gray).bg(Color::Black));
        }

        let hidden = self.hints.len() - shown;
        if hidden > 0 {
            line.put(&overflow_marker(hidden), background);
        }
    }
}
