//! Mouse input handling.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::ui::{Hit, PanelItem};

use super::{App, Focus};

impl App {
    /// Handles mouse events.
    pub(super) fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(event.column, event.row),
            MouseEventKind::ScrollUp => self.scroll_by(-1),
            MouseEventKind::ScrollDown => self.scroll_by(1),
            _ => {}
        }
    }

    /// Left click at (`x`, `y`).
    fn handle_click(&mut self, x: u16, y: u16) {
        let hit = self.layout().hit(x, y, &self.controller);
        debug!("[APP] click ({}, {}) -> {:?}", x, y, hit);

        match hit {
            Hit::Trigger(row) => {
                self.toggle_menu_for(row);
                return;
            }
            Hit::MenuItem(action) => {
                self.controller.choose(action);
                return;
            }
            Hit::MenuFrame => return,
            _ => {}
        }

        // Anywhere else closes menus; panels stay open
        self.controller.close_menus();

        match hit {
            Hit::BulkUpdate => {
                self.controller.update_all();
            }
            Hit::BulkReload => {
                self.controller.update_all_and_reload_tabs();
            }
            Hit::Row(row) => {
                self.selected = row;
                self.focus = Focus::List;
            }
            Hit::PanelClose(row) => self.click_panel(row, PanelItem::Close),
            Hit::PanelReload(row) => self.click_panel(row, PanelItem::Reload),
            Hit::PanelTab { row, tab } => self.click_panel(row, PanelItem::Tab(tab)),
            Hit::Panel(_)
            | Hit::Outside
            | Hit::Trigger(_)
            | Hit::MenuItem(_)
            | Hit::MenuFrame => {}
        }
    }

    fn click_panel(&mut self, row: usize, item: PanelItem) {
        self.selected = row;
        self.activate_panel_item(item);
    }
}
