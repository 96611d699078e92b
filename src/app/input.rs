//! Keyboard input handling.
//!
//! Keys go to the open menu first, then to the tabs panel when it has
//! focus, then to the extension list.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::info;

use crate::controller::MenuAction;
use crate::ui::PanelItem;

use super::{App, Focus};

impl App {
    /// Handles a key event.
    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        if self.controller.open_menu().is_some() {
            self.handle_menu_key(key);
        } else if self.focus == Focus::Panel {
            self.handle_panel_key(key);
        } else {
            self.handle_list_key(key);
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.controller.move_menu_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.controller.move_menu_cursor(1),
            KeyCode::Enter => {
                if let Some(action) = self.controller.open_menu().map(|m| m.selected()) {
                    self.controller.choose(action);
                }
            }
            KeyCode::Char('u') => self.controller.choose(MenuAction::Update),
            KeyCode::Char('o') => self.controller.choose(MenuAction::More),
            KeyCode::Esc | KeyCode::Char('m') => self.controller.close_menus(),
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let count = PanelItem::count(self.open_panel_tabs());
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.panel_cursor = self.panel_cursor.saturating_sub(1);
                self.reveal_selection();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.panel_cursor = (self.panel_cursor + 1).min(count - 1);
                self.reveal_selection();
            }
            KeyCode::Enter => {
                if let Some(item) = self.panel_item() {
                    self.activate_panel_item(item);
                }
            }
            KeyCode::Char('r') => self.activate_panel_item(PanelItem::Reload),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = Focus::List;
                self.reveal_selection();
            }
            KeyCode::Esc => {
                self.controller.close_panel();
                self.focus = Focus::List;
            }
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.move_selection(isize::MIN),
            KeyCode::End => self.move_selection(isize::MAX),
            KeyCode::Enter | KeyCode::Char('m') => {
                self.reveal_selection();
                self.toggle_menu_for(self.selected);
            }
            KeyCode::Char('u') => {
                if let Some(id) = self.selected_id() {
                    self.controller.update(&id);
                }
            }
            KeyCode::Char('o') => {
                if let Some(id) = self.selected_id() {
                    self.controller.show_panel(&id);
                }
            }
            KeyCode::Tab => {
                if let Some(row) = self.open_panel_row() {
                    self.selected = row;
                    self.focus = Focus::Panel;
                    self.panel_cursor = 0;
                    self.reveal_selection();
                }
            }
            KeyCode::Char('a') => {
                let started = self.controller.update_all();
                info!("[APP] update all started {} update(s)", started);
            }
            KeyCode::Char('A') => {
                let started = self.controller.update_all_and_reload_tabs();
                info!("[APP] update all + reload started {} update(s)", started);
            }
            KeyCode::Esc => {
                if self.controller.open_panel().is_some() {
                    self.controller.close_panel();
                } else {
                    self.quit();
                }
            }
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.controller.rows().len();
        if rows == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(rows - 1);
        self.reveal_selection();
    }
}
