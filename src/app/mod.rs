//! Main application state and event handling.
//!
//! Wires the controller to the host bridge and the terminal: host replies
//! are pumped into the controller every frame, queued host calls go back out,
//! and crossterm input is routed to controller actions.

mod input;
mod input_mouse;
mod render;

use std::cell::Cell;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::config::Config;
use crate::controller::{Controller, Listing, TabEntry};
use crate::host::{ExtensionId, Host, HostBridge};
use crate::ui::action_menu::ActionMenu;
use crate::ui::layout::{LineKind, PopupLayout, list_lines, scroll_to_show};
use crate::ui::{HintContext, PanelItem, Selection};

/// Event poll timeout in milliseconds.
const POLL_TIMEOUT_MS: u64 = 50;

/// What the keyboard drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    /// The open tabs panel.
    Panel,
}

/// Application state.
pub struct App {
    controller: Controller,
    bridge: HostBridge,
    config: Config,
    running: bool,
    /// Selected row.
    selected: usize,
    focus: Focus,
    /// Position among [`PanelItem`]s while the panel has focus.
    panel_cursor: usize,
    /// First visible list line.
    scroll: usize,
    /// Screen area of the last frame, for mouse hit testing.
    last_area: Cell<Rect>,
}

impl App {
    /// Creates the app and requests the extension list.
    ///
    /// # Errors
    /// Returns error if the host runtime cannot be started.
    pub fn new(config: Config, host: Arc<dyn Host>) -> io::Result<Self> {
        let bridge = HostBridge::new(host)?;
        let mut controller = Controller::new(bridge.self_identifier(), config.controller_settings());
        controller.start();
        bridge.submit_all(controller.take_requests());

        Ok(Self {
            controller,
            bridge,
            config,
            running: true,
            selected: 0,
            focus: Focus::List,
            panel_cursor: 0,
            scroll: 0,
            last_area: Cell::new(Rect::default()),
        })
    }

    /// Returns true while the popup should stay open.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Closes the popup.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Popup state.
    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Selected row index.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Current keyboard focus.
    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Host calls still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.bridge.in_flight()
    }

    /// Processes events and updates state.
    ///
    /// # Errors
    /// Returns error if event processing fails.
    pub fn update(&mut self) -> io::Result<()> {
        self.pump(Instant::now());

        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
            let event = event::read()?;
            self.handle_event(event);
        }

        self.pump(Instant::now());
        Ok(())
    }

    /// Routes one terminal event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                debug!("[APP] resize {}x{}", width, height);
                // Placement is computed at open time only
                self.controller.close_menus();
            }
            _ => {}
        }
        self.flush();
    }

    /// Feeds host replies to the controller, fires due deadlines and sends
    /// newly queued calls.
    pub fn pump(&mut self, now: Instant) {
        while let Some(reply) = self.bridge.poll() {
            self.controller.handle_reply(reply, now);
        }
        self.controller.tick(now);
        self.flush();
    }

    /// Stops the app. The host runtime shuts down with the bridge.
    pub fn shutdown(self) {
        info!(
            "[APP] closing with {} host call(s) in flight",
            self.bridge.in_flight()
        );
    }

    fn flush(&mut self) {
        self.bridge.submit_all(self.controller.take_requests());
        self.sync_selection();
    }

    /// Keeps selection and focus consistent with what the controller shows.
    fn sync_selection(&mut self) {
        let rows = self.controller.rows().len();
        self.selected = self.selected.min(rows.saturating_sub(1));

        if self.focus == Focus::Panel && self.open_panel_row().is_none() {
            self.focus = Focus::List;
            self.panel_cursor = 0;
        }
        if self.focus == Focus::Panel {
            let count = PanelItem::count(self.open_panel_tabs());
            self.panel_cursor = self.panel_cursor.min(count - 1);
        }
    }

    /// Layout for the last drawn area.
    fn layout(&self) -> PopupLayout {
        PopupLayout::compute(
            self.last_area.get(),
            &self.controller,
            self.config.popup_width,
            self.scroll,
        )
    }

    fn selected_id(&self) -> Option<ExtensionId> {
        if self.controller.listing() != Listing::Ready {
            return None;
        }
        self.controller
            .rows()
            .get(self.selected)
            .map(|row| row.id().clone())
    }

    fn open_panel_row(&self) -> Option<usize> {
        self.controller
            .open_panel()
            .and_then(|id| self.controller.row_index(id))
    }

    fn open_panel_tabs(&self) -> usize {
        self.open_panel_row()
            .and_then(|index| self.controller.rows().get(index))
            .map_or(0, |row| row.panel().entries().len())
    }

    fn panel_item(&self) -> Option<PanelItem> {
        if self.focus != Focus::Panel {
            return None;
        }
        PanelItem::at(self.panel_cursor, self.open_panel_tabs())
    }

    /// What the popup highlights.
    pub(crate) fn selection(&self) -> Selection {
        let row = (self.controller.listing() == Listing::Ready).then_some(self.selected);
        Selection {
            row,
            panel: self.panel_item(),
        }
    }

    pub(crate) fn hint_context(&self) -> HintContext {
        if self.controller.open_menu().is_some() {
            HintContext::Menu
        } else if self.focus == Focus::Panel {
            HintContext::Panel
        } else {
            HintContext::List
        }
    }

    /// Opens or closes the menu of row `index` from its trigger.
    fn toggle_menu_for(&mut self, index: usize) {
        let layout = self.layout();
        let Some(anchor) = layout.trigger_area(index) else {
            return;
        };
        let Some(id) = self.controller.rows().get(index).map(|r| r.id().clone()) else {
            return;
        };
        self.selected = index;
        self.focus = Focus::List;
        let size = ActionMenu::measure(self.config.menu_max_width);
        self.controller.toggle_menu(&id, anchor, size, layout.frame);
    }

    /// Runs the panel item at the keyboard cursor.
    fn activate_panel_item(&mut self, item: PanelItem) {
        let Some(index) = self.open_panel_row() else {
            return;
        };
        let Some(row) = self.controller.rows().get(index) else {
            return;
        };
        let id = row.id().clone();
        let tab_id = match item {
            PanelItem::Tab(tab) => row.panel().entries().get(tab).map(TabEntry::id),
            _ => None,
        };

        match (item, tab_id) {
            (PanelItem::Close, _) => self.controller.close_panel(),
            (PanelItem::Reload, _) => {
                self.controller.update_and_reload_tabs(&id);
            }
            (PanelItem::Tab(_), Some(tab_id)) => {
                self.controller.select_tab(&id, tab_id);
            }
            (PanelItem::Tab(_), None) => {}
        }
    }

    /// Scrolls so the focused line is visible.
    fn reveal_selection(&mut self) {
        let lines = list_lines(&self.controller);
        let target = match self.panel_item() {
            Some(PanelItem::Tab(tab)) => self.open_panel_row().map(|row| LineKind::PanelTab { row, tab }),
            Some(_) => self.open_panel_row().map(LineKind::PanelActions),
            None => Some(LineKind::Row(self.selected)),
        };
        let Some(index) = target.and_then(|t| lines.iter().position(|l| *l == t)) else {
            return;
        };
        let height = self.layout().list.height as usize;
        self.scroll = scroll_to_show(index, self.scroll, height);
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = list_lines(&self.controller).len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}
