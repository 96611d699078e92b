//! Listing and action controller.
//!
//! Owns everything the popup shows: the listed rows, which row's menu or
//! panel is open, the update tasks in flight and the host calls they wait
//! on. It never calls the host itself. Actions queue [`HostRequest`]s that
//! the caller drains with [`Controller::take_requests`], and completions come
//! back through [`Controller::handle_reply`]. Status-clear delays are
//! deadlines checked by [`Controller::tick`].
//!
//! # Components
//!
//! - `row`: per-extension state (`Row`, `RowStatus`, `PanelContent`)
//! - `task`: the disable → enable → settle sequence (`UpdateTask`)

mod row;
mod task;

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::geometry::{self, DEFAULT_MENU_MARGIN, MenuSize};
use crate::host::{
    ExtensionId, ExtensionRecord, HostCall, HostReply, HostRequest, HostResult, TabFilter, TabId,
    TabRecord, Ticket,
};

pub use row::{PanelContent, Row, RowStatus, STATUS_UPDATED, STATUS_UPDATING, TabEntry};
pub use task::{FollowUp, TaskId, UpdateOrigin, UpdateStage, UpdateTask};

/// Shown instead of the list when nothing but the popup itself is installed.
pub const EMPTY_MESSAGE: &str = "No extensions found (except this extension).";

/// Shown while the extension list is loading.
pub const LOADING_MESSAGE: &str = "Loading extensions...";

/// Delay before a row-menu update clears its status.
pub const DEFAULT_STATUS_CLEAR: Duration = Duration::from_millis(1500);

/// Delay before a bulk update clears its status.
pub const DEFAULT_BULK_STATUS_CLEAR: Duration = Duration::from_millis(1200);

/// Delay before a tab-entry update clears its status.
pub const DEFAULT_TAB_STATUS_CLEAR: Duration = Duration::from_millis(1000);

/// Timing and placement knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub status_clear: Duration,
    pub bulk_status_clear: Duration,
    pub tab_status_clear: Duration,
    pub menu_margin: u16,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            status_clear: DEFAULT_STATUS_CLEAR,
            bulk_status_clear: DEFAULT_BULK_STATUS_CLEAR,
            tab_status_clear: DEFAULT_TAB_STATUS_CLEAR,
            menu_margin: DEFAULT_MENU_MARGIN,
        }
    }
}

impl ControllerSettings {
    /// Settle delay for an update started from `origin`.
    #[must_use]
    pub fn settle_for(&self, origin: UpdateOrigin) -> Duration {
        match origin {
            UpdateOrigin::Row => self.status_clear,
            UpdateOrigin::Bulk => self.bulk_status_clear,
            UpdateOrigin::TabEntry => self.tab_status_clear,
        }
    }
}

/// Entries of a row's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Update,
    More,
}

impl MenuAction {
    /// Menu entries in display order.
    pub const ALL: [Self; 2] = [Self::Update, Self::More];

    /// Entry label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Update => "Update",
            Self::More => "More",
        }
    }
}

/// Whether the extension list has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Waiting for the host.
    Loading,
    /// Nothing to list.
    Empty,
    /// Rows are populated.
    Ready,
}

/// The visible action menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMenu {
    /// Row the menu belongs to.
    pub extension: ExtensionId,
    /// Where the menu was placed when it opened.
    pub placement: Rect,
    /// Highlighted entry.
    pub cursor: usize,
}

impl OpenMenu {
    /// Highlighted action.
    #[must_use]
    pub fn selected(&self) -> MenuAction {
        MenuAction::ALL[self.cursor.min(MenuAction::ALL.len() - 1)]
    }
}

/// What an outstanding ticket is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Extensions,
    Disable(TaskId),
    Enable(TaskId),
    PanelTabs(ExtensionId),
    ReloadAll,
    /// A reload from a reload-all sweep.
    SweepReload(TabId),
    /// A reload to be followed by activation.
    ReloadThenActivate(TabId),
    Activate(TabId),
}

/// Popup state and action handlers.
#[derive(Debug)]
pub struct Controller {
    self_id: ExtensionId,
    settings: ControllerSettings,
    listing: Listing,
    rows: Vec<Row>,
    open_menu: Option<OpenMenu>,
    open_panel: Option<ExtensionId>,
    tasks: BTreeMap<TaskId, UpdateTask>,
    pending: HashMap<Ticket, Pending>,
    outbox: Vec<HostRequest>,
    next_ticket: u64,
    next_task: u64,
    started: bool,
}

impl Controller {
    /// Creates a controller for the popup hosted by `self_id`.
    #[must_use]
    pub fn new(self_id: ExtensionId, settings: ControllerSettings) -> Self {
        Self {
            self_id,
            settings,
            listing: Listing::Loading,
            rows: Vec::new(),
            open_menu: None,
            open_panel: None,
            tasks: BTreeMap::new(),
            pending: HashMap::new(),
            outbox: Vec::new(),
            next_ticket: 1,
            next_task: 1,
            started: false,
        }
    }

    // ------------------------------------------------------------------
    // Host plumbing
    // ------------------------------------------------------------------

    /// Requests the extension list. Only the first call has any effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!("Listing extensions (self = {})", self.self_id);
        self.request(HostCall::EnumerateExtensions, Pending::Extensions);
    }

    /// Drains the host calls queued since the last drain.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Applies a host completion received at `now`.
    pub fn handle_reply(&mut self, reply: HostReply, now: Instant) {
        let Some(pending) = self.pending.remove(&reply.ticket) else {
            warn!("Reply for unknown ticket {:?}", reply.ticket);
            return;
        };

        match (pending, reply.result) {
            (Pending::Extensions, HostResult::Extensions(Ok(records))) => {
                self.populate(records);
            }
            (Pending::Extensions, HostResult::Extensions(Err(e))) => {
                warn!("Listing extensions failed: {}", e);
                self.listing = Listing::Empty;
            }
            (Pending::Disable(task), HostResult::Done(result)) => {
                self.on_disabled(task, result.map_err(|e| e.to_string()));
            }
            (Pending::Enable(task), HostResult::Done(result)) => {
                self.on_enabled(task, result.map_err(|e| e.to_string()), now);
            }
            (Pending::PanelTabs(id), HostResult::Tabs(result)) => {
                self.on_panel_tabs(&id, result.map_err(|e| e.to_string()));
            }
            (Pending::ReloadAll, HostResult::Tabs(Ok(tabs))) => {
                self.reload_tabs(&tabs);
            }
            (Pending::ReloadAll, HostResult::Tabs(Err(e))) => {
                debug!("Tab query for reload failed: {}", e);
            }
            (Pending::ReloadThenActivate(tab), HostResult::Done(Ok(()))) => {
                self.request(HostCall::ActivateTab(tab), Pending::Activate(tab));
            }
            (
                Pending::SweepReload(tab)
                | Pending::ReloadThenActivate(tab)
                | Pending::Activate(tab),
                HostResult::Done(result),
            ) => {
                // Tabs may close between query and action
                if let Err(e) = result {
                    debug!("Ignoring failure on tab {}: {}", tab, e);
                }
            }
            (pending, result) => {
                warn!("Mismatched reply {:?} for {:?}", result, pending);
            }
        }
    }

    /// Clears statuses whose delay has passed and runs their follow-ups.
    pub fn tick(&mut self, now: Instant) {
        let settled: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|t| t.is_settled(now))
            .map(|t| t.id())
            .collect();

        for id in settled {
            let Some(task) = self.tasks.remove(&id) else {
                continue;
            };
            if let Some(row) = self.row_mut(task.extension()) {
                row.advance_status(id, RowStatus::Idle);
            }
            if let Some(follow_up) = task.finish() {
                self.run_follow_up(follow_up);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Identifier the list excludes.
    #[must_use]
    pub fn self_id(&self) -> &ExtensionId {
        &self.self_id
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Listing state.
    #[must_use]
    pub fn listing(&self) -> Listing {
        self.listing
    }

    /// Listed rows in host order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row for an extension.
    #[must_use]
    pub fn row(&self, id: &ExtensionId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    /// Position of an extension's row.
    #[must_use]
    pub fn row_index(&self, id: &ExtensionId) -> Option<usize> {
        self.rows.iter().position(|r| r.id() == id)
    }

    /// The visible menu, if any.
    #[must_use]
    pub fn open_menu(&self) -> Option<&OpenMenu> {
        self.open_menu.as_ref()
    }

    /// Row whose panel is visible, if any.
    #[must_use]
    pub fn open_panel(&self) -> Option<&ExtensionId> {
        self.open_panel.as_ref()
    }

    /// True if this row's menu is visible.
    #[must_use]
    pub fn is_menu_open(&self, id: &ExtensionId) -> bool {
        self.open_menu.as_ref().is_some_and(|m| &m.extension == id)
    }

    /// True if this row's panel is visible.
    #[must_use]
    pub fn is_panel_open(&self, id: &ExtensionId) -> bool {
        self.open_panel.as_ref() == Some(id)
    }

    /// Update tasks not yet settled.
    pub fn tasks(&self) -> impl Iterator<Item = &UpdateTask> {
        self.tasks.values()
    }

    /// Number of host calls awaiting a reply.
    #[must_use]
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    // ------------------------------------------------------------------
    // Menu
    // ------------------------------------------------------------------

    /// Toggles a row's menu from its trigger at `anchor`.
    ///
    /// Closes every other menu and every panel first. Returns true if the
    /// menu is now open.
    pub fn toggle_menu(
        &mut self,
        id: &ExtensionId,
        anchor: Rect,
        menu: MenuSize,
        viewport: Rect,
    ) -> bool {
        let was_open = self.is_menu_open(id);
        self.open_menu = None;
        self.open_panel = None;

        if was_open || self.row(id).is_none() {
            return false;
        }

        let placement = geometry::place_menu(anchor, menu, viewport, self.settings.menu_margin);
        debug!("Menu for {} placed at {:?}", id, placement);
        self.open_menu = Some(OpenMenu {
            extension: id.clone(),
            placement,
            cursor: 0,
        });
        true
    }

    /// Closes any open menu. Panels stay as they are.
    pub fn close_menus(&mut self) {
        self.open_menu = None;
    }

    /// Moves the menu highlight, wrapping around.
    pub fn move_menu_cursor(&mut self, delta: isize) {
        if let Some(menu) = self.open_menu.as_mut() {
            let len = MenuAction::ALL.len() as isize;
            menu.cursor = (menu.cursor as isize + delta).rem_euclid(len) as usize;
        }
    }

    /// Runs an action from the open menu and closes it.
    pub fn choose(&mut self, action: MenuAction) {
        let Some(menu) = self.open_menu.take() else {
            return;
        };
        match action {
            MenuAction::Update => {
                self.update(&menu.extension);
            }
            MenuAction::More => self.show_panel(&menu.extension),
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Updates one extension. Returns the task, or `None` if it is not listed.
    pub fn update(&mut self, id: &ExtensionId) -> Option<TaskId> {
        self.start_update(id, UpdateOrigin::Row, None, None)
    }

    /// Opens a row's tabs panel, closing any other panel. Tabs are queried
    /// the first time only.
    pub fn show_panel(&mut self, id: &ExtensionId) {
        self.open_menu = None;
        let Some(index) = self.row_index(id) else {
            return;
        };
        self.open_panel = Some(id.clone());

        let panel = self.rows[index].panel_mut();
        if panel.is_requested() {
            return;
        }
        *panel = PanelContent::Loading;
        info!("Loading tabs for {}", id);
        self.request(
            HostCall::EnumerateTabs(TabFilter::all()),
            Pending::PanelTabs(id.clone()),
        );
    }

    /// Hides the open panel.
    pub fn close_panel(&mut self) {
        self.open_panel = None;
    }

    /// Panel action: update this extension, then reload every open tab once
    /// its status clears.
    pub fn update_and_reload_tabs(&mut self, id: &ExtensionId) -> Option<TaskId> {
        self.open_panel = None;
        self.start_update(id, UpdateOrigin::Row, None, Some(FollowUp::ReloadAllTabs))
    }

    /// Panel entry: update this extension, then reload and activate `tab`.
    pub fn select_tab(&mut self, id: &ExtensionId, tab: TabId) -> Option<TaskId> {
        self.open_panel = None;
        self.start_update(
            id,
            UpdateOrigin::TabEntry,
            Some(FollowUp::ReloadTab(tab)),
            None,
        )
    }

    /// Starts an independent update for every listed row. Returns how many
    /// were started.
    pub fn update_all(&mut self) -> usize {
        if self.listing != Listing::Ready {
            return 0;
        }
        let ids: Vec<ExtensionId> = self.rows.iter().map(|r| r.id().clone()).collect();
        info!("Updating all {} extensions", ids.len());

        ids.iter()
            .filter_map(|id| self.start_update(id, UpdateOrigin::Bulk, None, None))
            .count()
    }

    /// "Update all" plus a reload of every open tab, started without waiting
    /// for any update.
    pub fn update_all_and_reload_tabs(&mut self) -> usize {
        let started = self.update_all();
        if self.listing == Listing::Ready {
            self.run_follow_up(FollowUp::ReloadAllTabs);
        }
        started
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn populate(&mut self, records: Vec<ExtensionRecord>) {
        self.rows = records
            .iter()
            .filter(|r| r.id != self.self_id)
            .map(Row::from_record)
            .collect();
        self.listing = if self.rows.is_empty() {
            Listing::Empty
        } else {
            Listing::Ready
        };
        info!("Listed {} extensions", self.rows.len());
    }

    fn start_update(
        &mut self,
        id: &ExtensionId,
        origin: UpdateOrigin,
        on_enabled: Option<FollowUp>,
        on_settled: Option<FollowUp>,
    ) -> Option<TaskId> {
        let settle = self.settings.settle_for(origin);
        let task_id = TaskId(self.next_task);
        let row = self.row_mut(id)?;
        row.begin_status(task_id);
        self.next_task += 1;

        let mut task = UpdateTask::new(task_id, id.clone(), origin, settle);
        if let Some(follow_up) = on_enabled {
            task = task.on_enabled(follow_up);
        }
        if let Some(follow_up) = on_settled {
            task = task.on_settled(follow_up);
        }
        self.tasks.insert(task_id, task);

        info!("Updating {} ({:?}, {:?})", id, origin, task_id);
        self.request(
            HostCall::SetEnabled {
                id: id.clone(),
                enabled: false,
            },
            Pending::Disable(task_id),
        );
        Some(task_id)
    }

    fn on_disabled(&mut self, task_id: TaskId, result: Result<(), String>) {
        if let Err(e) = result {
            warn!("Disable failed for {:?}: {}", task_id, e);
            self.tasks.remove(&task_id);
            return;
        }
        let Some(task) = self.tasks.get_mut(&task_id) else {
            return;
        };
        if !task.disabled() {
            return;
        }
        let id = task.extension().clone();
        self.request(
            HostCall::SetEnabled { id, enabled: true },
            Pending::Enable(task_id),
        );
    }

    fn on_enabled(&mut self, task_id: TaskId, result: Result<(), String>, now: Instant) {
        if let Err(e) = result {
            warn!("Enable failed for {:?}: {}", task_id, e);
            self.tasks.remove(&task_id);
            return;
        }
        let Some(task) = self.tasks.get_mut(&task_id) else {
            return;
        };
        let follow_up = task.enabled(now);
        let id = task.extension().clone();

        if let Some(row) = self.row_mut(&id) {
            row.advance_status(task_id, RowStatus::Updated);
        }
        info!("Updated {}", id);

        if let Some(follow_up) = follow_up {
            self.run_follow_up(follow_up);
        }
    }

    fn on_panel_tabs(&mut self, id: &ExtensionId, result: Result<Vec<TabRecord>, String>) {
        let Some(row) = self.row_mut(id) else {
            return;
        };
        *row.panel_mut() = match result {
            Ok(tabs) => PanelContent::Loaded(tabs.into_iter().map(TabEntry::new).collect()),
            Err(e) => {
                warn!("Loading tabs for {} failed: {}", id, e);
                PanelContent::Failed
            }
        };
    }

    fn run_follow_up(&mut self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::ReloadTab(tab) => {
                info!("Reloading tab {}", tab);
                self.request(HostCall::ReloadTab(tab), Pending::ReloadThenActivate(tab));
            }
            FollowUp::ReloadAllTabs => {
                info!("Reloading all tabs");
                self.request(HostCall::EnumerateTabs(TabFilter::all()), Pending::ReloadAll);
            }
        }
    }

    fn reload_tabs(&mut self, tabs: &[TabRecord]) {
        for tab in tabs {
            self.request(HostCall::ReloadTab(tab.id), Pending::SweepReload(tab.id));
        }
    }

    fn row_mut(&mut self, id: &ExtensionId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id() == id)
    }

    fn request(&mut self, call: HostCall, pending: Pending) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, pending);
        self.outbox.push(HostRequest { ticket, call });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;

    fn ready(ids: &[&str]) -> Controller {
        let mut controller = Controller::new(ExtensionId::new("me"), ControllerSettings::default());
        controller.start();
        let request = controller.take_requests().remove(0);

        let mut records = vec![ExtensionRecord::new("me", "Me")];
        records.extend(ids.iter().map(|id| ExtensionRecord::new(*id, id.to_uppercase())));
        controller.handle_reply(
            HostReply {
                ticket: request.ticket,
                result: HostResult::Extensions(Ok(records)),
            },
            Instant::now(),
        );
        controller
    }

    fn done(ticket: Ticket) -> HostReply {
        HostReply {
            ticket,
            result: HostResult::Done(Ok(())),
        }
    }

    #[test]
    fn test_start_only_once() {
        let mut controller = Controller::new(ExtensionId::new("me"), ControllerSettings::default());
        controller.start();
        controller.start();
        assert_eq!(controller.take_requests().len(), 1);
        assert_eq!(controller.listing(), Listing::Loading);
    }

    #[test]
    fn test_self_excluded() {
        let controller = ready(&["a", "b"]);
        let ids: Vec<&str> = controller.rows().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(controller.listing(), Listing::Ready);
    }

    #[test]
    fn test_only_self_is_empty() {
        let mut controller = ready(&[]);
        assert_eq!(controller.listing(), Listing::Empty);
        assert_eq!(controller.update_all_and_reload_tabs(), 0);
        assert!(controller.take_requests().is_empty());
    }

    #[test]
    fn test_disable_failure_abandons_task() {
        let mut controller = ready(&["a"]);
        let id = ExtensionId::new("a");
        controller.update(&id);
        let disable = controller.take_requests().remove(0);

        controller.handle_reply(
            HostReply {
                ticket: disable.ticket,
                result: HostResult::Done(Err(HostError::ExtensionNotFound(id.clone()))),
            },
            Instant::now(),
        );

        assert!(controller.take_requests().is_empty());
        assert_eq!(controller.tasks().count(), 0);
        assert_eq!(controller.row(&id).map(Row::status), Some(RowStatus::Updating));
    }

    #[test]
    fn test_unknown_ticket_ignored() {
        let mut controller = ready(&["a"]);
        controller.handle_reply(done(Ticket(999)), Instant::now());
        assert!(controller.take_requests().is_empty());
    }

    #[test]
    fn test_menu_cursor_wraps() {
        let mut controller = ready(&["a"]);
        let id = ExtensionId::new("a");
        controller.toggle_menu(
            &id,
            Rect::new(10, 2, 3, 1),
            MenuSize::new(10, 4),
            Rect::new(0, 0, 40, 20),
        );
        controller.move_menu_cursor(-1);
        assert_eq!(controller.open_menu().map(OpenMenu::selected), Some(MenuAction::More));
        controller.move_menu_cursor(1);
        assert_eq!(controller.open_menu().map(OpenMenu::selected), Some(MenuAction::Update));
    }

    #[test]
    fn test_settle_delays_by_origin() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.settle_for(UpdateOrigin::Row), Duration::from_millis(1500));
        assert_eq!(settings.settle_for(UpdateOrigin::Bulk), Duration::from_millis(1200));
        assert_eq!(settings.settle_for(UpdateOrigin::TabEntry), Duration::from_millis(1000));
    }
}
