//! One listed extension and its tabs panel.

use crate::host::{ExtensionId, ExtensionRecord, TabId, TabRecord};
use crate::icon::IconSlot;

use super::task::TaskId;

/// Status text while the disable/enable pair is running.
pub const STATUS_UPDATING: &str = "Updating...";

/// Status text after re-enable completes.
pub const STATUS_UPDATED: &str = "Updated";

/// Transient row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Idle,
    Updating,
    Updated,
}

impl RowStatus {
    /// Text shown in the status slot.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Updating => STATUS_UPDATING,
            Self::Updated => STATUS_UPDATED,
        }
    }
}

/// One open tab listed in a row's panel.
#[derive(Debug, Clone)]
pub struct TabEntry {
    /// Tab as reported when the panel loaded.
    pub tab: TabRecord,
    /// Favicon.
    pub icon: IconSlot,
}

impl TabEntry {
    /// Builds an entry, loading its favicon.
    #[must_use]
    pub fn new(tab: TabRecord) -> Self {
        let icon = IconSlot::for_tab(&tab);
        Self { tab, icon }
    }

    /// Tab identifier.
    #[must_use]
    pub fn id(&self) -> TabId {
        self.tab.id
    }

    /// Title, URL, or placeholder.
    #[must_use]
    pub fn label(&self) -> &str {
        self.tab.label()
    }
}

/// Contents of a row's tabs panel.
///
/// Moves forward only: once requested, the tabs are never queried again
/// for this row.
#[derive(Debug, Clone, Default)]
pub enum PanelContent {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<TabEntry>),
    Failed,
}

impl PanelContent {
    /// True once the tabs have been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        !matches!(self, Self::NotLoaded)
    }

    /// Loaded entries, empty otherwise.
    #[must_use]
    pub fn entries(&self) -> &[TabEntry] {
        match self {
            Self::Loaded(entries) => entries,
            _ => &[],
        }
    }
}

/// Controller-owned state for one extension.
#[derive(Debug, Clone)]
pub struct Row {
    id: ExtensionId,
    name: String,
    icon: IconSlot,
    status: RowStatus,
    /// Task allowed to change `status`. A newer update on the same row
    /// takes ownership.
    status_owner: Option<TaskId>,
    panel: PanelContent,
}

impl Row {
    /// Builds a row for a host record.
    #[must_use]
    pub fn from_record(record: &ExtensionRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            icon: IconSlot::for_extension(record),
            status: RowStatus::Idle,
            status_owner: None,
            panel: PanelContent::NotLoaded,
        }
    }

    /// Extension identifier.
    #[must_use]
    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row icon.
    #[must_use]
    pub fn icon(&self) -> &IconSlot {
        &self.icon
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> RowStatus {
        self.status
    }

    /// Current status text.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.status.text()
    }

    /// Panel contents.
    #[must_use]
    pub fn panel(&self) -> &PanelContent {
        &self.panel
    }

    pub(crate) fn panel_mut(&mut self) -> &mut PanelContent {
        &mut self.panel
    }

    /// Starts a status sequence owned by `task`.
    pub(crate) fn begin_status(&mut self, task: TaskId) {
        self.status_owner = Some(task);
        self.status = RowStatus::Updating;
    }

    /// Moves to `status` if `task` still owns the row. Returns true on change.
    pub(crate) fn advance_status(&mut self, task: TaskId, status: RowStatus) -> bool {
        if self.status_owner != Some(task) {
            return false;
        }
        self.status = status;
        if status == RowStatus::Idle {
            self.status_owner = None;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(RowStatus::Idle.text(), "");
        assert_eq!(RowStatus::Updating.text(), "Updating...");
        assert_eq!(RowStatus::Updated.text(), "Updated");
    }

    #[test]
    fn test_newer_task_owns_status() {
        let mut row = Row::from_record(&ExtensionRecord::new("a", "A"));
        row.begin_status(TaskId(1));
        row.begin_status(TaskId(2));

        assert!(!row.advance_status(TaskId(1), RowStatus::Updated));
        assert_eq!(row.status(), RowStatus::Updating);

        assert!(row.advance_status(TaskId(2), RowStatus::Updated));
        assert!(row.advance_status(TaskId(2), RowStatus::Idle));
        assert_eq!(row.status_text(), "");
        assert!(!row.advance_status(TaskId(2), RowStatus::Updated));
    }

    #[test]
    fn test_panel_content() {
        let mut panel = PanelContent::default();
        assert!(!panel.is_requested());
        panel = PanelContent::Loading;
        assert!(panel.is_requested());
        assert!(panel.entries().is_empty());
        panel = PanelContent::Loaded(vec![TabEntry::new(TabRecord::new(1, "t", "https://t"))]);
        assert_eq!(panel.entries()[0].label(), "t");
    }
}
