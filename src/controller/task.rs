//! Update tasks.
//!
//! An update is a short linear sequence:
//!
//! ```text
//! Disabling ──disable done──▶ Enabling ──enable done──▶ Settling ──delay──▶ (done)
//! ```
//!
//! Enable is only issued once the disable reply is in. A follow-up can be
//! attached to the enable completion or to the end of the settle delay.

use std::time::{Duration, Instant};

use crate::host::{ExtensionId, TabId};

/// Identifies an update task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// What started an update. Selects the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// "Update" from a row menu, or the panel's update-and-reload action.
    Row,
    /// "Update all".
    Bulk,
    /// A tab entry in a row's panel.
    TabEntry,
}

/// Work to start after a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Reload this tab, then activate it.
    ReloadTab(TabId),
    /// Reload every open tab.
    ReloadAllTabs,
}

/// Where a task is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    Disabling,
    Enabling,
    Settling { until: Instant },
}

/// One disable → enable → settle sequence.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    id: TaskId,
    extension: ExtensionId,
    origin: UpdateOrigin,
    stage: UpdateStage,
    settle: Duration,
    on_enabled: Option<FollowUp>,
    on_settled: Option<FollowUp>,
}

impl UpdateTask {
    /// Creates a task in the `Disabling` stage.
    #[must_use]
    pub fn new(id: TaskId, extension: ExtensionId, origin: UpdateOrigin, settle: Duration) -> Self {
        Self {
            id,
            extension,
            origin,
            stage: UpdateStage::Disabling,
            settle,
            on_enabled: None,
            on_settled: None,
        }
    }

    /// Runs `follow_up` once the extension is re-enabled.
    #[must_use]
    pub fn on_enabled(mut self, follow_up: FollowUp) -> Self {
        self.on_enabled = Some(follow_up);
        self
    }

    /// Runs `follow_up` once the settle delay has passed.
    #[must_use]
    pub fn on_settled(mut self, follow_up: FollowUp) -> Self {
        self.on_settled = Some(follow_up);
        self
    }

    /// Task identifier.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Extension being updated.
    #[must_use]
    pub fn extension(&self) -> &ExtensionId {
        &self.extension
    }

    /// What started the task.
    #[must_use]
    pub fn origin(&self) -> UpdateOrigin {
        self.origin
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> UpdateStage {
        self.stage
    }

    /// Records that disable completed. Returns false if the task was not
    /// waiting on disable.
    pub fn disabled(&mut self) -> bool {
        if self.stage != UpdateStage::Disabling {
            return false;
        }
        self.stage = UpdateStage::Enabling;
        true
    }

    /// Records that enable completed at `now` and starts the settle delay.
    /// Returns the follow-up to run now, if any.
    pub fn enabled(&mut self, now: Instant) -> Option<FollowUp> {
        if self.stage != UpdateStage::Enabling {
            return None;
        }
        self.stage = UpdateStage::Settling {
            until: now + self.settle,
        };
        self.on_enabled.take()
    }

    /// True once the settle delay has passed.
    #[must_use]
    pub fn is_settled(&self, now: Instant) -> bool {
        matches!(self.stage, UpdateStage::Settling { until } if now >= until)
    }

    /// Consumes a settled task, returning its follow-up.
    #[must_use]
    pub fn finish(self) -> Option<FollowUp> {
        self.on_settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> UpdateTask {
        UpdateTask::new(
            TaskId(1),
            ExtensionId::new("a"),
            UpdateOrigin::Row,
            Duration::from_millis(1500),
        )
    }

    #[test]
    fn test_stage_order() {
        let now = Instant::now();
        let mut task = task().on_enabled(FollowUp::ReloadTab(TabId(3)));

        // Enable completion before disable is ignored
        assert_eq!(task.enabled(now), None);
        assert_eq!(task.stage(), UpdateStage::Disabling);

        assert!(task.disabled());
        assert!(!task.disabled());
        assert_eq!(task.enabled(now), Some(FollowUp::ReloadTab(TabId(3))));
        assert!(!task.is_settled(now));
        assert!(task.is_settled(now + Duration::from_millis(1500)));
    }

    #[test]
    fn test_settled_follow_up() {
        let now = Instant::now();
        let mut task = task().on_settled(FollowUp::ReloadAllTabs);
        task.disabled();
        assert_eq!(task.enabled(now), None);
        assert_eq!(task.finish(), Some(FollowUp::ReloadAllTabs));
    }
}
