//! Snapshot-backed host.
//!
//! Serves extensions and tabs from a snapshot file so the popup can run
//! without a browser attached. Each call sleeps for a configurable latency
//! before completing, which keeps completions asynchronous the way a real
//! host's are. Every call is appended to a journal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    ExtensionId, ExtensionRecord, Host, HostError, HostFuture, TabFilter, TabId, TabRecord,
};

/// Errors loading or writing a host snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading or writing the file failed.
    #[error("Snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// JSON parse or serialize failure.
    #[error("Invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parse failure.
    #[error("Invalid TOML snapshot: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Host state as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Identifier of the popup's own extension.
    pub self_id: ExtensionId,
    /// Installed extensions, including `self_id`.
    #[serde(default)]
    pub extensions: Vec<ExtensionRecord>,
    /// Open tabs.
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
}

impl HostSnapshot {
    /// Returns the default snapshot path (~/.extreload/host.json).
    #[must_use]
    pub fn default_path() -> PathBuf {
        crate::logging::data_directory().join("host.json")
    }

    /// Loads a snapshot, picking the format from the file extension.
    ///
    /// `.toml` files parse as TOML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let snapshot = if is_toml {
            toml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        Ok(snapshot)
    }

    /// Loads a snapshot, writing [`HostSnapshot::sample`] there first if the
    /// file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, SnapshotError> {
        if !path.exists() {
            info!("No host snapshot at {}, writing sample", path.display());
            Self::sample().save(path)?;
        }
        Self::load(path)
    }

    /// Writes the snapshot as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).map_err(io_err)
    }

    /// A small snapshot for first runs.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            self_id: ExtensionId::new("extreload"),
            extensions: vec![
                ExtensionRecord::new("extreload", "Extension Reloader"),
                ExtensionRecord::new("kpbhmfjlmbpnbbgdfhnmaomcbkjdmiah", "Dark Reader")
                    .with_icon(16, "chrome://extension-icon/kpbhmfjlmbpnbbgdfhnmaomcbkjdmiah/16/0")
                    .with_icon(128, "chrome://extension-icon/kpbhmfjlmbpnbbgdfhnmaomcbkjdmiah/128/0"),
                ExtensionRecord::new("devtools-helper", "My Dev Build")
                    .with_icon(48, "chrome-extension://devtools-helper/icon48.png"),
                ExtensionRecord::new("json-viewer", "JSON Viewer"),
            ],
            tabs: vec![
                TabRecord::new(1, "Extensions", "chrome://extensions/"),
                TabRecord::new(2, "Local dev server", "http://localhost:3000/")
                    .with_fav_icon("http://localhost:3000/favicon.ico"),
                TabRecord::new(3, "docs.rs", "https://docs.rs/")
                    .with_fav_icon("https://docs.rs/favicon.ico"),
            ],
        }
    }
}

/// One call received by a [`LocalHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCallRecord {
    EnumerateExtensions,
    SetEnabled { id: ExtensionId, enabled: bool },
    EnumerateTabs,
    ReloadTab(TabId),
    ActivateTab(TabId),
}

#[derive(Debug, Default)]
struct HostState {
    extensions: Vec<ExtensionRecord>,
    tabs: Vec<TabRecord>,
    journal: Vec<HostCallRecord>,
}

/// In-process host serving a [`HostSnapshot`].
#[derive(Debug, Clone)]
pub struct LocalHost {
    self_id: ExtensionId,
    state: Arc<Mutex<HostState>>,
    latency: Duration,
}

impl LocalHost {
    /// Creates a host with no latency.
    #[must_use]
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self {
            self_id: snapshot.self_id,
            state: Arc::new(Mutex::new(HostState {
                extensions: snapshot.extensions,
                tabs: snapshot.tabs,
                journal: Vec::new(),
            })),
            latency: Duration::ZERO,
        }
    }

    /// Sets the delay before each call completes.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Returns every call received so far, in arrival order.
    #[must_use]
    pub fn journal(&self) -> Vec<HostCallRecord> {
        self.state
            .lock()
            .map(|s| s.journal.clone())
            .unwrap_or_default()
    }

    /// Returns the current enabled flag of an extension.
    #[must_use]
    pub fn is_enabled(&self, id: &ExtensionId) -> Option<bool> {
        let state = self.state.lock().ok()?;
        state.extensions.iter().find(|e| &e.id == id).map(|e| e.enabled)
    }

    /// Returns the active tab of a window.
    #[must_use]
    pub fn active_tab(&self, window_id: i64) -> Option<TabId> {
        let state = self.state.lock().ok()?;
        state
            .tabs
            .iter()
            .find(|t| t.window_id == window_id && t.active)
            .map(|t| t.id)
    }

    /// Closes a tab. Later calls naming it fail with [`HostError::TabNotFound`].
    pub fn close_tab(&self, id: TabId) {
        if let Ok(mut state) = self.state.lock() {
            state.tabs.retain(|t| t.id != id);
        }
    }

    /// Runs `apply` against the state after the configured latency.
    fn call<T, F>(&self, record: HostCallRecord, apply: F) -> HostFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut HostState) -> Result<T, HostError> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let latency = self.latency;

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            let mut guard = state
                .lock()
                .map_err(|_| HostError::Unavailable("host state poisoned".to_string()))?;
            debug!("[LOCAL-HOST] {:?}", record);
            guard.journal.push(record);
            apply(&mut *guard)
        })
    }
}

impl Host for LocalHost {
    fn self_identifier(&self) -> ExtensionId {
        self.self_id.clone()
    }

    fn enumerate_extensions(&self) -> HostFuture<Vec<ExtensionRecord>> {
        self.call(HostCallRecord::EnumerateExtensions, |state| {
            Ok(state.extensions.clone())
        })
    }

    fn set_extension_enabled(&self, id: &ExtensionId, enabled: bool) -> HostFuture<()> {
        let target = id.clone();
        let record = HostCallRecord::SetEnabled {
            id: id.clone(),
            enabled,
        };

        self.call(record, move |state| {
            let extension = state
                .extensions
                .iter_mut()
                .find(|e| e.id == target)
                .ok_or(HostError::ExtensionNotFound(target))?;
            extension.enabled = enabled;
            Ok(())
        })
    }

    fn enumerate_tabs(&self, filter: TabFilter) -> HostFuture<Vec<TabRecord>> {
        self.call(HostCallRecord::EnumerateTabs, move |state| {
            Ok(state
                .tabs
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect())
        })
    }

    fn reload_tab(&self, id: TabId) -> HostFuture<()> {
        self.call(HostCallRecord::ReloadTab(id), move |state| {
            if state.tabs.iter().any(|t| t.id == id) {
                Ok(())
            } else {
                Err(HostError::TabNotFound(id))
            }
        })
    }

    fn set_tab_active(&self, id: TabId) -> HostFuture<()> {
        self.call(HostCallRecord::ActivateTab(id), move |state| {
            let window = state
                .tabs
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.window_id)
                .ok_or(HostError::TabNotFound(id))?;

            for tab in state.tabs.iter_mut().filter(|t| t.window_id == window) {
                tab.active = tab.id == id;
            }
            Ok(())
        })
    }
}
