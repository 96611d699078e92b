//! Host collaborator seam.
//!
//! The popup never talks to a browser directly. Everything it needs from the
//! host goes through the [`Host`] trait:
//! - extension management (enumerate, enable/disable)
//! - tabs (enumerate, reload, activate)
//!
//! Calls return boxed futures so the [`HostBridge`] can drive them on its own
//! runtime while the UI loop stays synchronous.

pub mod bridge;
pub mod local;
mod types;

use std::future::Future;
use std::pin::Pin;

pub use bridge::{HostBridge, HostCall, HostReply, HostRequest, HostResult, Ticket};
pub use local::{HostCallRecord, HostSnapshot, LocalHost, SnapshotError};
pub use types::{
    ExtensionId, ExtensionRecord, IconCandidate, TabFilter, TabId, TabRecord, UNTITLED_TAB,
};

/// Errors reported by a host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// No extension with that identifier.
    #[error("Extension not found: {0}")]
    ExtensionNotFound(ExtensionId),
    /// The tab closed or never existed.
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
    /// The host could not service the call.
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by host calls.
pub type HostFuture<T> = Pin<Box<dyn Future<Output = Result<T, HostError>> + Send + 'static>>;

/// Extension-management and tabs APIs of the host.
///
/// Futures must not borrow `self`; implementations clone whatever shared
/// state they need into the returned future.
pub trait Host: Send + Sync {
    /// Identifies the calling extension so it can be left out of the list.
    fn self_identifier(&self) -> ExtensionId;

    /// Lists every installed extension, including the caller.
    fn enumerate_extensions(&self) -> HostFuture<Vec<ExtensionRecord>>;

    /// Enables or disables an extension.
    fn set_extension_enabled(&self, id: &ExtensionId, enabled: bool) -> HostFuture<()>;

    /// Lists open tabs matching the filter.
    fn enumerate_tabs(&self, filter: TabFilter) -> HostFuture<Vec<TabRecord>>;

    /// Reloads a tab. Fails if the tab has closed.
    fn reload_tab(&self, id: TabId) -> HostFuture<()>;

    /// Makes a tab the active one in its window.
    fn set_tab_active(&self, id: TabId) -> HostFuture<()>;
}
