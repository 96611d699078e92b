//! Host record types.
//!
//! Read-only views of what the host reports. The popup never mutates these
//! directly; enabling, reloading and activating go through [`super::Host`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used for a tab with neither title nor URL.
pub const UNTITLED_TAB: &str = "(No title)";

/// Opaque host-assigned extension identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Creates an identifier from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Host-assigned tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One icon an extension ships, at a given pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCandidate {
    /// Edge size in pixels. Missing sizes rank as 0.
    #[serde(default)]
    pub size: Option<u32>,
    /// Where the host serves the image.
    pub url: String,
}

impl IconCandidate {
    /// Creates a sized icon candidate.
    #[must_use]
    pub fn new(size: u32, url: impl Into<String>) -> Self {
        Self {
            size: Some(size),
            url: url.into(),
        }
    }

    /// Size used for ranking.
    #[must_use]
    pub fn rank(&self) -> u32 {
        self.size.unwrap_or(0)
    }
}

/// An installed extension as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    /// Identifier.
    pub id: ExtensionId,
    /// Display name.
    pub name: String,
    /// Icon candidates in host order.
    #[serde(default)]
    pub icons: Vec<IconCandidate>,
    /// Whether the host currently has it enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ExtensionRecord {
    /// Creates an enabled extension with no icons.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ExtensionId::new(id),
            name: name.into(),
            icons: Vec::new(),
            enabled: true,
        }
    }

    /// Adds an icon candidate.
    #[must_use]
    pub fn with_icon(mut self, size: u32, url: impl Into<String>) -> Self {
        self.icons.push(IconCandidate::new(size, url));
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// An open browser tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    /// Identifier.
    pub id: TabId,
    /// Page title, if the page has loaded one.
    #[serde(default)]
    pub title: Option<String>,
    /// Page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Favicon URL.
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    /// Whether the tab is the active one in its window.
    #[serde(default)]
    pub active: bool,
    /// Owning window.
    #[serde(default)]
    pub window_id: i64,
}

impl TabRecord {
    /// Creates a tab in window 0.
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TabId(id),
            title: Some(title.into()),
            url: Some(url.into()),
            fav_icon_url: None,
            active: false,
            window_id: 0,
        }
    }

    /// Sets the favicon URL.
    #[must_use]
    pub fn with_fav_icon(mut self, url: impl Into<String>) -> Self {
        self.fav_icon_url = Some(url.into());
        self
    }

    /// Sets the owning window.
    #[must_use]
    pub fn in_window(mut self, window_id: i64) -> Self {
        self.window_id = window_id;
        self
    }

    /// Display label: title, then URL, then a placeholder.
    #[must_use]
    pub fn label(&self) -> &str {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.url.as_deref()))
            .unwrap_or(UNTITLED_TAB)
    }
}

/// Which tabs an enumeration should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabFilter {
    /// Only tabs whose active flag matches.
    pub active: Option<bool>,
    /// Only tabs in this window.
    pub window_id: Option<i64>,
}

impl TabFilter {
    /// Matches every open tab.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            active: None,
            window_id: None,
        }
    }

    /// Returns true if the tab passes the filter.
    #[must_use]
    pub fn matches(&self, tab: &TabRecord) -> bool {
        self.active.is_none_or(|active| tab.active == active)
            && self.window_id.is_none_or(|window| tab.window_id == window)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn default_true() -> bool {
    true
}
