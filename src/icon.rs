//! Extension and tab icons.
//!
//! An extension ships several icon candidates; the row shows the largest.
//! If the chosen image cannot be loaded it is swapped for the default glyph
//! exactly once.

use tracing::debug;

use crate::host::{ExtensionRecord, IconCandidate, TabRecord};

/// Glyph drawn when there is no usable image.
pub const DEFAULT_GLYPH: &str = "▤";

/// Glyph drawn for a loaded image.
pub const IMAGE_GLYPH: &str = "◆";

/// URL schemes the popup can load images from.
const LOADABLE_SCHEMES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "moz-extension://",
    "edge://",
    "http://",
    "https://",
    "file://",
    "data:image/",
];

/// Where an icon's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// A host-served image.
    Url(String),
    /// The built-in glyph.
    Default,
}

/// Why an icon image failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IconLoadError {
    #[error("icon url is empty")]
    Empty,
    #[error("icon url scheme is not loadable")]
    UnsupportedScheme,
}

/// Picks the largest candidate. Ties keep the earliest one.
#[must_use]
pub fn best_icon(candidates: &[IconCandidate]) -> IconSource {
    let mut best: Option<&IconCandidate> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.rank() <= current.rank() => {}
            _ => best = Some(candidate),
        }
    }
    best.map_or(IconSource::Default, |c| IconSource::Url(c.url.clone()))
}

/// Checks that an image URL can be loaded.
pub fn probe(url: &str) -> Result<(), IconLoadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(IconLoadError::Empty);
    }

    let lower = url.to_ascii_lowercase();
    if LOADABLE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        Ok(())
    } else {
        Err(IconLoadError::UnsupportedScheme)
    }
}

/// A rendered icon that falls back to the default glyph at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSlot {
    source: IconSource,
    fell_back: bool,
}

impl IconSlot {
    /// Loads an icon, substituting the default glyph if the image fails.
    #[must_use]
    pub fn load(source: IconSource) -> Self {
        let mut slot = Self {
            source,
            fell_back: false,
        };

        if let IconSource::Url(url) = &slot.source {
            if let Err(e) = probe(url) {
                debug!("Icon {:?} failed to load: {}", url, e);
                slot.fail();
            }
        }
        slot
    }

    /// Icon for an extension row.
    #[must_use]
    pub fn for_extension(record: &ExtensionRecord) -> Self {
        Self::load(best_icon(&record.icons))
    }

    /// Favicon for a tab entry.
    #[must_use]
    pub fn for_tab(tab: &TabRecord) -> Self {
        let source = tab
            .fav_icon_url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .map_or(IconSource::Default, |url| IconSource::Url(url.clone()));
        Self::load(source)
    }

    /// Reports a load failure. Returns true if the glyph was substituted;
    /// a slot already showing the default is left alone.
    pub fn fail(&mut self) -> bool {
        if self.source == IconSource::Default {
            return false;
        }
        self.source = IconSource::Default;
        self.fell_back = true;
        true
    }

    /// Current source.
    #[must_use]
    pub fn source(&self) -> &IconSource {
        &self.source
    }

    /// True if a failed image was replaced.
    #[must_use]
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    /// Glyph to draw in a terminal cell.
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self.source {
            IconSource::Url(_) => IMAGE_GLYPH,
            IconSource::Default => DEFAULT_GLYPH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_icon_picks_largest() {
        let icons = vec![
            IconCandidate::new(16, "chrome://a/16"),
            IconCandidate::new(128, "chrome://a/128"),
            IconCandidate::new(48, "chrome://a/48"),
        ];
        assert_eq!(best_icon(&icons), IconSource::Url("chrome://a/128".to_string()));
    }

    #[test]
    fn test_best_icon_tie_keeps_first() {
        let icons = vec![
            IconCandidate::new(32, "chrome://first"),
            IconCandidate::new(32, "chrome://second"),
        ];
        assert_eq!(best_icon(&icons), IconSource::Url("chrome://first".to_string()));
    }

    #[test]
    fn test_best_icon_missing_size_ranks_lowest() {
        let icons = vec![
            IconCandidate {
                size: None,
                url: "chrome://unsized".to_string(),
            },
            IconCandidate::new(1, "chrome://tiny"),
        ];
        assert_eq!(best_icon(&icons), IconSource::Url("chrome://tiny".to_string()));
    }

    #[test]
    fn test_no_candidates_uses_default() {
        assert_eq!(best_icon(&[]), IconSource::Default);
        let slot = IconSlot::for_extension(&ExtensionRecord::new("x", "X"));
        assert_eq!(slot.glyph(), DEFAULT_GLYPH);
        assert!(!slot.fell_back());
    }

    #[test]
    fn test_unloadable_icon_falls_back_once() {
        let mut slot = IconSlot::load(IconSource::Url("ftp://nope/icon.png".to_string()));
        assert_eq!(slot.source(), &IconSource::Default);
        assert!(slot.fell_back());
        assert!(!slot.fail());
    }

    #[test]
    fn test_loadable_icon_kept() {
        let record = ExtensionRecord::new("x", "X").with_icon(48, "chrome://extension-icon/x/48/0");
        let slot = IconSlot::for_extension(&record);
        assert_eq!(slot.glyph(), IMAGE_GLYPH);
        assert!(!slot.fell_back());
    }

    #[test]
    fn test_tab_without_favicon() {
        let tab = TabRecord::new(1, "t", "https://t");
        assert_eq!(IconSlot::for_tab(&tab).source(), &IconSource::Default);

        let tab = tab.with_fav_icon("https://t/favicon.ico");
        assert_eq!(IconSlot::for_tab(&tab).glyph(), IMAGE_GLYPH);
    }

    #[test]
    fn test_probe() {
        assert_eq!(probe(""), Err(IconLoadError::Empty));
        assert_eq!(probe("javascript:alert(1)"), Err(IconLoadError::UnsupportedScheme));
        assert!(probe("data:image/svg+xml;utf8,<svg/>").is_ok());
        assert!(probe("HTTPS://EXAMPLE.COM/x.png").is_ok());
    }
}
