//! Viewport-aware placement for the row action menu.
//!
//! The menu prefers to sit just below its trigger, right-aligned with the
//! trigger's right edge. When that would cross the bottom of the viewport it
//! flips above the trigger, and when it still does not fit it is clamped to
//! the margin. Horizontal placement clamps on its own.
//!
//! ```text
//!            ┌──┐ trigger
//!     ┌──────┴──┤
//!     │ Update  │  default: below, right-aligned
//!     │ More    │
//!     └─────────┘
//! ```
//!
//! All coordinates are terminal cells.

use ratatui::layout::Rect;

/// Default gap between the menu and the viewport edges.
pub const DEFAULT_MENU_MARGIN: u16 = 1;

/// Measured menu dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSize {
    pub width: u16,
    pub height: u16,
}

impl MenuSize {
    /// Creates a menu size.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Places a menu of `menu` size for a trigger at `anchor`.
///
/// A menu larger than the viewport is shrunk to it. Whenever the menu fits
/// inside the viewport with `margin` on both sides, the returned rect lies
/// within `[margin, extent - margin]` on both axes.
#[must_use]
pub fn place_menu(anchor: Rect, menu: MenuSize, viewport: Rect, margin: u16) -> Rect {
    let vw = i32::from(viewport.width);
    let vh = i32::from(viewport.height);
    let w = i32::from(menu.width.min(viewport.width));
    let h = i32::from(menu.height.min(viewport.height));
    let m = i32::from(margin);

    // Anchor edges relative to the viewport origin
    let a_top = i32::from(anchor.y) - i32::from(viewport.y);
    let a_right = i32::from(anchor.right()) - i32::from(viewport.x);
    let a_bottom = i32::from(anchor.bottom()) - i32::from(viewport.y);

    let mut left = a_right - w;
    if left < m {
        left = m.min(vw - w - m);
    }

    let mut top = a_bottom;
    if top + h > vh - m {
        top = a_top - h;
        if top < m {
            top = m.max(vh - h - m);
        }
    }

    if left + w > vw - m {
        left = m.max(vw - w - m);
    }

    let left = clamp_axis(left, w, vw, m);
    let top = clamp_axis(top, h, vh, m);

    Rect::new(
        viewport.x.saturating_add(left as u16),
        viewport.y.saturating_add(top as u16),
        w as u16,
        h as u16,
    )
}

/// Keeps `[pos, pos + len)` inside `[margin, extent - margin]`.
///
/// A span too long for the margins is pinned as close to `margin` as the
/// extent allows.
fn clamp_axis(pos: i32, len: i32, extent: i32, margin: i32) -> i32 {
    let high = extent - len - margin;
    if high < margin {
        return margin.min(extent - len).max(0);
    }
    pos.clamp(margin, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect {
        x: 0,
        y: 0,
        width: 60,
        height: 20,
    };

    #[test]
    fn test_default_below_right_aligned() {
        let anchor = Rect::new(40, 3, 3, 1);
        let placed = place_menu(anchor, MenuSize::new(12, 4), VIEWPORT, 1);
        assert_eq!(placed, Rect::new(31, 4, 12, 4));
    }

    #[test]
    fn test_flips_above_near_bottom() {
        let anchor = Rect::new(40, 17, 3, 1);
        let placed = place_menu(anchor, MenuSize::new(12, 4), VIEWPORT, 1);
        assert_eq!(placed.y, 13);
        assert_eq!(placed.bottom(), anchor.y);
    }

    #[test]
    fn test_tall_menu_clamped() {
        let anchor = Rect::new(40, 10, 3, 1);
        let placed = place_menu(anchor, MenuSize::new(12, 15), VIEWPORT, 1);
        assert_eq!(placed.y, 4);
        assert!(placed.bottom() <= VIEWPORT.height - 1);
    }

    #[test]
    fn test_left_overflow_shifts_right() {
        let anchor = Rect::new(0, 2, 3, 1);
        let placed = place_menu(anchor, MenuSize::new(12, 4), VIEWPORT, 1);
        assert_eq!(placed.x, 1);
    }

    #[test]
    fn test_right_edge_clamped() {
        let anchor = Rect::new(58, 2, 2, 1);
        let placed = place_menu(anchor, MenuSize::new(12, 4), VIEWPORT, 1);
        assert_eq!(placed.right(), 59);
    }

    #[test]
    fn test_oversized_menu_shrunk() {
        let placed = place_menu(
            Rect::new(5, 5, 1, 1),
            MenuSize::new(100, 50),
            VIEWPORT,
            1,
        );
        assert_eq!(placed, VIEWPORT);
    }

    #[test]
    fn test_viewport_offset() {
        let viewport = Rect::new(10, 5, 40, 20);
        let anchor = Rect::new(45, 8, 3, 1);
        let placed = place_menu(anchor, MenuSize::new(10, 4), viewport, 1);
        assert_eq!(placed, Rect::new(38, 9, 10, 4));
    }
}
