//! Property tests for action menu placement.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use ratatui::layout::Rect;

use extreload::geometry::{MenuSize, place_menu};

fn inside_margins(placed: Rect, viewport: Rect, margin: u16) -> bool {
    placed.x >= viewport.x + margin
        && placed.y >= viewport.y + margin
        && placed.right() <= viewport.right() - margin
        && placed.bottom() <= viewport.bottom() - margin
}

proptest! {
    /// Triggers hugging the right and bottom edges still get a menu inside
    /// the margins whenever one fits.
    #[test]
    fn prop_menu_near_edges_stays_inside(
        vw in 20u16..200,
        vh in 10u16..80,
        from_right in 0u16..6,
        from_bottom in 0u16..4,
        menu_w in 4u16..30,
        menu_h in 3u16..8,
        margin in 0u16..3,
    ) {
        let viewport = Rect::new(0, 0, vw, vh);
        prop_assume!(menu_w + 2 * margin <= vw && menu_h + 2 * margin <= vh);

        let anchor = Rect::new(
            vw.saturating_sub(3 + from_right),
            vh.saturating_sub(1 + from_bottom),
            3,
            1,
        );
        let placed = place_menu(anchor, MenuSize::new(menu_w, menu_h), viewport, margin);

        prop_assert_eq!((placed.width, placed.height), (menu_w, menu_h));
        prop_assert!(inside_margins(placed, viewport, margin), "{:?} in {:?}", placed, viewport);
    }

    /// Any anchor inside an offset viewport yields a menu inside it.
    #[test]
    fn prop_menu_anywhere_stays_inside(
        ox in 0u16..50,
        oy in 0u16..50,
        vw in 12u16..120,
        vh in 8u16..60,
        ax in 0u16..120,
        ay in 0u16..60,
    ) {
        let viewport = Rect::new(ox, oy, vw, vh);
        let anchor = Rect::new(ox + ax % vw, oy + ay % vh, 1, 1);
        let placed = place_menu(anchor, MenuSize::new(10, 4), viewport, 1);
        prop_assert!(inside_margins(placed, viewport, 1), "{:?} in {:?}", placed, viewport);
    }

    /// A menu larger than the viewport is shrunk to fit.
    #[test]
    fn prop_oversized_menu_shrinks(vw in 1u16..40, vh in 1u16..20) {
        let viewport = Rect::new(0, 0, vw, vh);
        let placed = place_menu(Rect::new(0, 0, 1, 1), MenuSize::new(vw + 5, vh + 5), viewport, 1);
        prop_assert_eq!((placed.width, placed.height), (vw, vh));
        prop_assert!(inside_margins(placed, viewport, 0), "{:?} in {:?}", placed, viewport);
    }
}

#[test]
fn test_below_trigger_by_default() {
    let viewport = Rect::new(0, 0, 60, 20);
    let anchor = Rect::new(20, 2, 3, 1);
    let placed = place_menu(anchor, MenuSize::new(10, 4), viewport, 1);
    assert_eq!(placed.y, anchor.bottom());
    assert_eq!(placed.right(), anchor.right());
}
