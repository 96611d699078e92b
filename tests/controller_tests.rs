//! Integration tests for the listing and action controller.
//!
//! The controller never calls the host itself, so these tests play the host:
//! they drain queued requests and feed replies back in whatever order the
//! scenario needs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use ratatui::layout::Rect;

use extreload::controller::{
    Controller, ControllerSettings, EMPTY_MESSAGE, Listing, MenuAction, PanelContent, RowStatus,
};
use extreload::geometry::MenuSize;
use extreload::host::{
    ExtensionId, ExtensionRecord, HostCall, HostError, HostReply, HostRequest, HostResult,
    TabFilter, TabId, TabRecord,
};

// ============================================================================
// Helpers
// ============================================================================

const VIEWPORT: Rect = Rect {
    x: 0,
    y: 0,
    width: 60,
    height: 20,
};

fn id(raw: &str) -> ExtensionId {
    ExtensionId::new(raw)
}

fn listed(ids: &[&str]) -> Controller {
    let mut controller = Controller::new(id("self"), ControllerSettings::default());
    controller.start();
    let requests = controller.take_requests();
    assert_eq!(calls(&requests), vec![HostCall::EnumerateExtensions]);

    let mut records = vec![ExtensionRecord::new("self", "This popup")];
    records.extend(ids.iter().map(|raw| ExtensionRecord::new(*raw, raw.to_uppercase())));
    controller.handle_reply(
        HostReply {
            ticket: requests[0].ticket,
            result: HostResult::Extensions(Ok(records)),
        },
        Instant::now(),
    );
    controller
}

fn calls(requests: &[HostRequest]) -> Vec<HostCall> {
    requests.iter().map(|r| r.call.clone()).collect()
}

fn disable(raw: &str) -> HostCall {
    HostCall::SetEnabled {
        id: id(raw),
        enabled: false,
    }
}

fn enable(raw: &str) -> HostCall {
    HostCall::SetEnabled {
        id: id(raw),
        enabled: true,
    }
}

fn done(request: &HostRequest) -> HostReply {
    HostReply {
        ticket: request.ticket,
        result: HostResult::Done(Ok(())),
    }
}

fn tabs(request: &HostRequest, tabs: Vec<TabRecord>) -> HostReply {
    HostReply {
        ticket: request.ticket,
        result: HostResult::Tabs(Ok(tabs)),
    }
}

fn status(controller: &Controller, raw: &str) -> &'static str {
    controller.row(&id(raw)).map_or("<missing>", |r| r.status_text())
}

/// Runs one full disable/enable pair, replying to each step. Returns the
/// time the enable completed.
fn complete_pair(controller: &mut Controller, raw: &str) -> Instant {
    let requests = controller.take_requests();
    assert_eq!(calls(&requests), vec![disable(raw)]);
    controller.handle_reply(done(&requests[0]), Instant::now());

    let requests = controller.take_requests();
    assert_eq!(calls(&requests), vec![enable(raw)]);
    let now = Instant::now();
    controller.handle_reply(done(&requests[0]), now);
    now
}

fn open_panel_with(controller: &mut Controller, raw: &str, records: Vec<TabRecord>) {
    controller.show_panel(&id(raw));
    let requests = controller.take_requests();
    assert_eq!(calls(&requests), vec![HostCall::EnumerateTabs(TabFilter::all())]);
    controller.handle_reply(tabs(&requests[0], records), Instant::now());
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_listing_keeps_host_order_without_self() {
    let controller = listed(&["b", "a", "c"]);
    let names: Vec<&str> = controller.rows().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["B", "A", "C"]);
    assert!(controller.rows().iter().all(|r| r.status() == RowStatus::Idle));
}

#[test]
fn test_only_self_shows_message_and_bulk_is_noop() {
    let mut controller = listed(&[]);
    assert_eq!(controller.listing(), Listing::Empty);
    assert_eq!(EMPTY_MESSAGE, "No extensions found (except this extension).");

    assert_eq!(controller.update_all(), 0);
    assert_eq!(controller.update_all_and_reload_tabs(), 0);
    assert!(controller.take_requests().is_empty());
}

#[test]
fn test_bulk_is_noop_while_loading() {
    let mut controller = Controller::new(id("self"), ControllerSettings::default());
    controller.start();
    controller.take_requests();

    assert_eq!(controller.update_all(), 0);
    assert!(controller.take_requests().is_empty());
}

#[test]
fn test_listing_failure_shows_empty() {
    let mut controller = Controller::new(id("self"), ControllerSettings::default());
    controller.start();
    let requests = controller.take_requests();
    controller.handle_reply(
        HostReply {
            ticket: requests[0].ticket,
            result: HostResult::Extensions(Err(HostError::Unavailable("gone".into()))),
        },
        Instant::now(),
    );
    assert_eq!(controller.listing(), Listing::Empty);
}

// ============================================================================
// Update sequence
// ============================================================================

#[test]
fn test_enable_waits_for_disable() {
    let mut controller = listed(&["a"]);
    controller.update(&id("a"));

    let first = controller.take_requests();
    assert_eq!(calls(&first), vec![disable("a")]);

    // Nothing else goes out until the disable completes
    controller.tick(Instant::now() + Duration::from_secs(10));
    assert!(controller.take_requests().is_empty());

    controller.handle_reply(done(&first[0]), Instant::now());
    assert_eq!(calls(&controller.take_requests()), vec![enable("a")]);
}

#[test]
fn test_status_transitions_in_order() {
    let mut controller = listed(&["a"]);
    let mut seen = vec![status(&controller, "a")];

    controller.update(&id("a"));
    seen.push(status(&controller, "a"));

    let enabled_at = complete_pair(&mut controller, "a");
    seen.push(status(&controller, "a"));

    controller.tick(enabled_at + Duration::from_millis(1499));
    assert_eq!(status(&controller, "a"), "Updated");

    controller.tick(enabled_at + Duration::from_millis(1500));
    seen.push(status(&controller, "a"));

    assert_eq!(seen, vec!["", "Updating...", "Updated", ""]);
    assert_eq!(controller.tasks().count(), 0);
}

#[test]
fn test_enable_failure_keeps_updating() {
    let mut controller = listed(&["a"]);
    controller.update(&id("a"));
    let requests = controller.take_requests();
    controller.handle_reply(done(&requests[0]), Instant::now());

    let requests = controller.take_requests();
    controller.handle_reply(
        HostReply {
            ticket: requests[0].ticket,
            result: HostResult::Done(Err(HostError::ExtensionNotFound(id("a")))),
        },
        Instant::now(),
    );

    controller.tick(Instant::now() + Duration::from_secs(5));
    assert_eq!(status(&controller, "a"), "Updating...");
    assert!(controller.take_requests().is_empty());
}

#[test]
fn test_newer_update_owns_status() {
    let mut controller = listed(&["a"]);
    controller.update(&id("a"));
    controller.update(&id("a"));

    let disables = controller.take_requests();
    assert_eq!(calls(&disables), vec![disable("a"), disable("a")]);

    // The older pair finishes first and must not mark the row Updated
    controller.handle_reply(done(&disables[0]), Instant::now());
    let older_enable = controller.take_requests();
    controller.handle_reply(done(&older_enable[0]), Instant::now());
    assert_eq!(status(&controller, "a"), "Updating...");

    controller.handle_reply(done(&disables[1]), Instant::now());
    let newer_enable = controller.take_requests();
    controller.handle_reply(done(&newer_enable[0]), Instant::now());
    assert_eq!(status(&controller, "a"), "Updated");
}

// ============================================================================
// Menus
// ============================================================================

#[test]
fn test_opening_menu_closes_other_menus_and_panels() {
    let mut controller = listed(&["a", "b"]);
    let size = MenuSize::new(10, 4);
    let anchor = Rect::new(50, 3, 3, 1);

    controller.show_panel(&id("a"));
    assert!(controller.is_panel_open(&id("a")));

    assert!(controller.toggle_menu(&id("b"), anchor, size, VIEWPORT));
    assert!(controller.is_menu_open(&id("b")));
    assert_eq!(controller.open_panel(), None);

    assert!(controller.toggle_menu(&id("a"), anchor, size, VIEWPORT));
    assert!(controller.is_menu_open(&id("a")));
    assert!(!controller.is_menu_open(&id("b")));

    // Toggling the open one closes it
    assert!(!controller.toggle_menu(&id("a"), anchor, size, VIEWPORT));
    assert_eq!(controller.open_menu(), None);
}

#[test]
fn test_close_menus_leaves_panel_open() {
    let mut controller = listed(&["a"]);
    controller.show_panel(&id("a"));
    controller.close_menus();
    assert!(controller.is_panel_open(&id("a")));
}

#[test]
fn test_menu_update_action() {
    let mut controller = listed(&["a"]);
    controller.toggle_menu(&id("a"), Rect::new(50, 3, 3, 1), MenuSize::new(10, 4), VIEWPORT);
    controller.choose(MenuAction::Update);

    assert_eq!(controller.open_menu(), None);
    assert_eq!(calls(&controller.take_requests()), vec![disable("a")]);
}

#[test]
fn test_menu_placement_recorded() {
    let mut controller = listed(&["a"]);
    controller.toggle_menu(&id("a"), Rect::new(50, 18, 3, 1), MenuSize::new(10, 4), VIEWPORT);

    let placement = controller.open_menu().map(|m| m.placement).unwrap();
    // Flipped above a trigger on the last usable line
    assert_eq!(placement, Rect::new(43, 14, 10, 4));
}

// ============================================================================
// Tabs panel
// ============================================================================

#[test]
fn test_panel_fetched_once() {
    let mut controller = listed(&["a"]);
    open_panel_with(
        &mut controller,
        "a",
        vec![TabRecord::new(1, "One", "https://one"), TabRecord::new(2, "", "https://two")],
    );

    controller.close_panel();
    controller.choose(MenuAction::More);
    controller.show_panel(&id("a"));
    controller.show_panel(&id("a"));
    assert!(controller.take_requests().is_empty());

    let row = controller.row(&id("a")).unwrap();
    let labels: Vec<&str> = row.panel().entries().iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["One", "https://two"]);
}

#[test]
fn test_panel_loading_then_empty() {
    let mut controller = listed(&["a"]);
    controller.show_panel(&id("a"));
    assert!(matches!(
        controller.row(&id("a")).unwrap().panel(),
        PanelContent::Loading
    ));

    let requests = controller.take_requests();
    controller.handle_reply(tabs(&requests[0], vec![]), Instant::now());
    assert!(matches!(
        controller.row(&id("a")).unwrap().panel(),
        PanelContent::Loaded(entries) if entries.is_empty()
    ));
}

#[test]
fn test_only_one_panel_open() {
    let mut controller = listed(&["a", "b"]);
    controller.show_panel(&id("a"));
    controller.show_panel(&id("b"));
    assert_eq!(controller.open_panel(), Some(&id("b")));
}

#[test]
fn test_tab_entry_reloads_then_activates() {
    let mut controller = listed(&["a"]);
    open_panel_with(
        &mut controller,
        "a",
        vec![TabRecord::new(7, "Seven", "https://7"), TabRecord::new(8, "Eight", "https://8")],
    );

    controller.select_tab(&id("a"), TabId(8));
    assert_eq!(controller.open_panel(), None);

    let enabled_at = complete_pair(&mut controller, "a");
    assert_eq!(status(&controller, "a"), "Updated");

    let reload = controller.take_requests();
    assert_eq!(calls(&reload), vec![HostCall::ReloadTab(TabId(8))]);
    controller.handle_reply(done(&reload[0]), Instant::now());

    let activate = controller.take_requests();
    assert_eq!(calls(&activate), vec![HostCall::ActivateTab(TabId(8))]);
    controller.handle_reply(done(&activate[0]), Instant::now());

    controller.tick(enabled_at + Duration::from_millis(1000));
    assert_eq!(status(&controller, "a"), "");
}

#[test]
fn test_tab_reload_failure_swallowed() {
    let mut controller = listed(&["a"]);
    open_panel_with(&mut controller, "a", vec![TabRecord::new(7, "Seven", "https://7")]);
    controller.select_tab(&id("a"), TabId(7));
    complete_pair(&mut controller, "a");

    let reload = controller.take_requests();
    controller.handle_reply(
        HostReply {
            ticket: reload[0].ticket,
            result: HostResult::Done(Err(HostError::TabNotFound(TabId(7)))),
        },
        Instant::now(),
    );

    assert!(controller.take_requests().is_empty());
    assert_eq!(controller.pending_calls(), 0);
    assert_eq!(status(&controller, "a"), "Updated");
}

#[test]
fn test_panel_update_reloads_tabs_after_settle() {
    let mut controller = listed(&["a"]);
    controller.show_panel(&id("a"));
    controller.take_requests();

    controller.update_and_reload_tabs(&id("a"));
    assert_eq!(controller.open_panel(), None);
    let enabled_at = complete_pair(&mut controller, "a");
    assert!(controller.take_requests().is_empty());

    controller.tick(enabled_at + Duration::from_millis(1499));
    assert!(controller.take_requests().is_empty());

    controller.tick(enabled_at + Duration::from_millis(1500));
    let query = controller.take_requests();
    assert_eq!(calls(&query), vec![HostCall::EnumerateTabs(TabFilter::all())]);

    controller.handle_reply(
        tabs(
            &query[0],
            vec![TabRecord::new(1, "x", "https://x"), TabRecord::new(2, "y", "https://y")],
        ),
        Instant::now(),
    );
    assert_eq!(
        calls(&controller.take_requests()),
        vec![HostCall::ReloadTab(TabId(1)), HostCall::ReloadTab(TabId(2))]
    );
}

// ============================================================================
// Bulk actions
// ============================================================================

#[test]
fn test_update_all_one_pair_per_row() {
    let mut controller = listed(&["a", "b", "c"]);
    assert_eq!(controller.update_all(), 3);

    let disables = controller.take_requests();
    assert_eq!(calls(&disables), vec![disable("a"), disable("b"), disable("c")]);

    // Completions arrive out of order; each row still gets its own enable
    for request in disables.iter().rev() {
        controller.handle_reply(done(request), Instant::now());
    }
    assert_eq!(
        calls(&controller.take_requests()),
        vec![enable("c"), enable("b"), enable("a")]
    );
}

#[test]
fn test_bulk_status_uses_bulk_delay() {
    let mut controller = listed(&["a"]);
    controller.update_all();
    let enabled_at = complete_pair(&mut controller, "a");

    controller.tick(enabled_at + Duration::from_millis(1200));
    assert_eq!(status(&controller, "a"), "");
}

#[test]
fn test_update_all_and_reload_does_not_wait() {
    let mut controller = listed(&["a", "b"]);
    assert_eq!(controller.update_all_and_reload_tabs(), 2);

    let requests = controller.take_requests();
    assert_eq!(
        calls(&requests),
        vec![
            disable("a"),
            disable("b"),
            HostCall::EnumerateTabs(TabFilter::all()),
        ]
    );

    controller.handle_reply(
        tabs(
            &requests[2],
            vec![TabRecord::new(1, "x", "https://x"), TabRecord::new(2, "y", "https://y")],
        ),
        Instant::now(),
    );
    let reloads = controller.take_requests();
    assert_eq!(
        calls(&reloads),
        vec![HostCall::ReloadTab(TabId(1)), HostCall::ReloadTab(TabId(2))]
    );

    // One tab failing does not affect the other or the updates
    controller.handle_reply(
        HostReply {
            ticket: reloads[0].ticket,
            result: HostResult::Done(Err(HostError::TabNotFound(TabId(1)))),
        },
        Instant::now(),
    );
    controller.handle_reply(done(&reloads[1]), Instant::now());
    assert_eq!(status(&controller, "a"), "Updating...");
    assert_eq!(status(&controller, "b"), "Updating...");
}
