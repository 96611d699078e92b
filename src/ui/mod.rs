//! User interface module.
//!
//! Widgets and layout for the popup.

pub mod action_menu;
pub mod key_hint_bar;
pub mod layout;
pub mod popup_view;
pub mod tab_panel;

pub use action_menu::ActionMenu;
pub use key_hint_bar::{HintContext, KeyHint, KeyHintBar, KeyHintStyle};
pub use layout::{Hit, LineKind, ListLine, PopupLayout};
pub use popup_view::{PopupView, Selection};
pub use tab_panel::PanelItem;
