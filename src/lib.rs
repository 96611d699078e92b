//! extreload
//!
//! A terminal popup that force-refreshes browser extensions by disabling and
//! re-enabling them, optionally reloading open tabs afterwards.
//!
//! # Architecture
//!
//! - **Host Module**: the browser management contract, a snapshot-backed
//!   local host and the bridge that runs host calls on a tokio runtime
//! - **Controller Module**: listed rows, menus, the tabs panel and update
//!   tasks
//! - **UI Module**: ratatui widgets, layout and hit testing
//! - **App Module**: event loop glue between terminal, controller and host
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use extreload::app::App;
//! use extreload::config::Config;
//! use extreload::host::{HostSnapshot, LocalHost};
//!
//! let host = Arc::new(LocalHost::new(HostSnapshot::sample()));
//! let mut app = App::new(Config::default(), host).expect("Failed to create app");
//! // Run event loop...
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod app;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod icon;
pub mod logging;
pub mod ui;

// Re-export main types
pub use app::App;
pub use config::Config;
pub use controller::Controller;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
