//! # Lumen: a small privacy-minded browser core
//!
//! Everything a tabbed browser needs except the rendering engine itself.
//! The engine is reached through the traits in [`engine`]; the Servo-based
//! desktop shell lives in the `shell/` package.
//!
//! ## Modules
//!
//! - [`privacy`]: substring request blocklist and the interception hook
//!   every session installs.
//! - [`profile`] / [`session`]: on-disk profile layout and the factory for
//!   persistent and incognito browsing sessions.
//! - [`tab`] / [`window`]: tab load state machine and the per-window
//!   controller (active tab, status bar, navigation state).
//! - [`app`]: the [`Browser`](app::Browser), owning windows, sessions and
//!   bookmarks, and dispatching [`events`].
//! - [`store`]: history, bookmarks (JSON on disk) and the download log.
//! - [`urlbar`]: URL field editing and input normalization.
//! - [`config`]: TOML configuration.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod privacy;
pub mod profile;
pub mod session;
pub mod store;
pub mod tab;
pub mod urlbar;
pub mod window;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
