//! Storage infrastructure: configuration, catalogue library and shortcut store.
//!
//! This module provides a thin adapter between the application and the
//! file system:
//!
//! - **`config`** – the TOML configuration file, with defaults on first run.
//! - **`library`** – the JSON catalogue library.
//! - **`shortcut_store`** – atomic replacement of `shortcuts.vdf` with backups.
//! - **`mock`** – an in-memory stand-in for `shortcut_store` used in tests.

pub mod config;
pub mod library;
pub mod mock;
pub mod shortcut_store;
