//! Infrastructure layer for the librarian.
//!
//! Contains OS-facing adapters: config and catalogue files, the on-disk
//! shortcut store, and Steam's install layout.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `librarian_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod steam;
pub mod storage;
