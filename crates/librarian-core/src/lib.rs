//! # librarian-core
//!
//! Shared library for Steam ROM Librarian containing the binary KeyValues
//! codec, the `shortcuts.vdf` record mapper, and shortcut identifier
//! derivation.
//!
//! It has no dependencies on the filesystem, Steam's install location, or
//! the catalogue file format; those live in the `librarian` crate.
//!
//! # Architecture overview
//!
//! - **`vdf`** – How Steam's binary KeyValues files are laid out.  A
//!   recursive codec turns bytes into a [`KvNode`] tree and back, and the
//!   shortcut mapper turns the `shortcuts` tree into typed [`Shortcut`]
//!   records.  The codec knows nothing about shortcuts, so it also reads
//!   the KeyValues blobs inside `appinfo.vdf` and `packageinfo.vdf`.
//!
//! - **`domain`** – The shortcut entity, the catalogue library with its
//!   pointers and declared entries, and [`AppId`], the CRC32-based identifier that ties a
//!   catalogue entry to its shortcut across runs.

pub mod domain;
pub mod vdf;

pub use domain::app_id::AppId;
pub use domain::catalogue::{CataloguePointer, DeclaredEntry};
pub use domain::library::{Category, Launcher, Library, RomEntry};
pub use domain::shortcut::{Shortcut, ShortcutFlags};
pub use vdf::{decode, encode, read_shortcuts, write_shortcuts, KvNode, KvValue, ShortcutsError, VdfError};
