//! Domain entities: shortcuts, their identifiers, and the catalogue's view
//! of them.
//!
//! Nothing in here touches the filesystem.  The reconciliation engine in the
//! `librarian` crate combines these types; the codec in [`crate::vdf`] moves
//! them to and from bytes.

/// Shortcut identifier derivation.
pub mod app_id;

/// Catalogue pointers and declared entries.
pub mod catalogue;

/// The catalogue document.
pub mod library;

/// The shortcut record itself.
pub mod shortcut;
