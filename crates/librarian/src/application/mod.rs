//! Application layer use cases for the librarian.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (OS/filesystem/Steam).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "make
//!   Steam's shortcut list match my ROM catalogue").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls and no direct file system access**.
//!
//! # Sub-modules
//!
//! - **`build_entries`** – Resolves every catalogue entry against its
//!   launcher into the shortcut the catalogue wants to exist.
//!
//! - **`reconcile`**     – The reconciliation engine: merges declared
//!   entries into the existing store while keeping everything Steam and the
//!   user own.
//!
//! - **`sync_library`**  – One full pass: read, reconcile, back up, write.

pub mod build_entries;
pub mod reconcile;
pub mod sync_library;
