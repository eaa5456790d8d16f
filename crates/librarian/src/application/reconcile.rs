//! ReconcileUseCase: merges the catalogue into the existing shortcut store.
//!
//! The engine is a pure function of three inputs:
//!
//! - the shortcuts currently in `shortcuts.vdf`,
//! - the catalogue's pointers (shortcuts it claimed on earlier runs but does
//!   not generate),
//! - the entries the catalogue declares for this run.
//!
//! # Bookkeeping rules
//!
//! ```text
//! deleted  = pointers whose appid is no longer in the store
//! adopted  = store shortcuts that are neither pointed to nor declared
//! pointers'= (pointers - deleted) ++ adopted
//! output   = store shortcuts referenced by pointers' (stored order)
//!            ++ declared entries (declaration order)
//!            ++ extra store copies of a declared appid (stored order)
//! ```
//!
//! Deletion only fires when a pointer's shortcut is gone from the store.  A
//! shortcut the catalogue stopped declaring stays in the store and is
//! adopted as a pointer, so nothing the user can see in Steam disappears
//! behind their back.
//!
//! A declared entry whose ID is already in the store inherits everything
//! Steam owns (play time, tags, visibility) and only has its launch fields
//! replaced.  Running the engine again on its own output with the same
//! catalogue reproduces that output exactly.

use std::collections::{HashMap, HashSet};

use librarian_core::{CataloguePointer, DeclaredEntry, Shortcut};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for the reconciliation engine.
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// Two different shortcuts map to the same shortcut ID.
    #[error("identifier collision: {existing:?} and {declared:?} both derive shortcut ID {app_id}")]
    IdentifierCollision {
        app_id: u32,
        existing: String,
        declared: String,
    },

    /// The same entry is declared twice.
    #[error("catalogue entry {name:?} is declared more than once (shortcut ID {app_id})")]
    DuplicateEntry { app_id: u32, name: String },
}

/// What changed during a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Pointers dropped because their shortcut was removed inside Steam.
    pub deleted: Vec<CataloguePointer>,
    /// Shortcuts added inside Steam (or no longer declared) that are now tracked.
    pub adopted: Vec<CataloguePointer>,
    /// Declared entries that reused an existing shortcut.
    pub inherited: Vec<String>,
    /// Declared entries that produced a brand-new shortcut.
    pub created: Vec<String>,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The new store contents, in output order.
    pub shortcuts: Vec<Shortcut>,
    /// The pointer list the catalogue should persist.
    pub pointers: Vec<CataloguePointer>,
    pub report: ReconcileReport,
}

/// Merges `declared` into `existing`, tracking `pointers`.
///
/// # Errors
///
/// Returns [`ReconcileError::IdentifierCollision`] if two declared entries
/// with different names derive the same ID, or a declared entry derives the
/// ID of a pointer-tracked shortcut with a different name.  Returns
/// [`ReconcileError::DuplicateEntry`] if an entry is declared twice.
pub fn reconcile(
    existing: &[Shortcut],
    pointers: &[CataloguePointer],
    declared: &[DeclaredEntry],
) -> Result<Reconciliation, ReconcileError> {
    let declared_ids = declared_ids(declared)?;
    let declared_set: HashSet<u32> = declared_ids.iter().copied().collect();

    // First occurrence wins when the store holds duplicate IDs.
    let mut store_by_id: HashMap<u32, &Shortcut> = HashMap::new();
    for shortcut in existing {
        store_by_id.entry(shortcut.app_id).or_insert(shortcut);
    }

    let mut report = ReconcileReport::default();

    // ── Deleted / retained pointers ──────────────────────────────────────────
    let mut final_pointers = Vec::with_capacity(pointers.len());
    let mut pointer_ids = HashSet::new();
    for pointer in pointers {
        let found = parse_pointer_id(&pointer.app_id).and_then(|id| store_by_id.get(&id));
        match found {
            Some(shortcut) => {
                if !pointer_ids.insert(shortcut.app_id) {
                    debug!("dropping repeated pointer {}", pointer.app_id);
                    continue;
                }
                if shortcut.app_name != pointer.app_name {
                    debug!(
                        "pointer {} renamed in Steam: {:?} -> {:?}",
                        pointer.app_id, pointer.app_name, shortcut.app_name
                    );
                }
                final_pointers.push(CataloguePointer::for_shortcut(shortcut));
            }
            None => {
                info!("{} ({}) was removed in Steam", pointer.app_name, pointer.app_id);
                report.deleted.push(pointer.clone());
            }
        }
    }

    // ── Adopted shortcuts ────────────────────────────────────────────────────
    for shortcut in existing {
        let id = shortcut.app_id;
        if pointer_ids.contains(&id) || declared_set.contains(&id) {
            continue;
        }
        pointer_ids.insert(id);
        let pointer = CataloguePointer::for_shortcut(shortcut);
        info!("adopting {shortcut}");
        report.adopted.push(pointer.clone());
        final_pointers.push(pointer);
    }

    // ── Collisions with user-owned shortcuts ─────────────────────────────────
    for (entry, &id) in declared.iter().zip(&declared_ids) {
        if !pointer_ids.contains(&id) {
            continue;
        }
        if let Some(shortcut) = store_by_id.get(&id) {
            if shortcut.app_name != entry.name {
                return Err(ReconcileError::IdentifierCollision {
                    app_id: id,
                    existing: shortcut.app_name.clone(),
                    declared: entry.name.clone(),
                });
            }
        }
    }

    // ── Output ───────────────────────────────────────────────────────────────
    let mut shortcuts: Vec<Shortcut> = existing
        .iter()
        .filter(|s| pointer_ids.contains(&s.app_id) && !declared_set.contains(&s.app_id))
        .cloned()
        .collect();

    // Repeated copies of a declared ID trail the declared entries, so the
    // copy a later pass inherits from is still the first one.
    let mut first_copies = HashSet::new();
    let extra_copies: Vec<Shortcut> = existing
        .iter()
        .filter(|s| declared_set.contains(&s.app_id) && !first_copies.insert(s.app_id))
        .cloned()
        .collect();

    for (entry, id) in declared.iter().zip(declared_ids) {
        let shortcut = match store_by_id.get(&id) {
            Some(existing) => {
                report.inherited.push(entry.name.clone());
                entry.apply_to(existing)
            }
            None => {
                report.created.push(entry.name.clone());
                entry.to_new_shortcut()
            }
        };
        shortcuts.push(shortcut);
    }

    let repeated = existing.len().saturating_sub(store_by_id.len());
    if repeated > 0 {
        warn!("store holds {repeated} shortcut(s) with a repeated appid; kept unchanged");
    }
    shortcuts.extend(extra_copies);

    Ok(Reconciliation {
        shortcuts,
        pointers: final_pointers,
        report,
    })
}

/// Derives each declared entry's ID, rejecting duplicates and collisions.
fn declared_ids(declared: &[DeclaredEntry]) -> Result<Vec<u32>, ReconcileError> {
    let mut seen: HashMap<u32, &DeclaredEntry> = HashMap::new();
    let mut ids = Vec::with_capacity(declared.len());
    for entry in declared {
        let id = entry.app_id().shortcut_id();
        if let Some(previous) = seen.insert(id, entry) {
            return Err(if previous.name == entry.name {
                ReconcileError::DuplicateEntry {
                    app_id: id,
                    name: entry.name.clone(),
                }
            } else {
                ReconcileError::IdentifierCollision {
                    app_id: id,
                    existing: previous.name.clone(),
                    declared: entry.name.clone(),
                }
            });
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Accepts both the unsigned form and the signed form older tools wrote.
fn parse_pointer_id(app_id: &str) -> Option<u32> {
    let trimmed = app_id.trim();
    trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<i32>().ok().map(|v| v as u32))
}
