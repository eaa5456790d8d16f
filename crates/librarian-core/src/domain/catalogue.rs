//! What the catalogue hands to the reconciliation engine.
//!
//! - [`CataloguePointer`]: a shortcut the catalogue has claimed but does not
//!   generate (typically something the user added inside Steam).
//! - [`DeclaredEntry`]: a shortcut the catalogue generates on every run.

use serde::{Deserialize, Serialize};

use crate::domain::app_id::AppId;
use crate::domain::shortcut::{quoted, Shortcut, ShortcutFlags};

/// The catalogue's memory of a shortcut it has claimed.
///
/// Only the ID and name are kept: enough to find the shortcut again and to
/// notice when it was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CataloguePointer {
    pub app_id: String,
    pub app_name: String,
}

impl CataloguePointer {
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
        }
    }

    /// Builds a pointer to an existing shortcut.
    pub fn for_shortcut(shortcut: &Shortcut) -> Self {
        Self::new(shortcut.app_id.to_string(), shortcut.app_name.clone())
    }
}

/// A shortcut the catalogue wants to exist after this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredEntry {
    /// Display name in the Steam library.
    pub name: String,
    /// Input to the identifier checksum together with `name`.
    pub id_key: String,
    /// Resolved executable, unquoted.
    pub exe: String,
    /// Working directory, unquoted.
    pub start_dir: String,
    pub launch_options: Option<String>,
    pub icon: Option<String>,
    /// Collection tag the shortcut is filed under.
    pub category: String,
    pub open_vr: bool,
    /// Last play time the catalogue remembers, used only for new shortcuts.
    pub last_play_time: Option<i32>,
}

impl DeclaredEntry {
    /// The identifiers this entry maps to.
    pub fn app_id(&self) -> AppId {
        AppId::derive(&self.id_key, &self.name)
    }

    /// Builds a brand-new shortcut for this entry.
    pub fn to_new_shortcut(&self) -> Shortcut {
        Shortcut {
            app_id: self.app_id().shortcut_id(),
            app_name: self.name.clone(),
            exe: quoted(&self.exe),
            start_dir: quoted(&self.start_dir),
            icon: self.icon.as_deref().map(quoted),
            launch_options: self.launch_options.clone(),
            flags: ShortcutFlags::for_new_shortcut(self.open_vr),
            last_play_time: self.last_play_time.unwrap_or(0),
            tags: vec![self.category.clone()],
            ..Default::default()
        }
    }

    /// Applies this declaration on top of an existing shortcut.
    ///
    /// The catalogue owns the launch fields; Steam owns play time, tags,
    /// visibility and the remaining flags, which are kept as stored.  The
    /// category tag is appended if missing.
    pub fn apply_to(&self, existing: &Shortcut) -> Shortcut {
        let mut merged = existing.clone();
        merged.app_name = self.name.clone();
        merged.exe = quoted(&self.exe);
        merged.start_dir = quoted(&self.start_dir);
        merged.icon = self.icon.as_deref().map(quoted);
        merged.launch_options = self.launch_options.clone();
        merged.flags.open_vr = self.open_vr;
        for key in ["AppName", "Exe", "StartDir", "icon", "LaunchOptions"] {
            merged.latin1_keys.remove(key);
        }
        merged.add_tag(&self.category);
        merged
    }
}
