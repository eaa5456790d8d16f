//! The catalogue library: launchers, categories of ROMs, and pointers.
//!
//! This is the user-editable document the librarian reads on every run.  It
//! is stored as JSON by the `librarian` crate; this module only defines its
//! shape and the lookups the application layer needs.
//!
//! ```json
//! {
//!   "launchers": {
//!     "duckstation": { "executable": "/usr/bin/duckstation", "arguments": ["-fullscreen"] }
//!   },
//!   "categories": {
//!     "PlayStation": {
//!       "default_launcher": "duckstation",
//!       "entries": [ { "name": "Ape Escape", "path": "/roms/psx/ape.chd" } ]
//!     }
//!   },
//!   "pointers": []
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::app_id::AppId;
use crate::domain::catalogue::CataloguePointer;

/// The whole catalogue document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub launchers: BTreeMap<String, Launcher>,
    /// Category name doubles as the Steam collection tag.
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
    /// Shortcuts claimed on earlier runs that the catalogue does not generate.
    #[serde(default)]
    pub pointers: Vec<CataloguePointer>,
}

/// An emulator or other program ROMs are launched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launcher {
    pub executable: String,
    /// Passed before the ROM path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub open_vr: bool,
}

/// A named group of entries sharing a default launcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_launcher: Option<String>,
    #[serde(default)]
    pub entries: Vec<RomEntry>,
}

/// One shortcut the catalogue generates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomEntry {
    pub name: String,
    /// ROM file handed to the launcher.  Absent for entries that launch the
    /// executable directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Overrides the category's default launcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<String>,
    /// Shortcut ID, rewritten on every load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_play_time: Option<i32>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Library {
    /// Name of the launcher `entry` resolves to, if any is configured.
    pub fn launcher_name<'a>(&'a self, category: &'a Category, entry: &'a RomEntry) -> Option<&'a str> {
        entry
            .launcher
            .as_deref()
            .or(category.default_launcher.as_deref())
    }

    /// The launcher `entry` resolves to, if it names one that exists.
    pub fn resolve_launcher(&self, category: &Category, entry: &RomEntry) -> Option<&Launcher> {
        self.launcher_name(category, entry)
            .and_then(|name| self.launchers.get(name))
    }

    /// Re-derives every entry's `app_id` from its identifier key and name.
    ///
    /// Entries whose launcher cannot be resolved and that have no ROM path
    /// have no key; their `app_id` is cleared.
    pub fn refresh_app_ids(&mut self) {
        let launchers = &self.launchers;
        for category in self.categories.values_mut() {
            let default = category.default_launcher.clone();
            for entry in &mut category.entries {
                let key = match entry.path.as_deref() {
                    Some(path) => Some(path.to_string()),
                    None => entry
                        .launcher
                        .as_ref()
                        .or(default.as_ref())
                        .and_then(|name| launchers.get(name))
                        .map(|l| l.executable.clone()),
                };
                entry.app_id = key.map(|k| AppId::derive(&k, &entry.name).shortcut_id());
            }
        }
    }

    /// Total number of entries over all categories.
    pub fn entry_count(&self) -> usize {
        self.categories.values().map(|c| c.entries.len()).sum()
    }

    /// A small library showing every feature, for first-time users.
    pub fn example() -> Self {
        let mut launchers = BTreeMap::new();
        launchers.insert(
            "retroarch-snes".to_string(),
            Launcher {
                executable: "/usr/bin/retroarch".to_string(),
                arguments: vec![
                    "-L".to_string(),
                    "/usr/lib/libretro/snes9x_libretro.so".to_string(),
                ],
                open_vr: false,
            },
        );
        launchers.insert(
            "dolphin".to_string(),
            Launcher {
                executable: "/usr/bin/dolphin-emu".to_string(),
                arguments: vec!["-b".to_string(), "-e".to_string()],
                open_vr: false,
            },
        );

        let mut categories = BTreeMap::new();
        categories.insert(
            "Super Nintendo".to_string(),
            Category {
                default_launcher: Some("retroarch-snes".to_string()),
                entries: vec![RomEntry {
                    name: "Super Metroid".to_string(),
                    path: Some("/home/user/roms/snes/Super Metroid.sfc".to_string()),
                    grid: Some("/home/user/roms/art/super_metroid_grid.png".to_string()),
                    ..Default::default()
                }],
            },
        );
        categories.insert(
            "Wii".to_string(),
            Category {
                default_launcher: Some("dolphin".to_string()),
                entries: vec![
                    RomEntry {
                        name: "Controller Test".to_string(),
                        path: Some("/home/user/roms/wii/240pTestSuite/boot.dol".to_string()),
                        ..Default::default()
                    },
                    RomEntry {
                        name: "Dolphin".to_string(),
                        ..Default::default()
                    },
                ],
            },
        );

        let mut library = Self {
            launchers,
            categories,
            pointers: Vec::new(),
        };
        library.refresh_app_ids();
        library
    }
}
