//! The shortcut entity: one non-Steam library entry as stored in `shortcuts.vdf`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Launch and visibility flags of a shortcut.
///
/// Missing flags decode as `false`; shortcuts created from the catalogue
/// start with desktop configuration and the overlay enabled, which is what
/// Steam itself picks for a hand-added shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShortcutFlags {
    pub is_hidden: bool,
    pub allow_desktop_config: bool,
    pub allow_overlay: bool,
    pub open_vr: bool,
    pub devkit: bool,
}

impl ShortcutFlags {
    /// Flags for a freshly created shortcut.
    pub fn for_new_shortcut(open_vr: bool) -> Self {
        Self {
            is_hidden: false,
            allow_desktop_config: true,
            allow_overlay: true,
            open_vr,
            devkit: false,
        }
    }
}

/// A Steam shortcut record.
///
/// `exe`, `start_dir` and `icon` hold the text exactly as it is stored,
/// which for Steam-written files is the quoted form.  Use [`Shortcut::exe_path`]
/// and friends for the unquoted path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shortcut {
    /// Stable join key between the store and the catalogue.
    pub app_id: u32,
    pub app_name: String,
    pub exe: String,
    pub start_dir: String,
    pub icon: Option<String>,
    pub shortcut_path: Option<String>,
    pub launch_options: Option<String>,
    pub flags: ShortcutFlags,
    pub devkit_game_id: Option<String>,
    pub devkit_override_app_id: u32,
    /// Seconds since the Unix epoch; `0` means never played.
    pub last_play_time: i32,
    pub flatpak_app_id: Option<String>,
    /// Steam collections this shortcut belongs to, in stored order.
    pub tags: Vec<String>,
    /// Keys whose stored text was Latin-1 rather than UTF-8 (`"AppName"`,
    /// `"tags/0"`, ...).  They are written back as Latin-1.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub latin1_keys: BTreeSet<String>,
}

impl Shortcut {
    /// The executable path without surrounding quotes.
    pub fn exe_path(&self) -> &str {
        unquoted(&self.exe)
    }

    /// The working directory without surrounding quotes.
    pub fn start_dir_path(&self) -> &str {
        unquoted(&self.start_dir)
    }

    /// The icon path without surrounding quotes.
    pub fn icon_path(&self) -> Option<&str> {
        self.icon.as_deref().map(unquoted)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Appends `tag` unless the shortcut already carries it.
    ///
    /// Returns `true` if the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.app_id, self.app_name)
    }
}

// ── Quoting ───────────────────────────────────────────────────────────────────

/// Returns `true` if `s` is wrapped in a pair of double quotes.
pub fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Wraps `s` in double quotes unless it is empty or already quoted.
pub fn quoted(s: &str) -> String {
    if s.is_empty() || is_quoted(s) {
        s.to_string()
    } else {
        format!("\"{s}\"")
    }
}

/// Strips one pair of surrounding double quotes, if present.
pub fn unquoted(s: &str) -> &str {
    if is_quoted(s) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
