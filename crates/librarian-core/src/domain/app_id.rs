//! Steam-compatible shortcut identifiers.
//!
//! Steam identifies a non-Steam shortcut by a CRC32 of its executable and
//! name.  Two forms are in use:
//!
//! - the 32-bit **shortcut ID**, stored as `appid` in `shortcuts.vdf` and used
//!   to name artwork in `config/grid`;
//! - the 64-bit **legacy ID** used by the old Big Picture grid, which is the
//!   shortcut ID in the high word and `0x0200_0000` in the low word.
//!
//! The top bit of the shortcut ID is always set, which keeps it out of the
//! range Steam assigns to its own catalogue titles.
//!
//! ```text
//! crc      = crc32(utf8(key ++ name))
//! shortcut = crc | 0x8000_0000
//! legacy   = (shortcut << 32) | 0x0200_0000
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

const HIGH_BIT: u32 = 0x8000_0000;
const LEGACY_LOW_WORD: u64 = 0x0200_0000;

/// The pair of identifiers derived for one shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppId {
    shortcut_id: u32,
}

impl AppId {
    /// Derives the identifiers for `app_name` launched via `key`.
    ///
    /// `key` is the executable path, or another command string that tells
    /// apart entries sharing a name.  It is concatenated with `app_name`
    /// without a separator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use librarian_core::AppId;
    ///
    /// let id = AppId::derive("12345678", "9");
    /// assert_eq!(id.shortcut_id(), 3_421_780_262);
    /// assert_eq!(id.legacy_id(), 14_696_434_319_421_865_984);
    /// ```
    pub fn derive(key: &str, app_name: &str) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(key.as_bytes());
        hasher.update(app_name.as_bytes());
        Self {
            shortcut_id: hasher.finalize() | HIGH_BIT,
        }
    }

    /// Wraps an already-known shortcut ID.
    pub fn from_shortcut_id(shortcut_id: u32) -> Self {
        Self { shortcut_id }
    }

    /// Recovers the identifiers from a legacy 64-bit ID.
    pub fn from_legacy(legacy_id: u64) -> Self {
        Self {
            shortcut_id: (legacy_id >> 32) as u32,
        }
    }

    /// The 32-bit ID stored as `appid` in `shortcuts.vdf`.
    pub fn shortcut_id(&self) -> u32 {
        self.shortcut_id
    }

    /// The shortcut ID as the signed value some Steam tooling displays.
    pub fn signed_shortcut_id(&self) -> i32 {
        self.shortcut_id as i32
    }

    /// The 64-bit legacy Big Picture ID.
    pub fn legacy_id(&self) -> u64 {
        (u64::from(self.shortcut_id) << 32) | LEGACY_LOW_WORD
    }

    /// The shortcut ID in the high word with an empty low word.
    pub fn legacy_from_shortcut(shortcut_id: u32) -> u64 {
        u64::from(shortcut_id) << 32
    }

    /// Decimal form of [`AppId::shortcut_id`].
    pub fn shortcut_id_string(&self) -> String {
        self.shortcut_id.to_string()
    }

    /// Decimal form of [`AppId::legacy_id`].
    pub fn legacy_id_string(&self) -> String {
        self.legacy_id().to_string()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shortcut_id)
    }
}
