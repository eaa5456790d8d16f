//! Maps the `shortcuts.vdf` tree to and from [`Shortcut`] records.
//!
//! Layout of the tree:
//! ```text
//! "shortcuts"
//!   "0"                    one nested node per shortcut, named by position
//!     "appid"       Int32
//!     "AppName"     String
//!     "Exe"         String  (quoted)
//!     ...
//!     "tags"
//!       "0"         String
//!       "1"         String
//!   "1"
//!     ...
//! ```
//!
//! Keys are matched case-insensitively.  Unknown keys are ignored and missing
//! keys fall back to the field's zero value, so files written by newer or
//! older Steam clients still load.  Record and tag indices are checked:
//! a record named anything other than its position, or a tag list with a
//! gap, makes the whole store malformed.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::shortcut::{quoted, Shortcut, ShortcutFlags};
use crate::vdf::codec::{self, VdfError};
use crate::vdf::node::{KvNode, KvValue};

/// Name of the root node of `shortcuts.vdf`.
pub const ROOT_NAME: &str = "shortcuts";

/// Errors raised when a decoded tree does not have the shortcut store shape.
#[derive(Debug, Error, PartialEq)]
pub enum ShortcutsError {
    /// The bytes are not valid binary KeyValues.
    #[error(transparent)]
    Vdf(#[from] VdfError),

    /// The root node is not named `shortcuts`.
    #[error("root node is named {found:?}, expected \"shortcuts\"")]
    UnexpectedRoot { found: String },

    /// The root node is a scalar.
    #[error("root node \"shortcuts\" is not a nested node")]
    RootNotNested,

    /// A record is a scalar instead of a nested node.
    #[error("shortcut record {name:?} at position {position} is not a nested node")]
    RecordNotNested { position: usize, name: String },

    /// A record's name does not equal its position.
    #[error("shortcut record at position {position} is named {name:?}")]
    IndexMismatch { position: usize, name: String },

    /// A shortcut's tag list is not indexed `0..n-1`.
    #[error("tags of shortcut {app_name:?} are not contiguous: unexpected tag index {name:?}")]
    TagIndex { app_name: String, name: String },
}

// ── Bytes ─────────────────────────────────────────────────────────────────────

/// Decodes `shortcuts.vdf` bytes.  Zero-length input is an empty store.
///
/// # Errors
///
/// Returns [`ShortcutsError`] if the bytes are not a well-formed store.
pub fn read_shortcuts(bytes: &[u8]) -> Result<Vec<Shortcut>, ShortcutsError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let root = codec::decode(bytes)?;
    decode_shortcuts(&root)
}

/// Encodes shortcuts into `shortcuts.vdf` bytes.
pub fn write_shortcuts(shortcuts: &[Shortcut]) -> Vec<u8> {
    codec::encode(&encode_shortcuts(shortcuts))
}

// ── Tree mapping ──────────────────────────────────────────────────────────────

/// Maps a decoded `shortcuts` tree to records, in stored order.
///
/// # Errors
///
/// Returns [`ShortcutsError`] if the tree is not shaped like a shortcut store.
pub fn decode_shortcuts(root: &KvNode) -> Result<Vec<Shortcut>, ShortcutsError> {
    if !root.name.eq_ignore_ascii_case(ROOT_NAME) {
        return Err(ShortcutsError::UnexpectedRoot {
            found: root.name.clone(),
        });
    }
    let records = root.value.as_children().ok_or(ShortcutsError::RootNotNested)?;

    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            if !record.is_nested() {
                return Err(ShortcutsError::RecordNotNested {
                    position,
                    name: record.name.clone(),
                });
            }
            if record.name.parse::<usize>().ok() != Some(position) {
                return Err(ShortcutsError::IndexMismatch {
                    position,
                    name: record.name.clone(),
                });
            }
            decode_record(record)
        })
        .collect()
}

/// Builds the `shortcuts` tree.  Record names are the output positions.
pub fn encode_shortcuts(shortcuts: &[Shortcut]) -> KvNode {
    let records = shortcuts
        .iter()
        .enumerate()
        .map(|(i, s)| encode_record(i, s))
        .collect();
    KvNode::nested(ROOT_NAME, records)
}

fn decode_record(record: &KvNode) -> Result<Shortcut, ShortcutsError> {
    let app_name = string_field(record, "AppName");
    let tags = match record.child("tags") {
        Some(node) => decode_tags(node, &app_name)?,
        None => Vec::new(),
    };
    Ok(Shortcut {
        app_id: int_field(record, "appid") as u32,
        exe: string_field(record, "Exe"),
        start_dir: string_field(record, "StartDir"),
        icon: optional_string_field(record, "icon"),
        shortcut_path: optional_string_field(record, "ShortcutPath"),
        launch_options: optional_string_field(record, "LaunchOptions"),
        flags: ShortcutFlags {
            is_hidden: bool_field(record, "IsHidden"),
            allow_desktop_config: bool_field(record, "AllowDesktopConfig"),
            allow_overlay: bool_field(record, "AllowOverlay"),
            open_vr: bool_field(record, "OpenVR"),
            devkit: bool_field(record, "Devkit"),
        },
        devkit_game_id: optional_string_field(record, "DevkitGameID"),
        devkit_override_app_id: int_field(record, "DevkitOverrideAppID") as u32,
        last_play_time: int_field(record, "LastPlayTime") as i32,
        flatpak_app_id: optional_string_field(record, "FlatpakAppID"),
        tags,
        app_name,
        latin1_keys: latin1_keys(record),
    })
}

/// Names the string fields stored as Latin-1; tags appear as `tags/<index>`.
fn latin1_keys(record: &KvNode) -> BTreeSet<String> {
    let fields = record
        .children()
        .iter()
        .filter(|c| is_latin1(c))
        .map(|c| canonical_key(&c.name));
    let tags = record
        .child("tags")
        .map(KvNode::children)
        .unwrap_or_default()
        .iter()
        .filter(|c| is_latin1(c))
        .map(|c| format!("tags/{}", c.name));
    fields.chain(tags).collect()
}

fn is_latin1(node: &KvNode) -> bool {
    matches!(node.value, KvValue::Latin1String(_))
}

/// Maps a stored key to the spelling the encoder writes.
fn canonical_key(name: &str) -> String {
    STRING_KEYS
        .iter()
        .find(|key| key.eq_ignore_ascii_case(name))
        .map_or_else(|| name.to_string(), |key| key.to_string())
}

const STRING_KEYS: [&str; 8] = [
    "AppName",
    "Exe",
    "StartDir",
    "icon",
    "ShortcutPath",
    "LaunchOptions",
    "DevkitGameID",
    "FlatpakAppID",
];

/// Reads tag children into the slot named by their index.
fn decode_tags(node: &KvNode, app_name: &str) -> Result<Vec<String>, ShortcutsError> {
    let children = node.children();
    let mut slots: Vec<Option<String>> = vec![None; children.len()];
    for child in children {
        let bad_index = || ShortcutsError::TagIndex {
            app_name: app_name.to_string(),
            name: child.name.clone(),
        };
        let index = child.name.parse::<usize>().map_err(|_| bad_index())?;
        let slot = slots.get_mut(index).ok_or_else(bad_index)?;
        if slot.is_some() {
            return Err(bad_index());
        }
        *slot = Some(child.value.as_str().unwrap_or_default().to_string());
    }
    // Every slot is filled: n children landed on n distinct indices below n.
    Ok(slots.into_iter().flatten().collect())
}

fn encode_record(index: usize, s: &Shortcut) -> KvNode {
    let tags = s
        .tags
        .iter()
        .enumerate()
        .map(|(i, tag)| text(s, &format!("tags/{i}"), i.to_string(), tag.clone()))
        .collect();

    KvNode::nested(
        index.to_string(),
        vec![
            KvNode::int32("appid", s.app_id as i32),
            field(s, "AppName", s.app_name.clone()),
            field(s, "Exe", quoted(&s.exe)),
            field(s, "StartDir", quoted(&s.start_dir)),
            field(s, "icon", quoted(s.icon.as_deref().unwrap_or_default())),
            field(s, "ShortcutPath", s.shortcut_path.clone().unwrap_or_default()),
            field(s, "LaunchOptions", s.launch_options.clone().unwrap_or_default()),
            flag("IsHidden", s.flags.is_hidden),
            flag("AllowDesktopConfig", s.flags.allow_desktop_config),
            flag("AllowOverlay", s.flags.allow_overlay),
            flag("OpenVR", s.flags.open_vr),
            flag("Devkit", s.flags.devkit),
            field(s, "DevkitGameID", s.devkit_game_id.clone().unwrap_or_default()),
            KvNode::int32("DevkitOverrideAppID", s.devkit_override_app_id as i32),
            KvNode::int32("LastPlayTime", s.last_play_time),
            field(s, "FlatpakAppID", s.flatpak_app_id.clone().unwrap_or_default()),
            KvNode::nested("tags", tags),
        ],
    )
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn field(s: &Shortcut, key: &str, value: String) -> KvNode {
    text(s, key, key.to_string(), value)
}

fn text(s: &Shortcut, key: &str, name: String, value: String) -> KvNode {
    if s.latin1_keys.contains(key) {
        KvNode::new(name, KvValue::Latin1String(value))
    } else {
        KvNode::new(name, KvValue::String(value))
    }
}

fn flag(name: &str, value: bool) -> KvNode {
    KvNode::int32(name, i32::from(value))
}

fn string_field(record: &KvNode, key: &str) -> String {
    record
        .child(key)
        .and_then(|c| c.value.as_str())
        .unwrap_or_default()
        .to_string()
}

fn optional_string_field(record: &KvNode, key: &str) -> Option<String> {
    Some(string_field(record, key)).filter(|s| !s.is_empty())
}

fn int_field(record: &KvNode, key: &str) -> i64 {
    record
        .child(key)
        .and_then(|c| c.value.as_i64())
        .unwrap_or_default()
}

fn bool_field(record: &KvNode, key: &str) -> bool {
    int_field(record, key) != 0
}
