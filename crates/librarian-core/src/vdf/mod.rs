//! Binary KeyValues ("VDF"): the tree model, the byte codec, and the
//! `shortcuts.vdf` record mapper.

pub mod codec;
pub mod node;
pub mod shortcuts;

pub use codec::{decode, decode_node, encode, encode_node, VdfError};
pub use node::{KvNode, KvValue};
pub use shortcuts::{read_shortcuts, write_shortcuts, ShortcutsError};
