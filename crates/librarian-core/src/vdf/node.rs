//! KeyValue tree types shared by the binary codec and the record mappers.
//!
//! A binary VDF file is a tree of named nodes.  Every node has a name and a
//! value; the value is either a scalar (string, integer, float, ...) or an
//! ordered list of child nodes.
//!
//! ```text
//! "shortcuts"            Nested
//!   "0"                  Nested
//!     "appid"            Int32   -1234567
//!     "AppName"          String  "Dolphin"
//!     "tags"             Nested
//!       "0"              String  "GameCube"
//! ```
//!
//! Child order is significant: it is the order the children were read from
//! disk, and the record mappers rebuild indexed lists from it.  Duplicate
//! child names are allowed and preserved.

use std::fmt::Write as _;

// ── Type tags ─────────────────────────────────────────────────────────────────

/// Type tag bytes used by the binary KeyValues format.
pub mod tag {
    /// Start of a nested node; children follow until [`END`].
    pub const NESTED: u8 = 0x00;
    /// NUL-terminated narrow string.
    pub const STRING: u8 = 0x01;
    /// 4-byte signed integer.
    pub const INT32: u8 = 0x02;
    /// 4-byte IEEE-754 float.
    pub const FLOAT32: u8 = 0x03;
    /// 4-byte colour, read as a signed integer.
    pub const COLOR: u8 = 0x04;
    /// 8-byte unsigned integer.
    pub const UINT64: u8 = 0x05;
    /// NUL-terminated UTF-16LE string.
    pub const WIDE_STRING: u8 = 0x06;
    /// Alternate 8-byte unsigned integer tag; decodes to the same kind as [`UINT64`].
    pub const UINT64_ALT: u8 = 0x07;
    /// End of a nested node's children (and of the document).
    pub const END: u8 = 0x08;
    /// 8-byte signed integer.
    pub const INT64: u8 = 0x0A;
    /// 4-byte unsigned integer.
    pub const UINT32: u8 = 0x0B;
}

// ── Node types ────────────────────────────────────────────────────────────────

/// The payload of a [`KvNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    /// Ordered child nodes, in on-disk encounter order.
    Nested(Vec<KvNode>),
    String(String),
    /// Narrow text that was not valid UTF-8 and was read as Latin-1.  It is
    /// written back as Latin-1 so the bytes are unchanged.
    Latin1String(String),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    WideString(String),
    /// A packed RGBA colour, carried as its raw 32-bit value.
    Color(i32),
    UInt64(u64),
    Int64(i64),
}

impl KvValue {
    /// Returns the type tag this value is written with.
    pub fn type_tag(&self) -> u8 {
        match self {
            KvValue::Nested(_) => tag::NESTED,
            KvValue::String(_) | KvValue::Latin1String(_) => tag::STRING,
            KvValue::Int32(_) => tag::INT32,
            KvValue::UInt32(_) => tag::UINT32,
            KvValue::Float32(_) => tag::FLOAT32,
            KvValue::WideString(_) => tag::WIDE_STRING,
            KvValue::Color(_) => tag::COLOR,
            KvValue::UInt64(_) => tag::UINT64,
            KvValue::Int64(_) => tag::INT64,
        }
    }

    /// Human-readable kind name, used in diagnostics and tree dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            KvValue::Nested(_) => "Nested",
            KvValue::String(_) => "String",
            KvValue::Latin1String(_) => "Latin1String",
            KvValue::Int32(_) => "Int32",
            KvValue::UInt32(_) => "UInt32",
            KvValue::Float32(_) => "Float32",
            KvValue::WideString(_) => "WideString",
            KvValue::Color(_) => "Color",
            KvValue::UInt64(_) => "UInt64",
            KvValue::Int64(_) => "Int64",
        }
    }

    /// Returns the value as a signed 64-bit integer if it is any integer kind.
    ///
    /// Unsigned 32-bit values widen without sign extension, so an `appid`
    /// stored as either `Int32` or `UInt32` can be recovered losslessly by
    /// truncating back to 32 bits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            KvValue::Int32(v) | KvValue::Color(v) => Some(i64::from(v)),
            KvValue::UInt32(v) => Some(i64::from(v)),
            KvValue::UInt64(v) => Some(v as i64),
            KvValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the text of any string kind.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvValue::String(s) | KvValue::Latin1String(s) | KvValue::WideString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the children of a `Nested` value.
    pub fn as_children(&self) -> Option<&[KvNode]> {
        match self {
            KvValue::Nested(children) => Some(children),
            _ => None,
        }
    }
}

/// A named node in a KeyValue tree.
#[derive(Debug, Clone, PartialEq)]
pub struct KvNode {
    pub name: String,
    pub value: KvValue,
}

impl KvNode {
    pub fn new(name: impl Into<String>, value: KvValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn nested(name: impl Into<String>, children: Vec<KvNode>) -> Self {
        Self::new(name, KvValue::Nested(children))
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, KvValue::String(value.into()))
    }

    pub fn int32(name: impl Into<String>, value: i32) -> Self {
        Self::new(name, KvValue::Int32(value))
    }

    /// Returns `true` if this node holds children rather than a scalar.
    pub fn is_nested(&self) -> bool {
        matches!(self.value, KvValue::Nested(_))
    }

    /// Returns the children of a nested node, or an empty slice for scalars.
    pub fn children(&self) -> &[KvNode] {
        self.value.as_children().unwrap_or(&[])
    }

    /// Finds the first child whose name matches `name`, ignoring ASCII case.
    pub fn child(&self, name: &str) -> Option<&KvNode> {
        self.children()
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Renders the tree as indented text, one node per line.
    ///
    /// ```rust
    /// use librarian_core::vdf::KvNode;
    ///
    /// let tree = KvNode::nested("root", vec![KvNode::int32("answer", 42)]);
    /// assert_eq!(tree.dump(), "root (Nested)\n  answer = 42 (Int32)\n");
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        let kind = self.value.kind_name();
        // Writing into a String cannot fail.
        let _ = match &self.value {
            KvValue::Nested(children) => {
                let _ = writeln!(out, "{pad}{} ({kind})", self.name);
                for child in children {
                    child.dump_into(out, depth + 1);
                }
                Ok(())
            }
            KvValue::String(s) | KvValue::Latin1String(s) | KvValue::WideString(s) => {
                writeln!(out, "{pad}{} = {s:?} ({kind})", self.name)
            }
            KvValue::Int32(v) | KvValue::Color(v) => writeln!(out, "{pad}{} = {v} ({kind})", self.name),
            KvValue::UInt32(v) => writeln!(out, "{pad}{} = {v} ({kind})", self.name),
            KvValue::Float32(v) => writeln!(out, "{pad}{} = {v} ({kind})", self.name),
            KvValue::UInt64(v) => writeln!(out, "{pad}{} = {v} ({kind})", self.name),
            KvValue::Int64(v) => writeln!(out, "{pad}{} = {v} ({kind})", self.name),
        };
    }
}
