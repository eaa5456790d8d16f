//! Binary KeyValues codec.
//!
//! Byte layout of one node:
//! ```text
//! [type:1][name:NUL-terminated][payload]
//! ```
//! Nested nodes have no payload of their own: their children follow directly
//! and the list is closed by a single `0x08` byte at the same depth.  There is
//! no length prefix or child count anywhere in the format, so the encoder and
//! decoder must agree exactly on where every terminator goes.  A document is
//! one root node followed by one more `0x08`.
//!
//! All multi-byte scalars are little-endian.

use thiserror::Error;
use tracing::warn;

use crate::vdf::node::{tag, KvNode, KvValue};

/// Deepest nesting accepted by the decoder.  Real Steam files stay well under
/// a dozen levels.
pub const MAX_DEPTH: usize = 256;

/// Errors that can occur while decoding binary KeyValues.
///
/// Every variant carries the byte offset at which decoding stopped.
#[derive(Debug, Error, PartialEq)]
pub enum VdfError {
    /// The input ended in the middle of a node.
    #[error("truncated input at byte {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The type byte is not one of the known tags.
    #[error("unknown type tag 0x{tag:02X} at byte {offset}")]
    UnknownType { tag: u8, offset: usize },

    /// A string ran to the end of the input without a NUL terminator.
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },

    /// A wide string contained an invalid UTF-16 sequence.
    #[error("invalid UTF-16 string starting at byte {offset}")]
    InvalidWideString { offset: usize },

    /// An end-of-children marker appeared where a node was expected.
    #[error("unexpected end marker at byte {offset}")]
    UnexpectedEnd { offset: usize },

    /// Nested nodes exceed [`MAX_DEPTH`].
    #[error("nesting deeper than {max} levels at byte {offset}")]
    TooDeep { offset: usize, max: usize },

    /// Bytes remain after the document terminator.
    #[error("trailing data at byte {offset}")]
    TrailingData { offset: usize },
}

impl VdfError {
    /// Byte offset in the input where the error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            VdfError::Truncated { offset, .. }
            | VdfError::UnknownType { offset, .. }
            | VdfError::UnterminatedString { offset }
            | VdfError::InvalidWideString { offset }
            | VdfError::UnexpectedEnd { offset }
            | VdfError::TooDeep { offset, .. }
            | VdfError::TrailingData { offset } => offset,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes a complete document: one root node plus the trailing `0x08`.
///
/// A missing final terminator at end of input is tolerated; anything other
/// than a single `0x08` after the root node is rejected.
///
/// # Errors
///
/// Returns [`VdfError`] on truncation, unknown tags, or broken nesting.
///
/// # Examples
///
/// ```rust
/// use librarian_core::vdf::{decode, encode, KvNode};
///
/// let tree = KvNode::nested("shortcuts", vec![KvNode::int32("n", 7)]);
/// assert_eq!(decode(&encode(&tree)).unwrap(), tree);
/// ```
pub fn decode(bytes: &[u8]) -> Result<KvNode, VdfError> {
    let (node, consumed) = decode_node(bytes)?;
    let rest = &bytes[consumed..];
    match rest {
        [] | [tag::END] => Ok(node),
        [tag::END, ..] => Err(VdfError::TrailingData {
            offset: consumed + 1,
        }),
        _ => Err(VdfError::TrailingData { offset: consumed }),
    }
}

/// Decodes one node from the front of `bytes`.
///
/// Returns the node and the number of bytes consumed, so callers reading
/// KeyValues blobs embedded in larger files can advance their cursor.  The
/// document terminator is not consumed.
///
/// # Errors
///
/// Returns [`VdfError`] if the node is malformed.
pub fn decode_node(bytes: &[u8]) -> Result<(KvNode, usize), VdfError> {
    let mut reader = Reader::new(bytes);
    let offset = reader.pos;
    let type_tag = reader.read_u8()?;
    if type_tag == tag::END {
        return Err(VdfError::UnexpectedEnd { offset });
    }
    let node = reader.read_node(type_tag, offset, 0)?;
    Ok((node, reader.pos))
}

/// Encodes a complete document: the root node followed by the trailing `0x08`.
pub fn encode(node: &KvNode) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_node(&mut buf, node);
    buf.push(tag::END);
    buf
}

/// Appends one node (without a document terminator) to `buf`.
pub fn encode_node(buf: &mut Vec<u8>, node: &KvNode) {
    buf.push(node.value.type_tag());
    write_cstring(buf, &node.name);
    match &node.value {
        KvValue::Nested(children) => {
            for child in children {
                encode_node(buf, child);
            }
            buf.push(tag::END);
        }
        KvValue::String(s) => write_cstring(buf, s),
        KvValue::Latin1String(s) => write_latin1(buf, s),
        KvValue::Int32(v) | KvValue::Color(v) => buf.extend_from_slice(&v.to_le_bytes()),
        KvValue::UInt32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        KvValue::Float32(v) => buf.extend_from_slice(&v.to_le_bytes()),
        KvValue::UInt64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        KvValue::Int64(v) => buf.extend_from_slice(&v.to_le_bytes()),
        KvValue::WideString(s) => write_wide_string(buf, s),
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reads the name and payload of a node whose tag has already been consumed.
    fn read_node(&mut self, type_tag: u8, offset: usize, depth: usize) -> Result<KvNode, VdfError> {
        if !is_known_tag(type_tag) {
            return Err(VdfError::UnknownType {
                tag: type_tag,
                offset,
            });
        }
        let name = self.read_cstring()?;
        let value = match type_tag {
            tag::NESTED => KvValue::Nested(self.read_children(depth + 1)?),
            tag::STRING => match self.read_narrow()? {
                (text, false) => KvValue::String(text),
                (text, true) => KvValue::Latin1String(text),
            },
            tag::INT32 => KvValue::Int32(i32::from_le_bytes(self.take()?)),
            tag::FLOAT32 => KvValue::Float32(f32::from_le_bytes(self.take()?)),
            tag::COLOR => KvValue::Color(i32::from_le_bytes(self.take()?)),
            tag::UINT64 | tag::UINT64_ALT => KvValue::UInt64(u64::from_le_bytes(self.take()?)),
            tag::WIDE_STRING => KvValue::WideString(self.read_wide_string()?),
            tag::INT64 => KvValue::Int64(i64::from_le_bytes(self.take()?)),
            tag::UINT32 => KvValue::UInt32(u32::from_le_bytes(self.take()?)),
            _ => unreachable!("tag validated by is_known_tag"),
        };
        Ok(KvNode { name, value })
    }

    /// Reads child nodes until the `0x08` that closes the current depth.
    fn read_children(&mut self, depth: usize) -> Result<Vec<KvNode>, VdfError> {
        if depth > MAX_DEPTH {
            return Err(VdfError::TooDeep {
                offset: self.pos,
                max: MAX_DEPTH,
            });
        }
        let mut children = Vec::new();
        loop {
            let offset = self.pos;
            let type_tag = self.read_u8()?;
            if type_tag == tag::END {
                return Ok(children);
            }
            children.push(self.read_node(type_tag, offset, depth)?);
        }
    }

    fn read_u8(&mut self) -> Result<u8, VdfError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], VdfError> {
        let available = self.buf.len() - self.pos;
        if available < N {
            return Err(VdfError::Truncated {
                offset: self.pos,
                needed: N,
                available,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_cstring(&mut self) -> Result<String, VdfError> {
        self.read_narrow().map(|(text, _)| text)
    }

    /// Reads NUL-terminated narrow text.  The flag is `true` when the bytes
    /// were not UTF-8 and were read as Latin-1.
    fn read_narrow(&mut self) -> Result<(String, bool), VdfError> {
        let start = self.pos;
        let len = self.buf[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(VdfError::UnterminatedString { offset: start })?;
        let decoded = decode_narrow(&self.buf[start..start + len]);
        self.pos = start + len + 1;
        Ok(decoded)
    }

    fn read_wide_string(&mut self) -> Result<String, VdfError> {
        let start = self.pos;
        let mut units = Vec::new();
        loop {
            let pair = self
                .take::<2>()
                .map_err(|_| VdfError::UnterminatedString { offset: start })?;
            let unit = u16::from_le_bytes(pair);
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        String::from_utf16(&units).map_err(|_| VdfError::InvalidWideString { offset: start })
    }
}

fn is_known_tag(type_tag: u8) -> bool {
    matches!(
        type_tag,
        tag::NESTED
            | tag::STRING
            | tag::INT32
            | tag::FLOAT32
            | tag::COLOR
            | tag::UINT64
            | tag::WIDE_STRING
            | tag::UINT64_ALT
            | tag::INT64
            | tag::UINT32
    )
}

/// Reads narrow text as UTF-8, falling back to Latin-1 for legacy bytes.
fn decode_narrow(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_owned(), false),
        Err(_) => (bytes.iter().map(|&b| char::from(b)).collect(), true),
    }
}

// ── Encoding helpers ──────────────────────────────────────────────────────────

/// Writes UTF-8 bytes followed by a NUL.  The format cannot carry interior
/// NULs, so text after the first one is dropped.
fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    write_narrow(buf, s.as_bytes());
}

/// Writes Latin-1 bytes followed by a NUL.  Text with characters above
/// U+00FF cannot be Latin-1 and is written as UTF-8 instead.
fn write_latin1(buf: &mut Vec<u8>, s: &str) {
    let bytes: Option<Vec<u8>> = s.chars().map(|c| u8::try_from(c).ok()).collect();
    match bytes {
        Some(bytes) => write_narrow(buf, &bytes),
        None => {
            warn!("{s:?} is not representable in Latin-1; writing UTF-8");
            write_cstring(buf, s);
        }
    }
}

fn write_narrow(buf: &mut Vec<u8>, bytes: &[u8]) {
    let end = match bytes.iter().position(|&b| b == 0) {
        Some(nul) => {
            warn!("truncating string at interior NUL (byte {nul} of {})", bytes.len());
            nul
        }
        None => bytes.len(),
    };
    buf.extend_from_slice(&bytes[..end]);
    buf.push(0);
}

fn write_wide_string(buf: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16().take_while(|&u| u != 0) {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    buf.extend_from_slice(&[0, 0]);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(node: &KvNode) -> KvNode {
        let encoded = encode(node);
        decode(&encoded).expect("decode failed")
    }

    fn every_kind() -> KvNode {
        KvNode::nested(
            "root",
            vec![
                KvNode::string("s", "hello"),
                KvNode::int32("i", -42),
                KvNode::new("u", KvValue::UInt32(0xFFFF_FFFF)),
                KvNode::new("f", KvValue::Float32(1.5)),
                KvNode::new("w", KvValue::WideString("wide ✓".to_string())),
                KvNode::new("c", KvValue::Color(0x7F00_FF00)),
                KvNode::new("u64", KvValue::UInt64(u64::MAX)),
                KvNode::new("i64", KvValue::Int64(i64::MIN)),
                KvNode::nested("empty", vec![]),
            ],
        )
    }

    // ── Byte layout ──────────────────────────────────────────────────────────

    #[test]
    fn test_encode_int32_node_exact_bytes() {
        let bytes = encode(&KvNode::int32("a", 1));
        assert_eq!(bytes, vec![0x02, b'a', 0x00, 0x01, 0x00, 0x00, 0x00, 0x08]);
    }

    #[test]
    fn test_encode_nested_writes_terminator_after_last_child() {
        let tree = KvNode::nested("r", vec![KvNode::string("k", "v")]);
        let bytes = encode(&tree);
        assert_eq!(
            bytes,
            vec![0x00, b'r', 0x00, 0x01, b'k', 0x00, b'v', 0x00, 0x08, 0x08]
        );
    }

    #[test]
    fn test_encode_empty_shortcuts_document() {
        let bytes = encode(&KvNode::nested("shortcuts", vec![]));
        let mut expected = vec![0x00];
        expected.extend_from_slice(b"shortcuts\0");
        expected.extend_from_slice(&[0x08, 0x08]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_wide_string_is_utf16le_nul_terminated() {
        let bytes = encode(&KvNode::new("w", KvValue::WideString("A".into())));
        assert_eq!(bytes, vec![0x06, b'w', 0x00, b'A', 0x00, 0x00, 0x00, 0x08]);
    }

    // ── Round trips ──────────────────────────────────────────────────────────

    #[test]
    fn test_every_kind_round_trips() {
        let tree = every_kind();
        assert_eq!(round_trip(&tree), tree);
    }

    #[test]
    fn test_deeply_nested_siblings_stay_in_sync() {
        let tree = KvNode::nested(
            "a",
            vec![
                KvNode::nested("b", vec![KvNode::nested("c", vec![KvNode::int32("d", 1)])]),
                KvNode::int32("after", 2),
            ],
        );
        assert_eq!(round_trip(&tree), tree);
    }

    #[test]
    fn test_duplicate_names_preserved_in_order() {
        let tree = KvNode::nested(
            "r",
            vec![KvNode::int32("x", 1), KvNode::int32("x", 2), KvNode::int32("x", 3)],
        );
        assert_eq!(round_trip(&tree), tree);
    }

    #[test]
    fn test_non_ascii_text_round_trips() {
        let tree = KvNode::nested("ゲーム", vec![KvNode::string("名前", "Pokémon")]);
        assert_eq!(round_trip(&tree), tree);
    }

    #[test]
    fn test_uint64_alternate_tag_decodes_as_uint64() {
        let mut bytes = vec![0x07, b'n', 0x00];
        bytes.extend_from_slice(&9u64.to_le_bytes());
        let node = decode(&bytes).expect("decode");
        assert_eq!(node.value, KvValue::UInt64(9));
    }

    #[test]
    fn test_latin1_bytes_fall_back_to_single_byte_decoding() {
        let bytes = vec![0x01, b'k', 0x00, 0xE9, 0x00, 0x08];
        let node = decode(&bytes).expect("decode");
        assert_eq!(node.value, KvValue::Latin1String("é".to_string()));
    }

    #[test]
    fn test_latin1_string_is_written_back_byte_for_byte() {
        let bytes = vec![
            0x00, b's', 0x00, 0x01, b'k', 0x00, 0x50, 0xE9, 0x00, 0x08, 0x08,
        ];
        let node = decode(&bytes).expect("decode");
        assert_eq!(node.child("k").and_then(|c| c.value.as_str()), Some("Pé"));
        assert_eq!(encode(&node), bytes);
    }

    #[test]
    fn test_utf8_string_with_same_text_is_written_as_utf8() {
        let bytes = encode(&KvNode::string("k", "Pé"));
        assert_eq!(bytes, vec![0x01, b'k', 0x00, 0x50, 0xC3, 0xA9, 0x00, 0x08]);
    }

    #[test]
    fn test_latin1_string_outside_latin1_range_falls_back_to_utf8() {
        let bytes = encode(&KvNode::new("k", KvValue::Latin1String("✓".to_string())));
        assert_eq!(bytes, vec![0x01, b'k', 0x00, 0xE2, 0x9C, 0x93, 0x00, 0x08]);
    }

    #[test]
    fn test_decode_tolerates_missing_document_terminator() {
        let mut bytes = encode(&every_kind());
        bytes.pop();
        assert_eq!(decode(&bytes).expect("decode"), every_kind());
    }

    #[test]
    fn test_decode_node_reports_consumed_bytes() {
        let tree = every_kind();
        let mut bytes = encode(&tree);
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let (node, consumed) = decode_node(&bytes).expect("decode");
        assert_eq!(node, tree);
        assert_eq!(bytes[consumed], tag::END);
    }

    // ── Error conditions ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_input_is_truncated() {
        assert!(matches!(decode(&[]), Err(VdfError::Truncated { offset: 0, .. })));
    }

    #[test]
    fn test_decode_unknown_tag_reports_offset() {
        let bytes = vec![0x00, b'r', 0x00, 0x09, b'x', 0x00, 0x08, 0x08];
        assert_eq!(
            decode(&bytes),
            Err(VdfError::UnknownType { tag: 0x09, offset: 3 })
        );
    }

    #[test]
    fn test_decode_truncated_scalar() {
        let bytes = vec![0x02, b'a', 0x00, 0x01, 0x00];
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            VdfError::Truncated {
                offset: 3,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn test_decode_missing_nested_terminator_is_truncated() {
        let bytes = vec![0x00, b'r', 0x00, 0x02, b'a', 0x00, 1, 0, 0, 0];
        assert!(matches!(decode(&bytes), Err(VdfError::Truncated { offset: 10, .. })));
    }

    #[test]
    fn test_decode_unterminated_name() {
        let bytes = vec![0x01, b'a', b'b'];
        assert_eq!(decode(&bytes), Err(VdfError::UnterminatedString { offset: 1 }));
    }

    #[test]
    fn test_decode_leading_end_marker_is_rejected() {
        assert_eq!(decode(&[0x08]), Err(VdfError::UnexpectedEnd { offset: 0 }));
    }

    #[test]
    fn test_decode_extra_terminator_is_trailing_data() {
        let mut bytes = encode(&KvNode::int32("a", 1));
        bytes.push(tag::END);
        assert!(matches!(decode(&bytes), Err(VdfError::TrailingData { .. })));
    }

    #[test]
    fn test_decode_rejects_nesting_beyond_limit() {
        let mut bytes = Vec::new();
        for _ in 0..=MAX_DEPTH + 1 {
            bytes.extend_from_slice(&[0x00, b'n', 0x00]);
        }
        assert!(matches!(decode(&bytes), Err(VdfError::TooDeep { .. })));
    }

    #[test]
    fn test_encode_truncates_interior_nul() {
        let bytes = encode(&KvNode::string("k", "ab\0cd"));
        assert_eq!(bytes, vec![0x01, b'k', 0x00, b'a', b'b', 0x00, 0x08]);
    }
}
