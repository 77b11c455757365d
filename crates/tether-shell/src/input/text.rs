/// Code points below this are control characters and never produce text.
pub const FIRST_PRINTABLE: u32 = 0x20;

/// A character produced by a key event, encoded as UTF-8 without allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInput {
    bytes: [u8; 4],
    len: usize,
}

impl TextInput {
    /// Encodes a code point reported by the keyboard map.
    ///
    /// Control characters, surrogates and values past `U+10FFFF` yield `None`.
    pub fn from_code_point(code_point: u32) -> Option<Self> {
        if code_point < FIRST_PRINTABLE {
            return None;
        }
        let ch = char::from_u32(code_point)?;
        let mut bytes = [0u8; 4];
        let len = ch.encode_utf8(&mut bytes).len();
        Some(Self { bytes, len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn as_str(&self) -> &str {
        // Always produced by `char::encode_utf8`.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}
