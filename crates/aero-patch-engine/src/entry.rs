use std::fmt;

/// Access width of a single patch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    Byte,
    Word,
    DWord,
}

/// Token used for each [`PatchType`] in patch lines, indexed by discriminant. Matching is
/// case-sensitive.
const PATCH_TYPE_TOKENS: [(PatchType, &str); 3] = [
    (PatchType::Byte, "byte"),
    (PatchType::Word, "word"),
    (PatchType::DWord, "dword"),
];

impl PatchType {
    pub fn as_str(self) -> &'static str {
        PATCH_TYPE_TOKENS[self as usize].1
    }

    pub fn from_token(token: &str) -> Option<Self> {
        PATCH_TYPE_TOKENS
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(ty, _)| *ty)
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One guest memory write.
///
/// `comparand` is only meaningful when `conditional` is set: the write then only happens if the
/// current value at `address` (read at the entry's width) equals the truncated comparand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchEntry {
    pub address: u32,
    pub patch_type: PatchType,
    pub value: u32,
    pub conditional: bool,
    pub comparand: u32,
}

impl PatchEntry {
    pub fn new(address: u32, patch_type: PatchType, value: u32) -> Self {
        Self {
            address,
            patch_type,
            value,
            conditional: false,
            comparand: 0,
        }
    }

    /// Makes the entry conditional on the current memory value matching `comparand`.
    pub fn with_comparand(mut self, comparand: u32) -> Self {
        self.conditional = true;
        self.comparand = comparand;
        self
    }

    /// Parses `ADDR:TYPE:VALUE[:COMPARAND]`.
    ///
    /// The first `=` is accepted in place of a `:` (older files use `ADDR=TYPE:VALUE`). Returns
    /// `None` for any malformed line.
    pub fn deserialize(line: &str) -> Option<Self> {
        let line = line.replacen('=', ":", 1);
        // A single trailing separator does not start an empty field.
        let body = line.strip_suffix(':').unwrap_or(&line);
        let items: Vec<&str> = body.split(':').collect();

        if items.len() < 3 {
            return None;
        }

        let address = parse_u32_literal(items[0])?;
        let value = parse_u32_literal(items[2])?;

        let mut entry = PatchEntry::new(address, PatchType::from_token(items[1])?, value);
        if let Some(comparand) = items.get(3) {
            entry = entry.with_comparand(parse_u32_literal(comparand)?);
        }

        Some(entry)
    }

    /// Canonical form: `0xAAAAAAAA:type:0xVVVVVVVV[:0xCCCCCCCC]`.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08X}:{}:0x{:08X}",
            self.address, self.patch_type, self.value
        )?;
        if self.conditional {
            write!(f, ":0x{:08X}", self.comparand)?;
        }
        Ok(())
    }
}

/// Parses an unsigned integer literal the way C's `strtoul(.., 0)` does, but requires the whole
/// string to be consumed.
///
/// Accepts optional leading whitespace and `+`, then `0x`/`0X` hex, `0`-prefixed octal, or
/// decimal digits.
pub fn parse_u32_literal(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);

    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // `from_str_radix` tolerates a sign of its own; only bare digits are valid here.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}
