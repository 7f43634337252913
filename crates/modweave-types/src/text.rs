//! Text decoding and line endings.
//!
//! Game data files are a mix of UTF-8 and Windows-1252. Reads decode UTF-8
//! when valid and fall back to Windows-1252, which maps every byte, so
//! decoding never fails. Internally text uses `\n`; the original convention
//! is restored on output.

use encoding_rs::WINDOWS_1252;

/// Decode file bytes as UTF-8 (BOM stripped), falling back to Windows-1252.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
            decoded.into_owned()
        }
    }
}

/// Encode text as Windows-1252 when every character is representable,
/// otherwise as UTF-8.
pub fn encode_text(text: &str) -> Vec<u8> {
    let (encoded, _, unmappable) = WINDOWS_1252.encode(text);
    if unmappable {
        text.as_bytes().to_vec()
    } else {
        encoded.into_owned()
    }
}

/// Convert every `\r\n` (and stray `\r`) to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// A line-ending convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` if the text contains any `\r\n`, otherwise `Lf`.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Join lines with this ending, terminating the last line too.
    pub fn join<S: AsRef<str>>(self, lines: &[S]) -> String {
        let mut out = String::new();
        for line in lines {
            out.push_str(line.as_ref());
            out.push_str(self.as_str());
        }
        out
    }

    /// Rewrite the line endings of `text` to this convention.
    pub fn apply(self, text: &str) -> String {
        let normalized = normalize_line_endings(text);
        match self {
            Self::Lf => normalized,
            Self::CrLf => normalized.replace('\n', "\r\n"),
        }
    }
}
