//! Charset detection for origin payloads.
//!
//! The origin sites emit either UTF-8 or windows-1251 with no reliable
//! charset declaration, so decoding is a two-step heuristic: trust UTF-8
//! only when the bytes actually carry Cyrillic text (or a BOM), otherwise
//! fall back to the legacy code page.

use encoding_rs::WINDOWS_1251;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decode raw origin bytes to text.
pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.starts_with(&UTF8_BOM) {
        return String::from_utf8_lossy(&bytes[UTF8_BOM.len()..]).into_owned();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        if contains_cyrillic(s) {
            return s.to_string();
        }
    }

    let (decoded, _, _) = WINDOWS_1251.decode(bytes);
    decoded.into_owned()
}

fn contains_cyrillic(s: &str) -> bool {
    s.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}
