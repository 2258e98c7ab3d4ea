//! Input decoding helpers.

use std::borrow::Cow;

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (e.g. from a `--encoding` flag)
/// 3. Falls back to Windows-1252 (common in old USFM exports)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
///
/// ```
/// use scriptura::util::decode_text;
///
/// assert_eq!(decode_text("\u{feff}\\id GEN".as_bytes(), None), "\\id GEN");
/// assert_eq!(decode_text(b"caf\xe9", None), "café");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        log::debug!("input is not UTF-8, decoding as {}", encoding.name());
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    // Fallback: Windows-1252 (superset of ISO-8859-1)
    log::debug!("input is not UTF-8, falling back to windows-1252");
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode bytes with [`decode_text`] and parse them as JSON.
pub fn read_json<T: DeserializeOwned>(bytes: &[u8], hint_encoding: Option<&str>) -> Result<T> {
    let text = decode_text(bytes, hint_encoding);
    Ok(serde_json::from_str(&text)?)
}
