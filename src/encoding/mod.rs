//! Decoding of raw input bytes to UTF-8 text.
//!
//! The tokenizer works on `&str`, so raw bytes are decoded up front:
//!
//! 1. A byte order mark selects UTF-8, UTF-16BE or UTF-16LE and is dropped.
//! 2. Without a BOM the input is taken as UTF-8.
//! 3. If the XML declaration names another ASCII-compatible encoding, the
//!    bytes are transcoded with `encoding_rs`. UTF-16 and UTF-32 labels on
//!    BOM-less input are ignored, since the declaration itself was ASCII.

use std::fmt;

/// An error raised when input bytes cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    /// What went wrong.
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.message)
    }
}

impl std::error::Error for EncodingError {}

/// Sniffs a byte order mark.
///
/// Returns the encoding label and the number of BOM bytes to skip.
///
/// ```
/// use xmlgrove::encoding::detect_encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_encoding(b"\xFF\xFE<\0"), ("UTF-16LE", 2));
/// assert_eq!(detect_encoding(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes `bytes` from the encoding named by `label` into a `String`.
///
/// # Errors
///
/// Returns `EncodingError` if the label is unknown to `encoding_rs` or the
/// bytes are malformed for that encoding.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok(text.into_owned())
}

/// Decodes raw XML bytes to UTF-8 text.
///
/// # Errors
///
/// Returns `EncodingError` if the encoding cannot be determined or the bytes
/// do not decode cleanly.
///
/// ```
/// use xmlgrove::encoding::decode_to_utf8;
///
/// let text = decode_to_utf8(b"<?xml version=\"1.0\"?><root/>").unwrap();
/// assert!(text.ends_with("<root/>"));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_label, skip) = detect_encoding(bytes);
    let content = &bytes[skip..];

    if bom_label != "UTF-8" {
        return transcode(content, bom_label);
    }

    // The declaration is ASCII, so it can be read even from bytes that are
    // not valid UTF-8.
    match declared_encoding(content) {
        Some(declared) if !keeps_utf8(&declared) => transcode(content, &declared),
        _ => std::str::from_utf8(content)
            .map(str::to_string)
            .map_err(|_| EncodingError::new("input is not valid UTF-8")),
    }
}

/// Reads the `encoding="..."` pseudo-attribute of a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(256)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let decl_end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..decl_end];

    let needle = b"encoding";
    let pos = decl.windows(needle.len()).position(|w| w == needle)?;
    let rest = trim_ascii_start(&decl[pos + needle.len()..]);
    let rest = trim_ascii_start(rest.strip_prefix(b"=")?);

    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = rest.iter().position(|&b| b == quote)?;
    let label = &rest[..end];
    label
        .is_ascii()
        .then(|| String::from_utf8_lossy(label).into_owned())
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}

/// Whether a declared label should leave BOM-less input as UTF-8.
///
/// Input without a BOM whose declaration is readable as ASCII cannot be
/// UTF-16 or UTF-32, so those labels are ignored along with the UTF-8 ones.
fn keeps_utf8(label: &str) -> bool {
    let label = label.to_ascii_lowercase();
    if matches!(label.as_str(), "us-ascii" | "ascii")
        || label.starts_with("utf-32")
        || label.starts_with("ucs-4")
        || label == "iso-10646-ucs-4"
    {
        return true;
    }
    encoding_rs::Encoding::for_label(label.as_bytes())
        .is_some_and(|encoding| encoding == encoding_rs::UTF_8 || !encoding.is_ascii_compatible())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf16be_bom() {
        assert_eq!(detect_encoding(b"\xFE\xFF\0<"), ("UTF-16BE", 2));
    }

    #[test]
    fn test_detect_empty_input() {
        assert_eq!(detect_encoding(b""), ("UTF-8", 0));
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let text = decode_to_utf8(b"\xEF\xBB\xBF<a/>").unwrap();
        assert_eq!(text, "<a/>");
    }

    #[test]
    fn test_decode_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<a>hi</a>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_to_utf8(&bytes).unwrap(), "<a>hi</a>");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf\xE9</a>";
        let text = decode_to_utf8(bytes).unwrap();
        assert!(text.ends_with("<a>caf\u{e9}</a>"));
    }

    #[test]
    fn test_declared_utf8_is_left_alone() {
        let bytes = b"<?xml version='1.0' encoding='UTF-8'?><a/>";
        assert_eq!(
            decode_to_utf8(bytes).unwrap(),
            "<?xml version='1.0' encoding='UTF-8'?><a/>"
        );
    }

    #[test]
    fn test_utf16_label_on_utf8_bytes_is_ignored() {
        for label in ["utf-16", "UTF-16LE", "utf-16be", "UTF-32"] {
            let input = format!("<?xml version=\"1.0\" encoding=\"{label}\"?><a>caf\u{e9}</a>");
            assert_eq!(decode_to_utf8(input.as_bytes()).unwrap(), input, "{label}");
        }
    }

    #[test]
    fn test_utf16_label_with_invalid_utf8() {
        let err = decode_to_utf8(b"<?xml version=\"1.0\" encoding=\"utf-16\"?><a>\xFF</a>").unwrap_err();
        assert_eq!(err.message, "input is not valid UTF-8");
    }

    #[test]
    fn test_invalid_utf8_without_declaration() {
        let err = decode_to_utf8(b"<a>\xFF\xFE\xFD</a>").unwrap_err();
        assert_eq!(err.message, "input is not valid UTF-8");
    }

    #[test]
    fn test_unknown_label() {
        let err = transcode(b"abc", "klingon").unwrap_err();
        assert_eq!(err.to_string(), "encoding error: unsupported encoding: klingon");
    }
}
