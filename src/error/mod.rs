//! Error types for tree construction and lookups.
//!
//! Two kinds of failure flow through the crate:
//!
//! - **Lookup failures** (`ElementNotFound`, `RootElementMissing`) never abort
//!   a traversal. They ride along inside a placeholder
//!   [`Element::Missing`](crate::tree::Element::Missing) so chained lookups
//!   keep working and report the first failure.
//! - **Construction failures** (`Parse`, `ParsingFailed`, `Encoding`) abort a
//!   load and are returned to the caller of
//!   [`Document::parse`](crate::Document::parse) or
//!   [`Document::load_xml`](crate::Document::load_xml).
//!
//! All error values compare by value.

use std::fmt;

pub use crate::encoding::EncodingError;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `byte_offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped to the end.
    #[must_use]
    pub fn from_offset(input: &str, byte_offset: usize) -> Self {
        let mut end = byte_offset.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let before = &input[..end];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            byte_offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A structured error reported by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Where in the source the error occurred.
    pub location: SourceLocation,
}

impl ParseError {
    /// Creates a new `ParseError` at the given location.
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The error type of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// A child lookup by name found nothing. Carries the queried name.
    ElementNotFound(String),
    /// The document has no root element.
    RootElementMissing,
    /// Parsing failed and the tokenizer gave no details.
    ParsingFailed,
    /// An element that must carry a value has none. Carries the element name.
    ValueNotFound(String),
    /// Parsing failed with a structured error from the tokenizer.
    Parse(ParseError),
    /// The raw input bytes could not be decoded to text.
    Encoding(EncodingError),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementNotFound(name) => write!(f, "element <{name}> not found"),
            Self::RootElementMissing => write!(f, "root element is missing"),
            Self::ParsingFailed => write!(f, "parsing failed"),
            Self::ValueNotFound(name) => write!(f, "value of element <{name}> not found"),
            Self::Parse(err) => write!(f, "parsing failed: {err}"),
            Self::Encoding(err) => write!(f, "parsing failed: {err}"),
        }
    }
}

impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for XmlError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<EncodingError> for XmlError {
    fn from(err: EncodingError) -> Self {
        Self::Encoding(err)
    }
}

/// Convenience alias for results carrying an [`XmlError`].
pub type Result<T> = std::result::Result<T, XmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation {
            line: 10,
            column: 5,
            byte_offset: 42,
        };
        assert_eq!(loc.to_string(), "10:5");
    }

    #[test]
    fn test_source_location_from_offset() {
        let input = "<a>\n  <b>\n</a>";
        let loc = SourceLocation::from_offset(input, 6);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.byte_offset, 6);
    }

    #[test]
    fn test_source_location_from_offset_past_end() {
        let loc = SourceLocation::from_offset("<a>", 100);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 4);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(
            "unexpected end of input",
            SourceLocation {
                line: 1,
                column: 15,
                byte_offset: 14,
            },
        );
        assert_eq!(
            err.to_string(),
            "parse error at 1:15: unexpected end of input"
        );
    }

    #[test]
    fn test_element_not_found_display() {
        let err = XmlError::ElementNotFound("ducks".to_string());
        assert_eq!(err.to_string(), "element <ducks> not found");
    }

    #[test]
    fn test_errors_compare_by_value() {
        assert_eq!(
            XmlError::ElementNotFound("a".to_string()),
            XmlError::ElementNotFound("a".to_string())
        );
        assert_ne!(
            XmlError::ElementNotFound("a".to_string()),
            XmlError::ElementNotFound("b".to_string())
        );
        assert_ne!(XmlError::RootElementMissing, XmlError::ParsingFailed);
        assert_eq!(
            XmlError::ValueNotFound("x".to_string()),
            XmlError::ValueNotFound("x".to_string())
        );
    }

    #[test]
    fn test_parse_variant_exposes_source() {
        use std::error::Error;

        let err = XmlError::from(ParseError::new("bad", SourceLocation::default()));
        assert!(err.source().is_some());
        assert!(XmlError::ParsingFailed.source().is_none());
    }
}
