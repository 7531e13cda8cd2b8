//! Entity escaping for text and attribute values.
//!
//! The same five-character table is applied to element text and attribute
//! values so that serialized output always re-parses to the original strings.
//! The character-level work is done by `quick_xml::escape`. This module adds
//! resolvers that produce owned replacement text.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Escapes `&`, `<`, `>`, `'` and `"` with their predefined entities.
///
/// ```
/// use xmlgrove::util::escape;
///
/// assert_eq!(escape("&<>'\""), "&amp;&lt;&gt;&apos;&quot;");
/// assert_eq!(escape("plain"), "plain");
/// ```
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Appends the escaped form of `text` to `out`.
pub(crate) fn write_escaped(out: &mut String, text: &str) {
    out.push_str(&escape(text));
}

/// A reference that could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// `&name;` where `name` is neither predefined nor resolvable.
    UnknownEntity(String),
    /// A character reference to an invalid code point, or a `&` with no
    /// terminating `;`.
    Malformed(String),
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(name) => write!(f, "undefined entity reference '&{name};'"),
            Self::Malformed(reason) => write!(f, "malformed reference: {reason}"),
        }
    }
}

impl std::error::Error for UnescapeError {}

/// Expands predefined entities and character references.
///
/// # Errors
///
/// Returns `UnescapeError` for unknown entities and malformed references.
///
/// ```
/// use xmlgrove::util::unescape;
///
/// assert_eq!(unescape("a &lt; b &#38; &#x3E;").unwrap(), "a < b & >");
/// assert!(unescape("&nbsp;").is_err());
/// ```
pub fn unescape(text: &str) -> Result<Cow<'_, str>, UnescapeError> {
    unescape_with(text, |_| None)
}

/// Like [`unescape`], but offers unknown entity names to `resolve` first.
///
/// `resolve` is called at most once per distinct name.
///
/// # Errors
///
/// Returns `UnescapeError` when a reference is malformed or `resolve`
/// declines an unknown entity.
pub fn unescape_with<F>(text: &str, mut resolve: F) -> Result<Cow<'_, str>, UnescapeError>
where
    F: FnMut(&str) -> Option<String>,
{
    // quick-xml wants borrowed replacements, so resolve everything up front.
    let mut resolved: HashMap<&str, String> = HashMap::new();
    for (amp, _) in text.match_indices('&') {
        let rest = &text[amp + 1..];
        let Some(end) = rest.find(['&', ';']) else {
            break;
        };
        let name = &rest[..end];
        if !rest[end..].starts_with(';') {
            continue;
        }
        if name.starts_with('#') || predefined(name).is_some() || resolved.contains_key(name) {
            continue;
        }
        if let Some(replacement) = resolve(name) {
            resolved.insert(name, replacement);
        }
    }

    let mut unknown = None;
    quick_xml::escape::unescape_with(text, |name| {
        let found = predefined(name).or_else(|| resolved.get(name).map(String::as_str));
        if found.is_none() && unknown.is_none() {
            unknown = Some(name.to_string());
        }
        found
    })
    .map_err(|err| match unknown.take() {
        Some(name) => UnescapeError::UnknownEntity(name),
        None => UnescapeError::Malformed(err.to_string()),
    })
}

fn predefined(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}
