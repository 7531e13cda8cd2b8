//! Qualified-name helpers.
//!
//! Prefixes are never resolved to namespace URIs here. When namespace
//! processing is enabled the tokenizer driver only strips them and recognizes
//! `xmlns` declarations.

/// Splits `prefix:local` into `(Some(prefix), local)`. Names without a colon
/// return `(None, name)`. Only the first colon splits.
#[must_use]
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

/// Returns the local part of a qualified name.
#[must_use]
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}

/// If `attr_name` declares a namespace, returns the declared prefix.
///
/// The default namespace (`xmlns="..."`) yields an empty prefix.
#[must_use]
pub fn declared_prefix(attr_name: &str) -> Option<&str> {
    match split_qname(attr_name) {
        (None, "xmlns") => Some(""),
        (Some("xmlns"), prefix) => Some(prefix),
        _ => None,
    }
}
