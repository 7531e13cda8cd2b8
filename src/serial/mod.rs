//! XML serialization.
//!
//! Turns a `Document` or an element subtree back into XML text, either
//! indented (one element per line) or compact (no whitespace between tags).

pub mod xml;

pub use xml::{serialize, serialize_element, serialize_with_options, SerializeOptions};
