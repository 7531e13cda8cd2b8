//! Text-level helpers shared by the tokenizer driver and the serializer.
//!
//! Contains entity escaping/unescaping and `QName` splitting.

pub mod escape;
pub mod qname;

pub use escape::{escape, unescape, UnescapeError};
