//! # xmlgrove
//!
//! A small XML document object model: parse XML into an in-memory element
//! tree, query it with chainable lookups that never panic, mutate it, and
//! write it back out as pretty or compact XML.
//!
//! ## Quick Start
//!
//! ```
//! use xmlgrove::{Document, XmlError};
//!
//! let doc = Document::parse_str(
//!     "<animals><dogs><dog color=\"white\">Villy</dog><dog>Spot</dog></dogs></animals>",
//! )
//! .unwrap();
//!
//! let dogs = doc.root().child("dogs").child("dog");
//! assert_eq!(dogs.count(), 2);
//! assert_eq!(dogs.last().string(), "Spot");
//!
//! // Failed lookups return a placeholder that carries the reason.
//! let ducks = doc.root().child("ducks");
//! assert_eq!(ducks.error(), Some(&XmlError::ElementNotFound("ducks".into())));
//! assert_eq!(ducks.child("duck").string(), "");
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: the arena `Document`, `NodeId` and the `Element` query handle
//! - [`parser`]: `ParseOptions` and the SAX-driven `TreeBuilder`
//! - [`sax`]: event handler trait and the `quick-xml` tokenizer driver
//! - [`serial`]: pretty and compact serialization
//! - [`encoding`]: BOM sniffing and transcoding of raw bytes
//! - [`error`]: error types
//! - [`util`]: escaping and qualified-name helpers

pub mod encoding;
pub mod error;
pub mod parser;
pub mod sax;
pub mod serial;
pub mod tree;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use error::{ParseError, Result, XmlError};
pub use parser::ParseOptions;
pub use tree::{Document, Element, NodeId};
