//! Event-driven tree construction.

use crate::error::{ParseError, Result, XmlError};
use crate::sax::{SaxHandler, Tokenizer};
use crate::tree::{Document, NodeId};

/// Builds an element tree from SAX events.
///
/// The builder keeps a cursor (`current_parent`, starting at the document
/// element), the most recently opened element, and an accumulator for
/// character data. Start tags descend, end tags ascend. Text is trimmed and
/// stored on the element that is currently open. Text that follows a closed
/// child element is discarded.
///
/// ```
/// use xmlgrove::Document;
/// use xmlgrove::parser::{ParseOptions, TreeBuilder};
/// use xmlgrove::sax::QuickXmlTokenizer;
///
/// let mut doc = Document::new();
/// let options = ParseOptions::default();
/// let mut tokenizer = QuickXmlTokenizer::new("<a><b> hi </b></a>", &options);
/// TreeBuilder::new(&mut doc).build(&mut tokenizer).unwrap();
/// assert_eq!(doc.root().child("b").string(), "hi");
/// ```
pub struct TreeBuilder<'d> {
    doc: &'d mut Document,
    current_parent: NodeId,
    current_element: Option<NodeId>,
    current_value: String,
    parse_error: Option<ParseError>,
    element_count: usize,
}

impl<'d> TreeBuilder<'d> {
    /// Creates a builder that appends below `doc`'s document element.
    pub fn new(doc: &'d mut Document) -> Self {
        let current_parent = doc.document_id();
        Self {
            doc,
            current_parent,
            current_element: None,
            current_value: String::new(),
            parse_error: None,
            element_count: 0,
        }
    }

    /// Drives `tokenizer` to completion.
    ///
    /// # Errors
    ///
    /// When the tokenizer reports failure, returns the error it handed to
    /// [`SaxHandler::error`], or [`XmlError::ParsingFailed`] if it gave none.
    /// Whatever was built before the failure stays attached to the document.
    pub fn build(mut self, tokenizer: &mut dyn Tokenizer) -> Result<()> {
        if tokenizer.tokenize(&mut self) {
            log::trace!("built {} elements", self.element_count);
            return Ok(());
        }
        Err(match self.parse_error {
            Some(err) => XmlError::Parse(err),
            None => XmlError::ParsingFailed,
        })
    }
}

impl SaxHandler for TreeBuilder<'_> {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) {
        log::trace!("open <{name}> below {:?}", self.current_parent);
        self.current_value.clear();
        let id = self.doc.add_element(
            self.current_parent,
            name,
            None,
            attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        self.current_element = Some(id);
        self.current_parent = id;
        self.element_count += 1;
    }

    fn end_element(&mut self, name: &str) {
        log::trace!("close <{name}>");
        if let Some(parent) = self.doc.parent(self.current_parent) {
            self.current_parent = parent;
        }
        self.current_element = None;
    }

    fn characters(&mut self, content: &str) {
        let Some(id) = self.current_element else {
            if !content.trim().is_empty() {
                log::warn!("discarding character data outside an open element: {content:?}");
            }
            return;
        };
        self.current_value.push_str(content);
        let trimmed = self.current_value.trim();
        if !trimmed.is_empty() {
            self.doc.set_value(id, Some(trimmed));
        } else if !self.doc.element(id).is_cdata() {
            self.doc.set_value(id, None);
        }
    }

    fn cdata(&mut self, content: &str) {
        let Some(id) = self.current_element else {
            log::warn!("discarding CDATA outside an open element");
            return;
        };
        log::trace!("cdata ({} bytes)", content.len());
        self.doc.set_cdata_value(id, content);
        self.current_value.clear();
    }

    fn error(&mut self, error: &ParseError) {
        log::trace!("recorded {error}");
        self.parse_error = Some(error.clone());
    }
}
