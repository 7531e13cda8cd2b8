//! SAX-style event boundary between the tokenizer and the tree builder.
//!
//! A [`Tokenizer`] turns text into a stream of callbacks on a
//! [`SaxHandler`] and finally reports success or failure. On failure it may
//! first hand the handler a structured [`ParseError`] through
//! [`SaxHandler::error`].
//!
//! [`QuickXmlTokenizer`] is the stock tokenizer, built on `quick-xml`.
//!
//! # Examples
//!
//! ```
//! use xmlgrove::sax::{parse_sax, SaxHandler};
//! use xmlgrove::parser::ParseOptions;
//!
//! struct Counter {
//!     elements: usize,
//! }
//!
//! impl SaxHandler for Counter {
//!     fn start_element(&mut self, _name: &str, _attributes: &[(String, String)]) {
//!         self.elements += 1;
//!     }
//! }
//!
//! let mut counter = Counter { elements: 0 };
//! parse_sax("<root><a/><b/><c/></root>", &ParseOptions::default(), &mut counter).unwrap();
//! assert_eq!(counter.elements, 4);
//! ```

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, SourceLocation};
use crate::parser::ParseOptions;
use crate::util::escape::unescape_with;
use crate::util::qname::{declared_prefix, local_name};

/// Receiver of tokenizer events.
///
/// Every method has a no-op default, so implementors only override what
/// they need.
#[allow(unused_variables)]
pub trait SaxHandler {
    /// Called before any other event.
    fn start_document(&mut self) {}

    /// Called after the last event of a successful parse.
    fn end_document(&mut self) {}

    /// Called for an element start tag. Attributes are `(name, value)` pairs
    /// in source order, with entities already expanded.
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) {}

    /// Called for an element end tag (also after a self-closing tag).
    fn end_element(&mut self, name: &str) {}

    /// Called for character data. One run of text may arrive in pieces.
    fn characters(&mut self, content: &str) {}

    /// Called for a CDATA section.
    fn cdata(&mut self, content: &str) {}

    /// Called for a comment.
    fn comment(&mut self, content: &str) {}

    /// Called for a processing instruction other than the XML declaration.
    fn processing_instruction(&mut self, target: &str, data: Option<&str>) {}

    /// Called for each namespace declaration in a start tag, before the
    /// element's `start_element`. Only fired when
    /// [`ParseOptions::report_namespace_prefixes`] is set.
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {}

    /// Called after the `end_element` of the element that declared `prefix`.
    fn end_prefix_mapping(&mut self, prefix: &str) {}

    /// Called once when the tokenizer gives up, before it reports failure.
    fn error(&mut self, error: &ParseError) {}
}

/// A no-op handler.
pub struct DefaultHandler;

impl SaxHandler for DefaultHandler {}

/// A source of SAX events.
pub trait Tokenizer {
    /// Feeds every event to `handler` and returns whether the input was
    /// well-formed.
    fn tokenize(&mut self, handler: &mut dyn SaxHandler) -> bool;
}

/// The stock tokenizer over a `&str`.
pub struct QuickXmlTokenizer<'a> {
    input: &'a str,
    options: &'a ParseOptions,
}

impl<'a> QuickXmlTokenizer<'a> {
    /// Creates a tokenizer for `input`.
    #[must_use]
    pub fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        Self { input, options }
    }
}

impl Tokenizer for QuickXmlTokenizer<'_> {
    fn tokenize(&mut self, handler: &mut dyn SaxHandler) -> bool {
        parse_sax(self.input, self.options, handler).is_ok()
    }
}

/// Parses `input`, firing events on `handler`.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed. The same error is
/// passed to [`SaxHandler::error`] first.
pub fn parse_sax(
    input: &str,
    options: &ParseOptions,
    handler: &mut dyn SaxHandler,
) -> Result<(), ParseError> {
    let result = Driver::new(input, options).run(handler);
    if let Err(ref err) = result {
        log::warn!("tokenizer stopped: {err}");
        handler.error(err);
    }
    result
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    prefixes: Vec<String>,
}

struct Driver<'a> {
    input: &'a str,
    options: &'a ParseOptions,
    reader: Reader<&'a [u8]>,
    open: Vec<OpenElement>,
    seen_root: bool,
}

impl<'a> Driver<'a> {
    fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        let mut reader = Reader::from_str(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Self {
            input,
            options,
            reader,
            open: Vec::new(),
            seen_root: false,
        }
    }

    fn run(mut self, handler: &mut dyn SaxHandler) -> Result<(), ParseError> {
        handler.start_document();
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let pos = offset(self.reader.error_position());
                    return Err(self.error_at(pos, err.to_string()));
                }
            };
            let pos = offset(self.reader.buffer_position());
            match event {
                Event::Start(ref start) => self.start_element(start, pos, handler)?,
                Event::Empty(ref start) => {
                    self.start_element(start, pos, handler)?;
                    self.end_element(pos, handler)?;
                }
                Event::End(_) => self.end_element(pos, handler)?,
                Event::Text(ref text) => {
                    let raw = self.decode(text, pos)?;
                    if self.open.is_empty() {
                        if !raw.trim().is_empty() {
                            return Err(self.error_at(pos, "text outside of the root element"));
                        }
                    } else {
                        let content = self.unescape(raw, pos)?;
                        handler.characters(&content);
                    }
                }
                Event::CData(ref data) => {
                    if self.open.is_empty() {
                        return Err(self.error_at(pos, "CDATA outside of the root element"));
                    }
                    handler.cdata(self.decode(data, pos)?);
                }
                Event::Comment(ref text) => handler.comment(self.decode(text, pos)?),
                Event::PI(ref pi) => {
                    let target = self.decode(pi.target(), pos)?;
                    let data = self.decode(pi.content(), pos)?.trim();
                    handler.processing_instruction(target, (!data.is_empty()).then_some(data));
                }
                Event::Decl(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        let pos = self.input.len();
        if let Some(open) = self.open.last() {
            let message = format!("unexpected end of input: element <{}> is not closed", open.name);
            return Err(self.error_at(pos, message));
        }
        if !self.seen_root {
            return Err(self.error_at(pos, "document has no root element"));
        }
        handler.end_document();
        Ok(())
    }

    fn start_element(
        &mut self,
        start: &BytesStart<'_>,
        pos: usize,
        handler: &mut dyn SaxHandler,
    ) -> Result<(), ParseError> {
        if self.open.is_empty() && self.seen_root {
            return Err(self.error_at(pos, "content after document element"));
        }
        let process = self.options.process_namespaces;
        let qname = self.decode(start.name().into_inner(), pos)?;

        let mut attributes = Vec::new();
        let mut prefixes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.error_at(pos, err.to_string()))?;
            let key = self.decode(attr.key.into_inner(), pos)?;
            let value = self.unescape(self.decode(&attr.value, pos)?, pos)?.into_owned();

            if let Some(prefix) = declared_prefix(key) {
                if self.options.report_namespace_prefixes {
                    handler.start_prefix_mapping(prefix, &value);
                    prefixes.push(prefix.to_string());
                }
                if process {
                    continue;
                }
            }
            let key = if process { local_name(key) } else { key };
            attributes.push((key.to_string(), value));
        }

        let name = if process { local_name(qname) } else { qname };
        handler.start_element(name, &attributes);
        self.open.push(OpenElement {
            name: name.to_string(),
            prefixes,
        });
        self.seen_root = true;
        Ok(())
    }

    fn end_element(&mut self, pos: usize, handler: &mut dyn SaxHandler) -> Result<(), ParseError> {
        let Some(open) = self.open.pop() else {
            return Err(self.error_at(pos, "end tag without matching start tag"));
        };
        handler.end_element(&open.name);
        for prefix in open.prefixes.iter().rev() {
            handler.end_prefix_mapping(prefix);
        }
        Ok(())
    }

    fn decode<'b>(&self, bytes: &'b [u8], pos: usize) -> Result<&'b str, ParseError> {
        std::str::from_utf8(bytes).map_err(|err| self.error_at(pos, err.to_string()))
    }

    fn unescape<'b>(&self, raw: &'b str, pos: usize) -> Result<Cow<'b, str>, ParseError> {
        let resolver = if self.options.resolve_external_entities {
            self.options.entity_resolver.as_ref()
        } else {
            None
        };
        unescape_with(raw, |name| resolver.and_then(|resolve| resolve(name)))
            .map_err(|err| self.error_at(pos, err.to_string()))
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, SourceLocation::from_offset(self.input, pos))
    }
}

/// Converts a reader position to a byte offset.
fn offset<T>(pos: T) -> usize
where
    usize: TryFrom<T>,
{
    usize::try_from(pos).unwrap_or(usize::MAX)
}
