//! Parse configuration and the document loading entry point.
//!
//! Parsing is a single pass: a [`Tokenizer`](crate::sax::Tokenizer) feeds
//! events to a fresh [`TreeBuilder`], which grows the element tree of the
//! target `Document`. A builder never outlives one parse call.

mod builder;

pub use builder::TreeBuilder;

use std::sync::Arc;

use crate::error::Result;
use crate::sax::QuickXmlTokenizer;
use crate::tree::Document;

/// A callback for resolving entity references beyond the predefined five.
///
/// Receives the entity name (without `&` and `;`) and returns
/// `Some(replacement_text)` to expand it, or `None` to reject the reference,
/// which fails the parse.
pub type EntityResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Parse options. Everything is off by default.
///
/// ```
/// use xmlgrove::parser::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .process_namespaces(true)
///     .resolve_external_entities(true)
///     .entity_resolver(|name| (name == "copy").then(|| "\u{a9}".to_string()));
/// assert!(opts.process_namespaces);
/// ```
#[derive(Default)]
pub struct ParseOptions {
    /// Report element and attribute names without their prefix, and drop
    /// `xmlns` declarations from attribute maps.
    pub process_namespaces: bool,
    /// Fire prefix mapping callbacks for every `xmlns` declaration.
    pub report_namespace_prefixes: bool,
    /// Pass unknown entity references to [`entity_resolver`](Self::entity_resolver).
    pub resolve_external_entities: bool,
    /// Resolver consulted when `resolve_external_entities` is set.
    pub entity_resolver: Option<EntityResolver>,
}

impl Clone for ParseOptions {
    fn clone(&self) -> Self {
        Self {
            process_namespaces: self.process_namespaces,
            report_namespace_prefixes: self.report_namespace_prefixes,
            resolve_external_entities: self.resolve_external_entities,
            entity_resolver: self.entity_resolver.clone(),
        }
    }
}

impl std::fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseOptions")
            .field("process_namespaces", &self.process_namespaces)
            .field("report_namespace_prefixes", &self.report_namespace_prefixes)
            .field("resolve_external_entities", &self.resolve_external_entities)
            .field(
                "entity_resolver",
                &self.entity_resolver.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl ParseOptions {
    /// Enables or disables namespace processing.
    #[must_use]
    pub fn process_namespaces(mut self, yes: bool) -> Self {
        self.process_namespaces = yes;
        self
    }

    /// Enables or disables prefix mapping callbacks.
    #[must_use]
    pub fn report_namespace_prefixes(mut self, yes: bool) -> Self {
        self.report_namespace_prefixes = yes;
        self
    }

    /// Enables or disables resolution of non-predefined entities.
    #[must_use]
    pub fn resolve_external_entities(mut self, yes: bool) -> Self {
        self.resolve_external_entities = yes;
        self
    }

    /// Sets the entity resolver callback.
    ///
    /// The callback is only consulted while
    /// [`resolve_external_entities`](Self::resolve_external_entities) is on.
    ///
    /// # Security
    ///
    /// A resolver that fetches content opens the door to XML External Entity
    /// (XXE) attacks. Only use one with trusted input.
    #[must_use]
    pub fn entity_resolver(
        mut self,
        resolver: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.entity_resolver = Some(Arc::new(resolver));
        self
    }
}

/// Parses `input` into `doc` below its document element.
///
/// The caller is responsible for clearing `doc` first.
pub(crate) fn parse_into(doc: &mut Document, input: &str, options: &ParseOptions) -> Result<()> {
    log::debug!("parsing {} bytes ({options:?})", input.len());
    let mut tokenizer = QuickXmlTokenizer::new(input, options);
    let result = TreeBuilder::new(doc).build(&mut tokenizer);
    match &result {
        Ok(()) => log::debug!("parsed {} elements", doc.node_count().saturating_sub(1)),
        Err(err) => log::debug!("parse failed: {err}"),
    }
    result
}
