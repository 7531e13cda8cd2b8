//! Arena-based XML element tree.
//!
//! All elements of a document live in a `Vec<NodeData>` owned by the
//! [`Document`] and are referenced by [`NodeId`], a newtype over
//! `NonZeroU32`. Parent links are plain ids, so they never own anything and
//! the whole tree is freed by dropping the `Document`.
//!
//! Reading goes through the [`Element`] handle returned by
//! [`Document::root`] and [`Document::element`]. Writing goes through
//! `&mut Document` methods that take the ids of the elements involved.
//!
//! # Examples
//!
//! ```
//! use xmlgrove::Document;
//!
//! let mut doc = Document::parse_str("<animals><dogs/></animals>").unwrap();
//! let dogs = doc.root().child("dogs").id().unwrap();
//! doc.add_element(dogs, "dog", Some("Rex"), [("color", "brown")]);
//!
//! assert_eq!(doc.root().child("dogs").child("dog").string(), "Rex");
//! ```

mod element;

pub use element::Element;

use std::num::NonZeroU32;

use indexmap::IndexMap;

use crate::error::Result;
use crate::parser::ParseOptions;

/// Name carried by the synthetic element that holds the document's children.
pub const DOCUMENT_NAME: &str = "#document";

/// A typed index into the document's element arena.
///
/// `Option<NodeId>` has the same size as `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if `index` is 0 or does not fit in a `u32`.
    #[allow(clippy::expect_used)]
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).expect("element arena exceeds u32::MAX entries");
        Self(NonZeroU32::new(raw).expect("NodeId index must be non-zero"))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for one element in the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    /// Whether `value` came from (or should be written as) a CDATA section.
    pub(crate) cdata: bool,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    fn new(name: String) -> Self {
        Self {
            name,
            value: None,
            cdata: false,
            attributes: IndexMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An XML document: header metadata, parse configuration and an element tree.
///
/// The document itself is an element named [`DOCUMENT_NAME`] with no parent.
/// Its first child is the root element.
#[derive(Debug)]
pub struct Document {
    /// The element arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The synthetic document element.
    document: NodeId,
    /// Version written in the XML declaration. Not read from parsed input.
    pub version: f64,
    /// Encoding written in the XML declaration. Not read from parsed input.
    pub encoding: String,
    /// Standalone flag written in the XML declaration.
    pub standalone: String,
    /// Configuration used by [`load_xml`](Self::load_xml).
    pub options: ParseOptions,
}

impl Document {
    /// Creates an empty document with default header values
    /// (`1.0`, `utf-8`, `no`) and default parse options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Creates an empty document that parses with `options`.
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(NodeData::new(String::new()));
        nodes.push(NodeData::new(DOCUMENT_NAME.to_string()));
        Self {
            nodes,
            document: NodeId::from_index(1),
            version: 1.0,
            encoding: "utf-8".to_string(),
            standalone: "no".to_string(),
            options,
        }
    }

    /// Parses raw XML bytes with default options.
    ///
    /// # Errors
    ///
    /// Returns an `XmlError` if the bytes cannot be decoded or are not
    /// well-formed XML.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with_options(bytes, ParseOptions::default())
    }

    /// Parses raw XML bytes with the given options.
    ///
    /// # Errors
    ///
    /// Returns an `XmlError` if the bytes cannot be decoded or are not
    /// well-formed XML.
    pub fn parse_with_options(bytes: &[u8], options: ParseOptions) -> Result<Self> {
        let mut doc = Self::with_options(options);
        doc.load_xml(bytes)?;
        Ok(doc)
    }

    /// Parses an XML string with default options.
    ///
    /// # Errors
    ///
    /// Returns an `XmlError` if the input is not well-formed XML.
    pub fn parse_str(input: &str) -> Result<Self> {
        let mut doc = Self::new();
        doc.load_xml_str(input)?;
        Ok(doc)
    }

    /// Replaces the content of this document with the tree parsed from
    /// `bytes`.
    ///
    /// The previous tree is discarded first and every `NodeId` obtained
    /// before the call becomes stale. On failure the document holds whatever
    /// was built before the error and should be discarded.
    ///
    /// # Errors
    ///
    /// Returns an `XmlError` if the bytes cannot be decoded or are not
    /// well-formed XML.
    pub fn load_xml(&mut self, bytes: &[u8]) -> Result<()> {
        let text = crate::encoding::decode_to_utf8(bytes)?;
        self.load_xml_str(&text)
    }

    /// Like [`load_xml`](Self::load_xml), for input that is already text.
    ///
    /// # Errors
    ///
    /// Returns an `XmlError` if the input is not well-formed XML.
    pub fn load_xml_str(&mut self, input: &str) -> Result<()> {
        self.clear();
        let options = self.options.clone();
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        crate::parser::parse_into(self, input, &options)
    }

    /// Drops every element and resets the document element itself,
    /// attributes and value included. All previously issued ids except
    /// [`document_id`](Self::document_id) become invalid.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes.push(NodeData::new(DOCUMENT_NAME.to_string()));
    }

    /// Returns the id of the synthetic document element.
    #[must_use]
    pub fn document_id(&self) -> NodeId {
        self.document
    }

    /// Returns the document element as an [`Element`].
    #[must_use]
    pub fn as_element(&self) -> Element<'_> {
        self.element(self.document)
    }

    /// Returns the root element (the first child of the document).
    ///
    /// If the document is empty, returns a placeholder carrying
    /// [`XmlError::RootElementMissing`](crate::XmlError::RootElementMissing).
    #[must_use]
    pub fn root(&self) -> Element<'_> {
        match self.node(self.document).children.first() {
            Some(&id) => self.element(id),
            None => Element::Missing {
                name: DOCUMENT_NAME.to_string(),
                error: crate::XmlError::RootElementMissing,
            },
        }
    }

    /// Returns a read handle for the element with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Element<'_> {
        assert!(id.as_index() < self.nodes.len(), "stale or foreign NodeId");
        Element::Found { doc: self, id }
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the parent id of an element, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the number of elements in the arena, the document element
    /// and detached elements included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    // --- Mutation ---

    /// Allocates a detached element and returns its id.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(name.into()));
        NodeId::from_index(index)
    }

    /// Appends `child` to the end of `parent`'s children and returns `child`.
    ///
    /// A child that is already attached elsewhere is moved. Attaching an
    /// element below itself, or attaching the document element anywhere, is
    /// refused and leaves the tree unchanged.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        if child == self.document {
            log::warn!("refusing to give the document element a parent");
            return child;
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("refusing to attach an element below itself");
            return child;
        }
        self.remove_from_parent(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        child
    }

    /// Creates an element with the given name, value and attributes, appends
    /// it to `parent` and returns its id.
    pub fn add_element<I, K, V>(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        value: Option<&str>,
        attributes: I,
    ) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = self.create_element(name);
        let node = self.node_mut(id);
        node.value = value.map(str::to_string);
        node.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.add_child(parent, id)
    }

    /// Appends each of `children` to `parent`, keeping their relative order.
    pub fn add_children(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.add_child(parent, child);
        }
    }

    /// Sets an attribute. An existing key keeps its position.
    pub fn add_attribute(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).attributes.insert(key.into(), value.into());
    }

    /// Removes an attribute, keeping the order of the remaining ones.
    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.node_mut(id).attributes.shift_remove(key)
    }

    /// Sets (or clears) the text value of an element.
    pub fn set_value(&mut self, id: NodeId, value: Option<&str>) {
        let node = self.node_mut(id);
        node.value = value.map(str::to_string);
        node.cdata = false;
    }

    /// Sets the text value of an element and marks it for CDATA output.
    pub fn set_cdata_value(&mut self, id: NodeId, value: &str) {
        let node = self.node_mut(id);
        node.value = Some(value.to_string());
        node.cdata = true;
    }

    /// Detaches an element from its parent.
    ///
    /// The element is matched by identity, so a sibling with the same name
    /// and value stays in place. Calling this on a detached element does
    /// nothing.
    ///
    /// The detached subtree keeps its arena slots, so its id stays usable
    /// and it can be attached again with [`add_child`](Self::add_child).
    /// Slots are only reclaimed by [`clear`](Self::clear) or
    /// [`load_xml`](Self::load_xml).
    pub fn remove_from_parent(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let siblings = &mut self.node_mut(parent).children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.remove(pos);
        }
        self.node_mut(id).parent = None;
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    // --- Output ---

    /// Renders the document as indented XML, preceded by the XML declaration.
    #[must_use]
    pub fn xml(&self) -> String {
        crate::serial::serialize(self)
    }

    /// Renders the document without indentation or newlines.
    #[must_use]
    pub fn xml_compact(&self) -> String {
        crate::serial::serialize_with_options(self, &crate::serial::SerializeOptions::compact())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
