//! Read-side element handle with chainable lookups.

use indexmap::IndexMap;

use super::{Document, NodeData, NodeId};
use crate::error::XmlError;
use crate::serial::{self, SerializeOptions};

/// A borrowed view of one element, or a placeholder for a failed lookup.
///
/// Lookups never fail structurally: asking for a child that does not exist
/// yields `Element::Missing`, which supports every read operation and
/// answers them as an empty element. Chaining further lookups on a
/// placeholder returns the same placeholder, so the first error is kept.
///
/// ```
/// use xmlgrove::{Document, XmlError};
///
/// let doc = Document::parse_str("<animals><cats/></animals>").unwrap();
/// let duck = doc.root().child("ducks").child("duck");
///
/// assert_eq!(duck.error(), Some(&XmlError::ElementNotFound("ducks".into())));
/// assert_eq!(duck.string(), "");
/// assert!(duck.first().is_none());
/// ```
#[derive(Debug, Clone)]
pub enum Element<'a> {
    /// An element that exists in `doc`.
    Found {
        /// The owning document.
        doc: &'a Document,
        /// The element's id.
        id: NodeId,
    },
    /// The result of a lookup that found nothing.
    Missing {
        /// The name that was looked up.
        name: String,
        /// Why the lookup failed.
        error: XmlError,
    },
}

impl<'a> Element<'a> {
    fn data(&self) -> Option<&'a NodeData> {
        match *self {
            Self::Found { doc, id } => Some(doc.node(id)),
            Self::Missing { .. } => None,
        }
    }

    /// Returns the element's id, or `None` for a placeholder.
    #[must_use]
    pub fn id(&self) -> Option<NodeId> {
        match *self {
            Self::Found { id, .. } => Some(id),
            Self::Missing { .. } => None,
        }
    }

    /// The element name. A placeholder reports the name that was looked up.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Found { doc, id } => &doc.node(*id).name,
            Self::Missing { name, .. } => name,
        }
    }

    /// The lookup error carried by a placeholder.
    #[must_use]
    pub fn error(&self) -> Option<&XmlError> {
        match self {
            Self::Found { .. } => None,
            Self::Missing { error, .. } => Some(error),
        }
    }

    /// Whether this is a placeholder.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    // --- Content ---

    /// The raw text value.
    #[must_use]
    pub fn value(&self) -> Option<&'a str> {
        self.data().and_then(|node| node.value.as_deref())
    }

    /// The text value, or `""` when there is none.
    #[must_use]
    pub fn string(&self) -> &'a str {
        self.value().unwrap_or_default()
    }

    /// The text value, or an error saying why there is none.
    ///
    /// # Errors
    ///
    /// A placeholder returns its lookup error. An element without text
    /// returns [`XmlError::ValueNotFound`].
    pub fn require_value(&self) -> Result<&'a str, XmlError> {
        match self {
            Self::Missing { error, .. } => Err(error.clone()),
            Self::Found { .. } => self
                .value()
                .ok_or_else(|| XmlError::ValueNotFound(self.name().to_string())),
        }
    }

    /// The value read as a boolean. Only `true` and `false` are accepted,
    /// in any letter case.
    #[must_use]
    pub fn bool(&self) -> Option<bool> {
        let value = self.value()?;
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// The value read as an integer.
    #[must_use]
    pub fn int(&self) -> Option<i64> {
        self.value()?.parse().ok()
    }

    /// The value read as a floating-point number.
    #[must_use]
    pub fn double(&self) -> Option<f64> {
        self.value()?.parse().ok()
    }

    /// Whether the value came from a CDATA section.
    #[must_use]
    pub fn is_cdata(&self) -> bool {
        self.data().is_some_and(|node| node.cdata)
    }

    // --- Attributes ---

    fn attribute_map(&self) -> Option<&'a IndexMap<String, String>> {
        self.data().map(|node| &node.attributes)
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.attribute_map()
            .into_iter()
            .flat_map(IndexMap::iter)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Looks up one attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attribute_map()?.get(key).map(String::as_str)
    }

    // --- Navigation ---

    /// The containing element. The document element, detached elements and
    /// placeholders have none.
    #[must_use]
    pub fn parent(&self) -> Option<Element<'a>> {
        match *self {
            Self::Found { doc, id } => doc.node(id).parent.map(|id| Self::Found { doc, id }),
            Self::Missing { .. } => None,
        }
    }

    /// Iterates over the child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let (doc, ids) = match *self {
            Self::Found { doc, id } => (Some(doc), doc.node(id).children.as_slice()),
            Self::Missing { .. } => (None, &[][..]),
        };
        ids.iter()
            .filter_map(move |&id| doc.map(|doc| Self::Found { doc, id }))
    }

    /// Returns the first child named `name`.
    ///
    /// When there is none, returns a placeholder carrying
    /// [`XmlError::ElementNotFound`]. On a placeholder, returns the
    /// placeholder itself.
    #[must_use]
    pub fn child(&self, name: &str) -> Element<'a> {
        if self.is_missing() {
            return self.clone();
        }
        self.children()
            .find(|child| child.name() == name)
            .unwrap_or_else(|| Self::Missing {
                name: name.to_string(),
                error: XmlError::ElementNotFound(name.to_string()),
            })
    }

    /// `Some(self)` for a real element, `None` for a placeholder.
    #[must_use]
    pub fn first(&self) -> Option<Element<'a>> {
        (!self.is_missing()).then(|| self.clone())
    }

    /// Every sibling sharing this element's name, self included, in
    /// document order.
    ///
    /// An element without a parent yields just itself. A placeholder yields
    /// `None`.
    #[must_use]
    pub fn all(&self) -> Option<Vec<Element<'a>>> {
        let Self::Found { doc, id } = *self else {
            return None;
        };
        let Some(parent) = doc.node(id).parent else {
            return Some(vec![self.clone()]);
        };
        let name = self.name();
        let siblings: Vec<_> = doc
            .element(parent)
            .children()
            .filter(|sibling| sibling.name() == name)
            .collect();
        (!siblings.is_empty()).then_some(siblings)
    }

    /// The last of [`all`](Self::all), or `self` when that is empty.
    #[must_use]
    pub fn last(&self) -> Element<'a> {
        self.all()
            .and_then(|mut all| all.pop())
            .unwrap_or_else(|| self.clone())
    }

    /// The number of elements in [`all`](Self::all).
    #[must_use]
    pub fn count(&self) -> usize {
        self.all().map_or(0, |all| all.len())
    }

    /// [`all`](Self::all), filtered to elements whose value equals `value`.
    #[must_use]
    pub fn all_with_value(&self, value: &str) -> Option<Vec<Element<'a>>> {
        self.filter_all(|element| element.value() == Some(value))
    }

    /// [`all`](Self::all), filtered to elements carrying every given
    /// key with exactly the given value.
    #[must_use]
    pub fn all_with_attributes<I, K, V>(&self, attributes: I) -> Option<Vec<Element<'a>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let wanted: Vec<(K, V)> = attributes.into_iter().collect();
        self.filter_all(|element| {
            wanted
                .iter()
                .all(|(k, v)| element.attribute(k.as_ref()) == Some(v.as_ref()))
        })
    }

    /// [`all`](Self::all), filtered to elements carrying every given key.
    #[must_use]
    pub fn all_containing_attribute_keys<I, K>(&self, keys: I) -> Option<Vec<Element<'a>>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let wanted: Vec<K> = keys.into_iter().collect();
        self.filter_all(|element| {
            wanted
                .iter()
                .all(|k| element.attribute(k.as_ref()).is_some())
        })
    }

    fn filter_all(&self, keep: impl Fn(&Element<'a>) -> bool) -> Option<Vec<Element<'a>>> {
        let matching: Vec<_> = self.all()?.into_iter().filter(|e| keep(e)).collect();
        (!matching.is_empty()).then_some(matching)
    }

    /// Number of ancestors, the document element excluded.
    pub(crate) fn depth(&self) -> usize {
        let mut depth: usize = 0;
        let mut current = self.parent();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent();
        }
        depth.saturating_sub(1)
    }

    /// Compares names, attributes, values and children recursively,
    /// ignoring identity and the CDATA flag.
    #[must_use]
    pub fn same_structure(&self, other: &Element<'_>) -> bool {
        self.name() == other.name()
            && self.value() == other.value()
            && self.attributes().eq(other.attributes())
            && self.children().count() == other.children().count()
            && self
                .children()
                .zip(other.children())
                .all(|(a, b)| a.same_structure(&b))
    }

    // --- Output ---

    /// Renders this element and its subtree as indented XML.
    #[must_use]
    pub fn xml(&self) -> String {
        serial::serialize_element(self, &SerializeOptions::default())
    }

    /// Renders this element without indentation or newlines.
    #[must_use]
    pub fn xml_compact(&self) -> String {
        serial::serialize_element(self, &SerializeOptions::compact())
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Found { doc: a, id: x }, Self::Found { doc: b, id: y }) => {
                std::ptr::eq(*a, *b) && x == y
            }
            (
                Self::Missing { name: a, error: x },
                Self::Missing { name: b, error: y },
            ) => a == b && x == y,
            _ => false,
        }
    }
}
