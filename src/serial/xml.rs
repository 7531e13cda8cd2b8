//! XML serializer.
//!
//! Renders a `Document` or a single element back to XML text. Pretty output
//! puts each child element on its own line, indented by one `indent_str` per
//! ancestor. Compact output is the same rendering with indentation and
//! newlines turned off.

use std::fmt::Write;

use crate::tree::{Document, Element};
use crate::util::escape::write_escaped;

/// Options controlling XML serialization output.
///
/// ```
/// use xmlgrove::Document;
/// use xmlgrove::serial::{serialize_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let xml = serialize_with_options(&doc, &SerializeOptions::default().indent_str("  "));
/// assert!(xml.contains("\n  <child>Hello</child>\n"));
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Whether to put child elements on their own indented lines.
    /// Defaults to `true`.
    pub indent: bool,
    /// The string written once per nesting level. Defaults to a tab.
    pub indent_str: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: true,
            indent_str: "\t".to_string(),
        }
    }
}

impl SerializeOptions {
    /// Options for single-line output.
    #[must_use]
    pub fn compact() -> Self {
        Self::default().indent(false)
    }

    /// Enables or disables indented output.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the string written once per nesting level.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }
}

/// Serializes a document as indented XML with its declaration.
///
/// ```
/// use xmlgrove::Document;
/// use xmlgrove::serial::serialize;
///
/// let doc = Document::parse_str("<a><b>1</b></a>").unwrap();
/// assert_eq!(
///     serialize(&doc),
///     "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n<a>\n\t<b>1</b>\n</a>"
/// );
/// ```
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_with_options(doc, &SerializeOptions::default())
}

/// Serializes a document with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, options: &SerializeOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<?xml version=\"{:?}\" encoding=\"{}\" standalone=\"{}\"?>",
        doc.version, doc.encoding, doc.standalone
    );
    if options.indent {
        out.push('\n');
    }
    for child in doc.as_element().children() {
        write_element(&child, &mut out, options, 0);
    }
    out
}

/// Serializes one element and its subtree.
///
/// Indentation starts from the element's depth in its tree, so a nested
/// element renders the same way it appears inside the whole document.
#[must_use]
pub fn serialize_element(element: &Element<'_>, options: &SerializeOptions) -> String {
    let mut out = String::new();
    write_element(element, &mut out, options, element.depth());
    out
}

fn write_indent(out: &mut String, options: &SerializeOptions, depth: usize) {
    if options.indent {
        for _ in 0..depth {
            out.push_str(&options.indent_str);
        }
    }
}

fn write_element(element: &Element<'_>, out: &mut String, options: &SerializeOptions, depth: usize) {
    write_indent(out, options, depth);
    out.push('<');
    out.push_str(element.name());
    for (key, value) in element.attributes() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        write_escaped(out, value);
        out.push('"');
    }

    let mut children = element.children().peekable();
    if children.peek().is_some() {
        out.push('>');
        if options.indent {
            out.push('\n');
        }
        for child in children {
            write_element(&child, out, options, depth + 1);
            if options.indent {
                out.push('\n');
            }
        }
        write_indent(out, options, depth);
    } else if let Some(value) = element.value() {
        out.push('>');
        if element.is_cdata() && !value.contains("]]>") {
            out.push_str("<![CDATA[");
            out.push_str(value);
            out.push_str("]]>");
        } else {
            write_escaped(out, value);
        }
    } else {
        out.push_str(" />");
        return;
    }

    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NO_ATTRS: [(&str, &str); 0] = [];
    const HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>";

    fn built() -> Document {
        let mut doc = Document::new();
        let children = doc.add_element(doc.document_id(), "children", None, NO_ATTRS);
        doc.add_element(children, "child", Some("value"), [("attribute", "attributeValue<&>")]);
        doc.add_element(children, "child", None, NO_ATTRS);
        doc.add_element(children, "child", Some("&<>'\""), NO_ATTRS);
        doc
    }

    #[test]
    fn test_serialize_pretty() {
        assert_eq!(
            built().xml(),
            format!(
                "{HEADER}\n<children>\n\t<child attribute=\"attributeValue&lt;&amp;&gt;\">value</child>\n\t<child />\n\t<child>&amp;&lt;&gt;&apos;&quot;</child>\n</children>"
            )
        );
    }

    #[test]
    fn test_serialize_compact() {
        assert_eq!(
            built().xml_compact(),
            format!(
                "{HEADER}<children><child attribute=\"attributeValue&lt;&amp;&gt;\">value</child><child /><child>&amp;&lt;&gt;&apos;&quot;</child></children>"
            )
        );
    }

    #[test]
    fn test_serialize_empty_document() {
        assert_eq!(Document::new().xml(), format!("{HEADER}\n"));
    }

    #[test]
    fn test_serialize_custom_header() {
        let mut doc = Document::parse_str("<foo><bar>hello</bar></foo>").unwrap();
        doc.version = 2.0;
        doc.encoding = "utf-16".to_string();
        doc.standalone = "yes".to_string();
        assert_eq!(
            doc.xml(),
            "<?xml version=\"2.0\" encoding=\"utf-16\" standalone=\"yes\"?>\n<foo>\n\t<bar>hello</bar>\n</foo>"
        );
    }

    #[test]
    fn test_serialize_nested_indentation() {
        let doc = Document::parse_str("<a><b><c>deep</c></b></a>").unwrap();
        assert_eq!(
            doc.root().xml(),
            "<a>\n\t<b>\n\t\t<c>deep</c>\n\t</b>\n</a>"
        );
        assert_eq!(
            doc.root().child("b").xml(),
            "\t<b>\n\t\t<c>deep</c>\n\t</b>"
        );
    }

    #[test]
    fn test_children_take_precedence_over_value() {
        let mut doc = Document::parse_str("<a><b/></a>").unwrap();
        let a = doc.root().id().unwrap();
        doc.set_value(a, Some("ignored"));
        assert_eq!(doc.root().xml_compact(), "<a><b /></a>");
    }

    #[test]
    fn test_serialize_cdata() {
        let mut doc = Document::new();
        let root = doc.add_element(doc.document_id(), "script", None, NO_ATTRS);
        doc.set_cdata_value(root, "if (a < b) {}");
        assert_eq!(doc.root().xml(), "<script><![CDATA[if (a < b) {}]]></script>");
        doc.set_cdata_value(root, "]]>");
        assert_eq!(doc.root().xml(), "<script>]]&gt;</script>");
    }

    #[test]
    fn test_serialize_placeholder() {
        let doc = Document::new();
        assert_eq!(doc.root().child("missing").xml(), "<#document />");
    }

    #[test]
    fn test_custom_indent_str() {
        let doc = Document::parse_str("<root><child/></root>").unwrap();
        let xml = serialize_with_options(&doc, &SerializeOptions::default().indent_str("  "));
        assert!(xml.ends_with("<root>\n  <child />\n</root>"));
    }
}
