//! Serialize a subtree of a parsed document as a standalone XML document.
//!
//! roxmltree is read-only, so records are written back out by walking the
//! tree. Namespace declarations inherited from ancestors outside the subtree
//! are re-declared on its root element, so the output is well-formed on its
//! own.

use roxmltree::{Node, NodeType};

/// Declaration prepended to every serialized document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// The `xml:` namespace is implicitly bound and must never be declared.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Serialize `node` and its descendants to UTF-8 bytes with an XML declaration.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::serialize_element;
///
/// let doc = Document::parse(r#"<a xmlns="urn:x"><b k="v">t</b></a>"#).unwrap();
/// let b = doc.root_element().first_element_child().unwrap();
/// let bytes = serialize_element(b);
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<b xmlns=\"urn:x\" k=\"v\">t</b>"
/// );
/// ```
pub fn serialize_element(node: Node<'_, '_>) -> Vec<u8> {
    let mut out = String::with_capacity(node.range().len() + XML_DECLARATION.len() + 64);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_node(&mut out, node, true);
    out.into_bytes()
}

fn write_node(out: &mut String, node: Node<'_, '_>, is_root: bool) {
    match node.node_type() {
        NodeType::Element => write_element(out, node, is_root),
        NodeType::Text => escape_into(out, node.text().unwrap_or_default(), false),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(node.text().unwrap_or_default());
            out.push_str("-->");
        }
        NodeType::PI => {
            if let Some(pi) = node.pi() {
                out.push_str("<?");
                out.push_str(pi.target);
                if let Some(value) = pi.value {
                    out.push(' ');
                    out.push_str(value);
                }
                out.push_str("?>");
            }
        }
        NodeType::Root => {
            for child in node.children() {
                write_node(out, child, false);
            }
        }
    }
}

fn write_element(out: &mut String, node: Node<'_, '_>, is_root: bool) {
    let tag = node.tag_name();
    let name = qualified_name(node, tag.namespace(), tag.name(), false);

    out.push('<');
    out.push_str(&name);

    write_namespace_declarations(out, node, is_root);

    for attr in node.attributes() {
        out.push(' ');
        out.push_str(&qualified_name(node, attr.namespace(), attr.name(), true));
        out.push_str("=\"");
        escape_into(out, attr.value(), true);
        out.push('"');
    }

    if node.has_children() {
        out.push('>');
        for child in node.children() {
            write_node(out, child, false);
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    } else {
        out.push_str("/>");
    }
}

/// Declare every namespace in scope on the root, and only new bindings below it.
fn write_namespace_declarations(out: &mut String, node: Node<'_, '_>, is_root: bool) {
    let parent = node.parent_element().filter(|_| !is_root);

    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE {
            continue;
        }
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited {
            continue;
        }
        match ns.name() {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        escape_into(out, ns.uri(), true);
        out.push('"');
    }

    // A parent's default namespace that was unset on this element
    if node.tag_name().namespace().is_none() {
        let parent_has_default =
            parent.is_some_and(|p| p.namespaces().any(|pns| pns.name().is_none()));
        let has_default = node.namespaces().any(|ns| ns.name().is_none());
        if parent_has_default && !has_default {
            out.push_str(" xmlns=\"\"");
        }
    }
}

/// Prefix a local name with the prefix bound to `namespace` in scope of `node`.
///
/// Attributes never pick up the default namespace.
fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str, is_attr: bool) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };

    if uri == XML_NAMESPACE {
        return format!("xml:{local}");
    }

    let mut default_match = false;
    for ns in node.namespaces().filter(|ns| ns.uri() == uri) {
        match ns.name() {
            Some(prefix) => return format!("{prefix}:{local}"),
            None => default_match = true,
        }
    }

    if default_match && !is_attr {
        return local.to_string();
    }

    tracing::debug!(uri, local, "No prefix bound for namespace, writing local name");
    local.to_string()
}

fn escape_into(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\n' if in_attribute => out.push_str("&#10;"),
            '\t' if in_attribute => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}
