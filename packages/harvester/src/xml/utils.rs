//! XML utility functions for navigating namespace-qualified DOM trees.

use roxmltree::Node;

/// Check if a node is an element with the given namespace and local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::has_tag;
///
/// let xml = r#"<r xmlns="urn:x"><item/></r>"#;
/// let doc = Document::parse(xml).unwrap();
/// let item = doc.root_element().first_element_child().unwrap();
/// assert!(has_tag(item, "urn:x", "item"));
/// assert!(!has_tag(item, "urn:y", "item"));
/// ```
pub fn has_tag(node: Node<'_, '_>, ns: &str, tag: &str) -> bool {
    node.is_element() && node.has_tag_name((ns, tag))
}

/// Find the first child element with the given namespace and local name.
pub fn find_child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, ns, tag))
}

/// Find a descendant element following a path of local names, all in `ns`.
///
/// # Arguments
/// * `node` - Starting node
/// * `ns` - Namespace URI shared by every path step
/// * `path` - Slash-separated path of local names (e.g., "header/identifier")
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use oai_harvester::xml::find_by_path;
///
/// let xml = r#"<record xmlns="urn:x"><header><identifier>id-1</identifier></header></record>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let id = find_by_path(doc.root_element(), "urn:x", "header/identifier");
/// assert_eq!(id.and_then(|n| n.text()), Some("id-1"));
/// ```
pub fn find_by_path<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    path: &str,
) -> Option<Node<'a, 'input>> {
    let mut current = node;

    for part in path.split('/') {
        current = find_child(current, ns, part)?;
    }

    Some(current)
}

/// All descendant elements (the node itself included) with the given name, in document order.
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &'a str,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().filter(move |n| has_tag(*n, ns, tag))
}

/// Get the text content of a node, trimmed.
///
/// # Returns
/// Trimmed text content, or empty string if no text
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const NS: &str = "http://www.openarchives.org/OAI/2.0/";

    #[test]
    fn test_has_tag_requires_namespace() {
        let xml = r#"<root><record/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let record = doc.root_element().first_element_child().unwrap();
        assert!(!has_tag(record, NS, "record"));
        assert!(record.has_tag_name("record"));
    }

    #[test]
    fn test_has_tag_with_prefix() {
        let xml = format!(r#"<oai:root xmlns:oai="{NS}"><oai:record/></oai:root>"#);
        let doc = Document::parse(&xml).unwrap();
        let record = doc.root_element().first_element_child().unwrap();
        assert!(has_tag(record, NS, "record"));
    }

    #[test]
    fn test_find_child() {
        let xml = format!(r#"<root xmlns="{NS}"><a/><b/><c/></root>"#);
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();

        assert!(find_child(root, NS, "a").is_some());
        assert!(find_child(root, NS, "b").is_some());
        assert!(find_child(root, NS, "d").is_none());
    }

    #[test]
    fn test_find_by_path() {
        let xml = format!(
            r#"<record xmlns="{NS}"><header><identifier> oai:x:1 </identifier></header></record>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();

        let target = find_by_path(root, NS, "header/identifier");
        assert_eq!(get_text(target.unwrap()), "oai:x:1");

        assert!(find_by_path(root, NS, "header/datestamp").is_none());
        assert!(find_by_path(root, NS, "missing/path").is_none());
    }

    #[test]
    fn test_find_descendants_document_order() {
        let xml = format!(
            r#"<root xmlns="{NS}"><list><record n="1"/><record n="2"/></list><record n="3"/></root>"#
        );
        let doc = Document::parse(&xml).unwrap();

        let order: Vec<_> = find_descendants(doc.root_element(), NS, "record")
            .filter_map(|n| n.attribute("n"))
            .collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_get_text() {
        let xml = r#"<root>  trimmed text  </root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "trimmed text");

        let empty = Document::parse("<root/>").unwrap();
        assert_eq!(get_text(empty.root_element()), "");
    }
}
