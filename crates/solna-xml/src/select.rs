#![forbid(unsafe_code)]

//! Namespace-qualified element selection.
//!
//! SAML producers disagree on prefixes and, occasionally, on namespaces, so
//! lookups are expressed as small ordered candidate lists: the first
//! candidate that matches wins.

use roxmltree::Node;

/// An expanded element name. An empty `ns` means "no namespace".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName {
    pub ns: &'static str,
    pub local: &'static str,
}

impl QName {
    pub const fn new(ns: &'static str, local: &'static str) -> Self {
        Self { ns, local }
    }

    /// Check whether `node` is an element with this expanded name.
    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        node.is_element()
            && node.tag_name().name() == self.local
            && node.tag_name().namespace().unwrap_or("") == self.ns
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ns.is_empty() {
            f.write_str(self.local)
        } else {
            write!(f, "{{{}}}{}", self.ns, self.local)
        }
    }
}

/// A single location step: an element name, or a local name in any namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Named(QName),
    AnyNamespace(&'static str),
}

impl Step {
    pub fn matches(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::Named(q) => q.matches(node),
            Self::AnyNamespace(local) => node.is_element() && node.tag_name().name() == *local,
        }
    }
}

impl From<QName> for Step {
    fn from(q: QName) -> Self {
        Self::Named(q)
    }
}

/// First child element of `parent` with the given expanded name.
pub fn child<'a, 'input>(parent: Node<'a, 'input>, name: QName) -> Option<Node<'a, 'input>> {
    parent.children().find(|n| name.matches(*n))
}

/// All child elements of `parent` with the given expanded name.
pub fn children<'a, 'input>(
    parent: Node<'a, 'input>,
    name: QName,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent.children().filter(move |n| name.matches(*n))
}

/// All element children of `parent`, in document order.
pub fn element_children<'a, 'input>(
    parent: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    parent.children().filter(|n| n.is_element())
}

/// First child of `parent` matching any candidate; candidates are tried in order.
pub fn first_child_of<'a, 'input>(
    parent: Node<'a, 'input>,
    candidates: &[QName],
) -> Option<Node<'a, 'input>> {
    candidates.iter().find_map(|q| child(parent, *q))
}

/// Follow `steps` from `start`, returning the first match in document order.
///
/// This mirrors XPath's "first node of a relative location path" semantics:
/// every matching child is explored depth-first, not only the first one.
pub fn path<'a, 'input>(start: Node<'a, 'input>, steps: &[Step]) -> Option<Node<'a, 'input>> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(start);
    };
    start
        .children()
        .filter(|n| step.matches(*n))
        .find_map(|n| path(n, rest))
}

/// Try several location paths in order; the first that yields a node wins.
pub fn first_path<'a, 'input>(
    start: Node<'a, 'input>,
    candidates: &[&[Step]],
) -> Option<Node<'a, 'input>> {
    candidates.iter().find_map(|steps| path(start, steps))
}

/// First descendant element (including `root` itself) with the given name.
pub fn descendant<'a, 'input>(root: Node<'a, 'input>, name: QName) -> Option<Node<'a, 'input>> {
    root.descendants().find(|n| name.matches(*n))
}

/// Attribute names treated as element identifiers.
pub const ID_ATTRS: [&str; 3] = ["ID", "Id", "id"];

/// All elements in the document whose identifier attribute equals `id`.
pub fn elements_with_id<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id: &str,
) -> Vec<Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| n.is_element() && ID_ATTRS.iter().any(|a| n.attribute(*a) == Some(id)))
        .collect()
}

/// Concatenated text content of an element; `None` when it has no text.
pub fn text_of(node: Node<'_, '_>) -> Option<String> {
    let mut texts = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .peekable();
    texts.peek()?;
    Some(texts.collect())
}

/// Namespace declarations in scope for `node`, as `(prefix, uri)` pairs.
/// The default namespace has an empty prefix; the implicit `xml` binding is
/// not included.
pub fn in_scope_namespaces(node: Node<'_, '_>) -> Vec<(String, String)> {
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .map(|ns| (ns.name().unwrap_or("").to_owned(), ns.uri().to_owned()))
        .collect()
}

/// The qualified tag name exactly as written in the source (`saml:Assertion`).
///
/// `text` must be the string `node` was parsed from; an empty name is
/// returned when the range does not fall inside it.
pub fn raw_tag_name<'t>(node: Node<'_, '_>, text: &'t str) -> &'t str {
    let rest = text.get(node.range().start + 1..).unwrap_or("");
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Byte offset just past the `>` closing the start tag of `element`.
///
/// `None` for a self-closing element or when `text` is not the source of
/// `element`.
pub fn start_tag_end(element: Node<'_, '_>, text: &str) -> Option<usize> {
    let range = element.range();
    let tag = text.get(range.clone())?;
    // Attribute values may contain '>' but never a raw '<'.
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => {
                return (!tag[..i].ends_with('/')).then_some(range.start + i + 1);
            }
            _ => {}
        }
    }
    None
}
