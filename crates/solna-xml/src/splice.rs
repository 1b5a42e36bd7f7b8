#![forbid(unsafe_code)]

//! Byte-range text splicing.
//!
//! Documents are never edited in place. Instead, a set of edits expressed
//! against the original text (using the parser's node ranges) is applied in
//! one pass to produce new text, which is then parsed afresh.

use solna_core::Error;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Remove(Range<usize>),
    Insert(usize, String),
}

impl Edit {
    fn position(&self) -> usize {
        match self {
            Self::Remove(r) => r.start,
            Self::Insert(at, _) => *at,
        }
    }
}

/// A pending set of edits over a piece of text.
#[derive(Debug, Clone)]
pub struct Splice<'a> {
    text: &'a str,
    edits: Vec<Edit>,
}

impl<'a> Splice<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            edits: Vec::new(),
        }
    }

    /// Remove the byte range occupied by `node`.
    pub fn remove_node(&mut self, node: roxmltree::Node<'_, '_>) -> &mut Self {
        self.edits.push(Edit::Remove(node.range()));
        self
    }

    /// Insert `content` right before the end tag of `element`.
    pub fn append_child(
        &mut self,
        element: roxmltree::Node<'_, '_>,
        content: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        let at = end_tag_start(self.text, element)?;
        self.edits.push(Edit::Insert(at, content.into()));
        Ok(self)
    }

    /// Apply all edits and return the new text.
    ///
    /// Removals must not overlap each other; an insertion may not fall
    /// strictly inside a removed range.
    pub fn apply(&self) -> Result<String, Error> {
        let mut edits = self.edits.clone();
        edits.sort_by_key(Edit::position);

        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for edit in &edits {
            match edit {
                Edit::Remove(r) => {
                    if r.start < cursor || r.end > self.text.len() {
                        return Err(Error::XmlParse("overlapping document edits".into()));
                    }
                    out.push_str(&self.text[cursor..r.start]);
                    cursor = r.end;
                }
                Edit::Insert(at, content) => {
                    if *at < cursor {
                        return Err(Error::XmlParse("insertion inside removed range".into()));
                    }
                    out.push_str(&self.text[cursor..*at]);
                    out.push_str(content);
                    cursor = *at;
                }
            }
        }
        out.push_str(&self.text[cursor..]);
        Ok(out)
    }
}

/// Byte offset of the `</...>` end tag of `element`.
fn end_tag_start(text: &str, element: roxmltree::Node<'_, '_>) -> Result<usize, Error> {
    let range = element.range();
    let source = &text[range.clone()];
    if source.ends_with("/>") {
        return Err(Error::XmlParse(format!(
            "cannot append to empty element <{}/>",
            element.tag_name().name()
        )));
    }
    source
        .rfind("</")
        .map(|offset| range.start + offset)
        .ok_or_else(|| Error::XmlParse("element has no end tag".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_and_append() {
        let xml = "<r><a>1</a><b/><c>3</c></r>";
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        let a = root.first_element_child().unwrap();
        let c = root.last_element_child().unwrap();

        let mut splice = Splice::new(xml);
        splice.remove_node(a);
        splice.remove_node(c);
        splice.append_child(root, "<d/>").unwrap();
        assert_eq!(splice.apply().unwrap(), "<r><b/><d/></r>");
    }

    #[test]
    fn append_to_prefixed_root() {
        let xml = r#"<p:r xmlns:p="urn:p"><x/></p:r>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut splice = Splice::new(xml);
        splice.append_child(doc.root_element(), "<y/>").unwrap();
        assert_eq!(splice.apply().unwrap(), r#"<p:r xmlns:p="urn:p"><x/><y/></p:r>"#);
    }

    #[test]
    fn cannot_append_to_self_closing() {
        let xml = "<r/>";
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut splice = Splice::new(xml);
        assert!(splice.append_child(doc.root_element(), "<y/>").is_err());
    }

    #[test]
    fn no_edits_is_identity() {
        let xml = "<r>text</r>";
        assert_eq!(Splice::new(xml).apply().unwrap(), xml);
    }
}
