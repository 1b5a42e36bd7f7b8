#![forbid(unsafe_code)]

//! Owned XML text with on-demand parsing.

use solna_core::Error;

/// An owned XML document.
///
/// The text is kept as-is; call [`XmlDocument::parse_doc`] to obtain a
/// temporary `roxmltree::Document` borrowing from it. Malformed text is
/// accepted by [`XmlDocument::new`] so that rejection can happen at a later,
/// well-defined validation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Wrap text without checking that it is well formed.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        parse_text(&text)?;
        Ok(Self { text })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Parse the document and return a temporary `roxmltree::Document`.
    ///
    /// This re-parses the stored text on every call. Callers that need the
    /// tree repeatedly should parse once and pass the document down.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        parse_text(&self.text)
    }

    pub fn is_well_formed(&self) -> bool {
        self.parse_doc().is_ok()
    }
}

impl std::fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Parse text with Solna's parsing options.
pub fn parse_text(text: &str) -> Result<roxmltree::Document<'_>, Error> {
    roxmltree::Document::parse_with_options(text, crate::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_garbage() {
        let doc = XmlDocument::new("not xml at all");
        assert!(!doc.is_well_formed());
        assert!(matches!(doc.parse_doc(), Err(Error::XmlParse(_))));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(XmlDocument::parse("<a><b></a>".to_owned()).is_err());
        assert!(XmlDocument::parse("<a><b/></a>".to_owned()).is_ok());
    }

    #[test]
    fn dtd_is_rejected() {
        let xml = "<!DOCTYPE a [<!ENTITY x \"y\">]><a>&x;</a>";
        assert!(XmlDocument::parse(xml.to_owned()).is_err());
    }

    #[test]
    fn blank_documents() {
        assert!(XmlDocument::new("  \n").is_empty());
        assert!(!XmlDocument::new("<a/>").is_empty());
    }
}
