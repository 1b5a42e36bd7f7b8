#![forbid(unsafe_code)]

//! A document handle bound to its signature verdict.

use crate::reference;
use crate::verify::{self, VerifyResult};
use solna_core::Error;
use solna_xml::XmlDocument;

/// XML text paired with the identity of the element its first signature
/// references.
///
/// Construction never fails: malformed or unsigned text simply has no
/// signed element and fails verification later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument {
    document: XmlDocument,
    signed_element_id: Option<String>,
}

impl SignedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let document = XmlDocument::new(text);
        let signed_element_id = extract_signed_element_id(document.text());
        Self {
            document,
            signed_element_id,
        }
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    /// The `ID` named by the first signature's reference, without `#`.
    ///
    /// Read straight from the markup; only [`Self::validate_document`]
    /// establishes that the signature over that element actually verifies.
    pub fn signed_element_id(&self) -> Option<&str> {
        self.signed_element_id.as_deref()
    }

    /// Verify the signature against a pinned certificate fingerprint.
    ///
    /// With `soft` set every failure, including malformed signature markup,
    /// is reported as `Ok(false)`. Otherwise failures are errors.
    pub fn validate_document(&self, fingerprint: &str, soft: bool) -> Result<bool, Error> {
        let outcome = verify::verify(self.text(), fingerprint);
        match outcome {
            Ok(VerifyResult::Valid { signed_element_id }) => {
                tracing::debug!(%signed_element_id, "signature verified");
                Ok(true)
            }
            Ok(VerifyResult::Invalid { reason }) => {
                tracing::debug!(%reason, "signature rejected");
                if soft {
                    Ok(false)
                } else {
                    Err(Error::SignatureInvalid(reason))
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "signature could not be checked");
                if soft {
                    Ok(false)
                } else {
                    Err(e)
                }
            }
        }
    }
}

fn extract_signed_element_id(text: &str) -> Option<String> {
    let doc = solna_xml::document::parse_text(text).ok()?;
    let sig = reference::find_signature(&doc)?;
    let uri = reference::reference_uri(sig)?;
    Some(uri.strip_prefix('#').unwrap_or(uri).to_owned())
}
