#![forbid(unsafe_code)]

//! Builds the assertion document of an encrypted response.
//!
//! The decrypted assertion replaces the `EncryptedAssertion` and the
//! response-level signature is dropped: it covered the ciphertext, and the
//! assertion carries its own. The result is produced by splicing the
//! original text and parsing it afresh.

use crate::claims::RESPONSE;
use crate::settings::Settings;
use solna_core::{ns, Error};
use solna_dsig::SignedDocument;
use solna_xml::{select, QName, Splice};

const SIGNATURE: QName = QName::new(ns::DSIG, ns::node::SIGNATURE);

/// Whether `text` is a `Response` carrying an `EncryptedAssertion`.
pub fn is_encrypted(text: &str) -> bool {
    solna_xml::document::parse_text(text)
        .map(|doc| {
            let root = doc.root_element();
            RESPONSE.matches(root) && solna_enc::find_encrypted_assertion(root).is_some()
        })
        .unwrap_or(false)
}

/// The document that holds the assertion to validate and read.
///
/// `Ok(None)` means the response is not encrypted and the original
/// document is used as-is.
pub fn assemble(
    document: &SignedDocument,
    settings: Option<&Settings>,
) -> Result<Option<SignedDocument>, Error> {
    let text = document.text();
    let Ok(doc) = solna_xml::document::parse_text(text) else {
        return Ok(None);
    };
    let root = doc.root_element();
    if !RESPONSE.matches(root) {
        return Ok(None);
    }
    let Some(encrypted) = solna_enc::find_encrypted_assertion(root) else {
        return Ok(None);
    };

    let settings = settings.ok_or(Error::MissingTrustConfiguration)?;
    let key = settings.sp_private_key()?;
    let private_key = key
        .rsa_private_key()
        .ok_or_else(|| Error::Key("no RSA private key".into()))?;
    let assertion = solna_enc::decrypt_assertion(encrypted, private_key)?;

    let mut splice = Splice::new(text);
    if let Some(signature) = select::child(root, SIGNATURE) {
        tracing::debug!("dropping response signature over encrypted assertion");
        splice.remove_node(signature);
    }
    splice.append_child(root, assertion)?;
    splice.remove_node(encrypted);
    let assembled = splice.apply()?;

    let document = SignedDocument::new(assembled);
    tracing::debug!(
        signed_element_id = document.signed_element_id(),
        "assembled decrypted assertion document"
    );
    Ok(Some(document))
}
