#![forbid(unsafe_code)]

//! Enveloped signature creation.
//!
//! Signs a document containing a [`crate::SignatureTemplate`]: the
//! reference digest is written into `DigestValue`, then the canonical
//! `SignedInfo` is signed into `SignatureValue`.

use crate::reference;
use base64::Engine;
use solna_core::{ns, Error};
use solna_keys::Key;
use solna_xml::select::{self, QName};
use solna_xml::{document::parse_text, Splice};

/// Sign the first `<ds:Signature>` template in `template_xml`.
///
/// The template's `DigestValue` and `SignatureValue` must be empty,
/// non-self-closing elements. Returns the signed document text.
pub fn sign(key: &Key, template_xml: &str) -> Result<String, Error> {
    let engine = base64::engine::general_purpose::STANDARD;

    let with_digest = {
        let doc = parse_text(template_xml)?;
        let sig = reference::find_signature(&doc)
            .ok_or_else(|| Error::MissingElement(ns::node::SIGNATURE.into()))?;
        let signed_info = reference::read_signed_info(sig)?;
        if !signed_info.reference.digest_value.is_empty() {
            return Err(Error::InvalidArgument("DigestValue is already filled in".into()));
        }
        let (_, digest) =
            reference::digest_reference(template_xml, &doc, sig, &signed_info.reference)?;

        let digest_value = select::path(
            signed_info.node,
            &[
                QName::new(ns::DSIG, ns::node::REFERENCE).into(),
                QName::new(ns::DSIG, ns::node::DIGEST_VALUE).into(),
            ],
        )
        .ok_or_else(|| Error::MissingElement(ns::node::DIGEST_VALUE.into()))?;

        let mut splice = Splice::new(template_xml);
        splice.append_child(digest_value, engine.encode(digest))?;
        splice.apply()?
    };

    let doc = parse_text(&with_digest)?;
    let sig = reference::find_signature(&doc)
        .ok_or_else(|| Error::MissingElement(ns::node::SIGNATURE.into()))?;
    let signed_info = reference::read_signed_info(sig)?;
    let canonical = reference::canonical_signed_info(&with_digest, &signed_info)?;

    let algorithm = solna_crypto::sign::from_uri(&signed_info.signature_method)?;
    let signature = algorithm.sign(&key.to_signing_key(), &canonical)?;

    let signature_value = select::child(sig, QName::new(ns::DSIG, ns::node::SIGNATURE_VALUE))
        .ok_or_else(|| Error::MissingElement(ns::node::SIGNATURE_VALUE.into()))?;
    let mut splice = Splice::new(&with_digest);
    splice.append_child(signature_value, engine.encode(signature))?;
    splice.apply()
}

/// Insert `template` into the element with ID `element_id`, directly after
/// its `Issuer` child (or as its first child when there is none), and sign.
///
/// That position is where the SAML schema places `ds:Signature` in both
/// `Response` and `Assertion`.
pub fn sign_element(
    key: &Key,
    xml: &str,
    element_id: &str,
    template: &crate::SignatureTemplate,
) -> Result<String, Error> {
    let doc = parse_text(xml)?;
    let target = match select::elements_with_id(&doc, element_id).as_slice() {
        [one] => *one,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "expected exactly one element with ID {element_id:?}"
            )))
        }
    };
    let issuer = select::element_children(target)
        .next()
        .filter(|n| n.tag_name().name() == ns::node::ISSUER);
    let at = match issuer {
        Some(issuer) => issuer.range().end,
        None => select::start_tag_end(target, xml).ok_or_else(|| {
            Error::InvalidArgument("cannot sign a self-closing element".into())
        })?,
    };

    let mut out = String::with_capacity(xml.len() + 1024);
    out.push_str(&xml[..at]);
    out.push_str(&template.to_xml());
    out.push_str(&xml[at..]);
    sign(key, &out)
}
