#![forbid(unsafe_code)]

//! Enveloped signature verification against a pinned fingerprint.
//!
//! Processing order:
//! 1. Find the first `<ds:Signature>` and its embedded X.509 certificate
//! 2. Compare the certificate's SHA-1 fingerprint with the pinned one
//! 3. Resolve the single `<ds:Reference>`, canonicalize, compare digests
//! 4. Canonicalize `<ds:SignedInfo>` and verify `<ds:SignatureValue>`
//!    with the certificate's public key

use crate::reference;
use base64::Engine;
use solna_core::{ns, Error};
use solna_keys::{fingerprints_match, keyinfo};
use solna_xml::select::{self, QName};

/// Result of signature verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// The signature verifies and covers the element with this ID.
    Valid { signed_element_id: String },
    Invalid { reason: String },
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::Valid { .. })
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Verify the first signature in `xml` against `fingerprint`.
///
/// Trust failures (no signature, wrong certificate, digest or signature
/// mismatch) come back as [`VerifyResult::Invalid`]. Malformed signature
/// markup and unsupported algorithms are errors.
pub fn verify(xml: &str, fingerprint: &str) -> Result<VerifyResult, Error> {
    let doc = solna_xml::document::parse_text(xml)?;

    let Some(sig) = reference::find_signature(&doc) else {
        return Ok(VerifyResult::invalid("document is not signed"));
    };

    let cert = match select::child(sig, QName::new(ns::DSIG, ns::node::KEY_INFO)) {
        Some(key_info) => keyinfo::x509_certificate(key_info)?,
        None => None,
    };
    let Some(cert) = cert else {
        return Ok(VerifyResult::invalid(
            "Certificate element missing in response (ds:X509Certificate)",
        ));
    };
    let actual = cert.fingerprint_sha1();
    if !fingerprints_match(&actual, fingerprint) {
        tracing::debug!(expected = fingerprint, actual = %actual, "certificate fingerprint mismatch");
        return Ok(VerifyResult::invalid("Fingerprint mismatch"));
    }

    let signed_info = reference::read_signed_info(sig)?;
    let expected_digest = base64::engine::general_purpose::STANDARD
        .decode(&signed_info.reference.digest_value)
        .map_err(|e| Error::Base64(format!("DigestValue: {e}")))?;

    let (target, digest) = match reference::digest_reference(xml, &doc, sig, &signed_info.reference) {
        Ok(found) => found,
        Err(Error::SignatureInvalid(reason)) => return Ok(VerifyResult::Invalid { reason }),
        Err(e) => return Err(e),
    };
    if digest != expected_digest {
        return Ok(VerifyResult::invalid("Digest mismatch"));
    }

    let canonical = reference::canonical_signed_info(xml, &signed_info)?;
    let signature_value = select::child(sig, QName::new(ns::DSIG, ns::node::SIGNATURE_VALUE))
        .and_then(select::text_of)
        .ok_or_else(|| Error::MissingElement(ns::node::SIGNATURE_VALUE.into()))?;
    let compact: String = signature_value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let signature_bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| Error::Base64(format!("SignatureValue: {e}")))?;

    let algorithm = solna_crypto::sign::from_uri(&signed_info.signature_method)?;
    let key = solna_crypto::sign::SigningKey::RsaPublic(cert.public_key()?);
    if !algorithm.verify(&key, &canonical, &signature_bytes)? {
        return Ok(VerifyResult::invalid("Key validation error"));
    }

    let signed_element_id = select::ID_ATTRS
        .iter()
        .find_map(|a| target.attribute(*a))
        .unwrap_or_default()
        .to_owned();
    Ok(VerifyResult::Valid { signed_element_id })
}
