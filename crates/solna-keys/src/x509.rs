#![forbid(unsafe_code)]

//! X.509 certificates and their fingerprints.
//!
//! Trust in an identity provider is pinned either to its certificate or to
//! the SHA-1 fingerprint of that certificate's DER encoding. Fingerprints are
//! written as upper-case hex pairs joined by colons
//! (`6D:AD:D5:...`); comparison ignores case and any separators.

use base64::Engine;
use der::{Decode, Encode};
use solna_core::Error;

/// A parsed X.509 certificate together with its DER encoding.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    inner: x509_cert::Certificate,
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject())
            .field("fingerprint", &self.fingerprint_sha1())
            .finish()
    }
}

impl Certificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, Error> {
        let inner = x509_cert::Certificate::from_der(&der)
            .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))?;
        Ok(Self { der, inner })
    }

    /// Parse a `-----BEGIN CERTIFICATE-----` PEM block.
    pub fn from_pem(pem: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(pem)
            .map_err(|e| Error::Certificate(format!("invalid PEM encoding: {e}")))?;
        // Some PEM files have extra newlines around the block.
        let (label, der) = pem_rfc7468::decode_vec(text.trim().as_bytes())
            .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;
        if label != "CERTIFICATE" {
            return Err(Error::Certificate(format!(
                "expected CERTIFICATE PEM label, got: {label}"
            )));
        }
        Self::from_der(der)
    }

    /// Parse bare base64 DER, as carried in `ds:X509Certificate`.
    /// Whitespace inside the text is ignored.
    pub fn from_base64(text: &str) -> Result<Self, Error> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| Error::Base64(format!("certificate: {e}")))?;
        Self::from_der(der)
    }

    /// Parse either a PEM block or bare base64.
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.contains("-----BEGIN") {
            Self::from_pem(text.as_bytes())
        } else {
            Self::from_base64(text)
        }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// SHA-1 fingerprint as colon-separated upper-case hex.
    pub fn fingerprint_sha1(&self) -> String {
        fingerprint_sha1(&self.der)
    }

    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// Validity window as `(not_before, not_after)` in RFC 3339 form.
    pub fn validity(&self) -> (String, String) {
        let v = &self.inner.tbs_certificate.validity;
        (
            v.not_before.to_date_time().to_string(),
            v.not_after.to_date_time().to_string(),
        )
    }

    /// The RSA public key from SubjectPublicKeyInfo.
    pub fn public_key(&self) -> Result<rsa::RsaPublicKey, Error> {
        use pkcs8::DecodePublicKey;
        let spki_der = self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;
        rsa::RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
            Error::Certificate(format!("certificate does not carry an RSA public key: {e}"))
        })
    }
}

/// SHA-1 fingerprint of arbitrary DER, colon-separated upper-case hex.
pub fn fingerprint_sha1(der: &[u8]) -> String {
    let digest = solna_crypto::digest::sha1(der);
    digest
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(":")
}

/// RSA public key of a DER-encoded certificate.
pub fn public_key_from_cert(der: &[u8]) -> Result<rsa::RsaPublicKey, Error> {
    Certificate::from_der(der.to_vec())?.public_key()
}

/// Lower-case hex digits only; separators and other characters are dropped.
pub fn normalize_fingerprint(fingerprint: &str) -> String {
    fingerprint
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compare two fingerprints after normalization. Empty never matches.
pub fn fingerprints_match(a: &str, b: &str) -> bool {
    let a = normalize_fingerprint(a);
    !a.is_empty() && a == normalize_fingerprint(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDP_CERT: &str = include_str!("../../../test-data/keys/idp-cert.pem");
    const IDP_FINGERPRINT: &str = "6D:AD:D5:ED:9E:9E:0B:DE:10:0A:97:90:22:EC:35:36:78:F3:83:E0";

    #[test]
    fn pem_certificate_fingerprint() {
        let cert = Certificate::from_pem(IDP_CERT.as_bytes()).unwrap();
        assert_eq!(cert.fingerprint_sha1(), IDP_FINGERPRINT);
        assert!(cert.subject().contains("idp.example.test"));
    }

    #[test]
    fn bare_base64_matches_pem() {
        let body: String = IDP_CERT
            .lines()
            .filter(|l| !l.starts_with("-----"))
            .collect::<Vec<_>>()
            .join("\n");
        let from_b64 = Certificate::parse(&body).unwrap();
        let from_pem = Certificate::parse(IDP_CERT).unwrap();
        assert_eq!(from_b64.der(), from_pem.der());
    }

    #[test]
    fn public_key_is_rsa_2048() {
        use rsa::traits::PublicKeyParts;
        let cert = Certificate::parse(IDP_CERT).unwrap();
        assert_eq!(cert.public_key().unwrap().size(), 256);
        assert_eq!(public_key_from_cert(cert.der()).unwrap(), cert.public_key().unwrap());
    }

    #[test]
    fn fingerprint_normalization() {
        assert_eq!(normalize_fingerprint("6D:AD:d5"), "6dadd5");
        assert!(fingerprints_match(
            IDP_FINGERPRINT,
            "6dadd5ed9e9e0bde100a979022ec353678f383e0"
        ));
        assert!(!fingerprints_match("", ""));
        assert!(!fingerprints_match(IDP_FINGERPRINT, "00:11"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(Certificate::parse("not base64!"), Err(Error::Base64(_))));
        assert!(matches!(Certificate::from_der(vec![1, 2, 3]), Err(Error::Certificate(_))));
    }
}
