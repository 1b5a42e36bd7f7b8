#![forbid(unsafe_code)]

//! Enveloped signature templates.

use solna_core::{algorithm, ns};

/// An unsigned `<ds:Signature>` skeleton with empty `DigestValue` and
/// `SignatureValue`, ready for [`crate::sign::sign`].
#[derive(Debug, Clone)]
pub struct SignatureTemplate {
    pub reference_id: String,
    pub signature_method: &'static str,
    pub digest_method: &'static str,
    /// Base64 DER to embed under `KeyInfo/X509Data`.
    pub certificate: Option<String>,
    /// PrefixList for the reference's exclusive canonicalization.
    pub inclusive_prefixes: Vec<String>,
}

impl SignatureTemplate {
    /// RSA-SHA256 over a SHA-256 digest of the element with `reference_id`.
    pub fn new(reference_id: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            signature_method: algorithm::RSA_SHA256,
            digest_method: algorithm::SHA256,
            certificate: None,
            inclusive_prefixes: Vec::new(),
        }
    }

    pub fn with_algorithms(mut self, signature_method: &'static str, digest_method: &'static str) -> Self {
        self.signature_method = signature_method;
        self.digest_method = digest_method;
        self
    }

    pub fn with_certificate(mut self, base64_der: impl Into<String>) -> Self {
        self.certificate = Some(base64_der.into());
        self
    }

    pub fn with_inclusive_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.inclusive_prefixes = prefixes.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    pub fn to_xml(&self) -> String {
        let inclusive = if self.inclusive_prefixes.is_empty() {
            String::new()
        } else {
            format!(
                r#"<ec:InclusiveNamespaces xmlns:ec="{}" PrefixList="{}"/>"#,
                ns::EXC_C14N,
                self.inclusive_prefixes.join(" ")
            )
        };
        let key_info = match &self.certificate {
            Some(cert) => format!(
                "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{cert}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>"
            ),
            None => String::new(),
        };
        format!(
            concat!(
                r#"<ds:Signature xmlns:ds="{dsig}">"#,
                "<ds:SignedInfo>",
                r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
                r#"<ds:SignatureMethod Algorithm="{sig}"/>"#,
                r##"<ds:Reference URI="#{id}">"##,
                "<ds:Transforms>",
                r#"<ds:Transform Algorithm="{enveloped}"/>"#,
                r#"<ds:Transform Algorithm="{c14n}">{inclusive}</ds:Transform>"#,
                "</ds:Transforms>",
                r#"<ds:DigestMethod Algorithm="{digest}"/>"#,
                "<ds:DigestValue></ds:DigestValue>",
                "</ds:Reference>",
                "</ds:SignedInfo>",
                "<ds:SignatureValue></ds:SignatureValue>",
                "{key_info}",
                "</ds:Signature>"
            ),
            dsig = ns::DSIG,
            c14n = algorithm::EXC_C14N,
            sig = self.signature_method,
            id = self.reference_id,
            enveloped = algorithm::ENVELOPED_SIGNATURE,
            inclusive = inclusive,
            digest = self.digest_method,
            key_info = key_info,
        )
    }
}
