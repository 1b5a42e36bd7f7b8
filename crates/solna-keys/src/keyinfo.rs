#![forbid(unsafe_code)]

//! `<ds:KeyInfo>` processing.
//!
//! A signing IdP embeds its certificate as
//! `KeyInfo/X509Data/X509Certificate`; only that form is read.

use crate::x509::Certificate;
use solna_core::{ns, Error};
use solna_xml::select::{self, QName, Step};

const X509_CERT_PATH: [Step; 2] = [
    Step::Named(QName::new(ns::DSIG, ns::node::X509_DATA)),
    Step::Named(QName::new(ns::DSIG, ns::node::X509_CERTIFICATE)),
];

/// The base64 text of the first embedded X.509 certificate, if any.
pub fn x509_certificate_text(key_info: roxmltree::Node<'_, '_>) -> Option<String> {
    select::path(key_info, &X509_CERT_PATH).and_then(select::text_of)
}

/// Parse the first embedded X.509 certificate.
///
/// `Ok(None)` when `KeyInfo` carries no certificate.
pub fn x509_certificate(key_info: roxmltree::Node<'_, '_>) -> Result<Option<Certificate>, Error> {
    x509_certificate_text(key_info)
        .map(|text| Certificate::from_base64(&text))
        .transpose()
}
