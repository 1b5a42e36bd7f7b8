#![forbid(unsafe_code)]

//! `EncryptedAssertion` decryption.
//!
//! Processing order:
//! 1. Read `EncryptedData/EncryptionMethod` and map it to an AES-CBC cipher
//! 2. RSA-OAEP unwrap `KeyInfo/EncryptedKey/CipherData/CipherValue`
//! 3. AES-CBC decrypt `EncryptedData/CipherData/CipherValue` (IV first)
//! 4. Cut the plaintext after the last closing `Assertion` tag
//! 5. Parse it in the namespace scope of the `EncryptedAssertion` and
//!    return it as standalone markup

use base64::Engine;
use solna_core::{ns, Error};
use solna_xml::document::parse_text;
use solna_xml::select::{self, QName, Step};
use std::sync::LazyLock;

const fn xenc(local: &'static str) -> Step {
    Step::Named(QName::new(ns::ENC, local))
}

/// Accepted names of the wrapper, tried in order.
const ENCRYPTED_ASSERTION: [QName; 3] = [
    QName::new(ns::ASSERTION, ns::node::ENCRYPTED_ASSERTION),
    QName::new(ns::PROTOCOL, ns::node::ENCRYPTED_ASSERTION),
    QName::new("", ns::node::ENCRYPTED_ASSERTION),
];

const WRAPPED_KEY_PATHS: [&[Step]; 2] = [
    &[
        Step::Named(QName::new(ns::DSIG, ns::node::KEY_INFO)),
        xenc(ns::node::ENCRYPTED_KEY),
        xenc(ns::node::CIPHER_DATA),
        xenc(ns::node::CIPHER_VALUE),
    ],
    &[
        Step::AnyNamespace(ns::node::KEY_INFO),
        xenc(ns::node::ENCRYPTED_KEY),
        xenc(ns::node::CIPHER_DATA),
        xenc(ns::node::CIPHER_VALUE),
    ],
];

const CIPHER_VALUE_PATH: [Step; 2] = [xenc(ns::node::CIPHER_DATA), xenc(ns::node::CIPHER_VALUE)];

/// Everything up to and including the last `</Assertion>` or `</p:Assertion>`.
static ASSERTION_END: LazyLock<regex::bytes::Regex> = LazyLock::new(|| {
    regex::bytes::Regex::new(r"(?s-u)^.*</(?:[A-Za-z_][\w.-]*:)?Assertion>")
        .expect("ASSERTION_END is a valid regex pattern")
});

static XMLNS_ATTR: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"\sxmlns(?::([A-Za-z_][\w.-]*))?\s*="#)
        .expect("XMLNS_ATTR is a valid regex pattern")
});

/// The `EncryptedAssertion` child of a response root, if any.
pub fn find_encrypted_assertion<'a, 'input>(
    root: roxmltree::Node<'a, 'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    select::first_child_of(root, &ENCRYPTED_ASSERTION)
}

/// Decrypt an `EncryptedAssertion` element with the service provider's key.
///
/// Returns the `Assertion` markup with the namespace declarations it
/// inherited from the wrapper's context added to its start tag, so it can
/// be inserted anywhere. Failures other than an unsupported cipher are
/// reported as a bare [`Error::Decryption`]; the cause is logged at debug.
pub fn decrypt_assertion(
    encrypted_assertion: roxmltree::Node<'_, '_>,
    private_key: &rsa::RsaPrivateKey,
) -> Result<String, Error> {
    decrypt_inner(encrypted_assertion, private_key).map_err(|e| match e {
        Error::UnsupportedAlgorithm(_) => e,
        other => {
            tracing::debug!(error = %other, "assertion decryption failed");
            Error::Decryption("unable to decrypt EncryptedAssertion".into())
        }
    })
}

fn decrypt_inner(
    encrypted_assertion: roxmltree::Node<'_, '_>,
    private_key: &rsa::RsaPrivateKey,
) -> Result<String, Error> {
    let enc_data = select::child(encrypted_assertion, QName::new(ns::ENC, ns::node::ENCRYPTED_DATA))
        .ok_or_else(|| Error::MissingElement(ns::node::ENCRYPTED_DATA.into()))?;

    let method = select::child(enc_data, QName::new(ns::ENC, ns::node::ENCRYPTION_METHOD))
        .and_then(|n| n.attribute(ns::attr::ALGORITHM))
        .ok_or_else(|| Error::MissingAttribute("Algorithm on EncryptionMethod".into()))?;
    let cipher = solna_crypto::cipher::from_uri(method)?;

    let wrapped_key = select::first_path(enc_data, &WRAPPED_KEY_PATHS)
        .and_then(select::text_of)
        .ok_or_else(|| Error::MissingElement("EncryptedKey CipherValue".into()))?;
    let session_key = solna_crypto::keytransport::default_transport()
        .decrypt(private_key, &decode_base64(&wrapped_key, "EncryptedKey")?)?;

    let ciphertext = select::path(enc_data, &CIPHER_VALUE_PATH)
        .and_then(select::text_of)
        .ok_or_else(|| Error::MissingElement("EncryptedData CipherValue".into()))?;
    let plaintext = cipher.decrypt(&session_key, &decode_base64(&ciphertext, "EncryptedData")?)?;
    tracing::trace!(cipher = method, bytes = plaintext.len(), "decrypted assertion payload");

    let assertion = extract_assertion(&plaintext)?;
    let assertion = std::str::from_utf8(assertion)
        .map_err(|e| Error::Decryption(format!("plaintext is not valid UTF-8: {e}")))?;
    standalone_assertion(encrypted_assertion, assertion)
}

fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| Error::Base64(format!("{what} CipherValue: {e}")))
}

/// The plaintext prefix ending with the last closing `Assertion` tag.
///
/// Whatever follows (block padding, noise) is dropped.
pub fn extract_assertion(plaintext: &[u8]) -> Result<&[u8], Error> {
    ASSERTION_END
        .find(plaintext)
        .map(|m| &plaintext[..m.end()])
        .ok_or_else(|| Error::Decryption("no closing Assertion tag in plaintext".into()))
}

fn strip_prolog(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    match text.strip_prefix("<?xml") {
        Some(rest) => rest.find("?>").map_or(text, |i| rest[i + 2..].trim_start()),
        None => text,
    }
}

fn namespace_decl(prefix: &str, uri: &str) -> String {
    let uri = uri
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;");
    if prefix.is_empty() {
        format!(r#" xmlns="{uri}""#)
    } else {
        format!(r#" xmlns:{prefix}="{uri}""#)
    }
}

/// Prefixes declared directly on a start tag (`""` for the default namespace).
fn declared_prefixes(start_tag: &str) -> Vec<String> {
    XMLNS_ATTR
        .captures_iter(start_tag)
        .map(|c| c.get(1).map_or(String::new(), |m| m.as_str().to_owned()))
        .collect()
}

/// Parse `body` in the namespace scope of `context` and return the single
/// `Assertion` element with that scope made explicit on its start tag.
fn standalone_assertion(context: roxmltree::Node<'_, '_>, body: &str) -> Result<String, Error> {
    let scope = select::in_scope_namespaces(context);
    let mut wrapped = String::from("<w");
    for (prefix, uri) in &scope {
        wrapped.push_str(&namespace_decl(prefix, uri));
    }
    wrapped.push('>');
    wrapped.push_str(strip_prolog(body));
    wrapped.push_str("</w>");

    let doc = parse_text(&wrapped)
        .map_err(|e| Error::Decryption(format!("decrypted assertion is not well-formed: {e}")))?;
    let mut elements = select::element_children(doc.root_element());
    let assertion = elements
        .next()
        .filter(|n| QName::new(ns::ASSERTION, ns::node::ASSERTION).matches(*n))
        .ok_or_else(|| Error::Decryption("decrypted content is not a SAML Assertion".into()))?;
    if elements.next().is_some() {
        return Err(Error::Decryption("decrypted content holds more than one element".into()));
    }

    let range = assertion.range();
    let tag_end = select::start_tag_end(assertion, &wrapped)
        .ok_or_else(|| Error::Decryption("decrypted Assertion is empty".into()))?;
    let declared = declared_prefixes(&wrapped[range.start..tag_end]);
    let name_end = range.start + 1 + select::raw_tag_name(assertion, &wrapped).len();

    let mut out = String::with_capacity(range.len() + 256);
    out.push_str(&wrapped[range.start..name_end]);
    for (prefix, uri) in &scope {
        if !declared.iter().any(|d| d == prefix) {
            out.push_str(&namespace_decl(prefix, uri));
        }
    }
    out.push_str(&wrapped[name_end..range.end]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_after_assertion_is_dropped() {
        let mut plaintext = b"<saml:Assertion ID=\"a\"></saml:Assertion>".to_vec();
        plaintext.extend_from_slice(&[0x9c, 0x01, 0x00, 0x07]);
        assert_eq!(
            extract_assertion(&plaintext).unwrap(),
            b"<saml:Assertion ID=\"a\"></saml:Assertion>"
        );
    }

    #[test]
    fn declared_prefixes_on_start_tag() {
        assert_eq!(
            declared_prefixes(r#"<saml:Assertion xmlns:saml="urn:a" xmlns="urn:d" ID="x" xmlnsfoo="y">"#),
            ["saml", ""]
        );
        assert!(declared_prefixes("<Assertion ID=\"x\">").is_empty());
    }

    #[test]
    fn last_closing_tag_wins() {
        let plaintext = b"<Assertion><Advice><Assertion></Assertion></Advice></Assertion>\x03\x03\x03";
        let got = extract_assertion(plaintext).unwrap();
        assert!(got.ends_with(b"</Advice></Assertion>"));
    }

    #[test]
    fn plaintext_without_assertion_is_rejected() {
        assert!(matches!(
            extract_assertion(b"<saml:Response></saml:Response>"),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn prolog_is_stripped() {
        assert_eq!(strip_prolog("\u{feff}<?xml version=\"1.0\"?>\n<a/>"), "<a/>");
        assert_eq!(strip_prolog("  <a/>"), "<a/>");
    }

    #[test]
    fn inherited_prefix_is_declared_on_assertion() {
        let outer = format!(
            r#"<samlp:Response xmlns:samlp="{}" xmlns:saml="{}"><saml:EncryptedAssertion/></samlp:Response>"#,
            ns::PROTOCOL,
            ns::ASSERTION
        );
        let doc = roxmltree::Document::parse(&outer).unwrap();
        let ea = find_encrypted_assertion(doc.root_element()).unwrap();
        let body = r#"<saml:Assertion ID="_a"><saml:Issuer>idp</saml:Issuer></saml:Assertion>"#;
        let out = standalone_assertion(ea, body).unwrap();

        let reparsed = roxmltree::Document::parse(&out).unwrap();
        let root = reparsed.root_element();
        assert_eq!(root.tag_name().namespace(), Some(ns::ASSERTION));
        assert_eq!(root.attribute("ID"), Some("_a"));
        assert!(out.starts_with("<saml:Assertion xmlns:"));
    }

    #[test]
    fn own_declarations_are_not_duplicated() {
        let outer = format!(r#"<r xmlns:saml="{}"><EncryptedAssertion/></r>"#, ns::ASSERTION);
        let doc = roxmltree::Document::parse(&outer).unwrap();
        let ea = find_encrypted_assertion(doc.root_element()).unwrap();
        let body = format!(r#"<saml:Assertion xmlns:saml="{}" ID="_a"/>"#, ns::ASSERTION);
        // Self-closing assertions carry nothing to trust.
        assert!(standalone_assertion(ea, &body).is_err());

        let body = format!(
            r#"<saml:Assertion xmlns:saml="{}" ID="_a"><saml:Issuer>i</saml:Issuer></saml:Assertion>"#,
            ns::ASSERTION
        );
        let out = standalone_assertion(ea, &body).unwrap();
        assert_eq!(out.matches("xmlns:saml=").count(), 1);
        roxmltree::Document::parse(&out).unwrap();
    }

    #[test]
    fn non_assertion_payload_is_rejected() {
        let outer = format!(r#"<r xmlns:saml="{}"><saml:EncryptedAssertion/></r>"#, ns::ASSERTION);
        let doc = roxmltree::Document::parse(&outer).unwrap();
        let ea = find_encrypted_assertion(doc.root_element()).unwrap();
        assert!(standalone_assertion(ea, "<saml:Attribute>x</saml:Attribute>").is_err());
    }
}
