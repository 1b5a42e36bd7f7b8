#![forbid(unsafe_code)]

//! `EncryptedAssertion` construction, the inverse of [`crate::decrypt`].
//!
//! A fresh AES session key encrypts the assertion markup; the session key
//! is wrapped with RSA-OAEP for the recipient and carried in
//! `ds:KeyInfo/xenc:EncryptedKey`.

use base64::Engine;
use rand::RngCore;
use solna_core::{algorithm, ns, Error};

/// Builds `saml:EncryptedAssertion` elements for one recipient key.
pub struct AssertionEncryptor {
    recipient: rsa::RsaPublicKey,
    cipher_uri: &'static str,
    qualified_key_info: bool,
}

impl AssertionEncryptor {
    /// AES-256-CBC, with the key wrapped under `recipient`.
    pub fn new(recipient: rsa::RsaPublicKey) -> Self {
        Self {
            recipient,
            cipher_uri: algorithm::AES256_CBC,
            qualified_key_info: true,
        }
    }

    /// Select the block cipher by URI.
    pub fn with_cipher(mut self, uri: &str) -> Result<Self, Error> {
        self.cipher_uri = solna_crypto::cipher::from_uri(uri)?.uri();
        Ok(self)
    }

    /// Emit `KeyInfo` without the DSIG namespace, as some IdPs do.
    pub fn with_unqualified_key_info(mut self) -> Self {
        self.qualified_key_info = false;
        self
    }

    /// Encrypt `assertion_xml` and return the `EncryptedAssertion` markup.
    ///
    /// The assertion must declare the namespaces it uses; only `saml` is
    /// guaranteed to be in scope where it is decrypted.
    pub fn encrypt(&self, assertion_xml: &str) -> Result<String, Error> {
        let cipher = solna_crypto::cipher::from_uri(self.cipher_uri)?;
        let mut session_key = vec![0u8; cipher.key_size()];
        rand::thread_rng().fill_bytes(&mut session_key);

        let ciphertext = cipher.encrypt(&session_key, assertion_xml.as_bytes())?;
        let transport = solna_crypto::keytransport::default_transport();
        let wrapped_key = transport.encrypt(&self.recipient, &session_key)?;

        let engine = base64::engine::general_purpose::STANDARD;
        let key_info_open = if self.qualified_key_info {
            format!(r#"<ds:KeyInfo xmlns:ds="{}">"#, ns::DSIG)
        } else {
            "<KeyInfo>".to_owned()
        };
        let key_info_close = if self.qualified_key_info {
            "</ds:KeyInfo>"
        } else {
            "</KeyInfo>"
        };

        let mut out = String::new();
        out.push_str(&format!(
            r#"<saml:EncryptedAssertion xmlns:saml="{}">"#,
            ns::ASSERTION
        ));
        out.push_str(&format!(
            r#"<xenc:EncryptedData xmlns:xenc="{}" Type="{}">"#,
            ns::ENC,
            ns::ENC_TYPE_ELEMENT
        ));
        out.push_str(&format!(
            r#"<xenc:EncryptionMethod Algorithm="{}"/>"#,
            cipher.uri()
        ));
        out.push_str(&key_info_open);
        out.push_str("<xenc:EncryptedKey>");
        out.push_str(&format!(
            r#"<xenc:EncryptionMethod Algorithm="{}"/>"#,
            transport.uri()
        ));
        out.push_str(&format!(
            "<xenc:CipherData><xenc:CipherValue>{}</xenc:CipherValue></xenc:CipherData>",
            engine.encode(&wrapped_key)
        ));
        out.push_str("</xenc:EncryptedKey>");
        out.push_str(key_info_close);
        out.push_str(&format!(
            "<xenc:CipherData><xenc:CipherValue>{}</xenc:CipherValue></xenc:CipherData>",
            engine.encode(&ciphertext)
        ));
        out.push_str("</xenc:EncryptedData></saml:EncryptedAssertion>");

        tracing::trace!(cipher = cipher.uri(), "encrypted assertion");
        Ok(out)
    }
}

/// Encrypt `assertion_xml` for `recipient` with the given block cipher.
pub fn encrypt_assertion(
    assertion_xml: &str,
    recipient: &rsa::RsaPublicKey,
    cipher_uri: &str,
) -> Result<String, Error> {
    AssertionEncryptor::new(recipient.clone())
        .with_cipher(cipher_uri)?
        .encrypt(assertion_xml)
}
