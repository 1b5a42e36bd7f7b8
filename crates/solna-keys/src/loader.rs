#![forbid(unsafe_code)]

//! Key loading from PEM and DER.

use crate::key::Key;
use crate::x509::Certificate;
use solna_core::Error;

/// Load an RSA private key from PEM data (PKCS#8 first, then PKCS#1).
pub fn load_rsa_private_pem(pem_data: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs8_pem(pem_str) {
        return Ok(Key::rsa_private(pk));
    }

    use pkcs1::DecodeRsaPrivateKey;
    let pk = rsa::RsaPrivateKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key PEM: {e}")))?;
    Ok(Key::rsa_private(pk))
}

/// Load an RSA public key from PEM data (SPKI first, then PKCS#1).
pub fn load_rsa_public_pem(pem_data: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePublicKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;

    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_pem(pem_str) {
        return Ok(Key::rsa_public(pk));
    }

    use pkcs1::DecodeRsaPublicKey;
    let pk = rsa::RsaPublicKey::from_pkcs1_pem(pem_str)
        .map_err(|e| Error::Key(format!("failed to parse RSA public key PEM: {e}")))?;
    Ok(Key::rsa_public(pk))
}

/// Load a private key from encrypted PEM (PKCS#8 ENCRYPTED PRIVATE KEY).
fn load_encrypted_pem(pem_data: &[u8], password: &str) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;
    let pk = rsa::RsaPrivateKey::from_pkcs8_encrypted_pem(pem_str, password)
        .map_err(|e| Error::Key(format!("failed to decrypt encrypted PKCS#8 PEM: {e}")))?;
    Ok(Key::rsa_private(pk))
}

/// Load an RSA private key from DER (PKCS#8 first, then PKCS#1).
pub fn load_rsa_private_der(der: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;
    if let Ok(pk) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(Key::rsa_private(pk));
    }
    use pkcs1::DecodeRsaPrivateKey;
    let pk = rsa::RsaPrivateKey::from_pkcs1_der(der)
        .map_err(|e| Error::Key(format!("failed to parse RSA private key DER: {e}")))?;
    Ok(Key::rsa_private(pk))
}

/// Auto-detect key format and load from PEM data.
///
/// Tries encrypted PKCS#8 (if a password is given and the block is
/// encrypted), then RSA private, RSA public, and finally an X.509
/// certificate whose public key is taken.
pub fn load_pem_auto(pem_data: &[u8], password: Option<&str>) -> Result<Key, Error> {
    const MARKER: &[u8] = b"ENCRYPTED PRIVATE KEY";
    if pem_data.windows(MARKER.len()).any(|w| w == MARKER) {
        let pwd = password.ok_or_else(|| {
            Error::Key("private key is encrypted but no password was given".into())
        })?;
        return load_encrypted_pem(pem_data, pwd);
    }

    if let Ok(key) = load_rsa_private_pem(pem_data) {
        return Ok(key);
    }
    if let Ok(key) = load_rsa_public_pem(pem_data) {
        return Ok(key);
    }
    if let Ok(key) = load_x509_cert_pem(pem_data) {
        return Ok(key);
    }
    Err(Error::Key("unable to auto-detect key format from PEM data".into()))
}

/// Load the public key of a PEM-encoded X.509 certificate.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<Key, Error> {
    let cert = Certificate::from_pem(pem_data)?;
    Ok(Key::rsa_public(cert.public_key()?).with_certificate(cert.der().to_vec()))
}

/// Load a key from a file, auto-detecting PEM or DER.
pub fn load_key_file_with_password(
    path: &std::path::Path,
    password: Option<&str>,
) -> Result<Key, Error> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Key(format!("failed to read {}: {e}", path.display())))?;

    if data.starts_with(b"-----BEGIN") {
        return load_pem_auto(&data, password);
    }
    if let Ok(key) = load_rsa_private_der(&data) {
        return Ok(key);
    }
    if let Ok(cert) = Certificate::from_der(data) {
        return Ok(Key::rsa_public(cert.public_key()?).with_certificate(cert.der().to_vec()));
    }
    Err(Error::Key(format!(
        "unable to auto-detect key format from file: {}",
        path.display()
    )))
}

/// Load a certificate from a file holding PEM, bare base64 or DER.
pub fn load_certificate_file(path: &std::path::Path) -> Result<Certificate, Error> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Certificate(format!("failed to read {}: {e}", path.display())))?;
    match std::str::from_utf8(&data) {
        Ok(text) => Certificate::parse(text),
        Err(_) => Certificate::from_der(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn key_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../test-data/keys")
            .join(name)
    }

    #[test]
    fn pkcs8_and_pkcs1_load_the_same_key() {
        let a = load_key_file_with_password(&key_path("sp-key.pem"), None).unwrap();
        let b = load_key_file_with_password(&key_path("sp-key-pkcs1.pem"), None).unwrap();
        assert!(a.is_private());
        assert_eq!(a.rsa_public_key(), b.rsa_public_key());
    }

    #[test]
    fn encrypted_pkcs8_needs_password() {
        let path = key_path("sp-key-encrypted.pem");
        assert!(matches!(load_key_file_with_password(&path, None), Err(Error::Key(_))));
        assert!(load_key_file_with_password(&path, Some("wrong")).is_err());

        let key = load_key_file_with_password(&path, Some("secret123")).unwrap();
        let plain = load_key_file_with_password(&key_path("sp-key.pem"), None).unwrap();
        assert_eq!(key.rsa_public_key(), plain.rsa_public_key());
    }

    #[test]
    fn certificate_pem_yields_public_key() {
        let key = load_key_file_with_password(&key_path("sp-cert.pem"), None).unwrap();
        assert!(!key.is_private());
        assert!(key.certificate.is_some());

        let private = load_key_file_with_password(&key_path("sp-key.pem"), None).unwrap();
        assert_eq!(key.rsa_public_key(), private.rsa_public_key());
    }

    #[test]
    fn certificate_file_round_trips_fingerprint() {
        let cert = load_certificate_file(&key_path("idp-cert.pem")).unwrap();
        assert_eq!(
            cert.fingerprint_sha1(),
            "6D:AD:D5:ED:9E:9E:0B:DE:10:0A:97:90:22:EC:35:36:78:F3:83:E0"
        );
    }

    #[test]
    fn missing_file_is_a_key_error() {
        let err = load_key_file_with_password(&key_path("nope.pem"), None).unwrap_err();
        assert!(matches!(err, Error::Key(_)));
    }
}
