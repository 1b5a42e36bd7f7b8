#![forbid(unsafe_code)]

//! RSA PKCS#1 v1.5 signature algorithms.
//!
//! SAML IdPs sign with `rsa-sha1` or one of the `xmldsig-more` SHA-2
//! variants; nothing else is accepted.

use solna_core::{algorithm, Error};
use signature::SignatureEncoding;

/// Key material for signature operations.
pub enum SigningKey {
    Rsa(rsa::RsaPrivateKey),
    RsaPublic(rsa::RsaPublicKey),
}

impl SigningKey {
    fn public_key(&self) -> rsa::RsaPublicKey {
        match self {
            Self::Rsa(pk) => pk.to_public_key(),
            Self::RsaPublic(pk) => pk.clone(),
        }
    }
}

/// Trait for signature algorithms.
pub trait SignatureAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn sign(&self, key: &SigningKey, data: &[u8]) -> Result<Vec<u8>, Error>;
    /// `Ok(false)` for a well-formed signature that does not verify.
    fn verify(&self, key: &SigningKey, data: &[u8], signature: &[u8]) -> Result<bool, Error>;
}

/// Create a signature algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn SignatureAlgorithm>, Error> {
    let (uri, hash) = match uri {
        algorithm::RSA_SHA1 => (algorithm::RSA_SHA1, HashType::Sha1),
        algorithm::RSA_SHA256 => (algorithm::RSA_SHA256, HashType::Sha256),
        algorithm::RSA_SHA384 => (algorithm::RSA_SHA384, HashType::Sha384),
        algorithm::RSA_SHA512 => (algorithm::RSA_SHA512, HashType::Sha512),
        _ => return Err(Error::UnsupportedAlgorithm(format!("signature algorithm: {uri}"))),
    };
    Ok(Box::new(RsaPkcs1v15 { uri, hash }))
}

#[derive(Debug, Clone, Copy)]
enum HashType {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

struct RsaPkcs1v15 {
    uri: &'static str,
    hash: HashType,
}

impl RsaPkcs1v15 {
    fn sign_with_key(&self, private_key: &rsa::RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        use signature::Signer;
        macro_rules! do_sign {
            ($hasher:ty) => {{
                let sk = rsa::pkcs1v15::SigningKey::<$hasher>::new(private_key.clone());
                let sig = sk
                    .try_sign(data)
                    .map_err(|e| Error::Crypto(format!("RSA sign: {e}")))?;
                Ok(sig.to_vec())
            }};
        }
        match self.hash {
            HashType::Sha1 => do_sign!(sha1::Sha1),
            HashType::Sha256 => do_sign!(sha2::Sha256),
            HashType::Sha384 => do_sign!(sha2::Sha384),
            HashType::Sha512 => do_sign!(sha2::Sha512),
        }
    }

    fn verify_with_key(&self, public_key: &rsa::RsaPublicKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        use signature::Verifier;
        let sig = rsa::pkcs1v15::Signature::try_from(sig_bytes)
            .map_err(|e| Error::Crypto(format!("invalid RSA signature: {e}")))?;
        macro_rules! do_verify {
            ($hasher:ty) => {{
                let vk = rsa::pkcs1v15::VerifyingKey::<$hasher>::new(public_key.clone());
                Ok(vk.verify(data, &sig).is_ok())
            }};
        }
        match self.hash {
            HashType::Sha1 => do_verify!(sha1::Sha1),
            HashType::Sha256 => do_verify!(sha2::Sha256),
            HashType::Sha384 => do_verify!(sha2::Sha384),
            HashType::Sha512 => do_verify!(sha2::Sha512),
        }
    }
}

impl SignatureAlgorithm for RsaPkcs1v15 {
    fn uri(&self) -> &'static str {
        self.uri
    }

    fn sign(&self, key: &SigningKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match key {
            SigningKey::Rsa(pk) => self.sign_with_key(pk, data),
            SigningKey::RsaPublic(_) => Err(Error::Key("RSA private key required".into())),
        }
    }

    fn verify(&self, key: &SigningKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        self.verify_with_key(&key.public_key(), data, sig_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> rsa::RsaPrivateKey {
        let mut rng = rand::thread_rng();
        rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap()
    }

    #[test]
    fn sign_then_verify_each_hash() {
        let key = SigningKey::Rsa(test_key());
        for uri in [
            algorithm::RSA_SHA1,
            algorithm::RSA_SHA256,
            algorithm::RSA_SHA384,
            algorithm::RSA_SHA512,
        ] {
            let alg = from_uri(uri).unwrap();
            assert_eq!(alg.uri(), uri);
            let sig = alg.sign(&key, b"signed info").unwrap();
            assert!(alg.verify(&key, b"signed info", &sig).unwrap());
            assert!(!alg.verify(&key, b"signed inf0", &sig).unwrap());
        }
    }

    #[test]
    fn public_key_cannot_sign() {
        let public = SigningKey::RsaPublic(test_key().to_public_key());
        let alg = from_uri(algorithm::RSA_SHA256).unwrap();
        assert!(matches!(alg.sign(&public, b"x"), Err(Error::Key(_))));
    }

    #[test]
    fn wrong_key_does_not_verify() {
        let signer = SigningKey::Rsa(test_key());
        let other = SigningKey::RsaPublic(test_key().to_public_key());
        let alg = from_uri(algorithm::RSA_SHA1).unwrap();
        let sig = alg.sign(&signer, b"data").unwrap();
        assert!(!alg.verify(&other, b"data", &sig).unwrap());
    }

    #[test]
    fn ecdsa_is_unsupported() {
        let err = from_uri("http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256").err().unwrap();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }
}
