#![forbid(unsafe_code)]

//! RSA-OAEP key transport (`rsa-oaep-mgf1p`: SHA-1 digest, MGF1 with SHA-1,
//! empty label).

use solna_core::{algorithm, Error};

/// Trait for key transport algorithms.
pub trait KeyTransportAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error>;
    fn decrypt(&self, private_key: &rsa::RsaPrivateKey, encrypted: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Create a key transport algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn KeyTransportAlgorithm>, Error> {
    match uri {
        algorithm::RSA_OAEP => Ok(Box::new(RsaOaepTransport)),
        _ => Err(Error::UnsupportedAlgorithm(format!("key transport: {uri}"))),
    }
}

/// The transport used when an `EncryptedKey` names none.
pub fn default_transport() -> Box<dyn KeyTransportAlgorithm> {
    Box::new(RsaOaepTransport)
}

struct RsaOaepTransport;

impl KeyTransportAlgorithm for RsaOaepTransport {
    fn uri(&self) -> &'static str {
        algorithm::RSA_OAEP
    }

    fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        public_key
            .encrypt(&mut rng, rsa::Oaep::new::<sha1::Sha1>(), key_data)
            .map_err(|e| Error::Crypto(format!("RSA-OAEP encrypt: {e}")))
    }

    fn decrypt(&self, private_key: &rsa::RsaPrivateKey, encrypted: &[u8]) -> Result<Vec<u8>, Error> {
        private_key
            .decrypt(rsa::Oaep::new::<sha1::Sha1>(), encrypted)
            .map_err(|e| Error::Crypto(format!("RSA-OAEP decrypt: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_and_unwrap_session_key() {
        let mut rng = rand::thread_rng();
        let private = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let transport = from_uri(algorithm::RSA_OAEP).unwrap();
        let wrapped = transport.encrypt(&private.to_public_key(), &[7u8; 32]).unwrap();
        assert_eq!(wrapped.len(), 128);
        assert_eq!(transport.decrypt(&private, &wrapped).unwrap(), [7u8; 32]);
    }

    #[test]
    fn wrong_private_key_fails() {
        let mut rng = rand::thread_rng();
        let a = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let b = rsa::RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let transport = default_transport();
        let wrapped = transport.encrypt(&a.to_public_key(), b"key").unwrap();
        assert!(matches!(transport.decrypt(&b, &wrapped), Err(Error::Crypto(_))));
    }

    #[test]
    fn pkcs1_v15_transport_is_unsupported() {
        let err = from_uri("http://www.w3.org/2001/04/xmlenc#rsa-1_5").err().unwrap();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }
}
