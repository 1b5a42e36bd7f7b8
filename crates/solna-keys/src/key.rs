#![forbid(unsafe_code)]

//! Key types.

use solna_crypto::sign::SigningKey;

/// The underlying key data.
pub enum KeyData {
    Rsa {
        private: Option<rsa::RsaPrivateKey>,
        public: rsa::RsaPublicKey,
    },
}

impl std::fmt::Debug for KeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa { private: Some(_), .. } => write!(f, "RSA private+public key"),
            Self::Rsa { private: None, .. } => write!(f, "RSA public key"),
        }
    }
}

/// A loaded key, with the certificate it came from when there is one.
#[derive(Debug)]
pub struct Key {
    pub data: KeyData,
    /// DER of the certificate the public half was taken from.
    pub certificate: Option<Vec<u8>>,
}

impl Key {
    pub fn rsa_private(private: rsa::RsaPrivateKey) -> Self {
        let public = private.to_public_key();
        Self {
            data: KeyData::Rsa {
                private: Some(private),
                public,
            },
            certificate: None,
        }
    }

    pub fn rsa_public(public: rsa::RsaPublicKey) -> Self {
        Self {
            data: KeyData::Rsa {
                private: None,
                public,
            },
            certificate: None,
        }
    }

    pub fn with_certificate(mut self, der: Vec<u8>) -> Self {
        self.certificate = Some(der);
        self
    }

    /// Convert to the signing key shape the signature algorithms take.
    pub fn to_signing_key(&self) -> SigningKey {
        match &self.data {
            KeyData::Rsa { private: Some(pk), .. } => SigningKey::Rsa(pk.clone()),
            KeyData::Rsa { public, .. } => SigningKey::RsaPublic(public.clone()),
        }
    }

    pub fn rsa_public_key(&self) -> &rsa::RsaPublicKey {
        match &self.data {
            KeyData::Rsa { public, .. } => public,
        }
    }

    pub fn rsa_private_key(&self) -> Option<&rsa::RsaPrivateKey> {
        match &self.data {
            KeyData::Rsa { private, .. } => private.as_ref(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.rsa_private_key().is_some()
    }
}
