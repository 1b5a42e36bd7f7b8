#![forbid(unsafe_code)]

//! XML Encryption for SAML assertions.
//!
//! Decrypts `EncryptedAssertion` elements (RSA-OAEP key transport with
//! AES-CBC content encryption) and builds them for tests and IdP tooling.

pub mod decrypt;
pub mod encrypt;

pub use decrypt::{decrypt_assertion, find_encrypted_assertion};
pub use encrypt::{encrypt_assertion, AssertionEncryptor};
