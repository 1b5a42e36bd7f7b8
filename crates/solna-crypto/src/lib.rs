#![forbid(unsafe_code)]

//! Cryptographic algorithm implementations for Solna.
//!
//! Covers what a SAML service provider needs to check an IdP's response:
//! reference digests, RSA signatures over `SignedInfo`, and the AES-CBC /
//! RSA-OAEP pair used by encrypted assertions.

pub mod cipher;
pub mod digest;
pub mod keytransport;
pub mod registry;
pub mod sign;

pub use digest::DigestAlgorithm;
