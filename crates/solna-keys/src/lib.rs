#![forbid(unsafe_code)]

//! Key management for Solna.
//!
//! Loads the service provider's RSA private key (PEM or DER, PKCS#1 or
//! PKCS#8, optionally password-protected) and the identity provider's
//! X.509 certificate, and computes the certificate fingerprints that
//! trust decisions are made on.

pub mod key;
pub mod keyinfo;
pub mod loader;
pub mod x509;

pub use key::{Key, KeyData};
pub use x509::{fingerprints_match, normalize_fingerprint, public_key_from_cert, Certificate};
