#![forbid(unsafe_code)]

//! Enveloped XML Digital Signature support for SAML documents.
//!
//! [`SignedDocument`] verifies the first `<ds:Signature>` of a document
//! against a pinned certificate fingerprint and reports which element the
//! signature covers. [`sign`] fills in a signature template, which is how
//! test fixtures and the CLI produce signed responses.

pub mod document;
pub mod reference;
pub mod sign;
pub mod template;
pub mod verify;

pub use document::SignedDocument;
pub use template::SignatureTemplate;
pub use verify::VerifyResult;
