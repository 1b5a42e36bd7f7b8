#![forbid(unsafe_code)]

//! XML document abstraction for Solna.
//!
//! Provides an owned document type over `roxmltree`, namespace-qualified
//! element lookups tolerant of prefix variations, and byte-range text
//! splicing used to rebuild documents without mutating a live tree.

pub mod document;
pub mod select;
pub mod splice;

pub use document::XmlDocument;
pub use select::QName;
pub use splice::Splice;

/// Return the roxmltree parsing options used throughout Solna.
///
/// DTDs are rejected; a SAML protocol message never carries one.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        ..roxmltree::ParsingOptions::default()
    }
}
