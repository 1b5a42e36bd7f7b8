#![forbid(unsafe_code)]

//! Exclusive XML Canonicalization (exc-C14N) for Solna.
//!
//! SAML signatures are enveloped signatures over a single element, so only
//! the subtree form is implemented: an apex element, optionally minus one
//! excluded descendant subtree (the `Signature` itself).

pub mod escape;
pub mod exclusive;
pub mod render;

use solna_core::{algorithm, Error};

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::ExclusiveWithComments)
    }
}

/// Canonicalize the subtree rooted at `apex`.
///
/// - `text`: the source text `apex` was parsed from
/// - `exclude`: a descendant whose whole subtree is omitted
/// - `inclusive_prefixes`: the InclusiveNamespaces PrefixList
pub fn canonicalize_subtree(
    text: &str,
    apex: roxmltree::Node<'_, '_>,
    exclude: Option<roxmltree::Node<'_, '_>>,
    mode: C14nMode,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    if !apex.is_element() {
        return Err(Error::XmlParse("canonicalization apex must be an element".into()));
    }
    exclusive::canonicalize(
        text,
        apex,
        exclude.map(|n| n.id()),
        mode.with_comments(),
        inclusive_prefixes,
    )
}
