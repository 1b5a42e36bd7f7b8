#![forbid(unsafe_code)]

//! Claims read from the signed assertion.
//!
//! Every query is anchored at the assertion the verified signature covers,
//! found through the signed element ID:
//!
//! 1. `/samlp:Response/saml:Assertion[@ID = id]` (signed assertion)
//! 2. `/samlp:Response[@ID = id]/saml:Assertion` (signed response)
//!
//! An unsigned document has no scope and yields no claims. Any other
//! `Assertion` in the document, such as one injected next to a signed one,
//! is never read.

use crate::attributes::Attributes;
use chrono::{DateTime, Utc};
use roxmltree::Node;
use solna_core::{ns, Error};
use solna_dsig::SignedDocument;
use solna_xml::select::{self, QName};

pub(crate) const RESPONSE: QName = QName::new(ns::PROTOCOL, ns::node::RESPONSE);
const ASSERTION: QName = QName::new(ns::ASSERTION, ns::node::ASSERTION);

const fn a(local: &'static str) -> QName {
    QName::new(ns::ASSERTION, local)
}

/// The `Conditions` validity window, as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    pub not_before: Option<String>,
    pub not_on_or_after: Option<String>,
}

impl Conditions {
    pub fn not_before(&self) -> Result<Option<DateTime<Utc>>, Error> {
        self.not_before.as_deref().map(crate::time::parse_timestamp).transpose()
    }

    pub fn not_on_or_after(&self) -> Result<Option<DateTime<Utc>>, Error> {
        self.not_on_or_after
            .as_deref()
            .map(crate::time::parse_timestamp)
            .transpose()
    }
}

/// Everything a service provider reads from an assertion document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub name_id: Option<String>,
    pub session_index: Option<String>,
    /// Raw `SessionNotOnOrAfter`.
    pub session_not_on_or_after: Option<String>,
    pub conditions: Option<Conditions>,
    pub issuer: Option<String>,
    pub attributes: Attributes,
}

impl Claims {
    /// Extract claims from an assembled assertion document.
    pub fn extract(document: &SignedDocument) -> Self {
        let parsed = match document.document().parse_doc() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "no claims in malformed document");
                return Self::default();
            }
        };
        let root = parsed.root_element();
        let scope = signed_scope(root, document.signed_element_id());
        if scope.is_none() {
            tracing::debug!(
                signed_element_id = document.signed_element_id(),
                "no signed assertion scope"
            );
        }
        Self::from_scope(root, scope)
    }

    fn from_scope(root: Node<'_, '_>, scope: Option<Node<'_, '_>>) -> Self {
        let authn_statement = scope.and_then(|s| select::child(s, a(ns::node::AUTHN_STATEMENT)));
        let conditions = scope
            .and_then(|s| select::child(s, a(ns::node::CONDITIONS)))
            .map(|c| Conditions {
                not_before: c.attribute(ns::attr::NOT_BEFORE).map(str::to_owned),
                not_on_or_after: c.attribute(ns::attr::NOT_ON_OR_AFTER).map(str::to_owned),
            });

        let top_issuer = if RESPONSE.matches(root) {
            select::child(root, a(ns::node::ISSUER))
        } else {
            None
        };
        let issuer = top_issuer
            .or_else(|| scope.and_then(|s| select::child(s, a(ns::node::ISSUER))))
            .and_then(select::text_of);

        Self {
            name_id: scope
                .and_then(|s| {
                    select::path(s, &[a(ns::node::SUBJECT).into(), a(ns::node::NAME_ID).into()])
                })
                .and_then(select::text_of),
            session_index: authn_statement
                .and_then(|n| n.attribute(ns::attr::SESSION_INDEX))
                .map(str::to_owned),
            session_not_on_or_after: authn_statement
                .and_then(|n| n.attribute(ns::attr::SESSION_NOT_ON_OR_AFTER))
                .map(str::to_owned),
            conditions,
            issuer,
            attributes: scope.map(attributes).unwrap_or_default(),
        }
    }

    /// `SessionNotOnOrAfter`, if present and well formed.
    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.session_not_on_or_after.as_deref()?;
        crate::time::parse_timestamp(raw)
            .inspect_err(|e| tracing::debug!(error = %e, "ignoring SessionNotOnOrAfter"))
            .ok()
    }
}

/// The assertion covered by the signature over `signed_element_id`.
pub fn signed_scope<'a, 'input>(
    root: Node<'a, 'input>,
    signed_element_id: Option<&str>,
) -> Option<Node<'a, 'input>> {
    let id = signed_element_id?;
    if !RESPONSE.matches(root) {
        return None;
    }
    select::children(root, ASSERTION)
        .find(|n| n.attribute(ns::attr::ID) == Some(id))
        .or_else(|| {
            if root.attribute(ns::attr::ID) == Some(id) {
                select::child(root, ASSERTION)
            } else {
                None
            }
        })
}

/// Attributes of the first `AttributeStatement` in `scope`.
///
/// Children without a `Name` (an `EncryptedAttribute`, say) are skipped.
fn attributes(scope: Node<'_, '_>) -> Attributes {
    let mut attributes = Attributes::new();
    let Some(statement) = select::child(scope, a(ns::node::ATTRIBUTE_STATEMENT)) else {
        return attributes;
    };
    for element in select::element_children(statement) {
        let Some(name) = element.attribute(ns::attr::NAME) else {
            continue;
        };
        let values = select::element_children(element)
            .map(|v| select::text_of(v).unwrap_or_default())
            .collect();
        attributes.add_element(name, values);
    }
    attributes
}

/// `/samlp:Response/samlp:Status/samlp:StatusCode/@Value`.
pub fn status_code(root: Node<'_, '_>) -> Option<String> {
    if !RESPONSE.matches(root) {
        return None;
    }
    select::path(
        root,
        &[
            QName::new(ns::PROTOCOL, ns::node::STATUS).into(),
            QName::new(ns::PROTOCOL, ns::node::STATUS_CODE).into(),
        ],
    )
    .and_then(|n| n.attribute(ns::attr::VALUE))
    .map(str::to_owned)
}
