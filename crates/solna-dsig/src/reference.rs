#![forbid(unsafe_code)]

//! Reading `<ds:SignedInfo>` and computing the digest of its reference.
//!
//! Shared by verification and signing so both sides canonicalize exactly
//! the same bytes.

use solna_c14n::C14nMode;
use solna_core::{algorithm, ns, Error};
use solna_xml::select::{self, QName};

const fn ds(local: &'static str) -> QName {
    QName::new(ns::DSIG, local)
}

/// A transform listed under `<ds:Reference>/<ds:Transforms>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Enveloped,
    Canonicalize {
        mode: C14nMode,
        inclusive_prefixes: Vec<String>,
    },
}

/// The parsed contents of `<ds:SignedInfo>`.
#[derive(Debug)]
pub struct SignedInfo<'a, 'input> {
    pub node: roxmltree::Node<'a, 'input>,
    pub c14n_mode: C14nMode,
    pub inclusive_prefixes: Vec<String>,
    pub signature_method: String,
    pub reference: Reference,
}

/// The single `<ds:Reference>` of a SAML signature.
#[derive(Debug, Clone)]
pub struct Reference {
    pub uri: String,
    pub digest_method: String,
    /// Base64 text of `DigestValue`, whitespace removed; empty in a template.
    pub digest_value: String,
    pub transforms: Vec<Transform>,
}

impl Reference {
    /// The referenced element identifier (`URI` without the leading `#`).
    pub fn target_id(&self) -> Result<&str, Error> {
        match self.uri.strip_prefix('#') {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::SignatureInvalid(format!(
                "reference URI must point at an element ID, got {:?}",
                self.uri
            ))),
        }
    }

    fn is_enveloped(&self) -> bool {
        self.transforms.contains(&Transform::Enveloped)
    }

    fn canonicalization(&self) -> (C14nMode, &[String]) {
        self.transforms
            .iter()
            .find_map(|t| match t {
                Transform::Canonicalize {
                    mode,
                    inclusive_prefixes,
                } => Some((*mode, inclusive_prefixes.as_slice())),
                Transform::Enveloped => None,
            })
            .unwrap_or((C14nMode::Exclusive, &[][..]))
    }
}

/// The first `<ds:Signature>` in document order.
pub fn find_signature<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    select::descendant(doc.root_element(), ds(ns::node::SIGNATURE))
}

/// The `URI` of the first reference of `signature`, without parsing the rest.
pub fn reference_uri<'a>(signature: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    let signed_info = select::child(signature, ds(ns::node::SIGNED_INFO))?;
    select::child(signed_info, ds(ns::node::REFERENCE))?.attribute(ns::attr::URI)
}

fn algorithm_of(node: roxmltree::Node<'_, '_>, what: &str) -> Result<String, Error> {
    node.attribute(ns::attr::ALGORITHM)
        .map(str::to_owned)
        .ok_or_else(|| Error::MissingAttribute(format!("Algorithm on {what}")))
}

fn required<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    local: &'static str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    select::child(parent, ds(local)).ok_or_else(|| Error::MissingElement(local.into()))
}

fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    select::child(node, QName::new(ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES))
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn c14n_mode(uri: &str) -> Result<C14nMode, Error> {
    C14nMode::from_uri(uri).ok_or_else(|| Error::UnsupportedAlgorithm(format!("C14N: {uri}")))
}

/// Parse `<ds:SignedInfo>` of `signature`.
pub fn read_signed_info<'a, 'input>(
    signature: roxmltree::Node<'a, 'input>,
) -> Result<SignedInfo<'a, 'input>, Error> {
    let signed_info = required(signature, ns::node::SIGNED_INFO)?;

    let c14n_node = required(signed_info, ns::node::CANONICALIZATION_METHOD)?;
    let mode = c14n_mode(&algorithm_of(c14n_node, "CanonicalizationMethod")?)?;
    let inclusive_prefixes = read_inclusive_prefixes(c14n_node);

    let signature_method = algorithm_of(
        required(signed_info, ns::node::SIGNATURE_METHOD)?,
        "SignatureMethod",
    )?;

    let mut references = select::children(signed_info, ds(ns::node::REFERENCE));
    let reference_node = references
        .next()
        .ok_or_else(|| Error::MissingElement(ns::node::REFERENCE.into()))?;
    if references.next().is_some() {
        return Err(Error::SignatureInvalid(
            "a SAML signature must carry exactly one Reference".into(),
        ));
    }

    let mut transforms = Vec::new();
    if let Some(list) = select::child(reference_node, ds(ns::node::TRANSFORMS)) {
        for t in select::children(list, ds(ns::node::TRANSFORM)) {
            let uri = algorithm_of(t, "Transform")?;
            transforms.push(match uri.as_str() {
                algorithm::ENVELOPED_SIGNATURE => Transform::Enveloped,
                _ => Transform::Canonicalize {
                    mode: c14n_mode(&uri)?,
                    inclusive_prefixes: read_inclusive_prefixes(t),
                },
            });
        }
    }

    let digest_method = algorithm_of(
        required(reference_node, ns::node::DIGEST_METHOD)?,
        "DigestMethod",
    )?;
    let digest_value = required(reference_node, ns::node::DIGEST_VALUE)?
        .children()
        .filter_map(|c| c.text())
        .flat_map(str::chars)
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Ok(SignedInfo {
        node: signed_info,
        c14n_mode: mode,
        inclusive_prefixes,
        signature_method,
        reference: Reference {
            uri: reference_node.attribute(ns::attr::URI).unwrap_or("").to_owned(),
            digest_method,
            digest_value,
            transforms,
        },
    })
}

/// Locate the element `reference` points at and compute its digest.
///
/// The referenced `ID` must be unique in the document and `signature` must
/// be a direct child of the referenced element.
pub fn digest_reference<'a, 'input>(
    text: &str,
    doc: &'a roxmltree::Document<'input>,
    signature: roxmltree::Node<'a, 'input>,
    reference: &Reference,
) -> Result<(roxmltree::Node<'a, 'input>, Vec<u8>), Error> {
    let id = reference.target_id()?;
    let targets = select::elements_with_id(doc, id);
    let target = match targets.as_slice() {
        [one] => *one,
        [] => return Err(Error::SignatureInvalid(format!("no element with ID {id:?}"))),
        _ => {
            return Err(Error::SignatureInvalid(format!(
                "ID {id:?} is used by {} elements",
                targets.len()
            )))
        }
    };
    if signature.parent_element() != Some(target) {
        return Err(Error::SignatureInvalid(format!(
            "signature is not enveloped by the element with ID {id:?}"
        )));
    }

    let exclude = reference.is_enveloped().then_some(signature);
    let (mode, prefixes) = reference.canonicalization();
    let canonical = solna_c14n::canonicalize_subtree(text, target, exclude, mode, prefixes)?;
    tracing::trace!(
        target_id = id,
        bytes = canonical.len(),
        "canonicalized signed element"
    );
    let digest = solna_crypto::digest::digest(&reference.digest_method, &canonical)?;
    Ok((target, digest))
}

/// Canonical bytes of `<ds:SignedInfo>`, the input to the signature algorithm.
pub fn canonical_signed_info(text: &str, signed_info: &SignedInfo<'_, '_>) -> Result<Vec<u8>, Error> {
    solna_c14n::canonicalize_subtree(
        text,
        signed_info.node,
        None,
        signed_info.c14n_mode,
        &signed_info.inclusive_prefixes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_xml(c14n: &str, transform_c14n: &str) -> String {
        format!(
            r##"<ds:Signature xmlns:ds="{ds}"><ds:SignedInfo>
  <ds:CanonicalizationMethod Algorithm="{c14n}"/>
  <ds:SignatureMethod Algorithm="{sig}"/>
  <ds:Reference URI="#_a1">
    <ds:Transforms>
      <ds:Transform Algorithm="{env}"/>
      <ds:Transform Algorithm="{transform_c14n}"><ec:InclusiveNamespaces xmlns:ec="{exc}" PrefixList="xs saml"/></ds:Transform>
    </ds:Transforms>
    <ds:DigestMethod Algorithm="{sha}"/>
    <ds:DigestValue> AAAA
      BBBB </ds:DigestValue>
  </ds:Reference>
</ds:SignedInfo></ds:Signature>"##,
            ds = ns::DSIG,
            sig = algorithm::RSA_SHA256,
            env = algorithm::ENVELOPED_SIGNATURE,
            exc = ns::EXC_C14N,
            sha = algorithm::SHA256,
        )
    }

    #[test]
    fn signed_info_modes_and_transforms() {
        let xml = signature_xml(algorithm::EXC_C14N_WITH_COMMENTS, algorithm::EXC_C14N);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let info = read_signed_info(doc.root_element()).unwrap();

        assert_eq!(info.c14n_mode, C14nMode::ExclusiveWithComments);
        assert_eq!(info.signature_method, algorithm::RSA_SHA256);
        assert_eq!(info.reference.target_id().unwrap(), "_a1");
        assert_eq!(info.reference.digest_value, "AAAABBBB");
        assert_eq!(
            info.reference.transforms,
            vec![
                Transform::Enveloped,
                Transform::Canonicalize {
                    mode: C14nMode::Exclusive,
                    inclusive_prefixes: vec!["xs".into(), "saml".into()],
                },
            ]
        );
        assert!(info.reference.is_enveloped());
        assert_eq!(info.reference.canonicalization().0, C14nMode::Exclusive);
    }

    #[test]
    fn unknown_canonicalization_is_unsupported() {
        let xml = signature_xml("http://www.w3.org/TR/2001/REC-xml-c14n-20010315", algorithm::EXC_C14N);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert!(matches!(
            read_signed_info(doc.root_element()),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
