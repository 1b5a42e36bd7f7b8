#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 over a `roxmltree` subtree.
//!
//! Only "visibly utilized" namespace declarations are output. A namespace
//! is visibly utilized on an element when its prefix is used by the tag
//! name, by one of the element's attributes, or appears in the
//! InclusiveNamespaces PrefixList (`#default` names the default namespace).
//!
//! Element names are taken from the source text so the prefix written is
//! the one the signer saw, even when several prefixes share one URI.

use crate::escape::{self, Context};
use crate::render::{Attr, NsDecl};
use roxmltree::{Node, NodeId, NodeType};
use solna_core::{ns, Error};
use solna_xml::select;
use std::collections::{BTreeMap, BTreeSet};

pub(crate) fn canonicalize(
    text: &str,
    apex: Node<'_, '_>,
    exclude: Option<NodeId>,
    with_comments: bool,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let forced = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { String::new() } else { p.clone() })
        .collect();
    let ctx = ExcC14n {
        text,
        exclude,
        with_comments,
        forced,
    };
    let mut out = Vec::new();
    ctx.element(apex, &mut out, &BTreeMap::new())?;
    Ok(out)
}

struct ExcC14n<'t> {
    text: &'t str,
    exclude: Option<NodeId>,
    with_comments: bool,
    forced: BTreeSet<String>,
}

impl ExcC14n<'_> {
    fn node(
        &self,
        node: Node<'_, '_>,
        out: &mut Vec<u8>,
        rendered: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        match node.node_type() {
            NodeType::Element => self.element(node, out, rendered)?,
            NodeType::Text => {
                if let Some(t) = node.text() {
                    escape::escape_into(out, t, Context::Text);
                }
            }
            NodeType::Comment if self.with_comments => {
                out.extend_from_slice(b"<!--");
                out.extend_from_slice(node.text().unwrap_or_default().as_bytes());
                out.extend_from_slice(b"-->");
            }
            NodeType::PI => {
                if let Some(pi) = node.pi() {
                    out.extend_from_slice(b"<?");
                    out.extend_from_slice(pi.target.as_bytes());
                    if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                        out.push(b' ');
                        escape::escape_into(out, value, Context::ProcessingInstruction);
                    }
                    out.extend_from_slice(b"?>");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn element(
        &self,
        node: Node<'_, '_>,
        out: &mut Vec<u8>,
        rendered: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        if self.exclude == Some(node.id()) {
            return Ok(());
        }

        let qname = select::raw_tag_name(node, self.text);
        if qname.is_empty() {
            return Err(Error::XmlParse(format!(
                "cannot locate start tag of <{}>",
                node.tag_name().name()
            )));
        }
        let elem_prefix = qname.split_once(':').map_or("", |(p, _)| p);

        let attrs = collect_attrs(node)?;

        let mut utilized: BTreeSet<&str> = BTreeSet::new();
        utilized.insert(elem_prefix);
        for attr in &attrs {
            if let Some((prefix, _)) = attr.qualified_name.split_once(':') {
                utilized.insert(prefix);
            }
        }
        for p in &self.forced {
            utilized.insert(p.as_str());
        }

        let in_scope: BTreeMap<String, String> =
            select::in_scope_namespaces(node).into_iter().collect();

        let mut decls = Vec::new();
        for prefix in utilized {
            if prefix == "xml" {
                continue;
            }
            match in_scope.get(prefix) {
                Some(uri) => {
                    if rendered.get(prefix) != Some(uri) {
                        decls.push(NsDecl {
                            prefix: prefix.to_string(),
                            uri: uri.clone(),
                        });
                    }
                }
                None if prefix.is_empty() => {
                    // Leaving a default namespace that an ancestor rendered.
                    if rendered.get("").is_some_and(|uri| !uri.is_empty()) {
                        decls.push(NsDecl {
                            prefix: String::new(),
                            uri: String::new(),
                        });
                    }
                }
                None => {}
            }
        }
        decls.sort();

        let mut sorted_attrs = attrs;
        sorted_attrs.sort();

        out.push(b'<');
        out.extend_from_slice(qname.as_bytes());
        for decl in &decls {
            decl.render_into(out);
        }
        for attr in &sorted_attrs {
            attr.render_into(out);
        }
        out.push(b'>');

        let child_rendered;
        let rendered = if decls.is_empty() {
            rendered
        } else {
            let mut next = rendered.clone();
            for decl in decls {
                next.insert(decl.prefix, decl.uri);
            }
            child_rendered = next;
            &child_rendered
        };

        for child in node.children() {
            self.node(child, out, rendered)?;
        }

        out.extend_from_slice(b"</");
        out.extend_from_slice(qname.as_bytes());
        out.push(b'>');
        Ok(())
    }
}

fn collect_attrs(node: Node<'_, '_>) -> Result<Vec<Attr>, Error> {
    node.attributes()
        .map(|a| {
            let local = a.name();
            let (ns_uri, qualified_name) = match a.namespace() {
                None => (String::new(), local.to_string()),
                Some(uri) => {
                    let prefix = attr_prefix(node, uri).ok_or_else(|| {
                        Error::XmlParse(format!("no prefix bound for attribute namespace {uri}"))
                    })?;
                    (uri.to_string(), format!("{prefix}:{local}"))
                }
            };
            Ok(Attr {
                ns_uri,
                local_name: local.to_string(),
                qualified_name,
                value: a.value().to_string(),
            })
        })
        .collect()
}

// Namespaced attributes always carry a non-empty prefix.
fn attr_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == ns::XML {
        return Some("xml");
    }
    node.namespaces()
        .find(|n| n.uri() == uri && n.name().is_some())
        .and_then(|n| n.name())
}
