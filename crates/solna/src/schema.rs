#![forbid(unsafe_code)]

//! Structural validation of SAML 2.0 Response documents.
//!
//! The content model of `saml-schema-protocol-2.0` and
//! `saml-schema-assertion-2.0` is compiled into the tables below for the
//! elements a `Response` can carry: child order and cardinality, required
//! and permitted attributes, `xs:ID` and `xs:dateTime` lexical forms, and
//! character content. Wildcard (`xs:any`) content is validated laxly: known
//! SAML elements inside it are checked, anything else is accepted.
//!
//! Elements from the XML-DSig and XML-Encryption vocabularies are only
//! checked for their attributes; their internal structure is the business
//! of signature verification and decryption.

use roxmltree::Node;
use solna_core::{ns, Error};
use solna_xml::QName;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// A single schema validity error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// 1-based line of the offending node.
    pub line: u32,
    pub message: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0: ERROR: {}", self.line, self.message)
    }
}

/// Validate `text` as a SAML protocol `Response`. All errors found are
/// returned in document order; an empty list means the document is valid.
pub fn validate(text: &str) -> Vec<SchemaError> {
    if text.trim().is_empty() {
        return vec![SchemaError {
            line: 1,
            message: "Document is empty".into(),
        }];
    }
    let doc = match roxmltree::Document::parse_with_options(text, solna_xml::parsing_options()) {
        Ok(doc) => doc,
        Err(e) => {
            return vec![SchemaError {
                line: e.pos().row,
                message: e.to_string(),
            }]
        }
    };

    let mut validator = Validator {
        doc: &doc,
        errors: Vec::new(),
        ids: HashSet::new(),
    };
    let root = doc.root_element();
    if RESPONSE.matches(root) {
        validator.element(root, declaration(root));
    } else {
        validator.error(
            root,
            "No matching global declaration available for the validation root.".into(),
        );
    }
    validator.errors
}

/// Strict-mode rendering: the first error, a blank line, then the document.
pub fn check(text: &str) -> Result<(), Error> {
    match validate(text).into_iter().next() {
        None => Ok(()),
        Some(first) => Err(Error::SchemaViolation(format!("{first}\n\n{text}"))),
    }
}

// ── Content model ────────────────────────────────────────────────────

const fn p(local: &'static str) -> QName {
    QName::new(ns::PROTOCOL, local)
}

const fn a(local: &'static str) -> QName {
    QName::new(ns::ASSERTION, local)
}

const RESPONSE: QName = p(ns::node::RESPONSE);
const SIGNATURE: QName = QName::new(ns::DSIG, ns::node::SIGNATURE);
const ENCRYPTED_DATA: QName = QName::new(ns::ENC, ns::node::ENCRYPTED_DATA);
const ENCRYPTED_KEY: QName = QName::new(ns::ENC, ns::node::ENCRYPTED_KEY);

#[derive(Debug, Clone, Copy)]
enum Term {
    Element(QName),
    Choice(&'static [QName]),
    /// `xs:any namespace="##other"`: any qualified element outside SAML.
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Particle {
    term: Term,
    min: usize,
    /// `None` is `maxOccurs="unbounded"`.
    max: Option<usize>,
}

const fn one(q: QName) -> Particle {
    Particle { term: Term::Element(q), min: 1, max: Some(1) }
}

const fn opt(q: QName) -> Particle {
    Particle { term: Term::Element(q), min: 0, max: Some(1) }
}

const fn many(q: QName, min: usize) -> Particle {
    Particle { term: Term::Element(q), min, max: None }
}

const fn choice(names: &'static [QName], min: usize, max: Option<usize>) -> Particle {
    Particle { term: Term::Choice(names), min, max }
}

#[derive(Debug, Clone, Copy)]
enum Content {
    Empty,
    /// Character data only.
    Simple,
    ElementOnly(&'static [Particle]),
    /// `xs:anyType` or lax wildcard content; mixed.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrType {
    Text,
    Id,
    DateTime,
    Version,
    NonNegativeInteger,
}

#[derive(Debug, Clone, Copy)]
struct Attr {
    name: &'static str,
    required: bool,
    ty: AttrType,
}

const fn req(name: &'static str, ty: AttrType) -> Attr {
    Attr { name, required: true, ty }
}

const fn att(name: &'static str, ty: AttrType) -> Attr {
    Attr { name, required: false, ty }
}

#[derive(Debug, Clone, Copy)]
struct Decl {
    attrs: &'static [Attr],
    content: Content,
    /// Unqualified attributes beyond `attrs` are tolerated.
    open_attributes: bool,
}

const fn decl(attrs: &'static [Attr], content: Content) -> Decl {
    Decl { attrs, content, open_attributes: false }
}

use AttrType::*;

const STATUS_RESPONSE_ATTRS: &[Attr] = &[
    req("ID", Id),
    att("InResponseTo", Text),
    req("Version", Version),
    req("IssueInstant", DateTime),
    att("Destination", Text),
    att("Consent", Text),
];

const NAME_ID_ATTRS: &[Attr] = &[
    att("NameQualifier", Text),
    att("SPNameQualifier", Text),
    att("Format", Text),
    att("SPProvidedID", Text),
];

const IDENTIFIERS: &[QName] = &[a("BaseID"), a(ns::node::NAME_ID), a(ns::node::ENCRYPTED_ID)];

const STATEMENTS: &[QName] = &[
    a(ns::node::STATEMENT),
    a(ns::node::AUTHN_STATEMENT),
    a(ns::node::AUTHZ_DECISION_STATEMENT),
    a(ns::node::ATTRIBUTE_STATEMENT),
];

const CONDITIONS: &[QName] = &[
    a(ns::node::CONDITION),
    a(ns::node::AUDIENCE_RESTRICTION),
    a(ns::node::ONE_TIME_USE),
    a(ns::node::PROXY_RESTRICTION),
];

const ASSERTIONS: &[QName] = &[a(ns::node::ASSERTION), a(ns::node::ENCRYPTED_ASSERTION)];

const AUTHN_CONTEXT_DECLS: &[QName] = &[a("AuthnContextDecl"), a("AuthnContextDeclRef")];

const ATTRIBUTES: &[QName] = &[a(ns::node::ATTRIBUTE), a(ns::node::ENCRYPTED_ATTRIBUTE)];

const RESPONSE_DECL: Decl = decl(
    STATUS_RESPONSE_ATTRS,
    Content::ElementOnly(&[
        opt(a(ns::node::ISSUER)),
        opt(SIGNATURE),
        opt(p(ns::node::EXTENSIONS)),
        one(p(ns::node::STATUS)),
        choice(ASSERTIONS, 0, None),
    ]),
);

const STATUS_DECL: Decl = decl(
    &[],
    Content::ElementOnly(&[
        one(p(ns::node::STATUS_CODE)),
        opt(p(ns::node::STATUS_MESSAGE)),
        opt(p(ns::node::STATUS_DETAIL)),
    ]),
);

const STATUS_CODE_DECL: Decl = decl(
    &[req("Value", Text)],
    Content::ElementOnly(&[opt(p(ns::node::STATUS_CODE))]),
);

const EXTENSIONS_DECL: Decl = decl(
    &[],
    Content::ElementOnly(&[Particle { term: Term::Other, min: 1, max: None }]),
);

const ASSERTION_DECL: Decl = decl(
    &[req("Version", Version), req("ID", Id), req("IssueInstant", DateTime)],
    Content::ElementOnly(&[
        one(a(ns::node::ISSUER)),
        opt(SIGNATURE),
        opt(a(ns::node::SUBJECT)),
        opt(a(ns::node::CONDITIONS)),
        opt(a(ns::node::ADVICE)),
        choice(STATEMENTS, 0, None),
    ]),
);

const BASE_ID_DECL: Decl = decl(
    &[att("NameQualifier", Text), att("SPNameQualifier", Text)],
    Content::Any,
);

const ENCRYPTED_ELEMENT_DECL: Decl = decl(
    &[],
    Content::ElementOnly(&[one(ENCRYPTED_DATA), many(ENCRYPTED_KEY, 0)]),
);

const SUBJECT_DECL: Decl = decl(
    &[],
    Content::ElementOnly(&[
        choice(IDENTIFIERS, 0, Some(1)),
        many(a(ns::node::SUBJECT_CONFIRMATION), 0),
    ]),
);

const SUBJECT_CONFIRMATION_DECL: Decl = decl(
    &[req("Method", Text)],
    Content::ElementOnly(&[
        choice(IDENTIFIERS, 0, Some(1)),
        opt(a(ns::node::SUBJECT_CONFIRMATION_DATA)),
    ]),
);

const SUBJECT_CONFIRMATION_DATA_DECL: Decl = decl(
    &[
        att("NotBefore", DateTime),
        att("NotOnOrAfter", DateTime),
        att("Recipient", Text),
        att("InResponseTo", Text),
        att("Address", Text),
    ],
    Content::Any,
);

const CONDITIONS_DECL: Decl = decl(
    &[att("NotBefore", DateTime), att("NotOnOrAfter", DateTime)],
    Content::ElementOnly(&[choice(CONDITIONS, 0, None)]),
);

const AUDIENCE_RESTRICTION_DECL: Decl =
    decl(&[], Content::ElementOnly(&[many(a(ns::node::AUDIENCE), 1)]));

const PROXY_RESTRICTION_DECL: Decl = decl(
    &[att("Count", NonNegativeInteger)],
    Content::ElementOnly(&[many(a(ns::node::AUDIENCE), 0)]),
);

const AUTHN_STATEMENT_DECL: Decl = decl(
    &[
        req("AuthnInstant", DateTime),
        att("SessionIndex", Text),
        att("SessionNotOnOrAfter", DateTime),
    ],
    Content::ElementOnly(&[
        opt(a(ns::node::SUBJECT_LOCALITY)),
        one(a(ns::node::AUTHN_CONTEXT)),
    ]),
);

const SUBJECT_LOCALITY_DECL: Decl =
    decl(&[att("Address", Text), att("DNSName", Text)], Content::Empty);

const AUTHN_CONTEXT_DECL: Decl = decl(
    &[],
    Content::ElementOnly(&[
        opt(a("AuthnContextClassRef")),
        choice(AUTHN_CONTEXT_DECLS, 0, Some(1)),
        many(a("AuthenticatingAuthority"), 0),
    ]),
);

const ATTRIBUTE_STATEMENT_DECL: Decl =
    decl(&[], Content::ElementOnly(&[choice(ATTRIBUTES, 1, None)]));

const ATTRIBUTE_DECL: Decl = decl(
    &[req("Name", Text), att("NameFormat", Text), att("FriendlyName", Text)],
    Content::ElementOnly(&[many(a(ns::node::ATTRIBUTE_VALUE), 0)]),
);

const SIMPLE_DECL: Decl = decl(&[], Content::Simple);

const ANY_DECL: Decl = decl(&[], Content::Any);

/// `xs:anyType` with arbitrary attributes.
const OPEN_DECL: Decl = Decl {
    attrs: &[],
    content: Content::Any,
    open_attributes: true,
};

const SIGNATURE_DECL: Decl = decl(&[att("Id", Id)], Content::Any);

const ENC_DECL: Decl = decl(
    &[
        att("Id", Id),
        att("Type", Text),
        att("MimeType", Text),
        att("Encoding", Text),
        att("Recipient", Text),
    ],
    Content::Any,
);

/// The declaration governing `node`, if it belongs to a known vocabulary.
fn declaration(node: Node<'_, '_>) -> Option<Decl> {
    let name = node.tag_name();
    let decl = match (name.namespace().unwrap_or(""), name.name()) {
        (ns::PROTOCOL, "Response") => RESPONSE_DECL,
        (ns::PROTOCOL, "Status") => STATUS_DECL,
        (ns::PROTOCOL, "StatusCode") => STATUS_CODE_DECL,
        (ns::PROTOCOL, "StatusMessage") => SIMPLE_DECL,
        (ns::PROTOCOL, "StatusDetail") => ANY_DECL,
        (ns::PROTOCOL, "Extensions") => EXTENSIONS_DECL,

        (ns::ASSERTION, "Assertion") => ASSERTION_DECL,
        (ns::ASSERTION, "Issuer" | "NameID") => decl(NAME_ID_ATTRS, Content::Simple),
        (ns::ASSERTION, "BaseID") => BASE_ID_DECL,
        (ns::ASSERTION, "EncryptedID" | "EncryptedAssertion" | "EncryptedAttribute") => {
            ENCRYPTED_ELEMENT_DECL
        }
        (ns::ASSERTION, "Subject") => SUBJECT_DECL,
        (ns::ASSERTION, "SubjectConfirmation") => SUBJECT_CONFIRMATION_DECL,
        (ns::ASSERTION, "SubjectConfirmationData") => SUBJECT_CONFIRMATION_DATA_DECL,
        (ns::ASSERTION, "Conditions") => CONDITIONS_DECL,
        (ns::ASSERTION, "Condition" | "Advice" | "Statement" | "AuthzDecisionStatement") => {
            OPEN_DECL
        }
        (ns::ASSERTION, "AudienceRestriction") => AUDIENCE_RESTRICTION_DECL,
        (ns::ASSERTION, "Audience" | "AssertionIDRef" | "AssertionURIRef") => SIMPLE_DECL,
        (ns::ASSERTION, "OneTimeUse") => decl(&[], Content::Empty),
        (ns::ASSERTION, "ProxyRestriction") => PROXY_RESTRICTION_DECL,
        (ns::ASSERTION, "AuthnStatement") => AUTHN_STATEMENT_DECL,
        (ns::ASSERTION, "SubjectLocality") => SUBJECT_LOCALITY_DECL,
        (ns::ASSERTION, "AuthnContext") => AUTHN_CONTEXT_DECL,
        (
            ns::ASSERTION,
            "AuthnContextClassRef" | "AuthnContextDeclRef" | "AuthenticatingAuthority",
        ) => SIMPLE_DECL,
        (ns::ASSERTION, "AuthnContextDecl") => ANY_DECL,
        (ns::ASSERTION, "AttributeStatement") => ATTRIBUTE_STATEMENT_DECL,
        (ns::ASSERTION, "Attribute") => ATTRIBUTE_DECL,
        (ns::ASSERTION, "AttributeValue") => OPEN_DECL,

        (ns::DSIG, "Signature") => SIGNATURE_DECL,
        (ns::ENC, "EncryptedData" | "EncryptedKey") => ENC_DECL,
        _ => return None,
    };
    Some(decl)
}

// ── Validation ───────────────────────────────────────────────────────

struct Validator<'d, 'input> {
    doc: &'d roxmltree::Document<'input>,
    errors: Vec<SchemaError>,
    /// `xs:ID` values seen so far.
    ids: HashSet<String>,
}

fn describe(node: Node<'_, '_>) -> String {
    let name = node.tag_name();
    match name.namespace() {
        Some(uri) => format!("{{{uri}}}{}", name.name()),
        None => name.name().to_owned(),
    }
}

fn is_saml(uri: &str) -> bool {
    uri == ns::PROTOCOL || uri == ns::ASSERTION
}

fn expected(term: Term) -> String {
    match term {
        Term::Element(q) => q.to_string(),
        Term::Choice(names) => names.iter().map(|q| q.to_string()).collect::<Vec<_>>().join(", "),
        Term::Other => "##other{*}*".into(),
    }
}

impl Term {
    fn accepts(&self, node: Node<'_, '_>) -> bool {
        match self {
            Self::Element(q) => q.matches(node),
            Self::Choice(names) => names.iter().any(|q| q.matches(node)),
            // `##other` relative to the protocol namespace; assertion
            // elements are allowed.
            Self::Other => node
                .tag_name()
                .namespace()
                .is_some_and(|uri| uri != ns::PROTOCOL),
        }
    }
}

impl<'d, 'input> Validator<'d, 'input> {
    fn error(&mut self, node: Node<'_, '_>, message: String) {
        let line = self.doc.text_pos_at(node.range().start).row;
        self.errors.push(SchemaError { line, message });
    }

    fn element(&mut self, node: Node<'d, 'input>, decl: Option<Decl>) {
        let Some(decl) = decl else {
            // Lax wildcard content: nothing is known about this element,
            // but SAML elements nested inside it still get checked.
            self.lax_children(node);
            return;
        };
        self.attributes(node, &decl);
        match decl.content {
            Content::Empty => {
                if node.children().any(|c| c.is_element() || has_text(c)) {
                    self.error(
                        node,
                        format!(
                            "Element '{}': Character or element content is not allowed, because the content type is empty.",
                            describe(node)
                        ),
                    );
                }
            }
            Content::Simple => {
                if let Some(child) = node.children().find(|c| c.is_element()) {
                    self.error(
                        child,
                        format!(
                            "Element '{}': Element content is not allowed, because the content type is a simple type.",
                            describe(node)
                        ),
                    );
                }
            }
            Content::ElementOnly(particles) => self.sequence(node, particles),
            Content::Any => self.lax_children(node),
        }
    }

    fn lax_children(&mut self, node: Node<'d, 'input>) {
        for child in node.children().filter(|c| c.is_element()) {
            self.element(child, declaration(child));
        }
    }

    fn sequence(&mut self, node: Node<'d, 'input>, particles: &[Particle]) {
        if let Some(text) = node.children().find(|c| has_text(*c)) {
            self.error(
                text,
                format!(
                    "Element '{}': Character content other than whitespace is not allowed because the content type is 'element-only'.",
                    describe(node)
                ),
            );
        }

        let mut children = node.children().filter(|c| c.is_element()).peekable();
        for particle in particles {
            let mut count = 0;
            while particle.max.map_or(true, |max| count < max) {
                match children.peek() {
                    Some(child) if particle.term.accepts(*child) => {
                        let child = *child;
                        children.next();
                        let child_decl = match particle.term {
                            Term::Other => None,
                            _ => declaration(child),
                        };
                        self.element(child, child_decl);
                        count += 1;
                    }
                    _ => break,
                }
            }
            if count < particle.min {
                let at = children.peek().copied();
                let message = match at {
                    Some(unexpected) => format!(
                        "Element '{}': This element is not expected. Expected is ( {} ).",
                        describe(unexpected),
                        expected(particle.term)
                    ),
                    None => format!(
                        "Element '{}': Missing child element(s). Expected is ( {} ).",
                        describe(node),
                        expected(particle.term)
                    ),
                };
                self.error(at.unwrap_or(node), message);
                return;
            }
        }
        if let Some(extra) = children.next() {
            self.error(
                extra,
                format!("Element '{}': This element is not expected.", describe(extra)),
            );
        }
    }

    fn attributes(&mut self, node: Node<'d, 'input>, decl: &Decl) {
        for attr in node.attributes() {
            let qualified = attr.namespace().is_some();
            if qualified {
                if attr.namespace().is_some_and(is_saml) {
                    self.error(
                        node,
                        format!(
                            "Element '{}', attribute '{{{}}}{}': The attribute is not allowed.",
                            describe(node),
                            attr.namespace().unwrap_or(""),
                            attr.name()
                        ),
                    );
                }
                continue;
            }
            match decl.attrs.iter().find(|d| d.name == attr.name()) {
                Some(d) => self.attribute_value(node, d, attr.value()),
                None if decl.open_attributes => {}
                None => self.error(
                    node,
                    format!(
                        "Element '{}', attribute '{}': The attribute '{}' is not allowed.",
                        describe(node),
                        attr.name(),
                        attr.name()
                    ),
                ),
            }
        }
        for d in decl.attrs.iter().filter(|d| d.required) {
            if node.attribute(d.name).is_none() {
                self.error(
                    node,
                    format!(
                        "Element '{}': The attribute '{}' is required but missing.",
                        describe(node),
                        d.name
                    ),
                );
            }
        }
    }

    fn attribute_value(&mut self, node: Node<'_, '_>, decl: &Attr, value: &str) {
        let (valid, type_name) = match decl.ty {
            Text => (true, "xs:string"),
            Id => (is_ncname(value), "xs:ID"),
            DateTime => (crate::time::parse_timestamp(value).is_ok() && is_date_time(value), "xs:dateTime"),
            Version => (value == ns::SAML_VERSION, "xs:string"),
            NonNegativeInteger => (
                !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
                "xs:nonNegativeInteger",
            ),
        };
        if !valid {
            let message = if decl.ty == Version {
                format!(
                    "Element '{}', attribute 'Version': Unsupported SAML version '{value}'.",
                    describe(node)
                )
            } else {
                format!(
                    "Element '{}', attribute '{}': '{value}' is not a valid value of the atomic type '{type_name}'.",
                    describe(node),
                    decl.name
                )
            };
            self.error(node, message);
            return;
        }
        if decl.ty == Id && !self.ids.insert(value.to_owned()) {
            tracing::warn!(id = value, "duplicate xs:ID value in response");
            self.error(
                node,
                format!(
                    "Element '{}', attribute '{}': '{value}' is not a valid value of the atomic type 'xs:ID'.",
                    describe(node),
                    decl.name
                ),
            );
        }
    }
}

fn has_text(node: Node<'_, '_>) -> bool {
    node.is_text() && node.text().is_some_and(|t| !t.trim().is_empty())
}

/// ASCII approximation of `xs:NCName`.
fn is_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Lexical form of `xs:dateTime`.
static DATE_TIME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^-?\d{4,}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .expect("DATE_TIME is a valid regex pattern")
});

fn is_date_time(value: &str) -> bool {
    DATE_TIME.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> String {
        format!(
            r#"<samlp:Response xmlns:samlp="{p}" xmlns:saml="{a}" ID="_r1" Version="2.0" IssueInstant="2024-01-01T00:00:00Z">
  <saml:Issuer>https://idp.example.com</saml:Issuer>
  <samlp:Status><samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Success"/></samlp:Status>
{body}
</samlp:Response>"#,
            p = ns::PROTOCOL,
            a = ns::ASSERTION
        )
    }

    const ASSERTION: &str = r#"  <saml:Assertion ID="_a1" Version="2.0" IssueInstant="2024-01-01T00:00:00Z">
    <saml:Issuer>https://idp.example.com</saml:Issuer>
    <saml:Subject>
      <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">alice@example.com</saml:NameID>
      <saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer">
        <saml:SubjectConfirmationData NotOnOrAfter="2024-01-01T00:05:00Z" Recipient="https://sp.example.com/acs"/>
      </saml:SubjectConfirmation>
    </saml:Subject>
    <saml:Conditions NotBefore="2024-01-01T00:00:00Z" NotOnOrAfter="2024-01-01T01:00:00Z">
      <saml:AudienceRestriction><saml:Audience>https://sp.example.com</saml:Audience></saml:AudienceRestriction>
    </saml:Conditions>
    <saml:AuthnStatement AuthnInstant="2024-01-01T00:00:00Z" SessionIndex="_s1">
      <saml:AuthnContext><saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:Password</saml:AuthnContextClassRef></saml:AuthnContext>
    </saml:AuthnStatement>
    <saml:AttributeStatement>
      <saml:Attribute Name="mail"><saml:AttributeValue xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="xs:string">alice@example.com</saml:AttributeValue></saml:Attribute>
    </saml:AttributeStatement>
  </saml:Assertion>"#;

    fn messages(xml: &str) -> Vec<String> {
        validate(xml).into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn complete_response_is_valid() {
        assert_eq!(validate(&response(ASSERTION)), vec![]);
    }

    #[test]
    fn response_without_assertion_is_valid() {
        assert!(validate(&response("")).is_empty());
    }

    #[test]
    fn missing_status_is_reported() {
        let xml = format!(
            r#"<samlp:Response xmlns:samlp="{}" ID="_r" Version="2.0" IssueInstant="2024-01-01T00:00:00Z"></samlp:Response>"#,
            ns::PROTOCOL
        );
        let errors = messages(&xml);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Missing child element(s)"), "{errors:?}");
        assert!(errors[0].contains("Status"));
    }

    #[test]
    fn elements_out_of_order() {
        let xml = response(&ASSERTION.replace(
            "<saml:Issuer>https://idp.example.com</saml:Issuer>\n    <saml:Subject>",
            "<saml:Subject>",
        ));
        let errors = validate(&xml);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("This element is not expected"));
        assert!(errors[0].message.contains("Subject"));
        assert_eq!(errors[0].line, 5);
    }

    #[test]
    fn unknown_saml_element_is_rejected() {
        let xml = response(&ASSERTION.replace("<saml:AttributeStatement>", "<saml:Bogus/><saml:AttributeStatement>"));
        let errors = messages(&xml);
        assert!(errors.iter().any(|e| e.contains("Bogus") && e.contains("not expected")), "{errors:?}");
    }

    #[test]
    fn extensions_take_foreign_and_assertion_elements() {
        let xml = response("").replace(
            "<samlp:Status>",
            r#"<samlp:Extensions><saml:Attribute Name="x"/><e:Hint xmlns:e="urn:example:ext"/></samlp:Extensions>
  <samlp:Status>"#,
        );
        assert_eq!(validate(&xml), vec![]);
    }

    #[test]
    fn extensions_reject_protocol_elements() {
        let xml = response("").replace(
            "<samlp:Status>",
            "<samlp:Extensions><samlp:Status/></samlp:Extensions>\n  <samlp:Status>",
        );
        let errors = messages(&xml);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("Status"), "{errors:?}");
    }

    #[test]
    fn required_attributes() {
        let xml = response(&ASSERTION.replace(r#" AuthnInstant="2024-01-01T00:00:00Z""#, ""));
        let errors = messages(&xml);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'AuthnInstant' is required but missing"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let xml = response(&ASSERTION.replace("<saml:Subject>", r#"<saml:Subject Foo="bar">"#));
        let errors = messages(&xml);
        assert!(errors[0].contains("attribute 'Foo'"), "{errors:?}");
    }

    #[test]
    fn foreign_attributes_are_tolerated() {
        let xml = response(&ASSERTION.replace(
            "<saml:Subject>",
            r#"<saml:Subject xmlns:x="urn:x" x:hint="1">"#,
        ));
        assert!(validate(&xml).is_empty());
    }

    #[test]
    fn date_time_lexical_forms() {
        assert!(is_date_time("2024-01-01T10:00:00Z"));
        assert!(is_date_time("2024-01-01T10:00:00.123+02:00"));
        assert!(is_date_time("2024-01-01T10:00:00"));
        assert!(!is_date_time("2024-01-01 10:00:00Z"));
        assert!(!is_date_time("2024-1-01T10:00:00Z"));
    }

    #[test]
    fn bad_date_time() {
        let xml = response(&ASSERTION.replace(
            r#"NotBefore="2024-01-01T00:00:00Z""#,
            r#"NotBefore="tomorrow""#,
        ));
        let errors = messages(&xml);
        assert!(errors[0].contains("xs:dateTime"), "{errors:?}");

        let xml = response(&ASSERTION.replace(
            r#"NotBefore="2024-01-01T00:00:00Z""#,
            r#"NotBefore="2024-02-30T00:00:00Z""#,
        ));
        assert!(!validate(&xml).is_empty());
    }

    #[test]
    fn wrong_version() {
        let xml = response(ASSERTION).replacen(r#"Version="2.0""#, r#"Version="1.1""#, 1);
        let errors = messages(&xml);
        assert!(errors[0].contains("Unsupported SAML version"));
    }

    #[test]
    fn duplicate_ids() {
        let xml = response(ASSERTION).replacen(r#"ID="_r1""#, r#"ID="_a1""#, 1);
        let errors = messages(&xml);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'_a1' is not a valid value of the atomic type 'xs:ID'"));
    }

    #[test]
    fn ids_must_be_ncnames() {
        let xml = response(ASSERTION).replacen(r#"ID="_a1""#, r#"ID="1abc""#, 1);
        assert!(messages(&xml)[0].contains("xs:ID"));
    }

    #[test]
    fn text_in_element_only_content() {
        let xml = response(&ASSERTION.replace("<saml:Subject>", "<saml:Subject>stray"));
        let errors = messages(&xml);
        assert!(errors[0].contains("element-only"), "{errors:?}");
    }

    #[test]
    fn signature_and_encrypted_assertion_are_accepted() {
        let body = format!(
            r#"<saml:EncryptedAssertion><xenc:EncryptedData xmlns:xenc="{}" Type="{}"><xenc:CipherData><xenc:CipherValue>AAAA</xenc:CipherValue></xenc:CipherData></xenc:EncryptedData></saml:EncryptedAssertion>"#,
            ns::ENC,
            ns::ENC_TYPE_ELEMENT
        );
        assert!(validate(&response(&body)).is_empty());

        let signed = response("").replace(
            "</saml:Issuer>",
            &format!(r#"</saml:Issuer><ds:Signature xmlns:ds="{}"><ds:SignedInfo/></ds:Signature>"#, ns::DSIG),
        );
        assert!(validate(&signed).is_empty());
    }

    #[test]
    fn wrong_root() {
        let errors = messages(&format!(r#"<saml:Assertion xmlns:saml="{}"/>"#, ns::ASSERTION));
        assert!(errors[0].contains("validation root"));
    }

    #[test]
    fn garbage_and_empty_input() {
        assert_eq!(messages(""), vec!["Document is empty".to_owned()]);
        let errors = validate("not xml");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 1);
    }

    #[test]
    fn strict_message_carries_document() {
        let xml = response("<saml:Nope/>");
        let Err(Error::SchemaViolation(message)) = check(&xml) else {
            panic!("expected schema violation");
        };
        let (first, rest) = message.split_once("\n\n").unwrap();
        assert!(first.contains("Nope"));
        assert_eq!(rest, xml);
    }
}
