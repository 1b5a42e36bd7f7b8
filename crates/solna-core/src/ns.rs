#![forbid(unsafe_code)]

//! XML namespace constants used across the library.

/// SAML 2.0 assertion namespace
pub const ASSERTION: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace
pub const PROTOCOL: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Digital Signature namespace
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace
pub const ENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// Exclusive C14N namespace (InclusiveNamespaces)
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

/// XML namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Schema instance namespace
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Top-level status code of a successful response.
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// The only protocol version accepted.
pub const SAML_VERSION: &str = "2.0";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    // Protocol elements
    pub const RESPONSE: &str = "Response";
    pub const STATUS: &str = "Status";
    pub const STATUS_CODE: &str = "StatusCode";
    pub const STATUS_MESSAGE: &str = "StatusMessage";
    pub const STATUS_DETAIL: &str = "StatusDetail";
    pub const EXTENSIONS: &str = "Extensions";

    // Assertion elements
    pub const ASSERTION: &str = "Assertion";
    pub const ENCRYPTED_ASSERTION: &str = "EncryptedAssertion";
    pub const ISSUER: &str = "Issuer";
    pub const SUBJECT: &str = "Subject";
    pub const NAME_ID: &str = "NameID";
    pub const BASE_ID: &str = "BaseID";
    pub const ENCRYPTED_ID: &str = "EncryptedID";
    pub const SUBJECT_CONFIRMATION: &str = "SubjectConfirmation";
    pub const SUBJECT_CONFIRMATION_DATA: &str = "SubjectConfirmationData";
    pub const CONDITIONS: &str = "Conditions";
    pub const CONDITION: &str = "Condition";
    pub const AUDIENCE_RESTRICTION: &str = "AudienceRestriction";
    pub const AUDIENCE: &str = "Audience";
    pub const ONE_TIME_USE: &str = "OneTimeUse";
    pub const PROXY_RESTRICTION: &str = "ProxyRestriction";
    pub const ADVICE: &str = "Advice";
    pub const STATEMENT: &str = "Statement";
    pub const AUTHN_STATEMENT: &str = "AuthnStatement";
    pub const SUBJECT_LOCALITY: &str = "SubjectLocality";
    pub const AUTHN_CONTEXT: &str = "AuthnContext";
    pub const AUTHZ_DECISION_STATEMENT: &str = "AuthzDecisionStatement";
    pub const ATTRIBUTE_STATEMENT: &str = "AttributeStatement";
    pub const ATTRIBUTE: &str = "Attribute";
    pub const ENCRYPTED_ATTRIBUTE: &str = "EncryptedAttribute";
    pub const ATTRIBUTE_VALUE: &str = "AttributeValue";

    // DSig elements
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    pub const INCLUSIVE_NAMESPACES: &str = "InclusiveNamespaces";

    // Encryption elements
    pub const ENCRYPTED_DATA: &str = "EncryptedData";
    pub const ENCRYPTED_KEY: &str = "EncryptedKey";
    pub const ENCRYPTION_METHOD: &str = "EncryptionMethod";
    pub const CIPHER_DATA: &str = "CipherData";
    pub const CIPHER_VALUE: &str = "CipherValue";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const ID: &str = "ID";
    pub const VERSION: &str = "Version";
    pub const ISSUE_INSTANT: &str = "IssueInstant";
    pub const VALUE: &str = "Value";
    pub const NAME: &str = "Name";
    pub const NOT_BEFORE: &str = "NotBefore";
    pub const NOT_ON_OR_AFTER: &str = "NotOnOrAfter";
    pub const SESSION_INDEX: &str = "SessionIndex";
    pub const SESSION_NOT_ON_OR_AFTER: &str = "SessionNotOnOrAfter";
    pub const AUTHN_INSTANT: &str = "AuthnInstant";
    pub const METHOD: &str = "Method";
    pub const URI: &str = "URI";
    pub const TYPE: &str = "Type";
    pub const ALGORITHM: &str = "Algorithm";
    pub const PREFIX_LIST: &str = "PrefixList";
}

// ── Encryption type URIs ─────────────────────────────────────────────

pub const ENC_TYPE_ELEMENT: &str = "http://www.w3.org/2001/04/xmlenc#Element";
