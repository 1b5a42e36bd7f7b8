#![forbid(unsafe_code)]

/// Which side of the assertion validity window was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionViolation {
    /// The current time (plus allowed drift) is before `NotBefore`.
    NotYetValid,
    /// The current time is on or after `NotOnOrAfter`.
    Expired,
}

impl std::fmt::Display for ConditionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYetValid => f.write_str("Current time is earlier than NotBefore condition"),
            Self::Expired => f.write_str("Current time is on or after NotOnOrAfter condition"),
        }
    }
}

/// Errors produced while loading, decrypting and validating SAML responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("No settings on response")]
    MissingTrustConfiguration,

    #[error("No fingerprint or certificate on settings")]
    MissingTrustMaterial,

    #[error("{0}")]
    Conditions(ConditionViolation),

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_messages_are_distinct() {
        let early = Error::Conditions(ConditionViolation::NotYetValid).to_string();
        let late = Error::Conditions(ConditionViolation::Expired).to_string();
        assert!(early.contains("NotBefore"));
        assert!(late.contains("NotOnOrAfter"));
        assert_ne!(early, late);
    }

    #[test]
    fn trust_errors_match_response_state_messages() {
        assert_eq!(Error::MissingTrustConfiguration.to_string(), "No settings on response");
        assert_eq!(
            Error::MissingTrustMaterial.to_string(),
            "No fingerprint or certificate on settings"
        );
    }
}
