#![forbid(unsafe_code)]

//! One inbound SAML response.

use crate::attributes::Attributes;
use crate::claims::{self, Claims, Conditions};
use crate::settings::{ResponseOptions, Settings};
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, Utc};
use solna_core::{ns, Error};
use solna_dsig::SignedDocument;
use std::cell::OnceCell;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A SAML 2.0 `Response` received by the service provider.
///
/// Derived state (the decrypted assertion document and the claims read from
/// it) is computed on first use and cached for the life of the value.
/// Build one `Response` per inbound message; it is not `Sync`.
#[derive(Debug)]
pub struct Response<'a> {
    raw: String,
    document: SignedDocument,
    options: ResponseOptions,
    settings: Option<&'a Settings>,
    assertion_document: OnceCell<Result<Option<SignedDocument>, Error>>,
    claims: OnceCell<Claims>,
    status_code: OnceCell<Option<String>>,
}

impl<'a> Response<'a> {
    /// Load a response from XML text or its base64 encoding.
    ///
    /// Text starting with `<` is taken as XML. Anything else is base64
    /// decoded; undecodable input yields an empty document, which fails
    /// validation.
    pub fn new(input: &str, options: ResponseOptions) -> Result<Self, Error> {
        if input.is_empty() {
            return Err(Error::InvalidArgument("Response cannot be empty".into()));
        }
        let xml = if input.starts_with('<') {
            input.to_owned()
        } else {
            decode_base64(input)
        };
        Ok(Self {
            raw: input.to_owned(),
            document: SignedDocument::new(xml),
            options,
            settings: None,
            assertion_document: OnceCell::new(),
            claims: OnceCell::new(),
            status_code: OnceCell::new(),
        })
    }

    /// [`Response::new`] with settings attached.
    pub fn with_settings(
        input: &str,
        options: ResponseOptions,
        settings: &'a Settings,
    ) -> Result<Self, Error> {
        let mut response = Self::new(input, options)?;
        response.set_settings(settings);
        Ok(response)
    }

    /// Attach trust settings. Cached derived state is discarded.
    pub fn set_settings(&mut self, settings: &'a Settings) {
        self.settings = Some(settings);
        self.assertion_document = OnceCell::new();
        self.claims = OnceCell::new();
    }

    pub fn settings(&self) -> Option<&'a Settings> {
        self.settings
    }

    pub fn options(&self) -> &ResponseOptions {
        &self.options
    }

    /// The input exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The response as received, after base64 decoding.
    pub fn document(&self) -> &SignedDocument {
        &self.document
    }

    pub fn is_encrypted(&self) -> bool {
        crate::assemble::is_encrypted(self.document.text())
    }

    /// The document holding the assertion: the decrypted and re-assembled
    /// response when encrypted, the original document otherwise.
    pub fn assertion_document(&self) -> Result<&SignedDocument, Error> {
        let assembled = self
            .assertion_document
            .get_or_init(|| crate::assemble::assemble(&self.document, self.settings));
        match assembled {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Ok(&self.document),
            Err(e) => Err(e.clone()),
        }
    }

    /// Text of the assertion document.
    pub fn decoded_response(&self) -> Result<&str, Error> {
        self.assertion_document().map(SignedDocument::text)
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Run the validation pipeline; any failure is `false`.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Run the validation pipeline, returning the first failing stage's
    /// error. A response that passes every check but carries a
    /// non-success status is `Ok(false)`.
    pub fn validate(&self) -> Result<bool, Error> {
        self.validate_at(Utc::now())
    }

    /// [`Response::is_valid`] with an explicit current time.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        crate::validation::run(self, now, true).unwrap_or(false)
    }

    /// [`Response::validate`] with an explicit current time.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<bool, Error> {
        crate::validation::run(self, now, false)
    }

    // ── Claims ───────────────────────────────────────────────────────

    fn claims(&self) -> &Claims {
        self.claims.get_or_init(|| match self.assertion_document() {
            Ok(document) => Claims::extract(document),
            Err(e) => {
                tracing::debug!(error = %e, "no assertion document; claims are empty");
                Claims::default()
            }
        })
    }

    /// `Subject/NameID` of the signed assertion.
    pub fn name_id(&self) -> Option<&str> {
        self.claims().name_id.as_deref()
    }

    /// `AuthnStatement/@SessionIndex` of the signed assertion.
    pub fn session_index(&self) -> Option<&str> {
        self.claims().session_index.as_deref()
    }

    /// `AuthnStatement/@SessionNotOnOrAfter` of the signed assertion.
    pub fn session_expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims().session_expires_at()
    }

    pub fn conditions(&self) -> Option<&Conditions> {
        self.claims().conditions.as_ref()
    }

    pub fn conditions_present(&self) -> bool {
        self.conditions().is_some()
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.conditions().and_then(|c| c.not_before().ok().flatten())
    }

    pub fn not_on_or_after(&self) -> Option<DateTime<Utc>> {
        self.conditions().and_then(|c| c.not_on_or_after().ok().flatten())
    }

    /// Attributes of the signed assertion; empty when it has none.
    pub fn attributes(&self) -> &Attributes {
        &self.claims().attributes
    }

    /// The response-level `Issuer`, else the signed assertion's.
    pub fn issuer(&self) -> Option<&str> {
        self.claims().issuer.as_deref()
    }

    /// Top-level `StatusCode/@Value` of the response as received.
    pub fn status_code(&self) -> Option<&str> {
        self.status_code
            .get_or_init(|| {
                let parsed = self.document.document().parse_doc().ok()?;
                claims::status_code(parsed.root_element())
            })
            .as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status_code() == Some(ns::STATUS_SUCCESS)
    }
}

fn decode_base64(input: &str) -> String {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match LENIENT_BASE64.decode(compact) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "response is neither XML nor base64");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"><samlp:Status><samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Requester"/></samlp:Status></samlp:Response>"#;

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            Response::new("", ResponseOptions::default()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn xml_is_used_verbatim() {
        let response = Response::new(XML, ResponseOptions::default()).unwrap();
        assert_eq!(response.document().text(), XML);
        assert_eq!(response.raw(), XML);
    }

    #[test]
    fn base64_is_decoded() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(XML);
        let wrapped: String = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| format!("{}\r\n", std::str::from_utf8(c).unwrap()))
            .collect();
        let response = Response::new(&wrapped, ResponseOptions::default()).unwrap();
        assert_eq!(response.document().text(), XML);
        assert_eq!(response.raw(), wrapped);
        assert_eq!(
            response.status_code(),
            Some("urn:oasis:names:tc:SAML:2.0:status:Requester")
        );
        assert!(!response.is_success());
    }

    #[test]
    fn garbage_decodes_to_an_empty_document() {
        let response = Response::new("!!not base64!!", ResponseOptions::default()).unwrap();
        assert_eq!(response.document().text(), "");
        assert!(!response.is_valid());
        assert!(matches!(response.validate(), Err(Error::SchemaViolation(_))));
    }

    #[test]
    fn claims_of_unsigned_response_are_empty() {
        let response = Response::new(XML, ResponseOptions::default()).unwrap();
        assert_eq!(response.name_id(), None);
        assert!(response.attributes().is_empty());
        assert!(!response.conditions_present());
        assert!(!response.is_encrypted());
        assert_eq!(response.decoded_response().unwrap(), XML);
    }

    #[test]
    fn settings_are_borrowed_and_reset_caches() {
        let settings = Settings::default();
        let mut response = Response::new(XML, ResponseOptions::default()).unwrap();
        assert!(response.settings().is_none());
        let _ = response.name_id();
        response.set_settings(&settings);
        assert!(response.settings().is_some());
        assert!(response.claims.get().is_none());
    }
}
