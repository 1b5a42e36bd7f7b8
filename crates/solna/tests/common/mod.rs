#![allow(dead_code)]

//! Fixtures shared by the integration tests: responses are built from
//! templates, signed with the IdP test key, and optionally encrypted for
//! the SP test certificate.

use chrono::{DateTime, TimeZone, Utc};
use solna::core::{algorithm, ns};
use solna::dsig::SignatureTemplate;
use solna::enc::AssertionEncryptor;
use solna::keys::{loader, Certificate};
use solna::Settings;

pub const IDP_KEY: &str = include_str!("../../../../test-data/keys/idp-key.pem");
pub const IDP_CERT: &str = include_str!("../../../../test-data/keys/idp-cert.pem");
pub const ROGUE_KEY: &str = include_str!("../../../../test-data/keys/rogue-key.pem");
pub const ROGUE_CERT: &str = include_str!("../../../../test-data/keys/rogue-cert.pem");
pub const SP_KEY: &str = include_str!("../../../../test-data/keys/sp-key.pem");
pub const SP_KEY_ENCRYPTED: &str = include_str!("../../../../test-data/keys/sp-key-encrypted.pem");
pub const SP_KEY_PASSWORD: &str = "secret123";
pub const SP_CERT: &str = include_str!("../../../../test-data/keys/sp-cert.pem");
pub const IDP_FINGERPRINT: &str = "6D:AD:D5:ED:9E:9E:0B:DE:10:0A:97:90:22:EC:35:36:78:F3:83:E0";

pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

/// 2024-01-01 at the given time of day.
pub fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
}

/// A time inside every fixture's validity window.
pub fn now() -> DateTime<Utc> {
    at(10, 30, 0)
}

pub fn cert_base64(pem: &str) -> String {
    pem.lines().filter(|l| !l.starts_with("-----")).collect()
}

pub fn settings() -> Settings {
    Settings {
        idp_cert_fingerprint: Some(IDP_FINGERPRINT.into()),
        ..Settings::default()
    }
}

pub fn sp_settings() -> Settings {
    Settings {
        private_key: Some(SP_KEY.into()),
        ..settings()
    }
}

/// Attribute statement used by [`assertion`] unless overridden.
pub const ATTRIBUTES: &str = r#"<saml:AttributeStatement>
      <saml:Attribute Name="mail"><saml:AttributeValue>alice@example.test</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="role"><saml:AttributeValue>reader</saml:AttributeValue><saml:AttributeValue>writer</saml:AttributeValue></saml:Attribute>
      <saml:Attribute Name="role"><saml:AttributeValue>admin</saml:AttributeValue></saml:Attribute>
    </saml:AttributeStatement>"#;

/// A standalone assertion for `alice@example.test`, valid 10:00 to 11:00.
pub fn assertion(id: &str, name_id: &str, attributes: &str) -> String {
    format!(
        r#"<saml:Assertion xmlns:saml="{a}" ID="{id}" Version="2.0" IssueInstant="2024-01-01T10:00:00Z">
    <saml:Issuer>https://idp.example.test</saml:Issuer>
    <saml:Subject>
      <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">{name_id}</saml:NameID>
      <saml:SubjectConfirmation Method="urn:oasis:names:tc:SAML:2.0:cm:bearer">
        <saml:SubjectConfirmationData NotOnOrAfter="2024-01-01T10:05:00Z" Recipient="https://sp.example.test/acs"/>
      </saml:SubjectConfirmation>
    </saml:Subject>
    <saml:Conditions NotBefore="2024-01-01T10:00:00Z" NotOnOrAfter="2024-01-01T11:00:00Z">
      <saml:AudienceRestriction><saml:Audience>https://sp.example.test</saml:Audience></saml:AudienceRestriction>
    </saml:Conditions>
    <saml:AuthnStatement AuthnInstant="2024-01-01T10:00:00Z" SessionIndex="_session1" SessionNotOnOrAfter="2024-01-01T18:00:00Z">
      <saml:AuthnContext><saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:Password</saml:AuthnContextClassRef></saml:AuthnContext>
    </saml:AuthnStatement>
    {attributes}
  </saml:Assertion>"#,
        a = ns::ASSERTION
    )
}

/// A response with the given status carrying `body` after its `Status`.
pub fn response(status: &str, body: &str) -> String {
    format!(
        r#"<samlp:Response xmlns:samlp="{p}" xmlns:saml="{a}" ID="_response1" Version="2.0" IssueInstant="2024-01-01T10:00:00Z" Destination="https://sp.example.test/acs">
  <saml:Issuer>https://idp.example.test</saml:Issuer>
  <samlp:Status><samlp:StatusCode Value="{status}"/></samlp:Status>
  {body}
</samlp:Response>"#,
        p = ns::PROTOCOL,
        a = ns::ASSERTION
    )
}

/// Sign the element with ID `id` using `key`, embedding `cert`.
pub fn sign(xml: &str, id: &str, key: &str, cert: &str) -> String {
    let key = loader::load_pem_auto(key.as_bytes(), None).unwrap();
    let template = SignatureTemplate::new(id)
        .with_algorithms(algorithm::RSA_SHA256, algorithm::SHA256)
        .with_certificate(cert_base64(cert));
    solna::dsig::sign::sign_element(&key, xml, id, &template).unwrap()
}

/// A successful response whose assertion `_assertion1` is signed by the IdP.
pub fn signed_response() -> String {
    signed_response_with(SUCCESS, ATTRIBUTES)
}

pub fn signed_response_with(status: &str, attributes: &str) -> String {
    let xml = response(status, &assertion("_assertion1", "alice@example.test", attributes));
    sign(&xml, "_assertion1", IDP_KEY, IDP_CERT)
}

/// A successful response carrying the signed assertion encrypted for the SP.
pub fn encrypted_response(cipher: &str) -> String {
    let signed = sign(
        &assertion("_assertion1", "alice@example.test", ATTRIBUTES),
        "_assertion1",
        IDP_KEY,
        IDP_CERT,
    );
    let sp_cert = Certificate::parse(SP_CERT).unwrap();
    let encrypted = AssertionEncryptor::new(sp_cert.public_key().unwrap())
        .with_cipher(cipher)
        .unwrap()
        .encrypt(&signed)
        .unwrap();
    response(SUCCESS, &encrypted)
}
