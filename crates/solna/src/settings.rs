#![forbid(unsafe_code)]

//! Service provider trust configuration.
//!
//! [`Settings`] is plain data: the identifiers of this service provider and
//! the material used to trust the identity provider. It is validated for
//! presence when a response is checked, never for shape when it is built.
//!
//! Settings can be loaded from TOML:
//!
//! ```toml
//! issuer = "https://sp.example.com/metadata"
//! assertion_consumer_service_url = "https://sp.example.com/acs"
//! idp_cert_file = "idp-cert.pem"          # or idp_cert / idp_cert_fingerprint
//! private_key_file = "sp-key.pem"
//!
//! [response]
//! skip_conditions = false
//! allowed_clock_drift = 5                 # seconds
//! ```

use serde::{Deserialize, Deserializer};
use solna_core::Error;
use solna_keys::{Certificate, Key};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trust configuration shared by any number of responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entity ID of this service provider.
    pub issuer: Option<String>,
    pub assertion_consumer_service_url: Option<String>,
    pub sp_name_qualifier: Option<String>,
    pub name_identifier_format: Option<String>,
    pub idp_sso_target_url: Option<String>,
    pub idp_slo_target_url: Option<String>,

    /// IdP signing certificate, PEM or bare base64 DER.
    pub idp_cert: Option<String>,
    /// Read into `idp_cert` by [`Settings::load`].
    pub idp_cert_file: Option<PathBuf>,
    /// SHA-1 fingerprint of the IdP certificate, used when `idp_cert` is unset.
    pub idp_cert_fingerprint: Option<String>,

    /// SP private key (PEM) for encrypted assertions.
    pub private_key: Option<String>,
    /// Read into `private_key` by [`Settings::load`].
    pub private_key_file: Option<PathBuf>,
    pub private_key_password: Option<String>,
}

impl Settings {
    /// Parse settings from TOML text. `*_file` entries are left unresolved.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(format!("failed to parse settings: {e}")))
    }

    /// Load settings from a TOML file, reading `idp_cert_file` and
    /// `private_key_file` relative to the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = read_to_string(path)?;
        let mut settings = Self::from_toml_str(&text)?;
        settings.resolve_files(path.parent().unwrap_or_else(|| Path::new(".")))?;
        Ok(settings)
    }

    /// Fill inline PEM fields from their `*_file` counterparts.
    ///
    /// Inline values win when both are given.
    pub fn resolve_files(&mut self, base: &Path) -> Result<(), Error> {
        if self.idp_cert.is_none() {
            if let Some(file) = &self.idp_cert_file {
                self.idp_cert = Some(read_to_string(&base.join(file))?);
            }
        }
        if self.private_key.is_none() {
            if let Some(file) = &self.private_key_file {
                self.private_key = Some(read_to_string(&base.join(file))?);
            }
        }
        Ok(())
    }

    /// Whether a certificate or a fingerprint is configured.
    pub fn has_trust_material(&self) -> bool {
        self.idp_cert.is_some() || self.idp_cert_fingerprint.is_some()
    }

    /// The fingerprint responses are checked against.
    ///
    /// Derived from `idp_cert` when present (`AA:BB:..`, upper case),
    /// otherwise `idp_cert_fingerprint` verbatim.
    pub fn idp_fingerprint(&self) -> Result<Option<String>, Error> {
        match &self.idp_cert {
            Some(cert) => Ok(Some(Certificate::parse(cert)?.fingerprint_sha1())),
            None => Ok(self.idp_cert_fingerprint.clone()),
        }
    }

    /// The SP private key, decrypted with `private_key_password` if needed.
    pub fn sp_private_key(&self) -> Result<Key, Error> {
        let pem = self
            .private_key
            .as_deref()
            .ok_or_else(|| Error::Config("no private_key in settings".into()))?;
        let key = solna_keys::loader::load_pem_auto(
            pem.as_bytes(),
            self.private_key_password.as_deref(),
        )?;
        if !key.is_private() {
            return Err(Error::Key("private_key does not hold a private key".into()));
        }
        Ok(key)
    }
}

/// Per-response behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseOptions {
    /// Do not check the assertion's `Conditions` time window.
    pub skip_conditions: bool,
    /// Tolerance added to the current time when comparing with `NotBefore`.
    #[serde(deserialize_with = "seconds")]
    pub allowed_clock_drift: Duration,
}

impl ResponseOptions {
    pub fn with_skip_conditions(mut self, skip: bool) -> Self {
        self.skip_conditions = skip;
        self
    }

    pub fn with_allowed_clock_drift(mut self, drift: Duration) -> Self {
        self.allowed_clock_drift = drift;
        self
    }

    /// Read the `[response]` table of a settings file; absent means defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct File {
            #[serde(default)]
            response: ResponseOptions,
        }
        toml::from_str::<File>(text)
            .map(|f| f.response)
            .map_err(|e| Error::Config(format!("failed to parse response options: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_toml_str(&read_to_string(path.as_ref())?)
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}
