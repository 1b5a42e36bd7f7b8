#![forbid(unsafe_code)]

//! Solna: SAML 2.0 Response validation for service providers.
//!
//! A [`Response`] wraps one inbound message. [`Response::is_valid`] and
//! [`Response::validate`] run the validation pipeline (schema, response
//! state, conditions, signature, status); claim accessors such as
//! [`Response::name_id`] only ever read from the assertion the verified
//! signature covers.
//!
//! ```no_run
//! use solna::{Response, ResponseOptions, Settings};
//!
//! # fn main() -> Result<(), solna::Error> {
//! let settings = Settings::load("sp.toml")?;
//! let saml_response = std::fs::read_to_string("response.b64").unwrap_or_default();
//! let mut response = Response::new(&saml_response, ResponseOptions::default())?;
//! response.set_settings(&settings);
//! if response.is_valid() {
//!     println!("{:?}", response.name_id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod attributes;
pub mod claims;
pub mod response;
pub mod schema;
pub mod settings;
pub mod time;
pub mod validation;

pub use attributes::{AttributeValue, Attributes};
pub use response::Response;
pub use settings::{ResponseOptions, Settings};
pub use solna_core::{ConditionViolation, Error, Result};

pub use solna_c14n as c14n;
pub use solna_core as core;
pub use solna_crypto as crypto;
pub use solna_dsig as dsig;
pub use solna_enc as enc;
pub use solna_keys as keys;
pub use solna_xml as xml;
