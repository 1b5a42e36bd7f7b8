#![forbid(unsafe_code)]

//! The response validation pipeline.
//!
//! Stages run in order and stop at the first failure:
//!
//! 1. structure (schema)
//! 2. response state (non-empty, settings, trust material)
//! 3. conditions (time window)
//! 4. signature, against the configured fingerprint
//! 5. status (`Success`), folded in as a boolean
//!
//! In soft mode every failure becomes `Ok(false)`; otherwise the failing
//! stage's error is returned. A non-success status is never an error.

use crate::claims::Conditions;
use crate::response::Response;
use crate::settings::{ResponseOptions, Settings};
use chrono::{DateTime, Utc};
use solna_core::{ConditionViolation, Error};

pub(crate) fn run(response: &Response<'_>, now: DateTime<Utc>, soft: bool) -> Result<bool, Error> {
    match stages(response, now, soft) {
        Err(e) if soft => {
            tracing::debug!(error = %e, "response rejected");
            Ok(false)
        }
        outcome => outcome,
    }
}

fn stages(response: &Response<'_>, now: DateTime<Utc>, soft: bool) -> Result<bool, Error> {
    validate_structure(response.document().text())?;
    tracing::trace!("structure ok");

    let settings = validate_response_state(response.document().text(), response.settings())?;
    tracing::trace!("response state ok");

    response.assertion_document()?;
    validate_conditions(response.conditions(), response.options(), now)?;
    tracing::trace!("conditions ok");

    let fingerprint = fingerprint(settings)?;
    if !response
        .assertion_document()?
        .validate_document(&fingerprint, soft)?
    {
        return Ok(false);
    }
    tracing::trace!("signature ok");

    let success = response.is_success();
    if !success {
        tracing::debug!(status = response.status_code(), "status is not Success");
    }
    Ok(success)
}

/// Stage 1: the document must match the SAML protocol schema.
pub fn validate_structure(text: &str) -> Result<(), Error> {
    crate::schema::check(text)
}

/// Stage 2: a non-blank response, settings, and a certificate or fingerprint.
pub fn validate_response_state<'s>(
    text: &str,
    settings: Option<&'s Settings>,
) -> Result<&'s Settings, Error> {
    if text.is_empty() {
        return Err(Error::InvalidArgument("Blank response".into()));
    }
    let settings = settings.ok_or(Error::MissingTrustConfiguration)?;
    if !settings.has_trust_material() {
        return Err(Error::MissingTrustMaterial);
    }
    Ok(settings)
}

/// Stage 3: `now` must fall inside the assertion's validity window.
///
/// The allowed clock drift widens the window on the `NotBefore` side only.
pub fn validate_conditions(
    conditions: Option<&Conditions>,
    options: &ResponseOptions,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let Some(conditions) = conditions else {
        return Ok(());
    };
    if options.skip_conditions {
        return Ok(());
    }

    let drift = chrono::Duration::from_std(options.allowed_clock_drift)
        .map_err(|e| Error::Config(format!("allowed_clock_drift: {e}")))?;
    if let Some(not_before) = conditions.not_before()? {
        if now + drift < not_before {
            return Err(Error::Conditions(ConditionViolation::NotYetValid));
        }
    }
    if let Some(not_on_or_after) = conditions.not_on_or_after()? {
        if now >= not_on_or_after {
            return Err(Error::Conditions(ConditionViolation::Expired));
        }
    }
    Ok(())
}

/// The fingerprint signatures are checked against.
pub fn fingerprint(settings: &Settings) -> Result<String, Error> {
    settings.idp_fingerprint()?.ok_or(Error::MissingTrustMaterial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn window() -> Conditions {
        Conditions {
            not_before: Some("2024-01-01T10:00:00Z".into()),
            not_on_or_after: Some("2024-01-01T11:00:00Z".into()),
        }
    }

    #[test]
    fn inside_window() {
        let options = ResponseOptions::default();
        assert!(validate_conditions(Some(&window()), &options, at(10, 0, 0)).is_ok());
        assert!(validate_conditions(Some(&window()), &options, at(10, 59, 59)).is_ok());
    }

    #[test]
    fn too_early_unless_drift_covers_it() {
        let strict = ResponseOptions::default();
        assert_eq!(
            validate_conditions(Some(&window()), &strict, at(9, 59, 58)),
            Err(Error::Conditions(ConditionViolation::NotYetValid))
        );
        let lenient = strict.with_allowed_clock_drift(Duration::from_secs(5));
        assert!(validate_conditions(Some(&window()), &lenient, at(9, 59, 58)).is_ok());
        assert!(validate_conditions(Some(&window()), &lenient, at(9, 59, 55)).is_ok());
        assert!(validate_conditions(Some(&window()), &lenient, at(9, 59, 54)).is_err());
    }

    #[test]
    fn drift_does_not_extend_expiry() {
        let lenient = ResponseOptions::default().with_allowed_clock_drift(Duration::from_secs(600));
        assert_eq!(
            validate_conditions(Some(&window()), &lenient, at(11, 0, 0)),
            Err(Error::Conditions(ConditionViolation::Expired))
        );
    }

    #[test]
    fn skipped_or_absent() {
        let skip = ResponseOptions::default().with_skip_conditions(true);
        assert!(validate_conditions(Some(&window()), &skip, at(23, 0, 0)).is_ok());
        assert!(validate_conditions(None, &ResponseOptions::default(), at(23, 0, 0)).is_ok());
        let open = Conditions::default();
        assert!(validate_conditions(Some(&open), &ResponseOptions::default(), at(23, 0, 0)).is_ok());
    }

    #[test]
    fn malformed_bound_is_an_error() {
        let bad = Conditions {
            not_before: Some("2024-02-30T00:00:00Z".into()),
            not_on_or_after: None,
        };
        assert!(matches!(
            validate_conditions(Some(&bad), &ResponseOptions::default(), at(10, 0, 0)),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn response_state() {
        let with_fp = Settings {
            idp_cert_fingerprint: Some("AA".into()),
            ..Settings::default()
        };
        assert_eq!(
            validate_response_state("", Some(&with_fp)).unwrap_err(),
            Error::InvalidArgument("Blank response".into())
        );
        assert_eq!(
            validate_response_state("<x/>", None).unwrap_err(),
            Error::MissingTrustConfiguration
        );
        assert_eq!(
            validate_response_state("<x/>", Some(&Settings::default())).unwrap_err(),
            Error::MissingTrustMaterial
        );
        assert!(validate_response_state("<x/>", Some(&with_fp)).is_ok());
        assert_eq!(fingerprint(&with_fp).unwrap(), "AA");
    }
}
