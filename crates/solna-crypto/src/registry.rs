#![forbid(unsafe_code)]

//! Supported algorithm URIs, as resolved by the `from_uri` constructors.

use solna_core::algorithm;

/// Supported algorithm URIs, by category.
pub const SUPPORTED: &[(&str, &[&str])] = &[
    (
        "Digest",
        &[algorithm::SHA1, algorithm::SHA256, algorithm::SHA384, algorithm::SHA512],
    ),
    (
        "Signature",
        &[
            algorithm::RSA_SHA1,
            algorithm::RSA_SHA256,
            algorithm::RSA_SHA384,
            algorithm::RSA_SHA512,
        ],
    ),
    ("Block cipher", &[algorithm::AES128_CBC, algorithm::AES256_CBC]),
    ("Key transport", &[algorithm::RSA_OAEP]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use solna_core::Error;

    #[test]
    fn every_listed_uri_resolves() {
        for (category, uris) in SUPPORTED {
            for uri in *uris {
                let found = match *category {
                    "Digest" => crate::digest::from_uri(uri).is_ok(),
                    "Signature" => crate::sign::from_uri(uri).is_ok(),
                    "Block cipher" => crate::cipher::from_uri(uri).is_ok(),
                    _ => crate::keytransport::from_uri(uri).is_ok(),
                };
                assert!(found, "{category}: {uri}");
            }
        }
    }

    #[test]
    fn unlisted_cipher_is_unsupported() {
        assert!(matches!(
            crate::cipher::from_uri("http://www.w3.org/2009/xmlenc11#aes128-gcm"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
