//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! Flickr authenticates REST calls with OAuth parameters carried in the
//! query string. Signing normalizes every request parameter, builds the
//! signature base string and signs it with the consumer secret joined to
//! the token secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Percent-encode a value the way OAuth signatures require.
pub fn oauth_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Build the signature base string: `METHOD&url&normalized-params`.
pub fn signature_base_string(http_method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (oauth_encode(key), oauth_encode(value)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        http_method.to_ascii_uppercase(),
        oauth_encode(url),
        oauth_encode(&normalized)
    )
}

/// HMAC-SHA1 signature of `base_string`, base64 encoded.
pub fn hmac_sha1_signature(base_string: &str, consumer_secret: &str, token_secret: Option<&str>) -> String {
    let key = format!("{}&{}", oauth_encode(consumer_secret), oauth_encode(token_secret.unwrap_or("")));
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Token half of the signing key.
#[derive(Debug, Clone, Copy)]
pub struct TokenPair<'a> {
    pub token: &'a str,
    pub secret: &'a str,
}

/// Per-request values that must differ between calls.
#[derive(Debug, Clone)]
pub struct Freshness {
    pub nonce: String,
    pub timestamp: i64,
}

impl Freshness {
    pub fn now() -> Self {
        Self {
            nonce: uuid::Uuid::new_v4().simple().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Signs requests on behalf of one consumer.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
}

impl Signer<'_> {
    /// Return `params` extended with the `oauth_*` protocol parameters and
    /// the resulting `oauth_signature`.
    ///
    /// `extra` carries flow-specific protocol parameters such as
    /// `oauth_callback` or `oauth_verifier`; they are signed like the rest.
    pub fn sign(
        &self,
        http_method: &str,
        url: &str,
        params: Vec<(String, String)>,
        token: Option<TokenPair<'_>>,
        extra: &[(&str, &str)],
        freshness: &Freshness,
    ) -> Vec<(String, String)> {
        let mut signed = params;
        signed.push(("oauth_consumer_key".into(), self.consumer_key.into()));
        signed.push(("oauth_nonce".into(), freshness.nonce.clone()));
        signed.push(("oauth_signature_method".into(), SIGNATURE_METHOD.into()));
        signed.push(("oauth_timestamp".into(), freshness.timestamp.to_string()));
        signed.push(("oauth_version".into(), OAUTH_VERSION.into()));
        if let Some(token) = token {
            signed.push(("oauth_token".into(), token.token.into()));
        }
        for (key, value) in extra {
            signed.push(((*key).into(), (*value).into()));
        }

        let base_string = signature_base_string(http_method, url, &signed);
        let signature = hmac_sha1_signature(&base_string, self.consumer_secret, token.map(|token| token.secret));
        signed.push(("oauth_signature".into(), signature));
        signed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_params() -> Vec<(String, String)> {
        vec![("file".into(), "vacation.jpg".into()), ("size".into(), "original".into())]
    }

    fn reference_signer() -> Signer<'static> {
        Signer {
            consumer_key: "dpf43f3p2l4k3l03",
            consumer_secret: "kd94hf93k423kf44",
        }
    }

    fn reference_freshness() -> Freshness {
        Freshness {
            nonce: "kllo9940pd9333jh".into(),
            timestamp: 1191242096,
        }
    }

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(oauth_encode("a b&c=d/e~f-g.h_i"), "a%20b%26c%3Dd%2Fe~f-g.h_i");
        assert_eq!(oauth_encode("é"), "%C3%A9");
    }

    #[test]
    fn base_string_matches_reference_example() {
        let mut params = reference_params();
        params.extend([
            ("oauth_consumer_key".to_string(), "dpf43f3p2l4k3l03".to_string()),
            ("oauth_token".to_string(), "nnch734d00sl2jdk".to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), "1191242096".to_string()),
            ("oauth_nonce".to_string(), "kllo9940pd9333jh".to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]);
        let base = signature_base_string("get", "http://photos.example.net/photos", &params);
        assert_eq!(
            base,
            "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
        );
    }

    #[test]
    fn signer_produces_reference_signature() {
        let signed = reference_signer().sign(
            "GET",
            "http://photos.example.net/photos",
            reference_params(),
            Some(TokenPair {
                token: "nnch734d00sl2jdk",
                secret: "pfkkdhi9sl3r4s00",
            }),
            &[],
            &reference_freshness(),
        );
        let signature = signed
            .iter()
            .find(|(key, _)| key == "oauth_signature")
            .map(|(_, value)| value.as_str());
        assert_eq!(signature, Some("tR3+Ty81lMeYAr/Fid0kMTYa/WM="));
    }

    #[test]
    fn extra_parameters_are_signed() {
        let signer = reference_signer();
        let freshness = reference_freshness();
        let plain = signer.sign("GET", "https://example.com/request_token", Vec::new(), None, &[], &freshness);
        let with_callback = signer.sign(
            "GET",
            "https://example.com/request_token",
            Vec::new(),
            None,
            &[("oauth_callback", "oob")],
            &freshness,
        );
        assert!(with_callback.iter().any(|(key, value)| key == "oauth_callback" && value == "oob"));
        assert!(!plain.iter().any(|(key, _)| key == "oauth_token"));
        assert_ne!(plain.last(), with_callback.last());
    }

    #[test]
    fn fresh_nonces_differ() {
        assert_ne!(Freshness::now().nonce, Freshness::now().nonce);
    }
}
