//! Flickr API client.
//!
//! This crate provides a small client for the Flickr REST endpoint. It
//! focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating configured base URLs for safety
//! - Sending every call with `format=json` and the consumer `api_key`
//! - Signing calls with OAuth 1.0a when an access token is configured
//! - Running the three-legged OAuth token exchange
//!
//! The primary entry point is [`FlickrClient`].
//!
//! # Example
//!
//! ```ignore
//! use flickrview_api::FlickrClient;
//! use flickrview_types::Credentials;
//! use indexmap::IndexMap;
//!
//! # async fn run(credentials: Credentials) -> Result<(), flickrview_api::ApiError> {
//! let client = FlickrClient::new(credentials)?;
//! let mut arguments = IndexMap::new();
//! arguments.insert("user_id".to_string(), "12345@N00".to_string());
//! let person = client.call("people.getInfo", &arguments).await?;
//! println!("{}", person["person"]["username"]["_content"]);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod oauth;

use std::time::Duration;
use std::{env, fmt};

use flickrview_types::{AccessToken, Credentials, Permission, RequestToken};
use flickrview_util::http::{parse_response_json_strict, truncate_response_preview};
use indexmap::IndexMap;
use reqwest::{Client, StatusCode, Url, header};
use serde_json::Value;
use tracing::debug;

pub use error::ApiError;
use oauth::{Freshness, Signer, TokenPair};

/// Default REST endpoint.
pub const DEFAULT_REST_URL: &str = "https://api.flickr.com/services/rest/";
/// Default base for the OAuth endpoints (`request_token`, `authorize`, `access_token`).
pub const DEFAULT_OAUTH_URL: &str = "https://www.flickr.com/services/oauth";
/// Prefix shared by every Flickr API method name.
pub const METHOD_PREFIX: &str = "flickr.";
/// Callback value for the out-of-band (copy the verifier by hand) flow.
pub const OUT_OF_BAND_CALLBACK: &str = "oob";

/// Allowed base domains for non-local endpoints. Subdomains are allowed too.
const ALLOWED_FLICKR_DOMAINS: &[&str] = &["flickr.com"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];
/// Parameters the client always sets itself.
const RESERVED_PARAMS: &[&str] = &["method", "format", "nojsoncallback", "api_key"];

/// Thin wrapper around a configured `reqwest::Client` for Flickr access.
#[derive(Clone)]
pub struct FlickrClient {
    rest_url: String,
    oauth_url: String,
    http: Client,
    credentials: Credentials,
}

impl fmt::Debug for FlickrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlickrClient")
            .field("rest_url", &self.rest_url)
            .field("oauth_url", &self.oauth_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl FlickrClient {
    /// Build a client against the public Flickr endpoints.
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_endpoints(credentials, None, None)
    }

    /// Build a client with optional endpoint overrides.
    ///
    /// Non-localhost endpoints must use HTTPS on a flickr.com host.
    pub fn with_endpoints(credentials: Credentials, rest_url: Option<&str>, oauth_url: Option<&str>) -> Result<Self, ApiError> {
        let rest_url = rest_url.unwrap_or(DEFAULT_REST_URL).to_string();
        let oauth_url = oauth_url.unwrap_or(DEFAULT_OAUTH_URL).trim_end_matches('/').to_string();
        validate_base_url(&rest_url)?;
        validate_base_url(&oauth_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .user_agent(format!("flickrview/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            rest_url,
            oauth_url,
            http,
            credentials,
        })
    }

    /// Whether calls are signed with a user access token.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.access_token.is_some()
    }

    /// NSID of the authenticated user, when the token recorded one.
    pub fn authenticated_user(&self) -> Option<&str> {
        self.credentials
            .access_token
            .as_ref()
            .and_then(|token| token.user_nsid.as_deref())
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn signer(&self) -> Signer<'_> {
        Signer {
            consumer_key: &self.credentials.api_key,
            consumer_secret: &self.credentials.api_secret,
        }
    }

    /// Call a REST method with named arguments and return the parsed payload.
    ///
    /// Bare names are qualified (`people.getInfo` becomes
    /// `flickr.people.getInfo`). Caller-supplied values for the parameters the
    /// client manages itself (`api_key`, `format`, `oauth_*`, ...) are
    /// dropped. A single request is made; there are no retries.
    pub async fn call(&self, method: &str, arguments: &IndexMap<String, String>) -> Result<Value, ApiError> {
        let method = qualify_method(method);
        let mut params: Vec<(String, String)> = arguments
            .iter()
            .filter(|(key, _)| !is_reserved_param(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        params.push(("method".into(), method.clone()));
        params.push(("format".into(), "json".into()));
        params.push(("nojsoncallback".into(), "1".into()));
        params.push(("api_key".into(), self.credentials.api_key.clone()));

        let params = match &self.credentials.access_token {
            Some(token) => self.signer().sign(
                "GET",
                &self.rest_url,
                params,
                Some(TokenPair {
                    token: &token.token,
                    secret: &token.secret,
                }),
                &[],
                &Freshness::now(),
            ),
            None => params,
        };

        debug!(%method, authenticated = self.is_authenticated(), "calling Flickr");
        let response = self.http.get(&self.rest_url).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;
        interpret_response(status, &text)
    }

    /// Step one of the three-legged flow: obtain a temporary request token.
    pub async fn request_token(&self, callback: &str) -> Result<RequestToken, ApiError> {
        let url = format!("{}/request_token", self.oauth_url);
        let params = self
            .signer()
            .sign("GET", &url, Vec::new(), None, &[("oauth_callback", callback)], &Freshness::now());
        let fields = self.oauth_exchange(&url, &params).await?;
        Ok(RequestToken {
            token: required_field(&fields, "oauth_token")?,
            secret: required_field(&fields, "oauth_token_secret")?,
        })
    }

    /// Step two: the page where the user grants access to the request token.
    pub fn authorize_url(&self, request_token: &RequestToken, perms: Permission) -> Result<String, ApiError> {
        let base = format!("{}/authorize", self.oauth_url);
        let url = Url::parse_with_params(&base, [("oauth_token", request_token.token.as_str()), ("perms", perms.as_str())])
            .map_err(|error| ApiError::InvalidBaseUrl {
                url: base.clone(),
                reason: error.to_string(),
            })?;
        Ok(url.into())
    }

    /// Step three: trade the request token and verifier for an access token.
    pub async fn access_token(&self, request_token: &RequestToken, verifier: &str, perms: Permission) -> Result<AccessToken, ApiError> {
        let url = format!("{}/access_token", self.oauth_url);
        let params = self.signer().sign(
            "GET",
            &url,
            Vec::new(),
            Some(TokenPair {
                token: &request_token.token,
                secret: &request_token.secret,
            }),
            &[("oauth_verifier", verifier.trim())],
            &Freshness::now(),
        );
        let fields = self.oauth_exchange(&url, &params).await?;
        Ok(AccessToken {
            token: required_field(&fields, "oauth_token")?,
            secret: required_field(&fields, "oauth_token_secret")?,
            perms,
            user_nsid: fields.get("user_nsid").cloned(),
            username: fields.get("username").cloned(),
        })
    }

    async fn oauth_exchange(&self, url: &str, params: &[(String, String)]) -> Result<IndexMap<String, String>, ApiError> {
        debug!(%url, "OAuth token exchange");
        let response = self.http.get(url).query(params).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::OAuth(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_response_preview(&text, 200)
            )));
        }
        Ok(parse_form_response(&text))
    }
}

/// Qualify a bare method name with the `flickr.` prefix.
pub fn qualify_method(method: &str) -> String {
    let method = method.trim();
    if method.starts_with(METHOD_PREFIX) {
        method.to_string()
    } else {
        format!("{METHOD_PREFIX}{method}")
    }
}

fn is_reserved_param(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key) || key.starts_with("oauth_")
}

/// Turn an HTTP status and body into the payload or a typed failure.
///
/// Flickr signals most failures with HTTP 200 and `stat: fail`; anything
/// without a recognizable `stat` is treated as malformed.
pub fn interpret_response(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            body: truncate_response_preview(text, 200),
        });
    }

    let payload = parse_response_json_strict(text, Some(status))?;
    match payload.get("stat").and_then(Value::as_str) {
        Some("ok") => Ok(payload),
        Some("fail") => Err(ApiError::Remote {
            code: payload.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }),
        Some(other) => Err(ApiError::Malformed(format!("unexpected stat '{other}'"))),
        None => Err(ApiError::Malformed("missing stat field".into())),
    }
}

/// Decode an `application/x-www-form-urlencoded` OAuth response body.
fn parse_form_response(text: &str) -> IndexMap<String, String> {
    url::form_urlencoded::parse(text.trim().as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

fn required_field(fields: &IndexMap<String, String>, name: &str) -> Result<String, ApiError> {
    fields
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| ApiError::OAuth(format!("response is missing {name}")))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be flickr.com or a
///   subdomain of it
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let parsed_base_url = Url::parse(base).map_err(|error| invalid(error.to_string()))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| invalid("URL must include a host".into()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        )));
    }

    let is_allowed_domain = ALLOWED_FLICKR_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{allowed_domain}"))
    });
    if !is_allowed_domain {
        return Err(invalid(format!(
            "host '{host_name}' is not allowed; must be one of {ALLOWED_FLICKR_DOMAINS:?} or a subdomain, or localhost"
        )));
    }

    Ok(())
}
