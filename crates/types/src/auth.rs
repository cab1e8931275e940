//! Credential types for OAuth 1.0a access to Flickr.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Consumer credentials plus an optional user access token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    #[serde(default)]
    pub access_token: Option<AccessToken>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("access_token", &self.access_token)
            .finish()
    }
}

/// Long-lived OAuth access token obtained through the three-legged flow.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
    #[serde(default)]
    pub perms: Permission,
    #[serde(default)]
    pub user_nsid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .field("perms", &self.perms)
            .field("user_nsid", &self.user_nsid)
            .field("username", &self.username)
            .finish()
    }
}

/// Temporary token issued at the start of the three-legged flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
}

/// Permission level requested during authorization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Read,
    Write,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePermissionError;

impl fmt::Display for ParsePermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid permission; expected 'read', 'write' or 'delete'")
    }
}

impl std::error::Error for ParsePermissionError {}

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(ParsePermissionError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials {
            api_key: "key".into(),
            api_secret: "consumer-secret".into(),
            access_token: Some(AccessToken {
                token: "token".into(),
                secret: "token-secret".into(),
                perms: Permission::Read,
                user_nsid: None,
                username: None,
            }),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("consumer-secret"));
        assert!(!rendered.contains("token-secret"));
        assert!(rendered.contains("key"));
    }

    #[test]
    fn permission_parses_case_insensitively() {
        assert_eq!("Write".parse::<Permission>(), Ok(Permission::Write));
        assert!("admin".parse::<Permission>().is_err());
    }
}
