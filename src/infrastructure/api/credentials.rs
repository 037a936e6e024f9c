//! Authentication material and the headers it produces

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use std::fmt;

use super::errors::ApiError;

pub const X_AUTH_KEY: &str = "x-auth-key";
pub const X_AUTH_EMAIL: &str = "x-auth-email";
pub const X_AUTH_USER_SERVICE_KEY: &str = "x-auth-user-service-key";

/// Primary authentication scheme
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Global API key plus account email
    ApiKey { key: String, email: String },
    /// Scoped API token sent as a bearer token
    Token(String),
}

/// Credentials attached to every request a client sends.
///
/// A user service key may be combined with either auth method or used alone.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    auth: Option<AuthMethod>,
    user_service_key: Option<String>,
}

impl Credentials {
    pub fn api_key(key: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            auth: Some(AuthMethod::ApiKey {
                key: key.into(),
                email: email.into(),
            }),
            user_service_key: None,
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            auth: Some(AuthMethod::Token(token.into())),
            user_service_key: None,
        }
    }

    pub fn user_service_key(key: impl Into<String>) -> Self {
        Self {
            auth: None,
            user_service_key: Some(key.into()),
        }
    }

    #[must_use]
    pub fn with_user_service_key(mut self, key: impl Into<String>) -> Self {
        self.user_service_key = Some(key.into());
        self
    }

    pub const fn auth(&self) -> Option<&AuthMethod> {
        self.auth.as_ref()
    }

    /// True when no credential of any kind is present
    pub fn is_empty(&self) -> bool {
        let auth_empty = match &self.auth {
            None => true,
            Some(AuthMethod::Token(token)) => token.is_empty(),
            Some(AuthMethod::ApiKey { key, .. }) => key.is_empty(),
        };
        auth_empty && self.user_service_key.as_deref().map_or(true, str::is_empty)
    }

    /// Set the authentication headers, overriding any caller-supplied values.
    pub(crate) fn apply(&self, headers: &mut HeaderMap) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::NoCredentials);
        }

        match &self.auth {
            Some(AuthMethod::Token(token)) if !token.is_empty() => {
                headers.insert(AUTHORIZATION, secret_value("authorization", &format!("Bearer {token}"))?);
            }
            Some(AuthMethod::ApiKey { key, email }) if !key.is_empty() => {
                headers.insert(HeaderName::from_static(X_AUTH_KEY), secret_value(X_AUTH_KEY, key)?);
                headers.insert(HeaderName::from_static(X_AUTH_EMAIL), plain_value(X_AUTH_EMAIL, email)?);
            }
            _ => {}
        }

        if let Some(service_key) = self.user_service_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert(
                HeaderName::from_static(X_AUTH_USER_SERVICE_KEY),
                secret_value(X_AUTH_USER_SERVICE_KEY, service_key)?,
            );
        }

        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let auth = match &self.auth {
            None => "none".to_string(),
            Some(AuthMethod::Token(token)) => format!("token({})", redact(token)),
            Some(AuthMethod::ApiKey { key, email }) => format!("api_key({}, {email})", redact(key)),
        };
        f.debug_struct("Credentials")
            .field("auth", &auth)
            .field(
                "user_service_key",
                &self.user_service_key.as_deref().map(redact),
            )
            .finish()
    }
}

/// Keep a short prefix of a secret so log lines can be correlated.
pub fn redact(secret: &str) -> String {
    if secret.len() > 8 && secret.is_char_boundary(4) {
        format!("{}...[REDACTED]", &secret[..4])
    } else {
        "[REDACTED]".to_string()
    }
}

fn plain_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn secret_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    let mut header = plain_value(name, value)?;
    header.set_sensitive(true);
    Ok(header)
}
