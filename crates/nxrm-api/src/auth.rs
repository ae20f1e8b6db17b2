use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Basic-auth credentials bound to a [`NexusClient`](crate::NexusClient).
///
/// Immutable once built. Every outbound request carries the header afresh;
/// no session or cookie is ever held. The password is never printed --
/// `Debug` redacts it.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Attach the `Authorization: Basic …` header to a request.
    ///
    /// reqwest marks the generated header value as sensitive, so it is
    /// excluded from its own debug output as well.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let auth = BasicAuth::new("admin", SecretString::from("admin123".to_owned()));
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("admin123"));
    }
}
