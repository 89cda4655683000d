//! Hosting platform identity tokens.
//!
//! The token is opaque: it is read from the provider and surfaced as JSON,
//! never inspected.

use std::env;
use std::time::Duration;

use serde::Serialize;

use crate::error::CliError;

/// Source of an identity token and its advertised lifetime.
pub trait TokenProvider {
    /// Returns the current identity token.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Identity`] if no token is available.
    fn token(&self) -> Result<String, CliError>;

    /// Returns how long a token stays valid.
    fn token_timeout(&self) -> Duration;
}

/// Reads the identity token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
    timeout: Duration,
}

impl EnvTokenProvider {
    /// Creates a provider reading `var`, reporting `timeout` as the lifetime.
    #[must_use]
    pub fn new(var: impl Into<String>, timeout: Duration) -> Self {
        Self {
            var: var.into(),
            timeout,
        }
    }

    /// Returns the name of the environment variable consulted.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl TokenProvider for EnvTokenProvider {
    fn token(&self) -> Result<String, CliError> {
        match env::var(&self.var) {
            Ok(token) if !token.is_empty() => Ok(token),
            Ok(_) => Err(CliError::Identity(format!("`{}` is empty", self.var))),
            Err(err) => Err(CliError::Identity(format!("`{}`: {err}", self.var))),
        }
    }

    fn token_timeout(&self) -> Duration {
        self.timeout
    }
}

/// JSON body printed by `l402 identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityToken {
    /// Opaque identity token.
    pub token: String,
    /// Token lifetime in seconds.
    pub timeout: u64,
}

impl IdentityToken {
    /// Fetches a token and its lifetime from `provider`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error.
    pub fn fetch(provider: &dyn TokenProvider) -> Result<Self, CliError> {
        Ok(Self {
            token: provider.token()?,
            timeout: provider.token_timeout().as_secs(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct FixedProvider(pub Option<&'static str>);

    impl TokenProvider for FixedProvider {
        fn token(&self) -> Result<String, CliError> {
            self.0
                .map(str::to_owned)
                .ok_or_else(|| CliError::Identity("no token".to_owned()))
        }

        fn token_timeout(&self) -> Duration {
            Duration::from_secs(900)
        }
    }

    #[test]
    fn test_fetch_serializes_token_and_timeout() {
        let identity = IdentityToken::fetch(&FixedProvider(Some("eyJhbGciOi"))).unwrap();
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["token"], "eyJhbGciOi");
        assert_eq!(json["timeout"], 900);
    }

    #[test]
    fn test_fetch_propagates_provider_error() {
        let err = IdentityToken::fetch(&FixedProvider(None)).unwrap_err();
        assert!(matches!(err, CliError::Identity(_)));
    }

    #[test]
    fn test_env_provider_reports_missing_variable() {
        let provider = EnvTokenProvider::new(
            "L402_TEST_IDENTITY_VARIABLE_THAT_IS_NEVER_SET",
            Duration::from_secs(60),
        );
        let err = provider.token().unwrap_err();
        assert!(err.to_string().contains("L402_TEST_IDENTITY_VARIABLE_THAT_IS_NEVER_SET"));
        assert_eq!(provider.token_timeout(), Duration::from_secs(60));
    }
}
