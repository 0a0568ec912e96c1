use std::time::Duration;

use onecontext_core::{
    ClientError,
    ClientResult,
};
use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://api.onecontext.ai";

const API_KEY_ENV: &str = "ONECONTEXT_API_KEY";
const BASE_URL_ENV: &str = "ONECONTEXT_BASE_URL";
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Connection settings for [`crate::OneContext`].
///
/// The OpenAI key is only forwarded to the generation endpoints
/// (quiz/quest/completion); everything else runs on the OneContext key
/// alone.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub openai_api_key: Option<SecretString>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            openai_api_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Reads `ONECONTEXT_API_KEY` (required), `ONECONTEXT_BASE_URL` and
    /// `OPENAI_API_KEY` (both optional).
    pub fn from_env() -> ClientResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ClientError::InvalidArgument(format!("{API_KEY_ENV} is not set")))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(openai_key) = std::env::var(OPENAI_KEY_ENV) {
            config.openai_api_key = Some(SecretString::from(openai_key));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_openai_api_key(mut self, openai_api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(SecretString::from(openai_api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_setters() {
        let config = ClientConfig::new("key")
            .with_base_url("http://localhost:8000/")
            .with_openai_api_key("sk-test")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:8000/");
        assert!(config.openai_api_key.is_some());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
