use onecontext_core::{
    ClientError,
    ClientResult,
    RetryPolicy,
};
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
};
use reqwest::{
    Client,
    Response,
    StatusCode,
};
use secrecy::{
    ExposeSecret,
    SecretString,
};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ClientConfig;

/// Client for the OneContext API.
///
/// Holds a pooled HTTP client with the bearer token installed as a
/// default header; endpoint methods live in the sibling modules
/// (`knowledge_bases`, `pipelines`, `indexes`, `files`, `runs`,
/// `query`, `generate`).
pub struct OneContext {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) retry_policy: RetryPolicy,
    openai_api_key: Option<SecretString>,
}

impl OneContext {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_key.expose_secret()
        ))
        .map_err(|e| ClientError::InvalidArgument(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
            openai_api_key: config.openai_api_key,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn openai_key(&self) -> Option<String> {
        self.openai_api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
    }

    /// Decodes a successful JSON response, or turns the failure status
    /// into the matching error variant with the server's own detail.
    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        &self, response: Response,
    ) -> ClientResult<T> {
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::ApiError(format!("Failed to parse API response: {e}")))
    }

    /// Like [`Self::handle_response`] but for endpoints returning plain
    /// text (the pipeline YAML, for one).
    pub(crate) async fn handle_text_response(&self, response: Response) -> ClientResult<String> {
        let response = check_status(response).await?;
        response
            .text()
            .await
            .map_err(|e| ClientError::ApiError(format!("Failed to read API response: {e}")))
    }

    /// For endpoints whose body we do not care about.
    pub(crate) async fn expect_success(&self, response: Response) -> ClientResult<()> {
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::AuthenticationFailed(
            read_error_detail(response).await,
        ));
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(read_error_detail(response).await));
    }

    if !status.is_success() {
        return Err(ClientError::ApiError(format!(
            "OneContext API error ({status}): {}",
            read_error_detail(response).await
        )));
    }

    Ok(response)
}

/// Error payload shape used across the API. Endpoints disagree on which
/// field they populate, so take them in preference order.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<Value>,
    detail: Option<String>,
    message: Option<String>,
}

impl ApiErrorBody {
    fn first_detail(&self) -> Option<String> {
        if let Some(first) = self.errors.first() {
            return Some(match first {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        self.detail.clone().or_else(|| self.message.clone())
    }
}

async fn read_error_detail(response: Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.first_detail().unwrap_or(text),
        Err(_) => text,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(body: Value) -> Option<String> {
        serde_json::from_value::<ApiErrorBody>(body)
            .unwrap()
            .first_detail()
    }

    #[test]
    fn test_errors_array_wins() {
        let detail = decode(json!({
            "errors": ["knowledge base already exists"],
            "detail": "ignored",
            "message": "ignored",
        }));
        assert_eq!(detail.unwrap(), "knowledge base already exists");
    }

    #[test]
    fn test_detail_beats_message() {
        let detail = decode(json!({"detail": "bad request", "message": "ignored"}));
        assert_eq!(detail.unwrap(), "bad request");
    }

    #[test]
    fn test_message_is_the_last_resort() {
        let detail = decode(json!({"message": "something broke"}));
        assert_eq!(detail.unwrap(), "something broke");
    }

    #[test]
    fn test_structured_error_entries_are_stringified() {
        let detail = decode(json!({"errors": [{"field": "name", "code": "blank"}]}));
        assert_eq!(detail.unwrap(), r#"{"code":"blank","field":"name"}"#);
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        assert!(decode(json!({})).is_none());
    }
}
