use parley_core::{Error, GenerationConfig, Message, ProviderConfig, Result, TransportError};
use reqwest::Client as HttpClient;
use std::error::Error as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::mock::MockProvider;
use crate::types::*;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const DEFAULT_TITLE: &str = "Parley Chatbot";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A completion backend
///
/// One call is one billable round trip: no retries, no streaming. The
/// credential is bound when the provider is constructed.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, messages: &[Message], generation: &GenerationConfig) -> CompletionResult;
}

/// OpenRouter chat completions client
pub struct OpenRouterProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    referer: String,
    title: String,
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl OpenRouterProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> OpenRouterProviderBuilder {
        OpenRouterProviderBuilder::new(api_key)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self, messages: &[Message], generation: &GenerationConfig,
    ) -> std::result::Result<String, TransportError> {
        let request = ChatRequest::new(messages, generation);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::network(describe_reqwest_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(describe_reqwest_error(&e)))?;

        if !status.is_success() {
            return Err(TransportError::status(
                status.as_u16(),
                extract_error_reason(&body, status.canonical_reason()),
            ));
        }

        ChatResponse::parse(&body)?.into_reply()
    }
}

#[async_trait::async_trait]
impl Provider for OpenRouterProvider {
    async fn complete(&self, messages: &[Message], generation: &GenerationConfig) -> CompletionResult {
        tracing::debug!(
            model = %generation.model(),
            messages = messages.len(),
            temperature = generation.temperature(),
            max_tokens = generation.max_tokens(),
            "sending completion request"
        );

        let started = std::time::Instant::now();
        let result = self.send(messages, generation).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => tracing::debug!(elapsed_ms, reply_chars = text.chars().count(), "completion succeeded"),
            Err(error) => tracing::debug!(elapsed_ms, status = ?error.status_code(), %error, "completion failed"),
        }

        result.into()
    }
}

/// Builder for [`OpenRouterProvider`]
pub struct OpenRouterProviderBuilder {
    api_key: String,
    base_url: String,
    referer: String,
    title: String,
    timeout: Duration,
}

impl OpenRouterProviderBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenRouterProvider> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        let client = HttpClient::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(OpenRouterProvider {
            client,
            api_key: self.api_key,
            base_url: self.base_url,
            referer: self.referer,
            title: self.title,
        })
    }
}

/// reqwest's Display omits the cause chain, which holds the useful part
fn describe_reqwest_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "request timed out".to_string();
    }

    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

/// Factory to create providers from config
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the configured provider; a missing credential is a configuration error
    pub fn create_from_config(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
        Self::create_with_env(config, |name| std::env::var(name).ok())
    }

    pub fn create_with_env(
        config: &ProviderConfig, lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Arc<dyn Provider>> {
        match config {
            ProviderConfig::OpenRouter { base_url, referer, title, timeout_secs, .. } => {
                let api_key = config.resolve_api_key_with(lookup)?;
                let provider = OpenRouterProvider::builder(api_key)
                    .base_url(base_url.clone())
                    .referer(referer.clone())
                    .title(title.clone())
                    .timeout(Duration::from_secs(*timeout_secs))
                    .build()?;
                tracing::info!(provider = "openrouter", base_url = %base_url, "provider ready");
                Ok(Arc::new(provider))
            }
            ProviderConfig::Mock { responses_file } => {
                let provider = match responses_file {
                    Some(path) => MockProvider::from_file(Path::new(path))?,
                    None => MockProvider::default(),
                };
                tracing::info!(provider = "mock", "provider ready");
                Ok(Arc::new(provider))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_provider_creation() {
        let provider = OpenRouterProvider::new("test-key".to_string()).unwrap();
        assert_eq!(provider.api_key, "test-key");
        assert_eq!(provider.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(provider.referer, "http://localhost:3000");
        assert_eq!(provider.title, "Parley Chatbot");
        assert_eq!(provider.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_openrouter_provider_custom_url() {
        let provider = OpenRouterProvider::builder("test-key")
            .base_url("https://custom.api.com/v1/")
            .title("Other")
            .build()
            .unwrap();
        assert_eq!(provider.endpoint(), "https://custom.api.com/v1/chat/completions");
        assert_eq!(provider.title, "Other");
    }

    #[test]
    fn test_openrouter_provider_rejects_empty_key() {
        let err = OpenRouterProvider::new("  ".to_string()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = OpenRouterProvider::new("sk-secret".to_string()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("openrouter.ai"));
    }

    #[test]
    fn test_factory_missing_key_is_config_error() {
        let result = ProviderFactory::create_with_env(&ProviderConfig::default(), |_| None);
        match result {
            Err(Error::Config(message)) => assert!(message.contains("OPENROUTER_API_KEY")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("provider created without a credential"),
        }
    }

    #[test]
    fn test_factory_uses_env_key() {
        let result = ProviderFactory::create_with_env(&ProviderConfig::default(), |_| Some("env-key".to_string()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_factory_mock_without_file() {
        let config = ProviderConfig::Mock { responses_file: None };
        assert!(ProviderFactory::create_with_env(&config, |_| None).is_ok());
    }

    #[test]
    fn test_factory_mock_missing_file() {
        let config = ProviderConfig::Mock { responses_file: Some("/nonexistent/responses.toml".into()) };
        assert!(ProviderFactory::create_with_env(&config, |_| None).is_err());
    }
}
