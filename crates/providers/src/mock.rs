use crate::Provider;
use crate::types::CompletionResult;
use parley_core::{Error, GenerationConfig, Message, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted reply for deterministic runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    Text { content: String },
    Error { message: String },
}

/// Mock configuration from TOML file
#[derive(Debug, Deserialize)]
struct MockConfig {
    responses: Vec<MockResponse>,
}

/// A request as the mock saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub generation: GenerationConfig,
}

/// Provider that replays scripted responses without network access
///
/// Responses are consumed in order. Every request is recorded so tests can
/// inspect exactly which transcript was sent.
pub struct MockProvider {
    responses: Vec<MockResponse>,
    current: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self { responses, current: AtomicUsize::new(0), requests: Mutex::new(Vec::new()) }
    }

    /// Shorthand for a mock that answers with the given texts in order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| MockResponse::Text { content: r.into() }).collect())
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: MockConfig =
            toml::from_str(toml_str).map_err(|e| Error::Parse(format!("Failed to parse mock responses: {}", e)))?;
        Ok(Self::new(config.responses))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read mock responses file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    fn get_next_response(&self) -> MockResponse {
        let index = self.current.fetch_add(1, Ordering::SeqCst);
        if index < self.responses.len() {
            self.responses[index].clone()
        } else {
            MockResponse::Text {
                content: format!(
                    "No more mock responses configured (requested: {}, available: {})",
                    index + 1,
                    self.responses.len()
                ),
            }
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(vec![MockResponse::Text {
            content: "Mock response - configure responses_file in parley.toml".to_string(),
        }])
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message], generation: &GenerationConfig) -> CompletionResult {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest { messages: messages.to_vec(), generation: *generation });
        }

        match self.get_next_response() {
            MockResponse::Text { content } => CompletionResult::success(content),
            MockResponse::Error { message } => CompletionResult::failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::default();
        assert_eq!(provider.responses.len(), 1);
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_response_parsing() {
        let toml = r#"
[[responses]]
type = "text"
content = "Hello, world!"

[[responses]]
type = "error"
message = "HTTP 401: No auth credentials found"
"#;

        let provider = MockProvider::from_toml_str(toml).unwrap();
        assert_eq!(provider.responses.len(), 2);
        assert!(matches!(provider.responses[0], MockResponse::Text { .. }));
        assert!(matches!(provider.responses[1], MockResponse::Error { .. }));
    }

    #[test]
    fn test_mock_response_parse_error() {
        let err = MockProvider::from_toml_str("[[responses]]\ntype = \"toolcall\"\n").err().unwrap();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_mock_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("responses.toml");
        std::fs::write(&path, "[[responses]]\ntype = \"text\"\ncontent = \"from file\"\n").unwrap();

        let provider = MockProvider::from_file(&path).unwrap();
        assert_eq!(provider.responses, vec![MockResponse::Text { content: "from file".to_string() }]);
    }

    #[tokio::test]
    async fn test_mock_replays_in_order_and_records() {
        let provider = MockProvider::new(vec![
            MockResponse::Text { content: "one".to_string() },
            MockResponse::Error { message: "boom".to_string() },
        ]);
        let generation = GenerationConfig::default();
        let messages = vec![Message::user("hi")];

        assert_eq!(provider.complete(&messages, &generation).await, CompletionResult::success("one"));
        assert_eq!(provider.complete(&messages, &generation).await, CompletionResult::failure("boom"));

        let exhausted = provider.complete(&messages, &generation).await;
        assert!(exhausted.text().unwrap().contains("No more mock responses"));

        assert_eq!(provider.call_count(), 3);
        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].messages, messages);
        assert_eq!(requests[0].generation, generation);
    }

    #[tokio::test]
    async fn test_mock_with_replies() {
        let provider = MockProvider::with_replies(["a", "b"]);
        let generation = GenerationConfig::default();

        assert_eq!(provider.complete(&[], &generation).await.text(), Some("a"));
        assert_eq!(provider.complete(&[], &generation).await.text(), Some("b"));
    }
}
