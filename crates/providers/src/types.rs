use parley_core::{GenerationConfig, Message, TransportError};
use serde::{Deserialize, Serialize};

/// Longest raw error body echoed back to the user
const MAX_REASON_CHARS: usize = 500;

/// Outcome of one completion round trip
///
/// Failures never escape as `Err` or panics; the caller decides how to show
/// them and must not append an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success { text: String },
    Failure { reason: String },
}

impl CompletionResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure { reason: reason.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            Self::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

impl From<Result<String, TransportError>> for CompletionResult {
    fn from(result: Result<String, TransportError>) -> Self {
        match result {
            Ok(text) => Self::Success { text },
            Err(error) => Self::Failure { reason: error.to_string() },
        }
    }
}

/// Chat completions request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'static str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    pub fn new(messages: &'a [Message], generation: &GenerationConfig) -> Self {
        Self {
            model: generation.model().as_str(),
            messages,
            temperature: generation.temperature(),
            max_tokens: generation.max_tokens(),
        }
    }
}

/// Chat completions response body
///
/// Every field is optional so that an unexpected shape surfaces as a
/// [`TransportError::MalformedResponse`] from [`ChatResponse::into_reply`]
/// instead of a decode failure with a less useful message.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl ChatResponse {
    pub fn parse(body: &str) -> Result<Self, TransportError> {
        serde_json::from_str(body).map_err(|e| TransportError::malformed(format!("invalid JSON body: {}", e)))
    }

    /// Content of `choices[0].message.content`
    pub fn into_reply(self) -> Result<String, TransportError> {
        let Some(choices) = self.choices else {
            let detail = self
                .error
                .and_then(|e| e.message)
                .map(|m| format!("response has no choices ({})", m))
                .unwrap_or_else(|| "response has no choices".to_string());
            return Err(TransportError::malformed(detail));
        };

        let choice = choices
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::malformed("response choices are empty"))?;

        choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| TransportError::malformed("first choice has no message content"))
    }
}

/// Best-effort human-readable reason for a non-success response
///
/// Prefers `error.message` from a JSON error body, then the trimmed raw body,
/// then the canonical status text.
pub fn extract_error_reason(body: &str, canonical: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.error.message
        && !message.trim().is_empty()
    {
        return message.trim().to_string();
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        let total = trimmed.chars().count();
        if total <= MAX_REASON_CHARS {
            return trimmed.to_string();
        }
        let mut truncated: String = trimmed.chars().take(MAX_REASON_CHARS).collect();
        truncated.push_str("...");
        return truncated;
    }

    canonical.unwrap_or("request failed").to_string()
}
