use parley_core::{Attachment, GenerationConfig, PrivacyConfig, Transcript, redact_content};
use parley_providers::{CompletionResult, Provider};
use std::sync::Arc;

/// One conversation with a completion backend
///
/// Owns the transcript exclusively. `submit` takes `&mut self`, so a second
/// turn cannot start while a request is outstanding.
pub struct ChatSession {
    transcript: Transcript,
    provider: Arc<dyn Provider>,
    generation: GenerationConfig,
    system_prompt: Option<String>,
    privacy: PrivacyConfig,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, generation: GenerationConfig, system_prompt: Option<String>) -> Self {
        let mut session = Self {
            transcript: Transcript::new(),
            provider,
            generation,
            system_prompt: system_prompt.filter(|p| !p.trim().is_empty()),
            privacy: PrivacyConfig::default(),
        };
        session.ensure_system_prompt();
        session
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn generation_mut(&mut self) -> &mut GenerationConfig {
        &mut self.generation
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Change the prompt used for new conversations
    ///
    /// An existing system message is left alone; the new prompt takes effect
    /// after the next `clear`.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self.ensure_system_prompt();
    }

    /// Run one turn: record the user text, send the transcript, record the reply
    ///
    /// On failure the user message stays and no assistant message is added.
    pub async fn submit(&mut self, text: &str) -> CompletionResult {
        self.ensure_system_prompt();
        self.transcript.append_user(text);

        tracing::debug!(
            turn = self.transcript.len(),
            content = %redact_content(text, &self.privacy),
            "user message"
        );

        let snapshot = self.transcript.snapshot();
        let result = self.provider.complete(&snapshot, &self.generation).await;

        match &result {
            CompletionResult::Success { text } => {
                tracing::debug!(content = %redact_content(text, &self.privacy), "assistant reply");
                self.transcript.append_assistant(text.clone());
            }
            CompletionResult::Failure { reason } => {
                tracing::info!(%reason, "turn failed; transcript keeps the user message");
            }
        }

        result
    }

    pub fn attach(&mut self, attachment: &Attachment) {
        tracing::info!(name = %attachment.name, chars = attachment.content.chars().count(), "attachment added");
        self.transcript.append_attachment(&attachment.name, &attachment.content);
    }

    /// Empty the transcript and start over with the configured prompt
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.ensure_system_prompt();
        tracing::debug!("transcript cleared");
    }

    fn ensure_system_prompt(&mut self) {
        if let Some(prompt) = &self.system_prompt {
            self.transcript.ensure_system_prompt(prompt);
        }
    }
}
