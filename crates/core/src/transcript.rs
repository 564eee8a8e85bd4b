use serde::{Deserialize, Serialize};

/// The role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single transcript entry
///
/// Serializes to the `{role, content}` shape the completion endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Ordered conversation history for one session
///
/// Insertion order is display order and send order. The transcript only
/// grows by appending, except for the system prompt which is inserted at
/// index 0 when no system message exists yet, and [`Transcript::clear`].
///
/// Attachments are appended as system messages at the end, so a transcript
/// may hold a second system message after the prompt at index 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `prompt` as a system message at index 0 unless one exists
    ///
    /// An empty prompt means "no prompt configured" and is ignored.
    /// Returns whether a message was inserted.
    pub fn ensure_system_prompt(&mut self, prompt: &str) -> bool {
        if prompt.is_empty() || self.messages.iter().any(Message::is_system) {
            return false;
        }
        self.messages.insert(0, Message::system(prompt));
        true
    }

    /// Append file content as a system message at the end of the transcript
    pub fn append_attachment(&mut self, name: &str, content: &str) {
        self.messages.push(Message::system(format!("File {}:\n{}", name, content)));
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Owned copy of the current messages, used as a request payload
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the leading system message, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages.first().filter(|m| m.is_system()).map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
        assert!(Message::system("s").is_system());
        assert!(!Message::user("u").is_system());
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));

        let msg: Message = serde_json::from_str(r#"{"role":"assistant","content":"hello"}"#).unwrap();
        assert_eq!(msg, Message::assistant("hello"));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_ensure_system_prompt_inserts_at_front() {
        let mut transcript = Transcript::new();
        transcript.append_user("hi");

        assert!(transcript.ensure_system_prompt("S"));
        assert_eq!(transcript.messages()[0], Message::system("S"));
        assert_eq!(transcript.messages()[1], Message::user("hi"));
        assert_eq!(transcript.system_prompt(), Some("S"));
    }

    #[test]
    fn test_ensure_system_prompt_idempotent() {
        let mut transcript = Transcript::new();
        assert!(transcript.ensure_system_prompt("first"));
        assert!(!transcript.ensure_system_prompt("second"));
        assert!(!transcript.ensure_system_prompt("first"));

        let systems = transcript.messages().iter().filter(|m| m.is_system()).count();
        assert_eq!(systems, 1);
        assert_eq!(transcript.messages()[0], Message::system("first"));
    }

    #[test]
    fn test_ensure_system_prompt_ignores_empty() {
        let mut transcript = Transcript::new();
        assert!(!transcript.ensure_system_prompt(""));
        assert!(transcript.is_empty());
        assert_eq!(transcript.system_prompt(), None);
    }

    #[test]
    fn test_ensure_system_prompt_keeps_whitespace_prompt() {
        let mut transcript = Transcript::new();
        assert!(transcript.ensure_system_prompt("   "));
        assert_eq!(transcript.messages(), &[Message::system("   ")]);
        assert!(!transcript.ensure_system_prompt("   "));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_ensure_system_prompt_skipped_when_attachment_present() {
        let mut transcript = Transcript::new();
        transcript.append_attachment("notes.md", "body");

        assert!(!transcript.ensure_system_prompt("S"));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.system_prompt(), Some("File notes.md:\nbody"));
    }

    #[test]
    fn test_append_attachment_goes_to_end() {
        let mut transcript = Transcript::new();
        transcript.ensure_system_prompt("S");
        transcript.append_user("hi");
        transcript.append_attachment("notes.txt", "line one\nline two");

        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.last(),
            Some(&Message::system("File notes.txt:\nline one\nline two"))
        );
        let systems = transcript.messages().iter().filter(|m| m.is_system()).count();
        assert_eq!(systems, 2);
        assert_eq!(transcript.system_prompt(), Some("S"));
    }

    #[test]
    fn test_append_user_then_assistant_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.ensure_system_prompt("S");
        transcript.append_user("one");
        transcript.append_assistant("two");
        let before = transcript.snapshot();

        transcript.append_user("three");
        transcript.append_assistant("four");

        let after = transcript.snapshot();
        assert_eq!(after.len(), before.len() + 2);
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after[before.len()], Message::user("three"));
        assert_eq!(after[before.len() + 1], Message::assistant("four"));
    }

    #[test]
    fn test_clear_then_snapshot_is_empty() {
        let mut transcript = Transcript::new();
        transcript.ensure_system_prompt("S");
        transcript.append_user("hi");
        transcript.append_assistant("hello");

        transcript.clear();
        assert!(transcript.snapshot().is_empty());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut transcript = Transcript::new();
        transcript.append_user("hi");
        let snapshot = transcript.snapshot();

        transcript.append_assistant("hello");
        assert_eq!(snapshot, vec![Message::user("hi")]);
        assert_eq!(transcript.len(), 2);
    }
}
