use owo_colors::OwoColorize;
use parley_core::{Message, Role, Transcript};
use parley_providers::CompletionResult;

/// Longest attachment preview shown in `/history`
const ATTACHMENT_PREVIEW_CHARS: usize = 80;

fn label(role: Role) -> String {
    match role {
        Role::System => format!("{}", "system".yellow().bold()),
        Role::User => format!("{}", "you".cyan().bold()),
        Role::Assistant => format!("{}", "assistant".green().bold()),
    }
}

pub fn render_message(message: &Message) -> String {
    let content = if message.is_system() && message.content.starts_with("File ") {
        preview(&message.content)
    } else {
        message.content.clone()
    };
    format!("{}: {}", label(message.role), content)
}

fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    let total = content.chars().count();
    if total <= ATTACHMENT_PREVIEW_CHARS {
        return content.to_string();
    }
    format!("{} ({} chars)", first_line, total)
}

pub fn render_history(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return format!("{}", "(no messages)".dimmed());
    }
    transcript.messages().iter().map(render_message).collect::<Vec<_>>().join("\n")
}

pub fn render_error(reason: &str) -> String {
    format!("{} {}", "Error:".red().bold(), reason)
}

pub fn render_info(text: &str) -> String {
    format!("{} {}", "Info:".blue().bold(), text)
}

/// Reply text on success, an error line otherwise
pub fn render_result(result: &CompletionResult) -> String {
    match result {
        CompletionResult::Success { text } => format!("{}: {}", label(Role::Assistant), text),
        CompletionResult::Failure { reason } => render_error(reason),
    }
}
