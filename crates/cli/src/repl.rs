use crate::commands::{HELP, Input, SlashCommand, parse_input};
use crate::render::{render_error, render_history, render_info, render_result};
use anyhow::Result;
use owo_colors::OwoColorize;
use parley_chat::ChatSession;
use parley_core::Attachment;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented chat loop
///
/// Reads until EOF or `/quit`. Failed turns and bad commands are reported
/// and the loop keeps going. Input bytes that are not valid UTF-8 are
/// replaced with U+FFFD, as for attachments.
pub async fn run_repl<R, W>(session: &mut ChatSession, mut input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        output,
        "{} ({}). Type /help for commands.",
        "Parley".green().bold(),
        session.generation().model()
    )?;

    let mut buf = Vec::new();
    loop {
        write!(output, "{} ", ">".cyan().bold())?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            writeln!(output)?;
            break;
        }
        let line = String::from_utf8_lossy(&buf);

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Message(text) => {
                let result = session.submit(&text).await;
                writeln!(output, "{}", render_result(&result))?;
            }
            Input::Command(command) => {
                if let Flow::Quit = handle_command(session, command, output)? {
                    break;
                }
            }
            Input::Invalid(message) => writeln!(output, "{}", render_error(&message))?,
        }
    }

    Ok(())
}

fn handle_command<W: Write>(session: &mut ChatSession, command: SlashCommand, output: &mut W) -> Result<Flow> {
    match command {
        SlashCommand::Clear => {
            session.clear();
            writeln!(output, "{}", render_info("Conversation cleared"))?;
        }
        SlashCommand::Attach(path) => match Attachment::read(&path) {
            Ok(attachment) => {
                session.attach(&attachment);
                writeln!(output, "{} {}", "Loaded:".green().bold(), attachment.name)?;
            }
            Err(e) => writeln!(output, "{}", render_error(&e.to_string()))?,
        },
        SlashCommand::History => writeln!(output, "{}", render_history(session.transcript()))?,
        SlashCommand::Model(None) => writeln!(output, "{}", render_info(session.generation().model().as_str()))?,
        SlashCommand::Model(Some(model)) => {
            session.generation_mut().set_model(model);
            writeln!(output, "{}", render_info(&format!("Model set to {}", model)))?;
        }
        SlashCommand::Temperature(temperature) => match session.generation_mut().set_temperature(temperature) {
            Ok(()) => writeln!(output, "{}", render_info(&format!("Temperature set to {}", temperature)))?,
            Err(e) => writeln!(output, "{}", render_error(&e.to_string()))?,
        },
        SlashCommand::MaxTokens(max_tokens) => match session.generation_mut().set_max_tokens(max_tokens) {
            Ok(()) => writeln!(output, "{}", render_info(&format!("Max tokens set to {}", max_tokens)))?,
            Err(e) => writeln!(output, "{}", render_error(&e.to_string()))?,
        },
        SlashCommand::Help => writeln!(output, "{}", HELP)?,
        SlashCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{GenerationConfig, Message, Model};
    use parley_providers::{MockProvider, MockResponse};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(provider: Arc<MockProvider>) -> ChatSession {
        ChatSession::new(provider, GenerationConfig::default(), Some("S".to_string()))
    }

    async fn drive(session: &mut ChatSession, script: &str) -> String {
        let mut output = Vec::new();
        run_repl(session, script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_repl_turn_and_quit() {
        let provider = Arc::new(MockProvider::with_replies(["hello"]));
        let mut session = session(provider.clone());

        let output = drive(&mut session, "hi\n/quit\nignored\n").await;

        assert!(output.contains("hello"));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(
            session.transcript().messages(),
            &[Message::system("S"), Message::user("hi"), Message::assistant("hello")]
        );
    }

    #[tokio::test]
    async fn test_repl_failure_keeps_going() {
        let provider = Arc::new(MockProvider::new(vec![
            MockResponse::Error { message: "HTTP 401: No auth credentials found".to_string() },
            MockResponse::Text { content: "second try".to_string() },
        ]));
        let mut session = session(provider);

        let output = drive(&mut session, "hi\nagain\n").await;

        assert!(output.contains("HTTP 401: No auth credentials found"));
        assert!(output.contains("second try"));
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_repl_survives_invalid_utf8() {
        let provider = Arc::new(MockProvider::with_replies(["one", "two"]));
        let mut session = session(provider.clone());

        let mut output = Vec::new();
        run_repl(&mut session, &b"caf\xe9\nhello\n"[..], &mut output).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(session.transcript().messages()[1], Message::user("caf\u{FFFD}"));
        assert_eq!(session.transcript().messages()[3], Message::user("hello"));
    }

    #[tokio::test]
    async fn test_repl_skips_blank_lines() {
        let provider = Arc::new(MockProvider::with_replies(["x"]));
        let mut session = session(provider.clone());

        drive(&mut session, "\n   \n").await;

        assert_eq!(provider.call_count(), 0);
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_repl_attach_and_history() {
        let temp = TempDir::new().unwrap();
        let notes = temp.path().join("notes.md");
        std::fs::write(&notes, "# Notes").unwrap();

        let mut session = session(Arc::new(MockProvider::default()));
        let script = format!("/attach {}\n/history\n", notes.display());
        let output = drive(&mut session, &script).await;

        assert!(output.contains("Loaded:"));
        assert!(output.contains("notes.md"));
        assert_eq!(session.transcript().last(), Some(&Message::system("File notes.md:\n# Notes")));
    }

    #[tokio::test]
    async fn test_repl_attach_failure_leaves_transcript() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("photo.png");
        std::fs::write(&image, [0u8, 1, 2]).unwrap();

        let mut session = session(Arc::new(MockProvider::default()));
        let output = drive(&mut session, &format!("/attach {}\n", image.display())).await;

        assert!(output.contains("unsupported file type"));
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_repl_generation_commands() {
        let mut session = session(Arc::new(MockProvider::default()));

        let output = drive(
            &mut session,
            "/model openai/gpt-4o-mini\n/temperature 0.2\n/max-tokens 5000\n/max-tokens 400\n",
        )
        .await;

        assert_eq!(session.generation().model(), Model::Gpt4oMini);
        assert_eq!(session.generation().temperature(), 0.2);
        assert_eq!(session.generation().max_tokens(), 400);
        assert!(output.contains("Error:"));
    }

    #[tokio::test]
    async fn test_repl_clear() {
        let mut session = session(Arc::new(MockProvider::with_replies(["one"])));

        drive(&mut session, "hi\n/clear\n").await;

        assert_eq!(session.transcript().messages(), &[Message::system("S")]);
    }
}
