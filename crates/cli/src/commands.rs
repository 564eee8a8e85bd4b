use parley_core::Model;
use std::path::PathBuf;

/// A line typed at the chat prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Blank line, ignored
    Empty,
    /// Text sent to the model as a user message
    Message(String),
    Command(SlashCommand),
    /// Unknown command or bad argument, with a message for the user
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Clear,
    Attach(PathBuf),
    History,
    /// Show the current model, or switch to another one
    Model(Option<Model>),
    Temperature(f32),
    MaxTokens(u32),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /clear              start over (system prompt is kept)
  /attach <file>      add a .txt or .md file to the conversation
  /history            show the conversation so far
  /model [id]         show or switch the model
  /temperature <f>    set temperature (0.0 to 1.0)
  /max-tokens <n>     set the reply length cap (100 to 2000)
  /help               show this help
  /quit               exit";

/// Classify one line of user input
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Message(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match parse_command(name, arg) {
        Ok(command) => Input::Command(command),
        Err(message) => Input::Invalid(message),
    }
}

fn parse_command(name: &str, arg: &str) -> Result<SlashCommand, String> {
    match name {
        "clear" => Ok(SlashCommand::Clear),
        "attach" => {
            if arg.is_empty() {
                return Err("usage: /attach <file>".to_string());
            }
            Ok(SlashCommand::Attach(PathBuf::from(arg)))
        }
        "history" => Ok(SlashCommand::History),
        "model" => {
            if arg.is_empty() {
                return Ok(SlashCommand::Model(None));
            }
            arg.parse::<Model>().map(|m| SlashCommand::Model(Some(m))).map_err(|e| e.to_string())
        }
        "temperature" | "temp" => arg
            .parse::<f32>()
            .map(SlashCommand::Temperature)
            .map_err(|_| "usage: /temperature <0.0-1.0>".to_string()),
        "max-tokens" | "max_tokens" => arg
            .parse::<u32>()
            .map(SlashCommand::MaxTokens)
            .map_err(|_| "usage: /max-tokens <100-2000>".to_string()),
        "help" | "?" => Ok(SlashCommand::Help),
        "quit" | "exit" | "q" => Ok(SlashCommand::Quit),
        other => Err(format!("unknown command: /{} (try /help)", other)),
    }
}
