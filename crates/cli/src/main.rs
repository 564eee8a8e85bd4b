mod commands;
mod render;
mod repl;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use owo_colors::OwoColorize;
use parley_chat::ChatSession;
use parley_core::config::DEFAULT_CONFIG_FILE;
use parley_core::logging::sanitize_path;
use parley_core::{Attachment, Config, LoggingConfig, Model, PrivacyConfig, init_logging};
use parley_providers::{CompletionResult, Provider, ProviderFactory};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parley - chat with hosted language models from the terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "A terminal chat client for OpenRouter models", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to parley.toml (default: ./parley.toml if present)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat (default)
    Chat(GenerationArgs),
    /// Send a single prompt and print the reply
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true, value_name = "PROMPT", num_args = 1..)]
        prompt: Vec<String>,

        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// List the available models
    Models,
    /// Write an example parley.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Per-run overrides for the configured generation settings
#[derive(Args, Debug, Clone, Default)]
struct GenerationArgs {
    /// Model id, e.g. openai/gpt-4o-mini
    #[arg(short, long, value_name = "ID")]
    model: Option<Model>,

    /// Sampling temperature (0.0 to 1.0)
    #[arg(short, long, value_name = "F")]
    temperature: Option<f32>,

    /// Reply length cap (100 to 2000)
    #[arg(long, value_name = "N")]
    max_tokens: Option<u32>,

    /// System prompt for this run
    #[arg(short, long, value_name = "TEXT", conflicts_with = "no_system")]
    system: Option<String>,

    /// Send no system prompt
    #[arg(long)]
    no_system: bool,

    /// Add a .txt or .md file to the conversation (repeatable)
    #[arg(short, long, value_name = "FILE")]
    attach: Vec<PathBuf>,
}

impl GenerationArgs {
    fn system_prompt(&self, config: &Config) -> Option<String> {
        if self.no_system {
            return None;
        }
        self.system.clone().or_else(|| config.chat.system_prompt().map(str::to_string))
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Commands::Chat(GenerationArgs::default()));

    match command {
        Commands::Models => cmd_models(&mut std::io::stdout()),
        Commands::Init { force } => cmd_init(cli.config.as_deref(), force),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "parley", &mut std::io::stdout());
            Ok(())
        }
        Commands::Chat(args) => {
            let config = load_config(cli.config.as_deref())?;
            let _guard = init_logging(logging_config(&config, cli.verbose))?;
            runtime()?.block_on(cmd_chat(&config, &args))
        }
        Commands::Ask { prompt, generation } => {
            let config = load_config(cli.config.as_deref())?;
            let _guard = init_logging(logging_config(&config, cli.verbose))?;
            runtime()?.block_on(cmd_ask(&config, &prompt.join(" "), &generation))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

fn logging_config(config: &Config, verbose: bool) -> LoggingConfig {
    let logging = LoggingConfig::from(config.logging.clone());
    if verbose { logging.with_level("debug") } else { logging }
}

/// Missing credentials stop here, before any request is made
fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    ProviderFactory::create_from_config(&config.provider).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\n  export {}=sk-or-...\n\nor run `parley init` and set api_key under [provider].",
            e,
            parley_core::API_KEY_ENV
        )
    })
}

/// Session with config defaults, command-line overrides and any attachments
///
/// `Loaded:` notices go to `notices`; `ask` passes stderr so stdout carries
/// only the reply.
fn build_session<W: Write>(
    config: &Config, args: &GenerationArgs, provider: Arc<dyn Provider>, notices: &mut W,
) -> Result<ChatSession> {
    let mut generation = config.generation_config()?;
    if let Some(model) = args.model {
        generation.set_model(model);
    }
    if let Some(temperature) = args.temperature {
        generation.set_temperature(temperature)?;
    }
    if let Some(max_tokens) = args.max_tokens {
        generation.set_max_tokens(max_tokens)?;
    }

    let mut session = ChatSession::new(provider, generation, args.system_prompt(config))
        .with_privacy(PrivacyConfig::from(&config.logging.privacy));

    for path in &args.attach {
        match Attachment::read(path) {
            Ok(attachment) => {
                session.attach(&attachment);
                writeln!(notices, "{} {}", "Loaded:".green().bold(), attachment.name)?;
            }
            Err(e) => {
                tracing::info!(path = %sanitize_path(path), error = %e, "attachment skipped");
                eprintln!("{} {}", "Warning:".yellow().bold(), e);
            }
        }
    }

    Ok(session)
}

async fn cmd_chat(config: &Config, args: &GenerationArgs) -> Result<()> {
    let provider = create_provider(config)?;
    let mut session = build_session(config, args, provider, &mut std::io::stdout())?;
    tracing::info!(provider = config.provider.name(), model = %session.generation().model(), "chat started");

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run_repl(&mut session, input, &mut std::io::stdout()).await
}

async fn cmd_ask(config: &Config, prompt: &str, args: &GenerationArgs) -> Result<()> {
    let provider = create_provider(config)?;
    let mut session = build_session(config, args, provider, &mut std::io::stderr())?;

    match session.submit(prompt).await {
        CompletionResult::Success { text } => {
            println!("{}", text);
            Ok(())
        }
        CompletionResult::Failure { reason } => anyhow::bail!(reason),
    }
}

fn cmd_models<W: Write>(output: &mut W) -> Result<()> {
    for model in Model::VALUES {
        if *model == Model::default() {
            writeln!(output, "{} {}", model.as_str().cyan(), "(default)".dimmed())?;
        } else {
            writeln!(output, "{}", model.as_str().cyan())?;
        }
    }
    Ok(())
}

fn cmd_init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    std::fs::write(path, Config::example()).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}
